//! Exhaustive pagination over OCI list calls.

use std::future::Future;

use super::{OciError, OciResult, Page};

/// Upper bound on pages fetched by one list call.
const MAX_PAGES: usize = 10_000;

/// Fetch every page of a list call and concatenate the items in order.
///
/// `fetch` receives the token of the page to fetch (`None` for the first
/// one). Nothing is returned until the last page has been read, so callers
/// never see a partial listing.
pub async fn list_all<T, F, Fut>(mut fetch: F) -> OciResult<Vec<T>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = OciResult<Page<T>>>,
{
    let mut items = Vec::new();
    let mut token: Option<String> = None;

    for _ in 0..MAX_PAGES {
        let page = fetch(token.take()).await?;
        items.extend(page.items);

        match page.next_page {
            Some(next) => token = Some(next),
            None => return Ok(items),
        }
    }

    Err(OciError::Decode(format!(
        "list call did not terminate after {MAX_PAGES} pages"
    )))
}
