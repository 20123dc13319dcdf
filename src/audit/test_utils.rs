//! In-memory OCI fakes for audit tests.

use std::{
    collections::{HashMap, HashSet},
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use crate::{
    notify::{Notification, Notifier},
    oci::{
        BackupLifecycleState, BlockStorageApi, BlockStorageConnector, BootVolumeBackup,
        Compartment, CompartmentLifecycleState, IdentityApi, OciError, OciResult, Page,
    },
};

pub fn compartment(id: &str, name: &str) -> Compartment {
    Compartment {
        id: id.to_string(),
        name: name.to_string(),
        lifecycle_state: CompartmentLifecycleState::Active,
        parent_id: Some("tenancy".to_string()),
    }
}

/// An available backup created 2024-03-05, 50 GB, without tags.
pub fn backup(id: &str, source: Option<&str>) -> BootVolumeBackup {
    BootVolumeBackup {
        id: id.to_string(),
        display_name: format!("{id}-name"),
        size_in_gbs: Some(50),
        time_created: Utc.with_ymd_and_hms(2024, 3, 5, 10, 11, 12).unwrap(),
        lifecycle_state: BackupLifecycleState::Available,
        source_boot_volume_id: source.map(str::to_string),
        defined_tags: HashMap::new(),
        freeform_tags: HashMap::new(),
    }
}

pub fn not_authorized() -> OciError {
    OciError::Service {
        status: 404,
        code: "NotAuthorizedOrNotFound".into(),
        message: "Authorization failed or requested resource not found.".into(),
        opc_request_id: None,
    }
}

pub fn internal_error() -> OciError {
    OciError::Service {
        status: 500,
        code: "InternalServerError".into(),
        message: "Internal error".into(),
        opc_request_id: None,
    }
}

/// Page `n` of `pages`, with the token of page `n + 1` when there is one.
fn page_at<T: Clone>(pages: &[Vec<T>], token: Option<&str>) -> Page<T> {
    let index = token.and_then(|t| t.parse::<usize>().ok()).unwrap_or(0);
    Page {
        items: pages.get(index).cloned().unwrap_or_default(),
        next_page: (index + 1 < pages.len()).then(|| (index + 1).to_string()),
    }
}

pub struct FakeIdentity {
    pages: Option<Vec<Vec<Compartment>>>,
    root: Option<Compartment>,
    list_requests: AtomicUsize,
    root_requests: AtomicUsize,
}

impl FakeIdentity {
    pub fn new(pages: Vec<Vec<Compartment>>) -> Self {
        Self {
            pages: Some(pages),
            root: None,
            list_requests: AtomicUsize::new(0),
            root_requests: AtomicUsize::new(0),
        }
    }

    /// Every listing call fails.
    pub fn failing() -> Self {
        Self {
            pages: None,
            ..Self::new(Vec::new())
        }
    }

    pub fn with_root(mut self, mut root: Compartment) -> Self {
        root.parent_id = None;
        self.root = Some(root);
        self
    }

    pub fn list_requests(&self) -> usize {
        self.list_requests.load(Ordering::SeqCst)
    }

    pub fn root_requests(&self) -> usize {
        self.root_requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityApi for FakeIdentity {
    async fn list_compartments_page(
        &self,
        _tenancy_id: &str,
        page: Option<&str>,
    ) -> OciResult<Page<Compartment>> {
        self.list_requests.fetch_add(1, Ordering::SeqCst);
        match &self.pages {
            Some(pages) => Ok(page_at(pages, page)),
            None => Err(internal_error()),
        }
    }

    async fn get_compartment(&self, _compartment_id: &str) -> OciResult<Compartment> {
        self.root_requests.fetch_add(1, Ordering::SeqCst);
        self.root.clone().ok_or_else(not_authorized)
    }
}

/// What a fake compartment answers to a backup listing.
#[derive(Clone)]
pub enum ScopeListing {
    Pages(Vec<Vec<BootVolumeBackup>>),
    NotAuthorized,
    Failing,
}

#[derive(Default)]
pub struct FakeStorage {
    scopes: HashMap<String, ScopeListing>,
    requested_states: Mutex<Vec<BackupLifecycleState>>,
    requested_scopes: Mutex<Vec<String>>,
}

impl FakeStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scope(mut self, compartment_id: &str, listing: ScopeListing) -> Self {
        self.scopes.insert(compartment_id.to_string(), listing);
        self
    }

    pub fn requested_states(&self) -> Vec<BackupLifecycleState> {
        self.requested_states.lock().unwrap().clone()
    }

    /// Compartments listed, once per first-page request.
    pub fn requested_scopes(&self) -> Vec<String> {
        self.requested_scopes.lock().unwrap().clone()
    }
}

#[async_trait]
impl BlockStorageApi for FakeStorage {
    async fn list_boot_volume_backups_page(
        &self,
        compartment_id: &str,
        lifecycle_state: BackupLifecycleState,
        page: Option<&str>,
    ) -> OciResult<Page<BootVolumeBackup>> {
        self.requested_states.lock().unwrap().push(lifecycle_state);
        if page.is_none() {
            self.requested_scopes
                .lock()
                .unwrap()
                .push(compartment_id.to_string());
        }

        match self.scopes.get(compartment_id) {
            Some(ScopeListing::Pages(pages)) => Ok(page_at(pages, page)),
            Some(ScopeListing::NotAuthorized) => Err(not_authorized()),
            Some(ScopeListing::Failing) => Err(internal_error()),
            None => Ok(Page::last(Vec::new())),
        }
    }
}

/// Hands out one [`FakeStorage`] per region code.
#[derive(Default)]
pub struct FakeConnector {
    regions: HashMap<String, Arc<FakeStorage>>,
    broken_regions: HashSet<String>,
    bound: Mutex<Vec<String>>,
}

impl FakeConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_region(mut self, region_code: &str, storage: FakeStorage) -> Self {
        self.regions
            .insert(region_code.to_string(), Arc::new(storage));
        self
    }

    /// Binding this region fails.
    pub fn with_broken_region(mut self, region_code: &str) -> Self {
        self.broken_regions.insert(region_code.to_string());
        self
    }

    pub fn storage(&self, region_code: &str) -> Arc<FakeStorage> {
        self.regions[region_code].clone()
    }

    pub fn bound_regions(&self) -> Vec<String> {
        self.bound.lock().unwrap().clone()
    }
}

impl BlockStorageConnector for FakeConnector {
    fn bind(&self, region_code: &str) -> OciResult<Arc<dyn BlockStorageApi>> {
        self.bound.lock().unwrap().push(region_code.to_string());
        if self.broken_regions.contains(region_code) {
            return Err(OciError::InvalidRegion(region_code.to_string()));
        }

        let storage: Arc<dyn BlockStorageApi> = match self.regions.get(region_code) {
            Some(storage) => storage.clone(),
            None => Arc::new(FakeStorage::new()),
        };
        Ok(storage)
    }
}

/// Records every notification instead of sending it.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: &Notification) {
        self.sent.lock().unwrap().push(notification.clone());
    }
}
