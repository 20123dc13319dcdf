//! Fn runtime unix socket handshake.
//!
//! The runtime announces `FN_LISTENER=unix:/tmp/iofs/lsnr.sock` and waits
//! for that path to appear. The socket is bound under a sibling name first,
//! opened up to the runtime's user, then published with a relative symlink so
//! the runtime never sees a half-initialized socket.

use std::{
    io,
    os::unix::fs::{PermissionsExt, symlink},
    path::{Path, PathBuf},
};

use tokio::net::UnixListener;

/// Path of the socket actually bound for `socket_path`.
pub fn phony_socket_path(socket_path: &Path) -> io::Result<PathBuf> {
    let file_name = socket_path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("listener path has no file name: {}", socket_path.display()),
        )
    })?;

    let mut phony = std::ffi::OsString::from("phony");
    phony.push(file_name);
    Ok(socket_path.with_file_name(phony))
}

/// Bind the function's listener at `socket_path`.
pub fn bind_fn_socket(socket_path: &Path) -> io::Result<UnixListener> {
    let phony = phony_socket_path(socket_path)?;

    remove_stale(&phony)?;
    remove_stale(socket_path)?;

    let listener = UnixListener::bind(&phony)?;
    std::fs::set_permissions(&phony, std::fs::Permissions::from_mode(0o666))?;

    // Relative target: the runtime may mount the directory elsewhere
    let target = phony.file_name().map(PathBuf::from).unwrap_or_else(|| phony.clone());
    symlink(&target, socket_path)?;

    tracing::debug!(
        socket = %socket_path.display(),
        phony = %phony.display(),
        "Fn listener socket published"
    );
    Ok(listener)
}

fn remove_stale(path: &Path) -> io::Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}
