//! Confinement of request paths to the served root directory.
//!
//! Resolution is done in two steps. [`resolve_path`] normalizes the request
//! lexically and never touches the filesystem. [`verify_on_disk`] then follows
//! symlinks and re-checks the canonical result against the canonical root.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use tokio::fs;
use tracing::{debug, warn};

use crate::error::FileServerError;

/// True for errors meaning "nothing usable lives at this path": missing
/// entries, a file used as a directory, or a symlink loop.
pub fn is_missing(err: &std::io::Error) -> bool {
    if matches!(err.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) {
        return true;
    }

    #[cfg(unix)]
    if err.raw_os_error() == Some(libc::ELOOP) {
        return true;
    }

    false
}

/// Join `requested` onto `root` and normalize `.`/`..` segments lexically.
///
/// A `..` that would climb above `root` rejects the whole request. Leading
/// slashes are ignored so `/sub/a.txt` and `sub/a.txt` resolve the same way.
pub fn resolve_path(root: &Path, requested: &str) -> Result<PathBuf, FileServerError> {
    if requested.contains('\0') {
        warn!("Path contains null byte: {:?}", requested);
        return Err(FileServerError::Forbidden);
    }

    let mut segments: Vec<&std::ffi::OsStr> = Vec::new();
    for component in Path::new(requested).components() {
        match component {
            Component::Normal(name) => segments.push(name),
            Component::CurDir | Component::RootDir => {}
            Component::ParentDir => {
                if segments.pop().is_none() {
                    warn!("Path traversal attempt: {:?} escapes root", requested);
                    return Err(FileServerError::Forbidden);
                }
            }
            Component::Prefix(_) => {
                warn!("Path prefix in request path: {:?}", requested);
                return Err(FileServerError::Forbidden);
            }
        }
    }

    let candidate: PathBuf = segments
        .into_iter()
        .fold(root.to_path_buf(), |mut path, name| {
            path.push(name);
            path
        });

    if !is_confined(root, &candidate) {
        warn!("Resolved path {:?} is outside {:?}", candidate, root);
        return Err(FileServerError::Forbidden);
    }

    Ok(candidate)
}

/// True when `candidate` is `root` or lies beneath it.
///
/// Compares whole path segments, so `/data-secret` is not inside `/data`.
pub fn is_confined(root: &Path, candidate: &Path) -> bool {
    let mut candidate = candidate.components();
    root.components()
        .all(|segment| candidate.next() == Some(segment))
}

/// Follow symlinks and make sure the real location stays inside the real root.
///
/// Missing paths (see [`is_missing`]) are checked through their nearest
/// existing ancestor and are otherwise accepted; the caller decides how to
/// report them.
pub async fn verify_on_disk(root: &Path, candidate: &Path) -> Result<(), FileServerError> {
    let canonical_root = fs::canonicalize(root).await?;
    let mut probe = candidate.to_path_buf();

    loop {
        match fs::canonicalize(&probe).await {
            Ok(canonical) => {
                if !is_confined(&canonical_root, &canonical) {
                    warn!(
                        "Symlink escape attempt: {:?} resolved to {:?} which is outside {:?}",
                        candidate, canonical, canonical_root
                    );
                    return Err(FileServerError::Forbidden);
                }
                return Ok(());
            }
            Err(err) if is_missing(&err) => {
                debug!("{:?} does not exist, checking parent", probe);
                if !probe.pop() || !is_confined(root, &probe) {
                    return Ok(());
                }
            }
            Err(err) => return Err(err.into()),
        }
    }
}

/// Resolve a request path and verify it on disk in one step.
pub async fn resolve_and_verify_path(
    root: &Path,
    requested: &str,
) -> Result<PathBuf, FileServerError> {
    let candidate = resolve_path(root, requested)?;
    verify_on_disk(root, &candidate).await?;
    Ok(candidate)
}

/// Path of `full_path` relative to `root`, always `/`-separated.
pub fn relative_path(root: &Path, full_path: &Path) -> String {
    let Ok(relative) = full_path.strip_prefix(root) else {
        return String::new();
    };

    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
