//! Request path → filesystem path mapping with containment checks.
//!
//! A request is first joined onto the root and normalized lexically, which
//! catches `..` segments and absolute paths. Paths that exist are then
//! canonicalized so a symlink cannot lead outside the root either.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// File served for `/`.
pub const INDEX_FILE: &str = "index.html";

/// Outcome of mapping a request path onto the asset root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A regular file inside the root.
    File(PathBuf),
    /// The path escapes the root.
    Forbidden(PathBuf),
    /// Nothing exists at the path.
    NotFound(PathBuf),
    /// Something exists, but it is not a regular file.
    NotAFile(PathBuf),
}

impl Resolution {
    /// The filesystem path the request resolved to, for the access log.
    pub fn path(&self) -> &Path {
        match self {
            Self::File(p) | Self::Forbidden(p) | Self::NotFound(p) | Self::NotAFile(p) => p,
        }
    }
}

/// The canonical directory assets are served from.
#[derive(Debug, Clone)]
pub struct AssetRoot {
    root: PathBuf,
}

impl AssetRoot {
    /// Canonicalize `dir` and use it as the containment boundary.
    pub fn open(dir: &Path) -> io::Result<Self> {
        let root = fs::canonicalize(dir)?;
        Ok(Self { root })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Map a raw request URL (path plus optional query) to a file.
    pub fn resolve(&self, url: &str) -> Resolution {
        let relative = relative_target(request_path(url));
        let joined = normalize_components(&self.root.join(relative));

        if !joined.starts_with(&self.root) {
            return Resolution::Forbidden(joined);
        }

        let real = match fs::canonicalize(&joined) {
            Ok(real) => real,
            Err(_) => return Resolution::NotFound(joined),
        };

        if !real.starts_with(&self.root) {
            return Resolution::Forbidden(real);
        }

        match fs::metadata(&real) {
            Ok(meta) if meta.is_file() => Resolution::File(real),
            Ok(_) => Resolution::NotAFile(real),
            Err(_) => Resolution::NotFound(real),
        }
    }
}

/// Strip the query string and fragment from a request URL.
pub fn request_path(url: &str) -> &str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    &url[..end]
}

/// `/` maps to the index file; `/X` maps to `X`.
fn relative_target(path: &str) -> &str {
    if path.is_empty() || path == "/" {
        return INDEX_FILE;
    }
    path.strip_prefix('/').unwrap_or(path)
}

/// Collapse `.` and `..` without touching the filesystem.
fn normalize_components(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => normalized.push(prefix.as_os_str()),
            Component::RootDir => normalized.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                let _ = normalized.pop();
            }
            Component::Normal(segment) => normalized.push(segment),
        }
    }
    normalized
}
