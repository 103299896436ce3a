//! Workspace sandbox
//!
//! Every filesystem and process primitive used by agents and by the MCP
//! front-end goes through a [`Workspace`]. Paths are resolved against a
//! canonical root and rejected when they escape it, whether through `..`
//! segments, absolute paths, or symlinks.

mod error;
mod files;
mod process;
mod search;
mod types;

pub use error::{SandboxError, SandboxResult};
pub use types::{CommandResult, FileInfo, GrepMatch};

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

/// Default ceiling for a single file read (10 MiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// A directory tree that bounds all agent-visible file and process access
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    max_file_size: u64,
    read_timeout: Option<Duration>,
    shell_timeout: Option<Duration>,
}

impl Workspace {
    /// Open a workspace rooted at `root`.
    ///
    /// The root must exist and be a directory; it is canonicalized once so
    /// later containment checks compare resolved paths.
    pub fn new(root: impl AsRef<Path>) -> SandboxResult<Self> {
        let root = root.as_ref();
        let display = root.display().to_string();
        let canonical = root
            .canonicalize()
            .map_err(|e| SandboxError::io(display.clone(), e))?;
        if !canonical.is_dir() {
            return Err(SandboxError::io(
                display,
                std::io::Error::new(std::io::ErrorKind::NotADirectory, "not a directory"),
            ));
        }

        Ok(Self {
            root: canonical,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            read_timeout: None,
            shell_timeout: None,
        })
    }

    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    pub fn with_shell_timeout(mut self, timeout: Duration) -> Self {
        self.shell_timeout = Some(timeout);
        self
    }

    /// Canonical workspace root
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Resolve `path` to an absolute location inside the workspace.
    ///
    /// Relative paths are taken relative to the root. The result is
    /// symlink-resolved for every component that exists on disk, so a link
    /// pointing outside the root is rejected just like `../..`.
    pub fn resolve(&self, path: &str) -> SandboxResult<PathBuf> {
        let candidate = Path::new(path);
        let joined = if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.root.join(candidate)
        };

        let resolved = resolve_components(&joined);
        if resolved.starts_with(&self.root) {
            Ok(resolved)
        } else {
            Err(SandboxError::PathEscape {
                path: path.to_string(),
            })
        }
    }

    /// Workspace-relative, `/`-separated form of an absolute path under the root
    pub fn relative(&self, path: &Path) -> Option<String> {
        let rel = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<_> = rel
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        Some(parts.join("/"))
    }

    /// Resolve an already-absolute path (e.g. a glob match), keeping it only
    /// when it lands inside the root
    pub(crate) fn contain(&self, path: &Path) -> Option<PathBuf> {
        let resolved = resolve_components(path);
        resolved.starts_with(&self.root).then_some(resolved)
    }
}

/// Walk `path` component by component, resolving symlinks before every `..`
/// so parent traversal follows the real directory structure.
fn resolve_components(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                out = canonicalize_existing(&out);
                out.pop();
            }
            Component::Normal(part) => out.push(part),
        }
    }
    canonicalize_existing(&out)
}

/// Canonicalize the longest existing prefix of `path` and re-append the rest
fn canonicalize_existing(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }

    let mut missing = Vec::new();
    let mut ancestor = path;
    while let Some(parent) = ancestor.parent() {
        if let Some(name) = ancestor.file_name() {
            missing.push(name.to_os_string());
        }
        ancestor = parent;
        if let Ok(canonical) = ancestor.canonicalize() {
            let mut rebuilt = canonical;
            for name in missing.iter().rev() {
                rebuilt.push(name);
            }
            return rebuilt;
        }
    }
    path.to_path_buf()
}
