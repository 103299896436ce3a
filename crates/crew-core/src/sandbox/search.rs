//! Glob and grep over the workspace tree
//!
//! Both walk the filesystem synchronously, so the walk runs on the blocking
//! pool and callers can still race it against a deadline.

use super::{GrepMatch, SandboxError, SandboxResult, Workspace};
use regex::Regex;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, instrument};
use walkdir::{DirEntry, WalkDir};

impl Workspace {
    /// Expand a glob pattern relative to the root.
    ///
    /// Matches that resolve outside the workspace are dropped; results are
    /// workspace-relative and sorted.
    #[instrument(skip(self))]
    pub async fn glob(&self, pattern: &str) -> SandboxResult<Vec<String>> {
        let workspace = self.clone();
        let pattern = pattern.to_string();
        run_blocking("glob", move || workspace.glob_blocking(&pattern)).await
    }

    /// Search file contents line by line.
    ///
    /// Hidden directories are skipped, as are files over the size limit and
    /// files that cannot be read as text. `file_pattern` is a glob matched
    /// against each file's base name.
    #[instrument(skip(self))]
    pub async fn grep(
        &self,
        pattern: &str,
        file_pattern: Option<&str>,
    ) -> SandboxResult<Vec<GrepMatch>> {
        let workspace = self.clone();
        let pattern = pattern.to_string();
        let file_pattern = file_pattern.map(str::to_string);
        run_blocking("grep", move || {
            workspace.grep_blocking(&pattern, file_pattern.as_deref())
        })
        .await
    }

    fn glob_blocking(&self, pattern: &str) -> SandboxResult<Vec<String>> {
        // The root is literal text; only the caller's pattern may hold wildcards
        let full_pattern = if Path::new(pattern).is_absolute() {
            pattern.to_string()
        } else {
            let root = glob::Pattern::escape(&self.root().to_string_lossy());
            Path::new(&root).join(pattern).to_string_lossy().into_owned()
        };

        let paths = glob::glob(&full_pattern)
            .map_err(|e| SandboxError::InvalidPattern(format!("{}: {}", pattern, e)))?;

        let mut matches = BTreeSet::new();
        for path in paths.flatten() {
            let Some(resolved) = self.contain(&path) else {
                continue;
            };
            match self.relative(&resolved) {
                Some(relative) if !relative.is_empty() => {
                    matches.insert(relative);
                }
                _ => {}
            }
        }

        debug!(count = matches.len(), "glob matched");
        Ok(matches.into_iter().collect())
    }

    fn grep_blocking(
        &self,
        pattern: &str,
        file_pattern: Option<&str>,
    ) -> SandboxResult<Vec<GrepMatch>> {
        let regex = Regex::new(pattern)
            .map_err(|e| SandboxError::InvalidPattern(format!("{}: {}", pattern, e)))?;
        let name_filter = match file_pattern.filter(|p| !p.is_empty()) {
            Some(p) => Some(
                glob::Pattern::new(p)
                    .map_err(|e| SandboxError::InvalidPattern(format!("{}: {}", p, e)))?,
            ),
            None => None,
        };

        let mut matches = Vec::new();
        let walker = WalkDir::new(self.root())
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden_dir(e));

        for entry in walker.filter_map(Result::ok) {
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(filter) = &name_filter {
                if !filter.matches(&entry.file_name().to_string_lossy()) {
                    continue;
                }
            }
            match entry.metadata() {
                Ok(meta) if meta.len() <= self.max_file_size() => {}
                _ => continue,
            }
            let Ok(content) = std::fs::read_to_string(entry.path()) else {
                continue;
            };
            let Some(file) = self.relative(entry.path()) else {
                continue;
            };

            for (index, line) in content.lines().enumerate() {
                if regex.is_match(line) {
                    matches.push(GrepMatch {
                        file: file.clone(),
                        line: index + 1,
                        content: line.trim().to_string(),
                    });
                }
            }
        }

        debug!(count = matches.len(), "grep matched");
        Ok(matches)
    }
}

async fn run_blocking<T, F>(operation: &'static str, f: F) -> SandboxResult<T>
where
    F: FnOnce() -> SandboxResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| SandboxError::io(operation, std::io::Error::other(e)))?
}

fn is_hidden_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir() && entry.file_name().to_string_lossy().starts_with('.')
}
