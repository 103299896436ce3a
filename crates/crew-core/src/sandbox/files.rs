//! File read/write/list primitives

use super::{FileInfo, SandboxError, SandboxResult, Workspace};
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument};

impl Workspace {
    /// Read a file's full contents.
    ///
    /// Directories and files larger than the configured limit are rejected
    /// before any bytes are read.
    #[instrument(skip(self), fields(root = %self.root().display()))]
    pub async fn read(&self, path: &str) -> SandboxResult<String> {
        let resolved = self.resolve(path)?;
        let metadata = tokio::fs::metadata(&resolved)
            .await
            .map_err(|e| SandboxError::io(path, e))?;

        if metadata.is_dir() {
            return Err(SandboxError::IsDirectory(path.to_string()));
        }
        if metadata.len() > self.max_file_size() {
            return Err(SandboxError::FileTooLarge {
                size: metadata.len(),
                max: self.max_file_size(),
            });
        }

        let read = tokio::fs::read(&resolved);
        let bytes = match self.read_timeout {
            Some(limit) => tokio::time::timeout(limit, read)
                .await
                .map_err(|_| SandboxError::Timeout {
                    operation: "file read",
                    limit,
                })?,
            None => read.await,
        }
        .map_err(|e| SandboxError::io(path, e))?;

        debug!(bytes = bytes.len(), "read file");
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Write `content` to a file, creating missing parent directories.
    ///
    /// New files are created owner read/write only.
    #[instrument(skip(self, content), fields(bytes = content.len()))]
    pub async fn write(&self, path: &str, content: &str) -> SandboxResult<()> {
        let resolved = self.resolve(path)?;
        if resolved.is_dir() {
            return Err(SandboxError::IsDirectory(path.to_string()));
        }

        if let Some(parent) = resolved.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| SandboxError::io(path, e))?;
        }

        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options
            .open(&resolved)
            .await
            .map_err(|e| SandboxError::io(path, e))?;
        file.write_all(content.as_bytes())
            .await
            .map_err(|e| SandboxError::io(path, e))?;
        file.flush().await.map_err(|e| SandboxError::io(path, e))?;

        debug!("wrote file");
        Ok(())
    }

    /// List the immediate entries of a directory, sorted by name
    #[instrument(skip(self))]
    pub async fn list_directory(&self, path: &str) -> SandboxResult<Vec<FileInfo>> {
        let resolved = self.resolve(path)?;
        let mut entries = tokio::fs::read_dir(&resolved)
            .await
            .map_err(|e| SandboxError::io(path, e))?;

        let mut listing = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| SandboxError::io(path, e))?
        {
            let metadata = match entry.metadata().await {
                Ok(metadata) => metadata,
                Err(_) => continue,
            };
            let entry_path = entry.path();
            listing.push(FileInfo {
                name: entry.file_name().to_string_lossy().into_owned(),
                path: self
                    .relative(&entry_path)
                    .unwrap_or_else(|| entry_path.display().to_string()),
                is_dir: metadata.is_dir(),
                size: metadata.len(),
            });
        }

        listing.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(listing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn workspace() -> (TempDir, Workspace) {
        let dir = TempDir::new().unwrap();
        let ws = Workspace::new(dir.path()).unwrap();
        (dir, ws)
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let (_dir, ws) = workspace();
        ws.write("notes/todo.md", "- ship it\n").await.unwrap();
        assert_eq!(ws.read("notes/todo.md").await.unwrap(), "- ship it\n");
    }

    #[tokio::test]
    async fn test_write_truncates_existing() {
        let (_dir, ws) = workspace();
        ws.write("a.txt", "a much longer first version").await.unwrap();
        ws.write("a.txt", "short").await.unwrap();
        assert_eq!(ws.read("a.txt").await.unwrap(), "short");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_write_uses_private_mode() {
        use std::os::unix::fs::PermissionsExt;

        let (_dir, ws) = workspace();
        ws.write("secret.txt", "x").await.unwrap();
        let mode = std::fs::metadata(ws.root().join("secret.txt"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let (_dir, ws) = workspace();
        assert!(matches!(
            ws.read("missing.txt").await,
            Err(SandboxError::Io { .. })
        ));
    }

    #[tokio::test]
    async fn test_read_directory_is_rejected() {
        let (_dir, ws) = workspace();
        std::fs::create_dir(ws.root().join("src")).unwrap();
        assert!(matches!(
            ws.read("src").await,
            Err(SandboxError::IsDirectory(_))
        ));
    }

    #[tokio::test]
    async fn test_read_respects_size_limit() {
        let dir = TempDir::new().unwrap();
        let ws = Workspace::new(dir.path()).unwrap().with_max_file_size(4);
        std::fs::write(dir.path().join("big.txt"), "12345").unwrap();
        assert!(matches!(
            ws.read("big.txt").await,
            Err(SandboxError::FileTooLarge { size: 5, max: 4 })
        ));
    }

    #[tokio::test]
    async fn test_escape_is_rejected_for_read_and_write() {
        let (_dir, ws) = workspace();
        assert!(matches!(
            ws.read("../outside.txt").await,
            Err(SandboxError::PathEscape { .. })
        ));
        assert!(matches!(
            ws.write("../outside.txt", "x").await,
            Err(SandboxError::PathEscape { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_directory_sorted() {
        let (_dir, ws) = workspace();
        ws.write("b.txt", "bb").await.unwrap();
        ws.write("a.txt", "a").await.unwrap();
        std::fs::create_dir(ws.root().join("c")).unwrap();

        let entries = ws.list_directory(".").await.unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "c"]);
        assert_eq!(entries[1].size, 2);
        assert!(entries[2].is_dir);
        assert_eq!(entries[0].path, "a.txt");
    }

    #[tokio::test]
    async fn test_list_nested_directory_paths() {
        let (_dir, ws) = workspace();
        ws.write("src/lib.rs", "").await.unwrap();
        let entries = ws.list_directory("src").await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].path, "src/lib.rs");
    }
}
