use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;

/// Storage handle behind the question history log.
///
/// The log is newline-delimited text; the store owns parsing.
#[async_trait]
pub trait HistoryBackend: Send + Sync {
    /// Full contents of the log
    async fn read_log(&self) -> io::Result<String>;

    /// Append `text` verbatim and flush
    async fn append(&mut self, text: &str) -> io::Result<()>;

    /// Replace the log with an empty one in a single step
    async fn truncate(&mut self) -> io::Result<()>;

    /// Where the log lives, for logs
    fn describe(&self) -> String;
}

/// Log file on disk, kept open in append mode
pub struct FileBackend {
    path: PathBuf,
    file: File,
}

impl FileBackend {
    /// Resolve `path`, creating parent directories and the file as needed
    pub async fn open(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let file = open_append(path).await?;
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }
}

async fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path).await
}

#[async_trait]
impl HistoryBackend for FileBackend {
    async fn read_log(&self) -> io::Result<String> {
        match fs::read_to_string(&self.path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e),
        }
    }

    async fn append(&mut self, text: &str) -> io::Result<()> {
        self.file.write_all(text.as_bytes()).await?;
        self.file.flush().await?;
        self.file.sync_data().await
    }

    async fn truncate(&mut self) -> io::Result<()> {
        // Readers see either the old log or the empty one, never a partial file
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, b"").await?;
        fs::rename(&tmp, &self.path).await?;
        // The old handle points at the replaced file
        self.file = open_append(&self.path).await?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Log held in memory, for tests and ephemeral sessions
#[derive(Debug, Default)]
pub struct MemoryBackend {
    content: String,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing log contents
    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

#[async_trait]
impl HistoryBackend for MemoryBackend {
    async fn read_log(&self) -> io::Result<String> {
        Ok(self.content.clone())
    }

    async fn append(&mut self, text: &str) -> io::Result<()> {
        self.content.push_str(text);
        Ok(())
    }

    async fn truncate(&mut self) -> io::Result<()> {
        self.content.clear();
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_backend_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/used.txt");

        let mut backend = FileBackend::open(&path).await.unwrap();
        assert!(path.exists());
        assert_eq!(backend.read_log().await.unwrap(), "");

        backend.append("7\n").await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "7\n");
    }

    #[tokio::test]
    async fn test_file_backend_truncate_then_append() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("used.txt");

        let mut backend = FileBackend::open(&path).await.unwrap();
        backend.append("1\n2\n").await.unwrap();
        backend.truncate().await.unwrap();
        assert_eq!(backend.read_log().await.unwrap(), "");
        assert!(!path.with_extension("tmp").exists());

        // Appends after a truncate land in the new file
        backend.append("3\n").await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "3\n");
    }

    #[tokio::test]
    async fn test_file_backend_keeps_existing_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("used.txt");
        std::fs::write(&path, "10\n11\n").unwrap();

        let mut backend = FileBackend::open(&path).await.unwrap();
        backend.append("12\n").await.unwrap();
        assert_eq!(backend.read_log().await.unwrap(), "10\n11\n12\n");
    }
}
