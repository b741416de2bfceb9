use crate::agent::types::{Agent, AgentError, AgentResult, Capability};
use crate::task::{ContentGuess, DirectoryEntry, EntryKind, Task, TaskResult};
use std::path::Path;
use tokio::io::AsyncReadExt;
use tracing::{debug, info};

/// Bytes inspected when guessing whether a file is text
const SNIFF_BYTES: usize = 8192;

/// Extensions treated as binary when a file cannot be sniffed
const BINARY_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "ico", "webp", "pdf", "zip", "gz", "tgz", "xz", "bz2",
    "7z", "rar", "tar", "jar", "exe", "dll", "so", "dylib", "a", "o", "class", "wasm", "bin",
    "mp3", "mp4", "mov", "avi", "wav", "flac", "ogg", "ttf", "otf", "woff", "woff2", "sqlite",
    "db",
];

/// Enumerates and classifies the entries of a directory.
///
/// Entries are returned sorted by name so that a fixed tree always yields the
/// same task order. Symlinks are not followed.
#[derive(Debug, Clone, Default)]
pub struct DirectoryAnalyzer {
    include_hidden: bool,
}

impl DirectoryAnalyzer {
    pub fn new(include_hidden: bool) -> Self {
        Self { include_hidden }
    }

    pub async fn list_entries(&self, path: &Path) -> Result<Vec<DirectoryEntry>, AgentError> {
        let mut reader = tokio::fs::read_dir(path)
            .await
            .map_err(|e| AgentError::access(path, e))?;
        let mut entries = Vec::new();

        while let Some(dir_entry) = reader
            .next_entry()
            .await
            .map_err(|e| AgentError::access(path, e))?
        {
            let name = dir_entry.file_name().to_string_lossy().into_owned();
            if !self.include_hidden && name.starts_with('.') {
                continue;
            }

            let entry_path = dir_entry.path();
            let file_type = match dir_entry.file_type().await {
                Ok(file_type) => file_type,
                Err(e) => {
                    debug!("Skipping {}: {}", entry_path.display(), e);
                    continue;
                }
            };

            if file_type.is_symlink() {
                debug!("Skipping symlink {}", entry_path.display());
                continue;
            }

            // Opening a FIFO blocks until a writer shows up
            if !file_type.is_dir() && !file_type.is_file() {
                debug!("Skipping special file {}", entry_path.display());
                continue;
            }

            let entry = if file_type.is_dir() {
                DirectoryEntry {
                    name,
                    path: entry_path,
                    kind: EntryKind::Directory,
                    content: None,
                    size_bytes: None,
                }
            } else {
                let size_bytes = dir_entry.metadata().await.ok().map(|m| m.len());
                let content = sniff_file(&entry_path).await;
                DirectoryEntry {
                    name,
                    path: entry_path,
                    kind: EntryKind::File,
                    content: Some(content),
                    size_bytes,
                }
            };
            entries.push(entry);
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}

#[async_trait::async_trait]
impl Agent for DirectoryAnalyzer {
    fn name(&self) -> &'static str {
        "directory_analyzer"
    }

    fn capability(&self) -> Capability {
        Capability::AnalyzeDirectory
    }

    async fn execute(&self, task: &Task) -> AgentResult {
        let entries = self.list_entries(task.path()).await?;
        info!(
            "Found {} entries in {}",
            entries.len(),
            task.path().display()
        );
        Ok(TaskResult::Entries { entries })
    }
}

/// Guess a file's nature from its leading bytes, falling back to the
/// extension when it cannot be opened
async fn sniff_file(path: &Path) -> ContentGuess {
    let mut buffer = Vec::with_capacity(SNIFF_BYTES);
    let read = match tokio::fs::File::open(path).await {
        Ok(file) => file.take(SNIFF_BYTES as u64).read_to_end(&mut buffer).await,
        Err(e) => Err(e),
    };

    match read {
        Ok(_) => guess_content(&buffer),
        Err(e) => {
            debug!("Cannot sniff {}: {}", path.display(), e);
            guess_from_extension(path)
        }
    }
}

/// Text means no NUL bytes and valid UTF-8, tolerating a character cut off
/// at the end of the sample
pub fn guess_content(bytes: &[u8]) -> ContentGuess {
    if bytes.contains(&0) {
        return ContentGuess::Binary;
    }
    match std::str::from_utf8(bytes) {
        Ok(_) => ContentGuess::Text,
        Err(e) if e.error_len().is_none() => ContentGuess::Text,
        Err(_) => ContentGuess::Binary,
    }
}

pub fn guess_from_extension(path: &Path) -> ContentGuess {
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_lowercase();

    if BINARY_EXTENSIONS.contains(&extension.as_str()) {
        ContentGuess::Binary
    } else {
        ContentGuess::Text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_guess_content() {
        assert_eq!(guess_content(b"hello world\n"), ContentGuess::Text);
        assert_eq!(guess_content(b""), ContentGuess::Text);
        assert_eq!(guess_content(b"\x89PNG\r\n\x1a\n\0\0"), ContentGuess::Binary);
        assert_eq!(guess_content(&[0xff, 0xfe, 0x41]), ContentGuess::Binary);
        // "é" cut in half at the end of the sample
        assert_eq!(guess_content(&[b'c', b'a', b'f', 0xc3]), ContentGuess::Text);
    }

    #[test]
    fn test_guess_from_extension() {
        assert_eq!(guess_from_extension(Path::new("a.PNG")), ContentGuess::Binary);
        assert_eq!(guess_from_extension(Path::new("notes.md")), ContentGuess::Text);
        assert_eq!(guess_from_extension(Path::new("Makefile")), ContentGuess::Text);
    }

    #[tokio::test]
    async fn test_list_entries_sorted_and_classified() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("b.txt"), "second").unwrap();
        fs::write(temp_dir.path().join("a.txt"), "first").unwrap();
        fs::write(temp_dir.path().join("image.bin"), [0u8, 1, 2, 3]).unwrap();
        fs::create_dir(temp_dir.path().join("sub")).unwrap();
        fs::write(temp_dir.path().join(".hidden"), "secret").unwrap();

        let entries = DirectoryAnalyzer::new(false)
            .list_entries(temp_dir.path())
            .await
            .unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "image.bin", "sub"]);

        assert!(entries[0].is_text_file());
        assert_eq!(entries[0].size_bytes, Some(5));
        assert_eq!(entries[2].content, Some(ContentGuess::Binary));
        assert!(entries[3].is_directory());
        assert_eq!(entries[3].content, None);
    }

    #[tokio::test]
    async fn test_hidden_entries_included_on_request() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(".env.example"), "KEY=value").unwrap();

        let entries = DirectoryAnalyzer::new(true)
            .list_entries(temp_dir.path())
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].is_text_file());
    }

    #[tokio::test]
    async fn test_missing_directory_is_access_error() {
        let temp_dir = TempDir::new().unwrap();
        let task = Task::root(temp_dir.path().join("missing"));

        let result = DirectoryAnalyzer::default().execute(&task).await;
        assert!(matches!(result, Err(AgentError::Access { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlinks_not_followed() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("real")).unwrap();
        std::os::unix::fs::symlink(temp_dir.path(), temp_dir.path().join("real/loop")).unwrap();

        let entries = DirectoryAnalyzer::default()
            .list_entries(&temp_dir.path().join("real"))
            .await
            .unwrap();
        assert!(entries.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_named_pipes_not_opened() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.txt"), "alpha").unwrap();
        let created = std::process::Command::new("mkfifo")
            .arg(temp_dir.path().join("pipe"))
            .status()
            .map(|status| status.success())
            .unwrap_or(false);
        if !created {
            return;
        }

        let entries = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            DirectoryAnalyzer::default().list_entries(temp_dir.path()),
        )
        .await
        .expect("scan must not block on the pipe")
        .unwrap();

        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a.txt"]);
        assert!(entries[0].is_text_file());
    }
}
