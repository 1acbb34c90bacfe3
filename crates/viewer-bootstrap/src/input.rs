//! User-supplied configuration inputs.

use std::{
    fmt::Debug,
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use tokio::fs;

use crate::SourceKind;

/// A file handed over by drag-and-drop or the file picker.
#[async_trait]
pub trait ConfigFile: Debug + Send + Sync {
    /// Display name of the file.
    fn name(&self) -> &str;

    /// Read the whole file as UTF-8 text.
    async fn read_text(&self) -> io::Result<String>;
}

/// A file whose bytes are already in memory.
#[derive(Debug, Clone)]
pub struct MemoryFile {
    /// Display name.
    name: String,
    /// File contents.
    contents: Vec<u8>,
}

impl MemoryFile {
    /// Wrap in-memory bytes.
    pub fn new(name: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
        }
    }
}

#[async_trait]
impl ConfigFile for MemoryFile {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read_text(&self) -> io::Result<String> {
        String::from_utf8(self.contents.clone())
            .map_err(|e| io::Error::new(ErrorKind::InvalidData, e))
    }
}

/// A file on the local filesystem.
#[derive(Debug, Clone)]
pub struct DiskFile {
    /// Location of the file.
    path: PathBuf,
    /// Display name (file name component).
    name: String,
}

impl DiskFile {
    /// Refer to the file at `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { path, name }
    }
}

#[async_trait]
impl ConfigFile for DiskFile {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read_text(&self) -> io::Result<String> {
        fs::read_to_string(&self.path).await
    }
}

/// One interactive submission, regardless of which control produced it.
#[derive(Debug)]
pub enum ConfigInput {
    /// A file dropped on the drop target.
    Dropped(Box<dyn ConfigFile>),
    /// A file chosen with the file picker.
    Picked(Box<dyn ConfigFile>),
    /// Text committed from the paste area.
    Pasted(String),
}

impl ConfigInput {
    /// The acquisition source this input belongs to.
    pub fn source(&self) -> SourceKind {
        match self {
            Self::Dropped(_) => SourceKind::Drop,
            Self::Picked(_) => SourceKind::FilePicker,
            Self::Pasted(_) => SourceKind::Paste,
        }
    }

    /// Prefix for inline parse errors.
    pub(crate) fn invalid_label(&self) -> &'static str {
        match self {
            Self::Dropped(_) | Self::Picked(_) => "Invalid JSON file",
            Self::Pasted(_) => "Invalid JSON text",
        }
    }

    /// Read the input as text. `Ok(None)` means there is nothing to load.
    pub(crate) async fn read(self) -> io::Result<Option<String>> {
        match self {
            Self::Dropped(file) | Self::Picked(file) => file.read_text().await.map(Some),
            Self::Pasted(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(trimmed.to_string()))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn pasted_text_is_trimmed_and_blank_is_ignored() {
        let text = ConfigInput::Pasted("  {\"a\":1}\n".into())
            .read()
            .await
            .unwrap();
        assert_eq!(text.as_deref(), Some("{\"a\":1}"));
        assert_eq!(
            ConfigInput::Pasted(" \n\t".into()).read().await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn memory_file_rejects_invalid_utf8() {
        let file = MemoryFile::new("bad.json", vec![0xff, 0xfe]);
        let err = file.read_text().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }

    #[tokio::test]
    async fn disk_file_reads_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("viewer.config.json");
        fs::write(&path, "{\"title\":\"x\"}").await.unwrap();
        let file = DiskFile::new(&path);
        assert_eq!(file.name(), "viewer.config.json");
        assert_eq!(file.read_text().await.unwrap(), "{\"title\":\"x\"}");
    }
}
