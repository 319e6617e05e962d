use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Plain-text file handed to the user's download mechanism
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportArtifact {
    pub filename: String,
    pub mime_type: &'static str,
    pub content: String,
}

impl ExportArtifact {
    pub fn new(content: impl Into<String>, epoch_millis: i64) -> Self {
        Self {
            filename: format!("filtered-log-{}.txt", epoch_millis),
            mime_type: "text/plain",
            content: content.into(),
        }
    }

    /// Name the artifact after the current time
    pub fn now(content: impl Into<String>) -> Self {
        Self::new(content, chrono::Utc::now().timestamp_millis())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Client-side save of an export artifact
pub trait DownloadSink {
    fn save(&mut self, artifact: &ExportArtifact) -> Result<(), ExportError>;
}

/// Writes artifacts into a directory
#[derive(Debug)]
pub struct DirectorySink {
    dir: PathBuf,
    saved: Vec<PathBuf>,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            saved: Vec::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Paths written so far
    pub fn saved(&self) -> &[PathBuf] {
        &self.saved
    }
}

impl DownloadSink for DirectorySink {
    fn save(&mut self, artifact: &ExportArtifact) -> Result<(), ExportError> {
        let path = self.dir.join(&artifact.filename);
        let io_err = |source| ExportError::Io {
            path: path.clone(),
            source,
        };

        let mut file = File::create(&path).map_err(io_err)?;
        file.write_all(artifact.content.as_bytes()).map_err(io_err)?;

        self.saved.push(path);
        Ok(())
    }
}

/// Keeps artifacts in memory
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub saved: Vec<ExportArtifact>,
}

impl DownloadSink for RecordingSink {
    fn save(&mut self, artifact: &ExportArtifact) -> Result<(), ExportError> {
        self.saved.push(artifact.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_pattern() {
        let artifact = ExportArtifact::new("USER_DEBUG x", 1_700_000_000_123);
        assert_eq!(artifact.filename, "filtered-log-1700000000123.txt");
        assert_eq!(artifact.mime_type, "text/plain");

        let now = ExportArtifact::now("x");
        let millis = now
            .filename
            .strip_prefix("filtered-log-")
            .and_then(|s| s.strip_suffix(".txt"))
            .unwrap();
        assert!(millis.parse::<i64>().unwrap() > 0);
    }

    #[test]
    fn test_directory_sink_writes_content_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DirectorySink::new(dir.path());
        let artifact = ExportArtifact::new("METHOD_ENTRY a\nUSER_DEBUG b", 42);

        sink.save(&artifact).unwrap();

        let path = dir.path().join("filtered-log-42.txt");
        assert_eq!(sink.saved(), &[path.clone()]);
        assert_eq!(
            std::fs::read_to_string(path).unwrap(),
            "METHOD_ENTRY a\nUSER_DEBUG b"
        );
    }

    #[test]
    fn test_directory_sink_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DirectorySink::new(dir.path().join("missing"));
        let err = sink.save(&ExportArtifact::new("x", 1)).unwrap_err();
        assert!(err.to_string().contains("filtered-log-1.txt"));
    }
}
