//! Shared file writer for the logger

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use tracing_subscriber::fmt::MakeWriter;

use crate::logger::config::FileConfig;
use crate::logger::error::LoggerError;

/// Log file handle shared by every event the subscriber formats.
#[derive(Clone)]
pub struct LogFileWriter {
    file: Arc<Mutex<File>>,
}

impl LogFileWriter {
    pub fn new(config: &FileConfig) -> Result<Self, LoggerError> {
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = open_log_file(&config.path, config.append)?;
        Ok(Self {
            file: Arc::new(Mutex::new(file)),
        })
    }
}

fn open_log_file(path: &Path, append: bool) -> Result<File, LoggerError> {
    let mut options = OpenOptions::new();
    options.create(true);
    if append {
        options.append(true);
    } else {
        options.write(true).truncate(true);
    }
    Ok(options.open(path)?)
}

/// Writer handed out per event; holds the file lock only while writing.
pub struct LogFileGuard {
    file: Arc<Mutex<File>>,
}

impl Write for LogFileGuard {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut file = self
            .file
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?;
        file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut file = self
            .file
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?;
        file.flush()
    }
}

impl<'a> MakeWriter<'a> for LogFileWriter {
    type Writer = LogFileGuard;

    fn make_writer(&'a self) -> Self::Writer {
        LogFileGuard {
            file: Arc::clone(&self.file),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::LogFormat;
    use std::io::Write;
    use tempfile::TempDir;

    fn file_config(dir: &TempDir, append: bool) -> FileConfig {
        FileConfig {
            enabled: true,
            path: dir.path().join("nested").join("catalog.log"),
            append,
            format: LogFormat::Compact,
        }
    }

    #[test]
    fn test_writer_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let config = file_config(&dir, true);

        let writer = LogFileWriter::new(&config).unwrap();
        writer.make_writer().write_all(b"hello\n").unwrap();

        let contents = std::fs::read_to_string(&config.path).unwrap();
        assert_eq!(contents, "hello\n");
    }

    #[test]
    fn test_append_preserves_existing_lines() {
        let dir = TempDir::new().unwrap();
        let config = file_config(&dir, true);

        LogFileWriter::new(&config)
            .unwrap()
            .make_writer()
            .write_all(b"first\n")
            .unwrap();
        LogFileWriter::new(&config)
            .unwrap()
            .make_writer()
            .write_all(b"second\n")
            .unwrap();

        let contents = std::fs::read_to_string(&config.path).unwrap();
        assert_eq!(contents, "first\nsecond\n");
    }

    #[test]
    fn test_truncate_when_not_appending() {
        let dir = TempDir::new().unwrap();
        let config = file_config(&dir, true);
        LogFileWriter::new(&config)
            .unwrap()
            .make_writer()
            .write_all(b"stale\n")
            .unwrap();

        let config = file_config(&dir, false);
        LogFileWriter::new(&config)
            .unwrap()
            .make_writer()
            .write_all(b"fresh\n")
            .unwrap();

        let contents = std::fs::read_to_string(&config.path).unwrap();
        assert_eq!(contents, "fresh\n");
    }
}
