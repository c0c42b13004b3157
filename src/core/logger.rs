//! Wire traffic log
//!
//! Records every frame sent to the INS and every raw reply read back, with
//! local timestamps, in one of a few line-oriented formats.

use chrono::{DateTime, Local};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Shared handle used by the transport
pub type Logger = Arc<Mutex<WireLogger>>;

/// Log format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Plain text
    #[default]
    Text,
    /// CSV with timestamp
    Csv,
    /// JSON lines
    JsonLines,
}

impl LogFormat {
    /// Get file extension for format
    pub fn extension(&self) -> &'static str {
        match self {
            LogFormat::Text => "txt",
            LogFormat::Csv => "csv",
            LogFormat::JsonLines => "jsonl",
        }
    }
}

/// Data direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Reply read from the device
    Received,
    /// Frame written to the device
    Sent,
}

impl Direction {
    fn tag(self) -> &'static str {
        match self {
            Direction::Received => "RX",
            Direction::Sent => "TX",
        }
    }
}

/// A single log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// Local time the frame was seen
    pub timestamp: DateTime<Local>,
    /// Direction of travel
    pub direction: Direction,
    /// Frame text (lossy for non-ASCII bytes)
    pub data: String,
}

impl LogEntry {
    /// Create new entry
    pub fn new(direction: Direction, data: &[u8]) -> Self {
        Self {
            timestamp: Local::now(),
            direction,
            data: String::from_utf8_lossy(data).into_owned(),
        }
    }

    /// Format as text, with CR/LF made visible
    pub fn to_text(&self) -> String {
        format!(
            "[{}] {} {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
            self.direction.tag(),
            self.data.replace('\r', "\\r").replace('\n', "\\n")
        )
    }

    /// Format as CSV
    pub fn to_csv(&self) -> String {
        let text = self
            .data
            .trim_end_matches(['\r', '\n'])
            .replace('"', "\"\"");
        format!(
            "\"{}\",\"{}\",\"{}\"",
            self.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
            self.direction.tag(),
            text
        )
    }

    /// Format as JSON line
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Wire traffic logger writing to a file
pub struct WireLogger {
    file: BufWriter<File>,
    format: LogFormat,
    path: PathBuf,
    lines_logged: usize,
}

impl WireLogger {
    /// Open (append) a log file
    pub fn open(path: &Path, format: LogFormat) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let is_new = file.metadata()?.len() == 0;
        let mut writer = BufWriter::new(file);

        if format == LogFormat::Csv && is_new {
            writeln!(writer, "Timestamp,Direction,Frame")?;
        }

        Ok(Self {
            file: writer,
            format,
            path: path.to_path_buf(),
            lines_logged: 0,
        })
    }

    /// Open a log file and wrap it for sharing
    pub fn shared(path: &Path, format: LogFormat) -> io::Result<Logger> {
        Ok(Arc::new(Mutex::new(Self::open(path, format)?)))
    }

    /// Get log path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Log one frame
    pub fn log(&mut self, direction: Direction, data: &[u8]) {
        let entry = LogEntry::new(direction, data);
        let line = match self.format {
            LogFormat::Text => entry.to_text(),
            LogFormat::Csv => entry.to_csv(),
            LogFormat::JsonLines => entry.to_json(),
        };

        if let Err(e) = writeln!(self.file, "{line}").and_then(|()| self.file.flush()) {
            tracing::warn!("Wire log write to {} failed: {}", self.path.display(), e);
            return;
        }
        self.lines_logged += 1;
    }

    /// Log sent frame
    pub fn log_tx(&mut self, data: &[u8]) {
        self.log(Direction::Sent, data);
    }

    /// Log received reply
    pub fn log_rx(&mut self, data: &[u8]) {
        self.log(Direction::Received, data);
    }

    /// Lines written so far
    pub fn lines_logged(&self) -> usize {
        self.lines_logged
    }
}
