//! CSV log of advertising start/stop events

use bgbeacon::{CycleEvent, CycleObserver};
use chrono::{DateTime, Local};
use log::warn;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub const EVENT_LOG_FILE: &str = "wakeup.csv";

const HEADER: &str = "Date,Status";

/// Appends one `timestamp,event` row per duty cycle transition
#[derive(Debug)]
pub struct CsvEventLog {
    path: PathBuf,
}

impl CsvEventLog {
    /// Create `dir` if needed and start a fresh log in it
    pub fn create(dir: &Path) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        let path = dir.join(EVENT_LOG_FILE);

        let mut file = File::create(&path)?;
        writeln!(file, "{}", HEADER)?;

        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, at: DateTime<Local>, event: CycleEvent) -> io::Result<()> {
        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        writeln!(file, "{},{}", at.format("%Y-%m-%d %H:%M:%S%.6f"), event)
    }
}

impl CycleObserver for CsvEventLog {
    fn on_event(&mut self, at: DateTime<Local>, event: CycleEvent) {
        if let Err(e) = self.append(at, event) {
            warn!("Could not record {} in {}: {}", event, self.path.display(), e);
        }
    }
}
