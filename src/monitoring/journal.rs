use anyhow::{Context, Result};
use chrono::Utc;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Append-only CSV record of every rendered prediction result
pub struct PredictionJournal {
    log_path: PathBuf,
    write_lock: Mutex<()>,
}

#[derive(Debug, Clone)]
pub struct JournalEntry<'a> {
    pub home_team: &'a str,
    pub away_team: &'a str,
    pub status: &'a str,
    pub title: &'a str,
}

impl PredictionJournal {
    pub fn new(log_path: impl AsRef<Path>) -> Result<Self> {
        let log_path = log_path.as_ref().to_path_buf();

        // Create CSV file with headers if it doesn't exist
        if !log_path.exists() {
            let mut file = OpenOptions::new()
                .create(true)
                .write(true)
                .open(&log_path)
                .with_context(|| format!("Failed to create journal: {}", log_path.display()))?;

            writeln!(file, "timestamp,home_team,away_team,status,title")?;
        }

        Ok(Self {
            log_path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.log_path
    }

    pub fn record(&self, entry: &JournalEntry<'_>) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.log_path)
            .with_context(|| format!("Failed to open journal: {}", self.log_path.display()))?;

        writeln!(
            file,
            "{},{},{},{},{}",
            Utc::now().to_rfc3339(),
            csv_field(entry.home_team),
            csv_field(entry.away_team),
            entry.status,
            csv_field(entry.title)
        )?;

        Ok(())
    }
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
