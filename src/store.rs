//! Local job store.
//!
//! Saved jobs are kept as one JSON document per job id under a data
//! directory, alongside a single `settings.json`.  The store keeps no
//! state of its own beyond the directory path, so it can be cloned
//! freely and shared between request handlers.

use crate::models::{AppSettings, EstimateResult, JobInputs, SavedJob};
use anyhow::{Context, Result};
use chrono::Utc;
use std::path::PathBuf;
use uuid::Uuid;

const JOBS_DIR: &str = "jobs";
const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone)]
pub struct JobStore {
    root: PathBuf,
}

impl JobStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(root.join(JOBS_DIR))
            .with_context(|| format!("creating job store: {}", root.display()))?;
        Ok(Self { root })
    }

    fn job_path(&self, id: &str) -> Option<PathBuf> {
        // Ids are generated UUIDs; anything else cannot name a stored job.
        Uuid::parse_str(id)
            .ok()
            .map(|uuid| self.root.join(JOBS_DIR).join(format!("{uuid}.json")))
    }

    /// Persist a job under a freshly generated id.
    pub fn save(&self, inputs: JobInputs, outputs: EstimateResult, photo_uri: String) -> Result<SavedJob> {
        let job = SavedJob {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now().timestamp_millis(),
            inputs,
            outputs,
            photo_uri,
        };
        let path = self.root.join(JOBS_DIR).join(format!("{}.json", job.id));
        let data = serde_json::to_string_pretty(&job)?;
        std::fs::write(&path, data).with_context(|| format!("writing job: {}", path.display()))?;
        tracing::debug!(id = %job.id, "job saved");
        Ok(job)
    }

    pub fn get(&self, id: &str) -> Result<Option<SavedJob>> {
        let Some(path) = self.job_path(id) else {
            return Ok(None);
        };
        if !path.is_file() {
            return Ok(None);
        }
        let data = std::fs::read_to_string(&path)
            .with_context(|| format!("reading job: {}", path.display()))?;
        let job = serde_json::from_str(&data).with_context(|| format!("parsing job: {}", path.display()))?;
        Ok(Some(job))
    }

    /// All saved jobs, newest first.  Documents that cannot be parsed are
    /// skipped with a warning rather than failing the listing.
    pub fn list(&self) -> Result<Vec<SavedJob>> {
        let mut jobs = Vec::new();
        for entry in std::fs::read_dir(self.root.join(JOBS_DIR))? {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type()?.is_file() || path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }
            let data = std::fs::read_to_string(&path)?;
            match serde_json::from_str::<SavedJob>(&data) {
                Ok(job) => jobs.push(job),
                Err(err) => tracing::warn!(path = %path.display(), error = %err, "skipping unreadable job"),
            }
        }
        jobs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(jobs)
    }

    /// Returns whether a job was removed.
    pub fn delete(&self, id: &str) -> Result<bool> {
        let Some(path) = self.job_path(id) else {
            return Ok(false);
        };
        if !path.is_file() {
            return Ok(false);
        }
        std::fs::remove_file(&path).with_context(|| format!("deleting job: {}", path.display()))?;
        Ok(true)
    }

    /// Stored settings, or the defaults when none have been saved.
    pub fn load_settings(&self) -> Result<AppSettings> {
        let path = self.root.join(SETTINGS_FILE);
        if !path.is_file() {
            return Ok(AppSettings::default());
        }
        let data = std::fs::read_to_string(&path)
            .with_context(|| format!("reading settings: {}", path.display()))?;
        serde_json::from_str(&data).with_context(|| "parsing settings")
    }

    pub fn save_settings(&self, settings: &AppSettings) -> Result<()> {
        let path = self.root.join(SETTINGS_FILE);
        std::fs::write(&path, serde_json::to_string_pretty(settings)?)
            .with_context(|| format!("writing settings: {}", path.display()))
    }
}
