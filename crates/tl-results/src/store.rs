//! Run storage API.
//!
//! Layout per run: `<root>/<run_id>/manifest.json`, `trajectory.jsonl` and,
//! when enabled, the headerless diagnostics file.

use crate::types::{RunManifest, TrajectoryRecord};
use crate::{ResultsError, ResultsResult};
use std::fs;
use std::path::{Path, PathBuf};

pub const DIAGNOSTICS_FILE: &str = "diagnostics.csv";

#[derive(Clone)]
pub struct RunStore {
    root_dir: PathBuf,
}

impl RunStore {
    pub fn new(root_dir: PathBuf) -> ResultsResult<Self> {
        if !root_dir.exists() {
            fs::create_dir_all(&root_dir)?;
        }
        Ok(Self { root_dir })
    }

    /// Store under `.twolayer/runs` next to the configuration file.
    pub fn for_config(config_path: &Path) -> ResultsResult<Self> {
        let config_dir = config_path
            .parent()
            .ok_or_else(|| ResultsError::InvalidPath {
                message: "config path has no parent directory".to_string(),
            })?;
        Self::new(config_dir.join(".twolayer").join("runs"))
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    fn run_dir(&self, run_id: &str) -> PathBuf {
        self.root_dir.join(run_id)
    }

    pub fn has_run(&self, run_id: &str) -> bool {
        self.run_dir(run_id).join("manifest.json").exists()
    }

    /// Path for a run's diagnostics stream, creating the run directory.
    pub fn diagnostics_path(&self, run_id: &str) -> ResultsResult<PathBuf> {
        let run_dir = self.run_dir(run_id);
        fs::create_dir_all(&run_dir)?;
        Ok(run_dir.join(DIAGNOSTICS_FILE))
    }

    pub fn save_run(
        &self,
        manifest: &RunManifest,
        records: &[TrajectoryRecord],
    ) -> ResultsResult<()> {
        if let Some((t, what)) = records.iter().find_map(TrajectoryRecord::first_non_finite) {
            return Err(ResultsError::NonFinite { t, what });
        }

        let run_dir = self.run_dir(&manifest.run_id);
        fs::create_dir_all(&run_dir)?;

        let mut trajectory = String::new();
        for record in records {
            trajectory.push_str(&serde_json::to_string(record)?);
            trajectory.push('\n');
        }
        fs::write(run_dir.join("trajectory.jsonl"), trajectory)?;

        // Manifest last: its presence marks the run complete.
        let manifest_json = serde_json::to_string_pretty(manifest)?;
        fs::write(run_dir.join("manifest.json"), manifest_json)?;

        Ok(())
    }

    pub fn load_manifest(&self, run_id: &str) -> ResultsResult<RunManifest> {
        let manifest_path = self.run_dir(run_id).join("manifest.json");

        if !manifest_path.exists() {
            return Err(ResultsError::RunNotFound {
                run_id: run_id.to_string(),
            });
        }

        let content = fs::read_to_string(manifest_path)?;
        let manifest = serde_json::from_str(&content)?;
        Ok(manifest)
    }

    pub fn load_trajectory(&self, run_id: &str) -> ResultsResult<Vec<TrajectoryRecord>> {
        let path = self.run_dir(run_id).join("trajectory.jsonl");

        if !path.exists() {
            return Err(ResultsError::RunNotFound {
                run_id: run_id.to_string(),
            });
        }

        let content = fs::read_to_string(path)?;
        let mut records = Vec::new();
        for line in content.lines() {
            if !line.trim().is_empty() {
                records.push(serde_json::from_str(line)?);
            }
        }

        Ok(records)
    }

    /// Diagnostics rows of a run, one `Vec` of values per line.
    pub fn load_diagnostics(&self, run_id: &str, delimiter: char) -> ResultsResult<Vec<Vec<f64>>> {
        let manifest = self.load_manifest(run_id)?;
        let Some(file) = manifest.diagnostics_file else {
            return Ok(Vec::new());
        };
        let content = fs::read_to_string(self.run_dir(run_id).join(file))?;

        content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| {
                line.split(delimiter)
                    .map(|field| {
                        field.trim().parse::<f64>().map_err(|_| ResultsError::Diagnostics {
                            line: i + 1,
                            reason: format!("'{field}' is not a number"),
                        })
                    })
                    .collect::<ResultsResult<Vec<f64>>>()
            })
            .collect()
    }

    /// All complete runs, oldest first.
    pub fn list_runs(&self) -> ResultsResult<Vec<RunManifest>> {
        let mut runs = Vec::new();

        if !self.root_dir.exists() {
            return Ok(runs);
        }

        for entry in fs::read_dir(&self.root_dir)? {
            let entry = entry?;
            if entry.path().is_dir() {
                let run_id = entry.file_name().to_string_lossy().to_string();
                if let Ok(manifest) = self.load_manifest(&run_id) {
                    runs.push(manifest);
                }
            }
        }
        runs.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

        Ok(runs)
    }

    pub fn delete_run(&self, run_id: &str) -> ResultsResult<()> {
        let run_dir = self.run_dir(run_id);
        if run_dir.exists() {
            fs::remove_dir_all(run_dir)?;
        }
        Ok(())
    }
}
