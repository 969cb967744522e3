//! On-disk plan and state files used by the command line.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::{IndexTogether, Migration, MigrationRecorder, ProjectState};

/// Legacy declarations to convert, as one named migration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationPlan {
    pub app_label: String,
    /// Migration name, e.g. `0042_convert_index_together`.
    pub name: String,
    pub models: Vec<IndexTogether>,
}

impl MigrationPlan {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read plan {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("invalid plan {}", path.display()))
    }

    pub fn to_migration(&self) -> Result<Migration> {
        Ok(Migration::from_index_together(
            &self.app_label,
            &self.name,
            &self.models,
        )?)
    }
}

/// Persisted schema state plus applied migrations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateFile {
    #[serde(default)]
    pub state: ProjectState,
    #[serde(default)]
    pub recorder: MigrationRecorder,
}

impl StateFile {
    /// Load from `path`; a missing file is an empty state.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read state {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("invalid state {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let raw = serde_json::to_string_pretty(self)?;
        fs::write(path, raw).with_context(|| format!("failed to write state {}", path.display()))
    }

    /// Apply the plan's migration once, registering any model the state
    /// does not know yet with its legacy declaration.
    pub fn apply_plan(&mut self, plan: &MigrationPlan) -> Result<bool> {
        let migration = plan.to_migration()?;
        if self.recorder.is_applied(&migration.app_label, &migration.name) {
            return Ok(false);
        }

        for legacy in &plan.models {
            self.state
                .ensure_model(&legacy.model, legacy.index_together.clone());
        }
        Ok(migration.apply(&mut self.state, &mut self.recorder)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAN: &str = r#"{
        "app_label": "teams",
        "name": "0007_convert_index_together",
        "models": [
            {"model": "TeamVideo", "index_together": [["team", "created"], ["team", "video"]]}
        ]
    }"#;

    #[test]
    fn test_apply_plan_is_idempotent() {
        let plan: MigrationPlan = serde_json::from_str(PLAN).unwrap();
        let mut file = StateFile::default();

        assert!(file.apply_plan(&plan).unwrap());
        assert!(!file.apply_plan(&plan).unwrap());

        let model = file.state.model("teamvideo").unwrap();
        assert_eq!(model.indexes.len(), 2);
        assert!(model.index_together.is_empty());
    }

    #[test]
    fn test_state_file_save_and_load() {
        let plan: MigrationPlan = serde_json::from_str(PLAN).unwrap();
        let mut file = StateFile::default();
        file.apply_plan(&plan).unwrap();

        let path = std::env::temp_dir().join(format!("caption-cache-state-{}.json", std::process::id()));
        file.save(&path).unwrap();
        let loaded = StateFile::load(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(loaded, file);
    }

    #[test]
    fn test_missing_state_file_is_empty() {
        let path = Path::new("/nonexistent/caption-cache/state.json");
        assert_eq!(StateFile::load(path).unwrap(), StateFile::default());
    }
}
