//! Applied-migration bookkeeping.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{IndexTogether, MigrationError, Operation, ProjectState, convert_index_together};

/// A named, ordered list of operations for one app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Migration {
    pub app_label: String,
    pub name: String,
    pub operations: Vec<Operation>,
}

impl Migration {
    /// Build a migration converting every model's `index_together`.
    pub fn from_index_together(
        app_label: &str,
        name: &str,
        models: &[IndexTogether],
    ) -> Result<Self, MigrationError> {
        let mut operations = Vec::new();
        for legacy in models {
            operations.extend(convert_index_together(app_label, legacy)?);
        }

        Ok(Self {
            app_label: app_label.to_string(),
            name: name.to_string(),
            operations,
        })
    }

    /// Apply once. Returns `false` without touching anything if `recorder`
    /// already lists this migration.
    ///
    /// Operations run against a copy of `state`; on error neither `state` nor
    /// `recorder` changes.
    pub fn apply(
        &self,
        state: &mut ProjectState,
        recorder: &mut MigrationRecorder,
    ) -> Result<bool, MigrationError> {
        if recorder.is_applied(&self.app_label, &self.name) {
            debug!("Migration {}.{} already applied", self.app_label, self.name);
            return Ok(false);
        }

        let mut next = state.clone();
        for operation in &self.operations {
            next.apply(operation)?;
        }

        *state = next;
        recorder.record_applied(&self.app_label, &self.name);
        info!(
            "Applied migration {}.{} ({} operations)",
            self.app_label,
            self.name,
            self.operations.len()
        );
        Ok(true)
    }
}

/// Set of applied `(app_label, name)` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationRecorder {
    #[serde(default)]
    applied: BTreeSet<(String, String)>,
}

impl MigrationRecorder {
    pub fn is_applied(&self, app_label: &str, name: &str) -> bool {
        self.applied
            .contains(&(app_label.to_string(), name.to_string()))
    }

    pub fn record_applied(&mut self, app_label: &str, name: &str) {
        self.applied.insert((app_label.to_string(), name.to_string()));
    }

    pub fn applied(&self) -> impl Iterator<Item = (&str, &str)> {
        self.applied.iter().map(|(app, name)| (app.as_str(), name.as_str()))
    }
}
