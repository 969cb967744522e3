//! In-memory project schema state that operations are applied to.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Index, MigrationError, Operation};

/// Index declarations of one model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelState {
    #[serde(default)]
    pub indexes: Vec<Index>,
    #[serde(default)]
    pub index_together: Vec<Vec<String>>,
}

/// Schema state keyed by lowercase model name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectState {
    #[serde(default)]
    pub models: BTreeMap<String, ModelState>,
}

impl ProjectState {
    /// Register a model if it is not known yet. Existing state is left alone.
    pub fn ensure_model(&mut self, name: &str, index_together: Vec<Vec<String>>) {
        self.models
            .entry(name.trim().to_lowercase())
            .or_insert_with(|| ModelState {
                indexes: Vec::new(),
                index_together,
            });
    }

    pub fn model(&self, name: &str) -> Option<&ModelState> {
        self.models.get(name)
    }

    pub fn apply(&mut self, operation: &Operation) -> Result<(), MigrationError> {
        let model_name = operation.model_name();
        let model = self
            .models
            .get_mut(model_name)
            .ok_or_else(|| MigrationError::UnknownModel(model_name.to_string()))?;

        match operation {
            Operation::AddIndex { index, .. } => {
                if model.indexes.iter().any(|existing| existing.name == index.name) {
                    return Err(MigrationError::DuplicateIndex {
                        model: model_name.to_string(),
                        name: index.name.clone(),
                    });
                }
                model.indexes.push(index.clone());
            }
            Operation::AlterIndexTogether { index_together, .. } => {
                model.index_together = index_together.clone();
            }
        }

        Ok(())
    }
}
