//! Conversion of legacy `index_together` declarations into named indexes.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::{Index, MigrationError, Operation};

/// Longest index name the supported databases accept portably.
const MAX_NAME_LENGTH: usize = 30;

/// A model's legacy multi-column index declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexTogether {
    pub model: String,
    pub index_together: Vec<Vec<String>>,
}

/// Turn one model's `index_together` into `AddIndex` operations followed by
/// an `AlterIndexTogether` that clears the legacy declaration.
///
/// Duplicate field tuples collapse into one index; the first occurrence
/// fixes the order.
pub fn convert_index_together(
    app_label: &str,
    legacy: &IndexTogether,
) -> Result<Vec<Operation>, MigrationError> {
    let model_name = legacy.model.trim().to_lowercase();
    if model_name.is_empty() {
        return Err(MigrationError::EmptyModelName);
    }

    let mut tuples: Vec<&Vec<String>> = Vec::with_capacity(legacy.index_together.len());
    for fields in &legacy.index_together {
        if fields.is_empty() {
            return Err(MigrationError::EmptyIndex { model: model_name });
        }
        if fields.iter().any(|f| f.trim().is_empty()) {
            return Err(MigrationError::EmptyField { model: model_name });
        }
        if !tuples.contains(&fields) {
            tuples.push(fields);
        }
    }

    let table = format!("{}_{}", app_label.to_lowercase(), model_name);
    let mut operations: Vec<Operation> = tuples
        .into_iter()
        .map(|fields| Operation::AddIndex {
            model_name: model_name.clone(),
            index: Index {
                name: index_name(&table, fields),
                fields: fields.clone(),
            },
        })
        .collect();

    operations.push(Operation::AlterIndexTogether {
        name: model_name,
        index_together: Vec::new(),
    });

    Ok(operations)
}

/// `{table[:11]}_{first_field[:7]}_{digest[:6]}_idx`, at most 30 characters.
pub fn index_name(table: &str, fields: &[String]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(table.as_bytes());
    for field in fields {
        // Separator keeps ["ab", "c"] and ["abc"] apart.
        hasher.update([0u8]);
        hasher.update(field.as_bytes());
    }
    let digest = hex::encode(hasher.finalize());

    let first = fields.first().map(String::as_str).unwrap_or_default();
    let name = format!(
        "{}_{}_{}_idx",
        truncate(table, 11),
        truncate(first, 7),
        &digest[..6]
    );
    debug_assert!(name.chars().count() <= MAX_NAME_LENGTH);
    name
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
