//! Schema operations emitted by migrations.

use serde::{Deserialize, Serialize};

/// A named multi-column index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    pub name: String,
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    /// Declare a named index on a model.
    AddIndex { model_name: String, index: Index },

    /// Replace a model's legacy `index_together` declaration.
    AlterIndexTogether {
        name: String,
        index_together: Vec<Vec<String>>,
    },
}

impl Operation {
    /// Model the operation targets.
    pub fn model_name(&self) -> &str {
        match self {
            Self::AddIndex { model_name, .. } => model_name,
            Self::AlterIndexTogether { name, .. } => name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_wire_format() {
        let op = Operation::AddIndex {
            model_name: "video".to_string(),
            index: Index {
                name: "videos_vide_title_a1b2c3_idx".to_string(),
                fields: vec!["title".to_string(), "created_at".to_string()],
            },
        };

        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json["op"], "add_index");
        assert_eq!(json["model_name"], "video");
        assert_eq!(json["index"]["fields"][1], "created_at");
        assert_eq!(op.model_name(), "video");
    }
}
