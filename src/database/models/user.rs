//! User model.

use serde::{Deserialize, Serialize};

use crate::database::Entity;

/// A platform account that can subtitle videos.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: i64,
    /// Login name, unique and lowercase.
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Language codes the user subtitles in, most preferred first.
    #[serde(default)]
    pub languages: Vec<String>,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

fn default_true() -> bool {
    true
}

impl User {
    pub fn new(id: i64, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into().to_lowercase(),
            full_name: None,
            is_active: true,
            languages: Vec::new(),
            updated_at: chrono::Utc::now().timestamp(),
        }
    }

    /// Full name when set, username otherwise.
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.username)
    }

    pub fn speaks(&self, language: &str) -> bool {
        self.languages.iter().any(|l| l.eq_ignore_ascii_case(language))
    }
}

impl Entity for User {
    const COLLECTION: &'static str = "users";

    fn pk(&self) -> i64 {
        self.id
    }
}
