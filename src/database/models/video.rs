//! Video model.

use serde::{Deserialize, Serialize};

use crate::database::Entity;

/// A video that subtitles are written for.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Video {
    #[serde(rename = "_id")]
    pub id: i64,
    pub title: String,
    /// Language spoken in the audio track, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_audio_language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<u32>,
    pub created_at: i64,
}

impl Video {
    pub fn new(id: i64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            primary_audio_language: None,
            duration_secs: None,
            created_at: chrono::Utc::now().timestamp(),
        }
    }
}

impl Entity for Video {
    const COLLECTION: &'static str = "videos";

    fn pk(&self) -> i64 {
        self.id
    }
}
