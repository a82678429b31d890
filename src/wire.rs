//! JSON bodies exchanged by the API and its client.

use crate::chat::Topic;
use crate::media::{Category, ImageRecord, SongRecord, VideoRecord};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryList {
    pub success: bool,
    pub categories: Vec<Category>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageList {
    pub success: bool,
    pub images: Vec<ImageRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoList {
    pub success: bool,
    pub videos: Vec<VideoRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SongList {
    pub success: bool,
    pub songs: Vec<SongRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCategory {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCreated {
    pub success: bool,
    pub message: String,
    pub category: Category,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageUploaded {
    pub success: bool,
    pub message: String,
    pub image: ImageRecord,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoUploaded {
    pub success: bool,
    pub message: String,
    pub video: VideoRecord,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SongUploaded {
    pub success: bool,
    pub message: String,
    pub song: SongRecord,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deleted {
    pub success: bool,
    pub message: String,
}

impl Deleted {
    pub fn new(message: &str) -> Self {
        Self {
            success: true,
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub success: bool,
    pub topic: Topic,
    pub reply: String,
}
