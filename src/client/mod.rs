//! HTTP client for the media API and the gallery/player view models built on it.

mod gallery;
mod session;

pub use gallery::{Card, ImageGallery, ListedMedia, Shelf, SongShelf, Source, VideoShelf};
pub use session::AdminSession;

use crate::media::{Category, ImageRecord, SongRecord, VideoRecord};
use crate::wire::{
    CategoryCreated, CategoryList, ChatReply, ChatRequest, Deleted, ErrorBody, ImageList,
    ImageUploaded, NewCategory, SongList, SongUploaded, VideoList, VideoUploaded,
};
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error("admin session required")]
    NotAdmin,
    #[error("{0}")]
    Validation(String),
    #[error("invalid base url: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    /// Status line shown to visitors.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Validation(msg) => msg.clone(),
            ClientError::NotAdmin => "กรุณาเข้าสู่ระบบก่อน".to_string(),
            other => format!("เกิดข้อผิดพลาด: {other}"),
        }
    }
}

/// A file picked for upload.
#[derive(Debug, Clone)]
pub struct MediaFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl MediaFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    fn into_part(self) -> Result<Part, ClientError> {
        Ok(Part::bytes(self.bytes)
            .file_name(self.name)
            .mime_str(&self.mime)?)
    }
}

#[derive(Debug, Clone)]
pub struct MediaClient {
    http: reqwest::Client,
    base: Url,
    token: Option<String>,
}

impl MediaClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base = Url::parse(base_url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(base_url.to_string()));
        }

        Ok(Self {
            http: reqwest::Client::builder().build()?,
            base,
            token: None,
        })
    }

    /// Sends `Authorization: Bearer <token>` on every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string(),
        };
        tracing::debug!(status = status.as_u16(), %message, "api error");
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    pub async fn categories(&self) -> Result<Vec<Category>, ClientError> {
        let url = self.url(&["api", "categories"]);
        let body: CategoryList = self.send(self.http.get(url)).await?;
        Ok(body.categories)
    }

    pub async fn create_category(&self, name: &str) -> Result<Category, ClientError> {
        let url = self.url(&["api", "categories"]);
        let request = self.http.post(url).json(&NewCategory {
            name: Some(name.to_string()),
        });
        let body: CategoryCreated = self.send(request).await?;
        Ok(body.category)
    }

    /// All images, or only those of `category`.
    pub async fn images(&self, category: Option<&str>) -> Result<Vec<ImageRecord>, ClientError> {
        let url = match category {
            Some(category) => self.url(&["api", "images", category]),
            None => self.url(&["api", "images"]),
        };
        let body: ImageList = self.send(self.http.get(url)).await?;
        Ok(body.images)
    }

    pub async fn upload_image(
        &self,
        category: &str,
        file: MediaFile,
    ) -> Result<ImageRecord, ClientError> {
        let form = Form::new()
            .text("category", category.to_string())
            .part("image", file.into_part()?);
        let url = self.url(&["api", "upload"]);
        let body: ImageUploaded = self.send(self.http.post(url).multipart(form)).await?;
        Ok(body.image)
    }

    pub async fn delete_image(&self, category: &str, filename: &str) -> Result<(), ClientError> {
        let url = self.url(&["api", "images", category, filename]);
        let _: Deleted = self.send(self.http.delete(url)).await?;
        Ok(())
    }

    pub async fn videos(&self) -> Result<Vec<VideoRecord>, ClientError> {
        let url = self.url(&["api", "videos"]);
        let body: VideoList = self.send(self.http.get(url)).await?;
        Ok(body.videos)
    }

    pub async fn upload_video(
        &self,
        title: &str,
        file: MediaFile,
    ) -> Result<VideoRecord, ClientError> {
        let form = Form::new()
            .text("title", title.to_string())
            .part("video", file.into_part()?);
        let url = self.url(&["api", "videos", "upload"]);
        let body: VideoUploaded = self.send(self.http.post(url).multipart(form)).await?;
        Ok(body.video)
    }

    pub async fn delete_video(&self, filename: &str) -> Result<(), ClientError> {
        let url = self.url(&["api", "videos", filename]);
        let _: Deleted = self.send(self.http.delete(url)).await?;
        Ok(())
    }

    pub async fn songs(&self) -> Result<Vec<SongRecord>, ClientError> {
        let url = self.url(&["api", "songs"]);
        let body: SongList = self.send(self.http.get(url)).await?;
        Ok(body.songs)
    }

    pub async fn upload_song(&self, title: &str, file: MediaFile) -> Result<SongRecord, ClientError> {
        let form = Form::new()
            .text("title", title.to_string())
            .part("audio", file.into_part()?);
        let url = self.url(&["api", "songs", "upload"]);
        let body: SongUploaded = self.send(self.http.post(url).multipart(form)).await?;
        Ok(body.song)
    }

    pub async fn delete_song(&self, filename: &str) -> Result<(), ClientError> {
        let url = self.url(&["api", "songs", filename]);
        let _: Deleted = self.send(self.http.delete(url)).await?;
        Ok(())
    }

    pub async fn chat(&self, message: &str) -> Result<ChatReply, ClientError> {
        let url = self.url(&["api", "chat"]);
        let request = self.http.post(url).json(&ChatRequest {
            message: message.to_string(),
        });
        self.send(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_segments_are_escaped() {
        let client = MediaClient::new("http://localhost:3000/").unwrap();
        let url = client.url(&["api", "images", "fun stuff", "a#b.png"]);
        assert_eq!(
            url.as_str(),
            "http://localhost:3000/api/images/fun%20stuff/a%23b.png"
        );
    }

    #[test]
    fn base_path_is_kept() {
        let client = MediaClient::new("http://example.com/studio").unwrap();
        assert_eq!(
            client.url(&["api", "songs"]).as_str(),
            "http://example.com/studio/api/songs"
        );
    }

    #[test]
    fn rejects_unusable_base() {
        assert!(matches!(
            MediaClient::new("mailto:poffog@gmail.com"),
            Err(ClientError::InvalidUrl(_))
        ));
        assert!(MediaClient::new("not a url").is_err());
    }

    #[test]
    fn api_errors_render_server_message() {
        let err = ClientError::Api {
            status: 404,
            message: "Video not found".to_string(),
        };
        assert_eq!(err.user_message(), "เกิดข้อผิดพลาด: Video not found");
    }
}
