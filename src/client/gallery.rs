use super::{AdminSession, ClientError, MediaClient, MediaFile};
use crate::media::{Category, ImageRecord, SongRecord, VIDEO_THUMBNAIL, VideoRecord, display_name};
use async_trait::async_trait;

/// Where the items on screen came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Live,
    /// Built-in list shown when the server is down or has nothing yet.
    Fallback,
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub title: String,
    pub url: String,
    pub meta: String,
    pub thumbnail: Option<String>,
    pub deletable: bool,
}

/// A record kind listed on a flat shelf (videos, songs).
#[async_trait]
pub trait ListedMedia: Clone + Send + Sync + 'static {
    fn filename(&self) -> &str;

    fn card(&self, deletable: bool) -> Card;

    fn fallback() -> Vec<Self>;

    async fn fetch(client: &MediaClient) -> Result<Vec<Self>, ClientError>;

    async fn upload(client: &MediaClient, title: &str, file: MediaFile)
    -> Result<Self, ClientError>;

    async fn remove(client: &MediaClient, filename: &str) -> Result<(), ClientError>;
}

#[async_trait]
impl ListedMedia for VideoRecord {
    fn filename(&self) -> &str {
        &self.filename
    }

    fn card(&self, deletable: bool) -> Card {
        Card {
            title: self.title.clone(),
            url: self.url.clone(),
            meta: format!("🎬 {}", self.filename),
            thumbnail: Some(self.thumbnail.clone()),
            deletable,
        }
    }

    fn fallback() -> Vec<Self> {
        vec![VideoRecord {
            filename: "gus_dance.mp4".to_string(),
            title: "GUS Dance".to_string(),
            url: "pofanimation/gus_dance.mp4".to_string(),
            thumbnail: VIDEO_THUMBNAIL.to_string(),
            size: 0,
            created: None,
        }]
    }

    async fn fetch(client: &MediaClient) -> Result<Vec<Self>, ClientError> {
        client.videos().await
    }

    async fn upload(
        client: &MediaClient,
        title: &str,
        file: MediaFile,
    ) -> Result<Self, ClientError> {
        client.upload_video(title, file).await
    }

    async fn remove(client: &MediaClient, filename: &str) -> Result<(), ClientError> {
        client.delete_video(filename).await
    }
}

#[async_trait]
impl ListedMedia for SongRecord {
    fn filename(&self) -> &str {
        &self.filename
    }

    fn card(&self, deletable: bool) -> Card {
        Card {
            title: self.title.clone(),
            url: self.url.clone(),
            meta: format!("🎵 {}", self.filename),
            thumbnail: None,
            deletable,
        }
    }

    fn fallback() -> Vec<Self> {
        vec![SongRecord {
            filename: "GUS_Open_Song_V01.mp3".to_string(),
            title: "GUS Open Song".to_string(),
            url: "pofsong/GUS_Open_Song_V01.mp3".to_string(),
            size: 0,
            created: None,
        }]
    }

    async fn fetch(client: &MediaClient) -> Result<Vec<Self>, ClientError> {
        client.songs().await
    }

    async fn upload(
        client: &MediaClient,
        title: &str,
        file: MediaFile,
    ) -> Result<Self, ClientError> {
        client.upload_song(title, file).await
    }

    async fn remove(client: &MediaClient, filename: &str) -> Result<(), ClientError> {
        client.delete_song(filename).await
    }
}

/// Flat listing that refetches after every change.
#[derive(Debug, Clone)]
pub struct Shelf<T> {
    items: Vec<T>,
    source: Source,
}

pub type VideoShelf = Shelf<VideoRecord>;
pub type SongShelf = Shelf<SongRecord>;

impl<T: ListedMedia> Default for Shelf<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ListedMedia> Shelf<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            source: Source::Unavailable,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn find(&self, filename: &str) -> Option<&T> {
        self.items.iter().find(|item| item.filename() == filename)
    }

    pub async fn load(&mut self, client: &MediaClient) -> Source {
        match T::fetch(client).await {
            Ok(items) if !items.is_empty() => {
                self.items = items;
                self.source = Source::Live;
            }
            Ok(_) => self.use_fallback(),
            Err(e) => {
                tracing::warn!(error = %e, "listing failed, showing built-in list");
                self.use_fallback();
            }
        }
        self.source
    }

    fn use_fallback(&mut self) {
        self.items = T::fallback();
        self.source = Source::Fallback;
    }

    /// Delete buttons only appear for admins on server-backed items.
    pub fn cards(&self, session: AdminSession) -> Vec<Card> {
        let deletable = session.is_admin() && self.source == Source::Live;
        self.items.iter().map(|item| item.card(deletable)).collect()
    }

    pub async fn upload(
        &mut self,
        client: &MediaClient,
        session: AdminSession,
        title: &str,
        file: MediaFile,
    ) -> Result<T, ClientError> {
        session.require_admin()?;
        let title = title.trim();
        if title.is_empty() || file.name.is_empty() {
            return Err(ClientError::Validation(
                "กรุณาเลือกไฟล์และใส่ชื่อ".to_string(),
            ));
        }

        let record = T::upload(client, title, file).await?;
        self.load(client).await;
        Ok(record)
    }

    pub async fn delete(
        &mut self,
        client: &MediaClient,
        session: AdminSession,
        filename: &str,
    ) -> Result<(), ClientError> {
        session.require_admin()?;
        T::remove(client, filename).await?;
        self.load(client).await;
        Ok(())
    }
}

/// Image gallery grouped by category.
#[derive(Debug, Clone)]
pub struct ImageGallery {
    categories: Vec<Category>,
    images: Vec<ImageRecord>,
    source: Source,
    error: Option<String>,
}

impl Default for ImageGallery {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageGallery {
    pub fn new() -> Self {
        Self {
            categories: Vec::new(),
            images: Vec::new(),
            source: Source::Unavailable,
            error: None,
        }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn source(&self) -> Source {
        self.source
    }

    /// Message to show in place of the gallery after a failed load.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// `None` means every category.
    pub fn images(&self, category: Option<&str>) -> Vec<&ImageRecord> {
        self.images
            .iter()
            .filter(|image| category.is_none_or(|wanted| image.category == wanted))
            .collect()
    }

    pub async fn load(&mut self, client: &MediaClient) -> Source {
        let fetched = async {
            let categories = client.categories().await?;
            let images = client.images(None).await?;
            Ok::<_, ClientError>((categories, images))
        }
        .await;

        match fetched {
            Ok((categories, images)) => {
                self.categories = categories;
                self.images = images;
                self.source = Source::Live;
                self.error = None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "gallery load failed");
                self.categories.clear();
                self.images.clear();
                self.source = Source::Unavailable;
                self.error = Some("ไม่สามารถโหลดภาพได้ กรุณารัน server ก่อน".to_string());
            }
        }
        self.source
    }

    pub fn cards(&self, session: AdminSession, category: Option<&str>) -> Vec<Card> {
        let deletable = session.is_admin() && self.source == Source::Live;
        self.images(category)
            .into_iter()
            .map(|image| Card {
                title: image.filename.clone(),
                url: image.url.clone(),
                meta: display_name(&image.category),
                thumbnail: Some(image.url.clone()),
                deletable,
            })
            .collect()
    }

    pub async fn create_category(
        &mut self,
        client: &MediaClient,
        session: AdminSession,
        name: &str,
    ) -> Result<Category, ClientError> {
        session.require_admin()?;
        let name = name.trim();
        if name.is_empty() {
            return Err(ClientError::Validation("กรุณาใส่ชื่อหมวดหมู่".to_string()));
        }

        let category = client.create_category(name).await?;
        self.load(client).await;
        Ok(category)
    }

    pub async fn upload(
        &mut self,
        client: &MediaClient,
        session: AdminSession,
        category: &str,
        file: MediaFile,
    ) -> Result<ImageRecord, ClientError> {
        session.require_admin()?;
        if file.name.is_empty() {
            return Err(ClientError::Validation("กรุณาเลือกไฟล์ภาพ".to_string()));
        }
        if category.is_empty() {
            return Err(ClientError::Validation("กรุณาเลือกหมวดหมู่".to_string()));
        }

        let image = client.upload_image(category, file).await?;
        self.load(client).await;
        Ok(image)
    }

    pub async fn delete(
        &mut self,
        client: &MediaClient,
        session: AdminSession,
        category: &str,
        filename: &str,
    ) -> Result<(), ClientError> {
        session.require_admin()?;
        client.delete_image(category, filename).await?;
        self.load(client).await;
        Ok(())
    }
}
