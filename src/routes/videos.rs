use super::{Store, ensure_segment};
use crate::auth::RequireAdmin;
use crate::errors::{ApiError, StoreError};
use crate::media::{MediaKind, VideoRecord, listing_title};
use crate::upload::{read_upload, store_upload};
use crate::wire::{Deleted, VideoList, VideoUploaded};
use axum::{
    Extension, Json,
    extract::{Multipart, Path, rejection::PathRejection},
};
use std::path::Path as FsPath;

const KIND: MediaKind = MediaKind::Video;

pub async fn list(Extension(store): Extension<Store>) -> Result<Json<VideoList>, ApiError> {
    let dir = FsPath::new(KIND.dir_name());
    let mut videos = Vec::new();

    for filename in store.list_files(dir, KIND).await? {
        let info = match store.file_info(&dir.join(&filename)).await {
            Ok(info) => info,
            Err(StoreError::NotFound) => continue,
            Err(e) => return Err(e.into()),
        };
        let title = listing_title(&filename, KIND.file_prefix());
        videos.push(VideoRecord::new(&filename, title, info.size, info.created));
    }

    Ok(Json(VideoList {
        success: true,
        videos,
    }))
}

pub async fn upload(
    _admin: RequireAdmin,
    Extension(store): Extension<Store>,
    mut multipart: Multipart,
) -> Result<Json<VideoUploaded>, ApiError> {
    let upload = read_upload(&mut multipart, KIND).await?;
    let Some(file) = upload.file.as_ref() else {
        return Err(ApiError::Validation("No video uploaded".to_string()));
    };

    let dir = FsPath::new(KIND.dir_name());
    let filename = store_upload(store.as_ref(), dir, KIND, file).await?;
    let info = store.file_info(&dir.join(&filename)).await?;
    let title = upload.text("title").unwrap_or(filename.as_str());

    Ok(Json(VideoUploaded {
        success: true,
        message: "Video uploaded successfully".to_string(),
        video: VideoRecord::new(&filename, title, info.size, info.created),
    }))
}

pub async fn delete(
    _admin: RequireAdmin,
    Extension(store): Extension<Store>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Deleted>, ApiError> {
    let Path(filename) = path?;
    ensure_segment(&filename, "filename")?;

    store
        .delete_file(&FsPath::new(KIND.dir_name()).join(&filename))
        .await
        .map_err(|e| ApiError::from_store(e, "Video not found"))?;

    Ok(Json(Deleted::new("Video deleted successfully")))
}
