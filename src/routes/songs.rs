use super::{Store, ensure_segment};
use crate::auth::RequireAdmin;
use crate::errors::{ApiError, StoreError};
use crate::media::{MediaKind, SongRecord, listing_title};
use crate::upload::{read_upload, store_upload};
use crate::wire::{Deleted, SongList, SongUploaded};
use axum::{
    Extension, Json,
    extract::{Multipart, Path, rejection::PathRejection},
};
use std::path::Path as FsPath;

const KIND: MediaKind = MediaKind::Audio;

pub async fn list(Extension(store): Extension<Store>) -> Result<Json<SongList>, ApiError> {
    let dir = FsPath::new(KIND.dir_name());
    let mut songs = Vec::new();

    for filename in store.list_files(dir, KIND).await? {
        let info = match store.file_info(&dir.join(&filename)).await {
            Ok(info) => info,
            Err(StoreError::NotFound) => continue,
            Err(e) => return Err(e.into()),
        };
        let title = listing_title(&filename, KIND.file_prefix());
        songs.push(SongRecord::new(&filename, title, info.size, info.created));
    }

    Ok(Json(SongList {
        success: true,
        songs,
    }))
}

/// Accepts anything with an audio extension or an `audio/*` type; files whose
/// extension the listing does not know are stored but never listed.
pub async fn upload(
    _admin: RequireAdmin,
    Extension(store): Extension<Store>,
    mut multipart: Multipart,
) -> Result<Json<SongUploaded>, ApiError> {
    let upload = read_upload(&mut multipart, KIND).await?;
    let Some(file) = upload.file.as_ref() else {
        return Err(ApiError::Validation("No audio uploaded".to_string()));
    };

    let dir = FsPath::new(KIND.dir_name());
    let filename = store_upload(store.as_ref(), dir, KIND, file).await?;
    let info = store.file_info(&dir.join(&filename)).await?;
    let title = upload.text("title").unwrap_or(filename.as_str());

    Ok(Json(SongUploaded {
        success: true,
        message: "Song uploaded successfully".to_string(),
        song: SongRecord::new(&filename, title, info.size, info.created),
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
        .map_err(|e| ApiError::from_store(e, "Song not found"))?;

    Ok(Json(Deleted::new("Song deleted successfully")))
}
