use super::{Store, ensure_segment};
use crate::auth::RequireAdmin;
use crate::errors::{ApiError, StoreError};
use crate::media::{DEFAULT_CATEGORY, ImageRecord, MediaKind};
use crate::upload::{read_upload, store_upload};
use crate::wire::{CategoryCreated, CategoryList, Deleted, ImageList, ImageUploaded, NewCategory};
use axum::{
    Extension, Json,
    extract::{
        Multipart, Path,
        rejection::{JsonRejection, PathRejection},
    },
};
use std::path::PathBuf;

fn category_dir(category: &str) -> PathBuf {
    PathBuf::from(MediaKind::Image.dir_name()).join(category)
}

pub async fn list_categories(
    Extension(store): Extension<Store>,
) -> Result<Json<CategoryList>, ApiError> {
    let categories = store.list_categories().await?;
    Ok(Json(CategoryList {
        success: true,
        categories,
    }))
}

pub async fn list_category(
    Extension(store): Extension<Store>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<ImageList>, ApiError> {
    let Path(category) = path?;
    ensure_segment(&category, "category")?;

    let images = store
        .list_files(&category_dir(&category), MediaKind::Image)
        .await
        .map_err(|e| ApiError::from_store(e, "Category not found"))?
        .iter()
        .map(|filename| ImageRecord::new(&category, filename))
        .collect();

    Ok(Json(ImageList {
        success: true,
        images,
    }))
}

pub async fn list_all(Extension(store): Extension<Store>) -> Result<Json<ImageList>, ApiError> {
    let mut images = Vec::new();
    for category in store.list_categories().await? {
        let files = match store
            .list_files(&category_dir(&category.name), MediaKind::Image)
            .await
        {
            Ok(files) => files,
            // Removed between the two reads.
            Err(StoreError::NotFound) => continue,
            Err(e) => return Err(e.into()),
        };
        images.extend(
            files
                .iter()
                .map(|filename| ImageRecord::new(&category.name, filename)),
        );
    }

    Ok(Json(ImageList {
        success: true,
        images,
    }))
}

pub async fn upload(
    _admin: RequireAdmin,
    Extension(store): Extension<Store>,
    mut multipart: Multipart,
) -> Result<Json<ImageUploaded>, ApiError> {
    let upload = read_upload(&mut multipart, MediaKind::Image).await?;
    let Some(file) = upload.file.as_ref() else {
        return Err(ApiError::Validation("No file uploaded".to_string()));
    };

    let category = upload.text("category").unwrap_or(DEFAULT_CATEGORY);
    ensure_segment(category, "category")?;

    let filename = store_upload(
        store.as_ref(),
        &category_dir(category),
        MediaKind::Image,
        file,
    )
    .await?;

    Ok(Json(ImageUploaded {
        success: true,
        message: "Image uploaded successfully".to_string(),
        image: ImageRecord::new(category, &filename),
    }))
}

pub async fn create_category(
    _admin: RequireAdmin,
    Extension(store): Extension<Store>,
    body: Result<Json<NewCategory>, JsonRejection>,
) -> Result<Json<CategoryCreated>, ApiError> {
    let Json(body) = body.map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
    let name = body.name.unwrap_or_default();
    if name.trim().is_empty() {
        return Err(ApiError::Validation(
            "Category name is required".to_string(),
        ));
    }

    let category = store.create_category(&name).await.map_err(|e| match e {
        StoreError::AlreadyExists => ApiError::AlreadyExists("Category already exists".to_string()),
        other => other.into(),
    })?;

    Ok(Json(CategoryCreated {
        success: true,
        message: "Category created successfully".to_string(),
        category,
    }))
}

pub async fn delete(
    _admin: RequireAdmin,
    Extension(store): Extension<Store>,
    path: Result<Path<(String, String)>, PathRejection>,
) -> Result<Json<Deleted>, ApiError> {
    let Path((category, filename)) = path?;
    ensure_segment(&category, "category")?;
    ensure_segment(&filename, "filename")?;

    store
        .delete_file(&category_dir(&category).join(&filename))
        .await
        .map_err(|e| ApiError::from_store(e, "Image not found"))?;

    Ok(Json(Deleted::new("Image deleted successfully")))
}
