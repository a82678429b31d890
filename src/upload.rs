//! Multipart intake for media uploads: field extraction, type and size
//! filtering, generated filenames.

use crate::errors::ApiError;
use crate::media::MediaKind;
use crate::storage::MediaStore;
use axum::extract::Multipart;
use axum::extract::multipart::{Field, MultipartError};
use axum::http::StatusCode;
use chrono::Utc;
use mime::Mime;
use rand::Rng;
use std::collections::HashMap;
use std::path::Path;

/// Room for multipart framing and text fields on top of the file ceiling.
pub const MULTIPART_OVERHEAD: usize = 1024 * 1024;

#[derive(Debug)]
pub struct UploadedFile {
    pub original_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct Upload {
    pub file: Option<UploadedFile>,
    fields: HashMap<String, String>,
}

impl Upload {
    /// A text field, ignoring blank values.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }
}

/// Drains `multipart`, accepting a single file in the kind's field.
///
/// The file is checked against the type filter before its body is read and
/// counted against the size ceiling while streaming, so a rejected upload
/// never reaches the store.
pub async fn read_upload(multipart: &mut Multipart, kind: MediaKind) -> Result<Upload, ApiError> {
    let mut upload = Upload::default();

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        let original_name = field
            .file_name()
            .filter(|file_name| !file_name.is_empty())
            .map(str::to_string);

        let Some(original_name) = original_name else {
            let value = field.bytes().await.map_err(multipart_error)?;
            upload
                .fields
                .insert(name, String::from_utf8_lossy(&value).into_owned());
            continue;
        };

        if name != kind.field_name() || upload.file.is_some() {
            return Err(ApiError::Validation(format!("Unexpected field: {name}")));
        }

        let content_type = field.content_type().map(str::to_string);
        check_type(kind, &original_name, content_type.as_deref())?;
        let bytes = read_limited(&mut field, kind.max_bytes()).await?;

        tracing::debug!(
            field = %name,
            original = %original_name,
            bytes = bytes.len(),
            "received upload"
        );
        upload.file = Some(UploadedFile {
            original_name,
            content_type,
            bytes,
        });
    }

    Ok(upload)
}

async fn read_limited(field: &mut Field<'_>, limit: usize) -> Result<Vec<u8>, ApiError> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        if bytes.len() + chunk.len() > limit {
            return Err(ApiError::PayloadTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge
    } else {
        ApiError::Validation(err.body_text())
    }
}

/// Type filter. Images and videos need both a known extension and a matching
/// declared MIME type; audio accepts either one.
pub fn check_type(
    kind: MediaKind,
    original_name: &str,
    content_type: Option<&str>,
) -> Result<(), ApiError> {
    let ext = extension(original_name).trim_start_matches('.');
    let ext_ok = kind
        .extensions()
        .iter()
        .any(|allowed| ext.eq_ignore_ascii_case(allowed));
    let mime: Option<Mime> = content_type.and_then(|ct| ct.parse().ok());

    let accepted = match kind {
        MediaKind::Image => {
            // Legacy subtypes such as `x-png` and `pjpeg` still pass.
            let mime_ok = mime.as_ref().is_some_and(|m| {
                let subtype = m.subtype().as_str().to_ascii_lowercase();
                kind.extensions()
                    .iter()
                    .any(|allowed| subtype.contains(allowed))
            });
            ext_ok && mime_ok
        }
        MediaKind::Video => ext_ok && mime.as_ref().is_some_and(|m| m.type_() == mime::VIDEO),
        MediaKind::Audio => ext_ok || mime.as_ref().is_some_and(|m| m.type_() == mime::AUDIO),
    };

    if accepted {
        Ok(())
    } else {
        Err(ApiError::UnsupportedMediaType(rejection_message(kind).to_string()))
    }
}

fn rejection_message(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Image => "Only image files are allowed!",
        MediaKind::Video => "Only video files are allowed!",
        MediaKind::Audio => "Only audio files are allowed!",
    }
}

/// Extension of the final path segment including its dot, or `""`.
/// Leading dots (`.profile`) do not start an extension.
pub fn extension(original_name: &str) -> &str {
    let base = original_name.rsplit(['/', '\\']).next().unwrap_or(original_name);
    match base.rfind('.') {
        Some(dot) if base[..dot].chars().any(|c| c != '.') => &base[dot..],
        _ => "",
    }
}

/// `<prefix>-<unix millis>-<random 0..=1e9><ext>`.
pub fn generate_filename(kind: MediaKind, original_name: &str) -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix: u32 = rand::thread_rng().gen_range(0..=1_000_000_000);
    format!(
        "{}-{millis}-{suffix}{}",
        kind.file_prefix(),
        extension(original_name)
    )
}

/// Names the file and writes it under `dir`, returning the generated filename.
pub async fn store_upload(
    store: &dyn MediaStore,
    dir: &Path,
    kind: MediaKind,
    file: &UploadedFile,
) -> Result<String, ApiError> {
    let filename = generate_filename(kind, &file.original_name);
    store.write_file(dir, &filename, &file.bytes).await?;
    Ok(filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_follows_last_dot_of_basename() {
        assert_eq!(extension("cat.png"), ".png");
        assert_eq!(extension("archive.tar.GZ"), ".GZ");
        assert_eq!(extension("dir.v2/noext"), "");
        assert_eq!(extension("C:\\pics\\cat.jpeg"), ".jpeg");
        assert_eq!(extension(".profile"), "");
        assert_eq!(extension("trailing."), ".");
        assert_eq!(extension(""), "");
    }

    #[test]
    fn image_requires_extension_and_mime() {
        assert!(check_type(MediaKind::Image, "a.png", Some("image/png")).is_ok());
        assert!(check_type(MediaKind::Image, "a.JPG", Some("image/jpeg")).is_ok());
        assert!(check_type(MediaKind::Image, "a.png", Some("text/plain")).is_err());
        assert!(check_type(MediaKind::Image, "a.txt", Some("image/png")).is_err());
        assert!(check_type(MediaKind::Image, "a.png", None).is_err());
    }

    #[test]
    fn image_mime_accepts_legacy_subtypes() {
        assert!(check_type(MediaKind::Image, "a.png", Some("image/x-png")).is_ok());
        assert!(check_type(MediaKind::Image, "a.jpg", Some("image/pjpeg")).is_ok());
        assert!(check_type(MediaKind::Image, "a.png", Some("image/svg+xml")).is_err());
    }

    #[test]
    fn video_requires_extension_and_video_mime() {
        assert!(check_type(MediaKind::Video, "clip.mp4", Some("video/mp4")).is_ok());
        assert!(check_type(MediaKind::Video, "clip.mov", Some("video/quicktime")).is_ok());
        assert!(check_type(MediaKind::Video, "clip.mp4", Some("audio/mp4")).is_err());
        assert!(check_type(MediaKind::Video, "clip.mkv", Some("video/x-matroska")).is_err());
    }

    #[test]
    fn audio_accepts_extension_or_mime() {
        assert!(check_type(MediaKind::Audio, "song.mp3", Some("application/octet-stream")).is_ok());
        assert!(check_type(MediaKind::Audio, "song.ogg", Some("audio/ogg")).is_ok());
        assert!(check_type(MediaKind::Audio, "song.wav", None).is_ok());

        let rejected = check_type(MediaKind::Audio, "notes.txt", Some("text/plain")).unwrap_err();
        assert_eq!(rejected.to_string(), "Only audio files are allowed!");
        assert_eq!(rejected.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[test]
    fn generated_names_keep_prefix_and_extension() {
        let name = generate_filename(MediaKind::Audio, "My Song.MP3");
        assert!(name.starts_with("song-"), "{name}");
        assert!(name.ends_with(".MP3"), "{name}");

        let parts: Vec<&str> = name.trim_end_matches(".MP3").split('-').collect();
        assert_eq!(parts.len(), 3);
        assert!(parts[1].parse::<i64>().is_ok());
        assert!(parts[2].parse::<u32>().unwrap() <= 1_000_000_000);
    }

    #[test]
    fn same_original_name_never_reuses_a_filename() {
        let first = generate_filename(MediaKind::Image, "cat.png");
        let second = generate_filename(MediaKind::Image, "cat.png");
        assert_ne!(first, second);
    }
}
