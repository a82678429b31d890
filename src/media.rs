//! Media kinds, the records served for them, and the naming rules shared by
//! the store, the upload pipeline and the client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Thumbnail shown for every video card.
pub const VIDEO_THUMBNAIL: &str = "images/kids-animation.png";

/// Category used when an image upload names none.
pub const DEFAULT_CATEGORY: &str = "uncategorized";

const MIB: usize = 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Image,
    Video,
    Audio,
}

impl MediaKind {
    /// Directory under the media root holding this kind.
    pub fn dir_name(self) -> &'static str {
        match self {
            MediaKind::Image => "pofimage",
            MediaKind::Video => "pofanimation",
            MediaKind::Audio => "pofsong",
        }
    }

    /// Multipart field the upload must arrive in.
    pub fn field_name(self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
        }
    }

    /// Leading segment of generated filenames.
    pub fn file_prefix(self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Audio => "song",
        }
    }

    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            MediaKind::Image => &["jpg", "jpeg", "png", "gif", "webp"],
            MediaKind::Video => &["mp4", "webm", "mov", "avi"],
            MediaKind::Audio => &["mp3", "wav", "mpeg"],
        }
    }

    pub fn max_bytes(self) -> usize {
        match self {
            MediaKind::Image => 10 * MIB,
            MediaKind::Video => 100 * MIB,
            MediaKind::Audio => 50 * MIB,
        }
    }

    /// Listing filter: does `filename` end in one of this kind's extensions?
    pub fn matches_filename(self, filename: &str) -> bool {
        match filename.rsplit_once('.') {
            Some((_, ext)) => self
                .extensions()
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed)),
            None => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub name: String,
    pub display_name: String,
    pub image_count: usize,
}

impl Category {
    pub fn new(name: impl Into<String>, image_count: usize) -> Self {
        let name = name.into();
        Self {
            display_name: display_name(&name),
            name,
            image_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub filename: String,
    pub url: String,
    pub category: String,
}

impl ImageRecord {
    pub fn new(category: &str, filename: &str) -> Self {
        Self {
            filename: filename.to_string(),
            url: format!("/{}/{category}/{filename}", MediaKind::Image.dir_name()),
            category: category.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub filename: String,
    pub title: String,
    pub url: String,
    pub thumbnail: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
}

impl VideoRecord {
    pub fn new(
        filename: &str,
        title: impl Into<String>,
        size: u64,
        created: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            filename: filename.to_string(),
            title: title.into(),
            url: format!("/{}/{filename}", MediaKind::Video.dir_name()),
            thumbnail: VIDEO_THUMBNAIL.to_string(),
            size,
            created,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongRecord {
    pub filename: String,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
}

impl SongRecord {
    pub fn new(
        filename: &str,
        title: impl Into<String>,
        size: u64,
        created: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            filename: filename.to_string(),
            title: title.into(),
            url: format!("/{}/{filename}", MediaKind::Audio.dir_name()),
            size,
            created,
        }
    }
}

/// Lowercases `raw` and replaces everything outside `[a-z0-9_-]` with `-`.
pub fn sanitize_slug(raw: &str) -> String {
    raw.to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '-' | '_' => c,
            _ => '-',
        })
        .collect()
}

/// `fun_stuff-2` becomes `Fun Stuff 2`.
pub fn display_name(name: &str) -> String {
    name.split(['-', '_'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Human title for a flat-directory record: drops a generated
/// `<prefix>-<ts>-<rand>` head and the extension, falling back to the raw name.
pub fn listing_title(filename: &str, prefix: &str) -> String {
    let rest = strip_generated_head(filename, prefix).unwrap_or(filename);
    let title = match rest.rfind('.') {
        Some(dot) if dot + 1 < rest.len() => &rest[..dot],
        _ => rest,
    };

    if title.is_empty() {
        filename.to_string()
    } else {
        title.to_string()
    }
}

fn strip_generated_head<'a>(filename: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = filename.strip_prefix(prefix)?.strip_prefix('-')?;
    let rest = strip_digits(rest)?.strip_prefix('-')?;
    strip_digits(rest)
}

fn strip_digits(s: &str) -> Option<&str> {
    let rest = s.trim_start_matches(|c: char| c.is_ascii_digit());
    (rest.len() < s.len()).then_some(rest)
}

/// Whether `segment` can be joined onto a directory without escaping it.
pub fn is_safe_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.contains(['/', '\\', '\0'])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_replaces_disallowed_characters() {
        assert_eq!(sanitize_slug("Kids Art!"), "kids-art-");
        assert_eq!(sanitize_slug("Fun Stuff"), "fun-stuff");
        assert_eq!(sanitize_slug("../etc"), "---etc");
        assert_eq!(sanitize_slug("snake_case-ok"), "snake_case-ok");
    }

    #[test]
    fn sanitize_is_idempotent_and_closed_over_slug_alphabet() {
        for raw in ["Kids Art!", "ภาพวาด 2024", "A/B\\C", "  spaced  ", "ÄÖÜ", "-_-"] {
            let once = sanitize_slug(raw);
            assert_eq!(sanitize_slug(&once), once);
            assert!(
                once.chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_'),
                "{once:?}"
            );
        }
    }

    #[test]
    fn display_name_title_cases_words() {
        assert_eq!(display_name("kids-art-"), "Kids Art");
        assert_eq!(display_name("fun-stuff"), "Fun Stuff");
        assert_eq!(display_name("character_design"), "Character Design");
        assert_eq!(display_name("x"), "X");
    }

    #[test]
    fn listing_title_strips_generated_head() {
        assert_eq!(listing_title("gus_dance.mp4", "video"), "gus_dance");
        assert_eq!(listing_title("video-1700000000000-42.mp4", "video"), "video-1700000000000-42.mp4");
        assert_eq!(listing_title("video-17-42-intro.mp4", "video"), "-intro");
        assert_eq!(listing_title("song-1-2.mp3", "video"), "song-1-2");
        assert_eq!(listing_title("GUS_Open_Song_V01.mp3", "song"), "GUS_Open_Song_V01");
        assert_eq!(listing_title("trailing.", "song"), "trailing.");
    }

    #[test]
    fn listing_filter_is_case_insensitive() {
        assert!(MediaKind::Image.matches_filename("PHOTO.JPG"));
        assert!(MediaKind::Image.matches_filename("a.webp"));
        assert!(!MediaKind::Image.matches_filename("a.jpg.part"));
        assert!(!MediaKind::Image.matches_filename("jpg"));
        assert!(MediaKind::Audio.matches_filename("track.MPEG"));
        assert!(!MediaKind::Video.matches_filename("clip.mkv"));
    }

    #[test]
    fn unsafe_segments_are_rejected() {
        assert!(is_safe_segment("fun-stuff"));
        assert!(is_safe_segment("image-1-2.png"));
        assert!(!is_safe_segment(".."));
        assert!(!is_safe_segment("a/b"));
        assert!(!is_safe_segment("a\\b"));
        assert!(!is_safe_segment(""));
    }
}
