use super::*;
use crate::media::sanitize_slug;
use std::io::ErrorKind;
use std::path::Component;
use tokio::fs;

pub struct LocalMediaStore {
    root: PathBuf,
}

impl LocalMediaStore {
    /// Opens the store, creating the image, video and song directories if missing.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        for kind in [MediaKind::Image, MediaKind::Video, MediaKind::Audio] {
            std::fs::create_dir_all(root.join(kind.dir_name()))?;
        }

        tracing::info!(root = %root.display(), "media store ready");
        Ok(Self { root })
    }

    fn resolve(&self, relative: &Path) -> Result<PathBuf, StoreError> {
        let plain = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        if !plain || relative.as_os_str().is_empty() {
            return Err(StoreError::Validation(format!(
                "Invalid path: {}",
                relative.display()
            )));
        }
        Ok(self.root.join(relative))
    }

    async fn count_images(&self, dir: &Path) -> Result<usize, StoreError> {
        Ok(read_matching(dir, MediaKind::Image).await?.len())
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    fn root(&self) -> &Path {
        &self.root
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        let image_root = self.root.join(MediaKind::Image.dir_name());
        let mut entries = fs::read_dir(&image_root).await?;

        let mut categories = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            let Ok(name) = entry.file_name().into_string() else {
                tracing::warn!(path = %entry.path().display(), "skipping non-UTF-8 category");
                continue;
            };

            let image_count = self.count_images(&entry.path()).await?;
            categories.push(Category::new(name, image_count));
        }

        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn list_files(&self, dir: &Path, kind: MediaKind) -> Result<Vec<String>, StoreError> {
        let dir = self.resolve(dir)?;
        read_matching(&dir, kind).await
    }

    async fn create_category(&self, raw_name: &str) -> Result<Category, StoreError> {
        if raw_name.trim().is_empty() {
            return Err(StoreError::Validation(
                "Category name is required".to_string(),
            ));
        }

        let slug = sanitize_slug(raw_name);
        let image_root = self.root.join(MediaKind::Image.dir_name());
        fs::create_dir_all(&image_root).await?;

        match fs::create_dir(image_root.join(&slug)).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(StoreError::AlreadyExists);
            }
            Err(e) => return Err(e.into()),
        }

        tracing::info!(category = %slug, "created category");
        Ok(Category::new(slug, 0))
    }

    async fn write_file(
        &self,
        dir: &Path,
        name: &str,
        bytes: &[u8],
    ) -> Result<PathBuf, StoreError> {
        let target_dir = self.resolve(dir)?;
        let relative = dir.join(name);
        let target = self.resolve(&relative)?;
        fs::create_dir_all(&target_dir).await?;

        // Partial writes keep the `.part` suffix, which no listing matches.
        let partial = target_dir.join(format!("{name}.part"));
        if let Err(e) = fs::write(&partial, bytes).await {
            let _ = fs::remove_file(&partial).await;
            return Err(e.into());
        }
        if let Err(e) = fs::rename(&partial, &target).await {
            let _ = fs::remove_file(&partial).await;
            return Err(e.into());
        }

        tracing::info!(path = %relative.display(), bytes = bytes.len(), "stored file");
        Ok(relative)
    }

    async fn delete_file(&self, path: &Path) -> Result<(), StoreError> {
        let target = self.resolve(path)?;
        match fs::remove_file(&target).await {
            Ok(()) => {
                tracing::info!(path = %path.display(), "deleted file");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StoreError::NotFound),
            Err(e) => Err(e.into()),
        }
    }

    async fn file_info(&self, path: &Path) -> Result<FileInfo, StoreError> {
        let target = self.resolve(path)?;
        let meta = fs::metadata(&target).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StoreError::NotFound,
            _ => e.into(),
        })?;

        let created = meta
            .created()
            .or_else(|_| meta.modified())
            .ok()
            .map(DateTime::<Utc>::from);

        Ok(FileInfo {
            size: meta.len(),
            created,
        })
    }
}

async fn read_matching(dir: &Path, kind: MediaKind) -> Result<Vec<String>, StoreError> {
    let mut entries = fs::read_dir(dir).await.map_err(|e| match e.kind() {
        ErrorKind::NotFound => StoreError::NotFound,
        _ => e.into(),
    })?;

    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        if let Ok(name) = entry.file_name().into_string() {
            if kind.matches_filename(&name) {
                files.push(name);
            }
        }
    }

    files.sort();
    tracing::debug!(dir = %dir.display(), count = files.len(), "listed files");
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, LocalMediaStore) {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalMediaStore::new(temp_dir.path()).unwrap();
        (temp_dir, store)
    }

    #[tokio::test]
    async fn new_lays_out_media_directories() {
        let (temp_dir, _store) = store();
        for dir in ["pofimage", "pofanimation", "pofsong"] {
            assert!(temp_dir.path().join(dir).is_dir(), "{dir} missing");
        }
    }

    #[tokio::test]
    async fn create_category_sanitizes_and_rejects_duplicates() {
        let (temp_dir, store) = store();

        let category = store.create_category("Kids Art!").await.unwrap();
        assert_eq!(category.name, "kids-art-");
        assert_eq!(category.display_name, "Kids Art");
        assert_eq!(category.image_count, 0);
        assert!(temp_dir.path().join("pofimage/kids-art-").is_dir());

        let again = store.create_category("kids art!").await;
        assert!(matches!(again, Err(StoreError::AlreadyExists)));
    }

    #[tokio::test]
    async fn create_category_requires_a_name() {
        let (_temp_dir, store) = store();
        assert!(matches!(
            store.create_category("   ").await,
            Err(StoreError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn list_categories_counts_only_images() {
        let (temp_dir, store) = store();
        let dir = temp_dir.path().join("pofimage/fun-stuff");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("a.png"), b"png").unwrap();
        std::fs::write(dir.join("b.JPG"), b"jpg").unwrap();
        std::fs::write(dir.join("notes.txt"), b"txt").unwrap();
        std::fs::write(temp_dir.path().join("pofimage/stray.png"), b"png").unwrap();
        std::fs::create_dir_all(temp_dir.path().join("pofimage/empty")).unwrap();

        let categories = store.list_categories().await.unwrap();
        assert_eq!(
            categories,
            vec![Category::new("empty", 0), Category::new("fun-stuff", 2)]
        );
    }

    #[tokio::test]
    async fn list_files_filters_and_reports_missing_dir() {
        let (temp_dir, store) = store();
        let dir = temp_dir.path().join("pofsong");
        std::fs::write(dir.join("b.mp3"), b"b").unwrap();
        std::fs::write(dir.join("a.wav"), b"a").unwrap();
        std::fs::write(dir.join("c.ogg"), b"c").unwrap();

        let files = store
            .list_files(Path::new("pofsong"), MediaKind::Audio)
            .await
            .unwrap();
        assert_eq!(files, vec!["a.wav", "b.mp3"]);

        let missing = store
            .list_files(Path::new("pofimage/nope"), MediaKind::Image)
            .await;
        assert!(matches!(missing, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn write_file_creates_directory_lazily() {
        let (temp_dir, store) = store();
        let relative = store
            .write_file(Path::new("pofimage/new-cat"), "image-1-2.png", b"data")
            .await
            .unwrap();

        assert_eq!(relative, Path::new("pofimage/new-cat/image-1-2.png"));
        let written = temp_dir.path().join(&relative);
        assert_eq!(std::fs::read(written).unwrap(), b"data");
        assert!(!temp_dir.path().join("pofimage/new-cat/image-1-2.png.part").exists());
    }

    #[tokio::test]
    async fn delete_missing_file_is_not_found() {
        let (_temp_dir, store) = store();
        let result = store.delete_file(Path::new("pofanimation/ghost.mp4")).await;
        assert!(matches!(result, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn delete_removes_file() {
        let (temp_dir, store) = store();
        let path = temp_dir.path().join("pofanimation/clip.mp4");
        std::fs::write(&path, b"mp4").unwrap();

        store
            .delete_file(Path::new("pofanimation/clip.mp4"))
            .await
            .unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn paths_escaping_the_root_are_rejected() {
        let (_temp_dir, store) = store();
        let result = store.delete_file(Path::new("pofimage/../../etc/passwd")).await;
        assert!(matches!(result, Err(StoreError::Validation(_))));
    }

    #[tokio::test]
    async fn file_info_reports_size() {
        let (temp_dir, store) = store();
        std::fs::write(temp_dir.path().join("pofsong/a.mp3"), vec![0u8; 42]).unwrap();

        let info = store.file_info(Path::new("pofsong/a.mp3")).await.unwrap();
        assert_eq!(info.size, 42);
        assert!(info.created.is_some());
    }
}
