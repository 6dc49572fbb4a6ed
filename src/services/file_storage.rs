use crate::models::{errors::AppError, uploaded_file::UploadedFile};
use axum::body::Bytes;
use futures_util::{Stream, StreamExt};
use std::{
    fmt::Display,
    fs::{self, FileTimes},
    path::{Path, PathBuf},
    time::SystemTime,
};
use tokio::{fs as async_fs, io::AsyncWriteExt};

/// The upload directory. Every regular file inside it is an uploaded file,
/// keyed by its name; there is no index beside the filesystem itself.
#[derive(Debug, Clone)]
pub struct FileStorageService {
    upload_dir: PathBuf,
}

impl FileStorageService {
    pub fn new(upload_dir: impl Into<PathBuf>) -> Result<Self, AppError> {
        let upload_dir = upload_dir.into();

        // Create the upload directory if it doesn't exist
        if !upload_dir.exists() {
            fs::create_dir_all(&upload_dir).map_err(|e| {
                AppError::storage_failed(format!("Failed to create upload directory: {}", e))
            })?;
        }

        Ok(Self { upload_dir })
    }

    /// Resolve a client-supplied name inside the upload directory.
    ///
    /// The name is joined as-is, with no traversal checks.
    pub fn file_path(&self, name: &str) -> PathBuf {
        self.upload_dir.join(name)
    }

    /// Write a file from a stream of chunks and stamp it with the current time.
    /// An existing file with the same name is overwritten.
    pub async fn save_stream<S, E>(&self, name: &str, stream: S) -> Result<u64, AppError>
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: Display,
    {
        let file_path = self.file_path(name);
        let mut stream = std::pin::pin!(stream);

        let mut file = async_fs::File::create(&file_path)
            .await
            .map_err(|e| AppError::storage_failed(format!("Failed to create {}: {}", name, e)))?;

        let mut written: u64 = 0;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| {
                AppError::file_upload_failed(format!("Failed to read upload data: {}", e))
            })?;
            file.write_all(&chunk)
                .await
                .map_err(|e| AppError::storage_failed(format!("Failed to write {}: {}", name, e)))?;
            written += chunk.len() as u64;
        }

        file.flush()
            .await
            .map_err(|e| AppError::storage_failed(format!("Failed to write {}: {}", name, e)))?;

        let now = SystemTime::now();
        file.into_std()
            .await
            .set_times(FileTimes::new().set_accessed(now).set_modified(now))
            .map_err(|e| {
                AppError::storage_failed(format!("Failed to set timestamps on {}: {}", name, e))
            })?;

        tracing::debug!("Stored file: {} ({} bytes)", file_path.display(), written);
        Ok(written)
    }

    /// Write an in-memory buffer as an uploaded file
    #[cfg(test)]
    pub async fn store_file(&self, name: &str, data: &[u8]) -> Result<u64, AppError> {
        let chunk = Bytes::copy_from_slice(data);
        let stream = futures_util::stream::once(async move { Ok::<_, std::io::Error>(chunk) });
        self.save_stream(name, stream).await
    }

    /// List regular files, most recently modified first.
    ///
    /// Ties keep directory enumeration order. A file that vanishes between
    /// enumeration and stat is reported as a storage error.
    pub async fn list_files(&self) -> Result<Vec<UploadedFile>, AppError> {
        let mut files = Vec::new();

        let mut entries = async_fs::read_dir(&self.upload_dir).await.map_err(|e| {
            AppError::storage_failed(format!("Failed to read upload directory: {}", e))
        })?;

        while let Some(entry) = entries.next_entry().await.map_err(|e| {
            AppError::storage_failed(format!("Failed to read directory entry: {}", e))
        })? {
            let path = entry.path();

            // Follows symlinks, so a link to a regular file is listed
            let metadata = match async_fs::metadata(&path).await {
                Ok(metadata) => metadata,
                Err(e) => {
                    // A dangling link is not a file; skip it
                    if is_symlink(&entry).await {
                        tracing::debug!("Skipping broken symlink: {}", path.display());
                        continue;
                    }
                    return Err(AppError::storage_failed(format!(
                        "Failed to read metadata for {}: {}",
                        path.display(),
                        e
                    )));
                }
            };

            if !metadata.is_file() {
                continue;
            }

            let modified = metadata.modified().map_err(|e| {
                AppError::storage_failed(format!(
                    "Failed to read modification time for {}: {}",
                    path.display(),
                    e
                ))
            })?;

            let name = entry.file_name().to_string_lossy().into_owned();
            files.push(UploadedFile::new(name, modified));
        }

        files.sort_by(|a, b| b.modified_at.cmp(&a.modified_at));
        Ok(files)
    }

    /// Open a stored file for download, returning it with its size
    pub async fn open_file(&self, name: &str) -> Result<(async_fs::File, u64), AppError> {
        let file_path = self.file_path(name);

        let metadata = async_fs::metadata(&file_path)
            .await
            .map_err(|e| AppError::file_not_found(name, e.to_string()))?;

        if !metadata.is_file() {
            return Err(AppError::file_not_found(name, "Not a regular file"));
        }

        let file = async_fs::File::open(&file_path)
            .await
            .map_err(|e| AppError::file_not_found(name, e.to_string()))?;

        Ok((file, metadata.len()))
    }

    /// Get the upload directory path
    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }
}

async fn is_symlink(entry: &async_fs::DirEntry) -> bool {
    entry
        .file_type()
        .await
        .map(|file_type| file_type.is_symlink())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::io::AsyncReadExt;

    #[test]
    fn test_creates_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a").join("uploads");

        let storage = FileStorageService::new(&nested).unwrap();
        assert!(nested.is_dir());
        assert_eq!(storage.upload_dir(), nested.as_path());
    }

    #[tokio::test]
    async fn test_store_and_open() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorageService::new(temp_dir.path()).unwrap();

        let written = storage.store_file("notes.txt", b"hello drop").await.unwrap();
        assert_eq!(written, 10);

        let (mut file, size) = storage.open_file("notes.txt").await.unwrap();
        assert_eq!(size, 10);
        let mut contents = Vec::new();
        file.read_to_end(&mut contents).await.unwrap();
        assert_eq!(contents, b"hello drop");
    }

    #[tokio::test]
    async fn test_save_stream_concatenates_chunks() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorageService::new(temp_dir.path()).unwrap();

        let chunks = vec![
            Ok::<_, std::io::Error>(Bytes::from_static(b"abc")),
            Ok(Bytes::from_static(b"def")),
        ];
        let written = storage
            .save_stream("joined.bin", futures_util::stream::iter(chunks))
            .await
            .unwrap();

        assert_eq!(written, 6);
        assert_eq!(fs::read(temp_dir.path().join("joined.bin")).unwrap(), b"abcdef");
    }

    #[tokio::test]
    async fn test_stream_error_is_upload_error() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorageService::new(temp_dir.path()).unwrap();

        let chunks = vec![
            Ok(Bytes::from_static(b"partial")),
            Err(std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "client went away")),
        ];
        let result = storage
            .save_stream("broken.bin", futures_util::stream::iter(chunks))
            .await;

        assert!(matches!(result, Err(AppError::FileUploadError { .. })));
    }

    #[tokio::test]
    async fn test_stamps_modification_time() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorageService::new(temp_dir.path()).unwrap();

        let before = SystemTime::now() - Duration::from_secs(1);
        storage.store_file("fresh.txt", b"x").await.unwrap();

        let modified = fs::metadata(temp_dir.path().join("fresh.txt"))
            .unwrap()
            .modified()
            .unwrap();
        assert!(modified >= before);
    }

    #[tokio::test]
    async fn test_list_sorted_newest_first() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorageService::new(temp_dir.path()).unwrap();

        storage.store_file("first.txt", b"1").await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        storage.store_file("second.txt", b"2").await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        storage.store_file("third.txt", b"3").await.unwrap();

        let names: Vec<String> = storage
            .list_files()
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(names, vec!["third.txt", "second.txt", "first.txt"]);
    }

    #[tokio::test]
    async fn test_list_skips_directories() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorageService::new(temp_dir.path()).unwrap();

        fs::create_dir(temp_dir.path().join("nested")).unwrap();
        storage.store_file("only.txt", b"data").await.unwrap();

        let files = storage.list_files().await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "only.txt");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_list_skips_broken_symlinks() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorageService::new(temp_dir.path()).unwrap();

        storage.store_file("real.txt", b"data").await.unwrap();
        std::os::unix::fs::symlink("/nonexistent/target", temp_dir.path().join("dangling"))
            .unwrap();

        let files = storage.list_files().await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "real.txt");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_list_follows_symlink_to_file() {
        let temp_dir = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        let storage = FileStorageService::new(temp_dir.path()).unwrap();

        let target = outside.path().join("target.txt");
        fs::write(&target, b"linked").unwrap();
        std::os::unix::fs::symlink(&target, temp_dir.path().join("link.txt")).unwrap();

        let files = storage.list_files().await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "link.txt");
    }

    #[tokio::test]
    async fn test_overwrite_keeps_single_entry() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorageService::new(temp_dir.path()).unwrap();

        storage.store_file("same.txt", b"old contents").await.unwrap();
        let first = storage.list_files().await.unwrap()[0].modified_at;
        tokio::time::sleep(Duration::from_millis(20)).await;
        storage.store_file("same.txt", b"new").await.unwrap();

        let files = storage.list_files().await.unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].modified_at > first);
        assert_eq!(fs::read(temp_dir.path().join("same.txt")).unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_open_missing_and_directory() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorageService::new(temp_dir.path()).unwrap();
        fs::create_dir(temp_dir.path().join("folder")).unwrap();

        assert!(matches!(
            storage.open_file("nope.txt").await,
            Err(AppError::FileNotFound { .. })
        ));
        assert!(matches!(
            storage.open_file("folder").await,
            Err(AppError::FileNotFound { .. })
        ));
    }
}
