use chrono::{DateTime, Local};
use std::time::SystemTime;

/// Display format for upload times, rendered in local time
pub const UPLOAD_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A file in the storage directory. Nothing here is persisted; every field
/// comes from the filesystem at enumeration time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub name: String,
    pub modified_at: SystemTime,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, modified_at: SystemTime) -> Self {
        Self {
            name: name.into(),
            modified_at,
        }
    }

    /// Modification time as `YYYY-MM-DD HH:MM:SS` local time
    pub fn upload_time(&self) -> String {
        DateTime::<Local>::from(self.modified_at)
            .format(UPLOAD_TIME_FORMAT)
            .to_string()
    }
}
