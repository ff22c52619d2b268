//! Profile-picture blob storage.
//!
//! Blobs are content-addressed: the stored name is the SHA-1 digest of the
//! bytes, so re-uploading the same picture yields the same stable URL and
//! replacement never rewrites an existing blob in place.

use std::path::{Path, PathBuf};

use sha1::{Digest, Sha1};

use crate::error::{Result, ServerError};

/// Store and address profile-picture blobs below a local directory,
/// served under a public base URL.
#[derive(Clone, Debug)]
pub struct ImageStore {
    directory: PathBuf,
    public_url: String,
}

impl ImageStore {
    /// Create a new [`ImageStore`].
    pub fn new(directory: impl Into<PathBuf>, public_url: &str) -> Self {
        Self {
            directory: directory.into(),
            public_url: public_url.trim_end_matches('/').to_owned(),
        }
    }

    /// Directory where blobs are written.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Write `bytes` for `user_id` and return the stable public URL.
    pub async fn store(&self, user_id: &str, bytes: &[u8]) -> Result<String> {
        let hash = hex::encode(Sha1::digest(bytes));
        let name = format!("{hash}.img");

        let dir = self.directory.join(user_id);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|err| ServerError::Storage(err.to_string()))?;
        tokio::fs::write(dir.join(&name), bytes)
            .await
            .map_err(|err| ServerError::Storage(err.to_string()))?;

        Ok(format!("{}/{user_id}/{name}", self.public_url))
    }
}
