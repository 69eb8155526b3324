//! File-backed token persistence: one opaque string in one file, owner-only
//! permissions. Read errors are treated as an absent token; the bootstrap
//! redirects and the portal re-issues one.

use std::fs;
use std::io;
use std::path::PathBuf;

use crate::profile::BearerToken;
use crate::session::TokenStore;

#[derive(Debug, thiserror::Error)]
pub enum TokenStoreError {
    #[error("token file write failed: {0}")]
    Write(#[source] io::Error),
    #[error("token file remove failed: {0}")]
    Remove(#[source] io::Error),
}

#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    #[must_use]
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    type Error = TokenStoreError;

    fn load_token(&self) -> Result<Option<BearerToken>, Self::Error> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(BearerToken::new(trimmed)))
                }
            }
            Err(_) => Ok(None),
        }
    }

    fn persist_token(&self, token: &BearerToken) -> Result<(), Self::Error> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(TokenStoreError::Write)?;
        }
        fs::write(&self.path, token.as_str()).map_err(TokenStoreError::Write)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))
                .map_err(TokenStoreError::Write)?;
        }

        Ok(())
    }

    fn clear_token(&self) -> Result<(), Self::Error> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(TokenStoreError::Remove(error)),
        }
    }
}
