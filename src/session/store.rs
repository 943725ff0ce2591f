//! Session file storage.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::TokenError;
use crate::session::Session;

/// Application directory under the platform config dir.
const APP_DIR: &str = "authctl";

/// Session file name inside [`APP_DIR`].
const SESSION_FILE: &str = "session.json";

/// Default session file location: `<config_dir>/authctl/session.json`.
pub fn default_path() -> Result<PathBuf, TokenError> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR).join(SESSION_FILE))
        .ok_or_else(|| TokenError::SessionLoad {
            path: format!("<config dir>/{APP_DIR}/{SESSION_FILE}"),
            reason: "could not determine config directory".to_string(),
        })
}

/// Reads and writes the JSON session file.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the session, `None` if the file does not exist.
    pub fn load(&self) -> Result<Option<Session>, TokenError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.load_error(e.to_string())),
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| self.load_error(e.to_string()))
    }

    /// Write the session, creating parent directories as needed.
    ///
    /// On Unix the file is created with mode `0600` since it holds tokens.
    pub fn save(&self, session: &Session) -> Result<(), TokenError> {
        let content =
            serde_json::to_string_pretty(session).map_err(|e| self.save_error(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.save_error(e.to_string()))?;
        }

        let mut file = open_private(&self.path).map_err(|e| self.save_error(e.to_string()))?;
        file.write_all(content.as_bytes())
            .and_then(|()| file.write_all(b"\n"))
            .map_err(|e| self.save_error(e.to_string()))
    }

    fn load_error(&self, reason: String) -> TokenError {
        TokenError::SessionLoad {
            path: self.path.display().to_string(),
            reason,
        }
    }

    fn save_error(&self, reason: String) -> TokenError {
        TokenError::Persistence {
            path: self.path.display().to_string(),
            reason,
        }
    }
}

#[cfg(unix)]
fn open_private(path: &Path) -> io::Result<fs::File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // `mode` only applies on creation; tighten files written by older versions.
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    Ok(file)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> io::Result<fs::File> {
    fs::File::create(path)
}
