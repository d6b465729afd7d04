//! Basic auth credentials read from mounted secrets.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const USER_FILE: &str = "basic-auth-user";
pub const PASSWORD_FILE: &str = "basic-auth-password";

/// A user/password pair.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuthCredentials {
    pub user: String,
    pub password: String,
}

impl BasicAuthCredentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for BasicAuthCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuthCredentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error("invalid secret mount path specified for reading secrets")]
    EmptyMountPath,

    #[error("unable to load {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Something that can produce the gateway's credentials.
pub trait ReadBasicAuth {
    fn read(&self) -> Result<BasicAuthCredentials, CredentialsError>;
}

/// Reads `basic-auth-user` and `basic-auth-password` from a directory.
#[derive(Debug, Clone)]
pub struct ReadBasicAuthFromDisk {
    pub secret_mount_path: PathBuf,
}

impl ReadBasicAuthFromDisk {
    pub fn new(secret_mount_path: impl Into<PathBuf>) -> Self {
        Self {
            secret_mount_path: secret_mount_path.into(),
        }
    }
}

impl ReadBasicAuth for ReadBasicAuthFromDisk {
    fn read(&self) -> Result<BasicAuthCredentials, CredentialsError> {
        if self.secret_mount_path.as_os_str().is_empty() {
            return Err(CredentialsError::EmptyMountPath);
        }

        let user = read_secret(&self.secret_mount_path.join(USER_FILE))?;
        let password = read_secret(&self.secret_mount_path.join(PASSWORD_FILE))?;

        Ok(BasicAuthCredentials { user, password })
    }
}

/// Line breaks become spaces, then surrounding whitespace is trimmed.
fn read_secret(path: &Path) -> Result<String, CredentialsError> {
    let raw = fs::read_to_string(path).map_err(|source| CredentialsError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(raw.replace("\r\n", " ").replace('\n', " ").trim().to_string())
}
