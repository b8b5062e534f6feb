//! Owner access to the studio.
//!
//! A single shared passcode guards the studio commands. It keeps casual
//! visitors out; it is not a security boundary, and nothing here pretends
//! otherwise (no hashing, no lockout). Wrong guesses are rejected and can be
//! retried immediately.
//!
//! A successful login yields a [`Session`], which the [`Studio`] requires at
//! construction. The CLI persists the session in the state directory with an
//! expiry so it survives between commands of one working session and ends
//! on `logout` or when it runs out.
//!
//! [`Studio`]: crate::studio::Studio

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use subtle::ConstantTimeEq;
use thiserror::Error;

const SESSION_FILENAME: &str = "session.json";

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid passcode")]
    InvalidPasscode,
    #[error("Not logged in. Run `folio login` first")]
    NotLoggedIn,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Proof of a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub started_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Checks passcodes and hands out sessions.
#[derive(Debug, Clone)]
pub struct Authenticator {
    passcode: String,
    session_length: Duration,
}

impl Authenticator {
    pub fn new(passcode: impl Into<String>, session_minutes: u32) -> Self {
        Self {
            passcode: passcode.into(),
            session_length: Duration::minutes(i64::from(session_minutes)),
        }
    }

    pub fn from_config(studio: &crate::config::StudioConfig) -> Self {
        Self::new(studio.passcode.clone(), studio.session_minutes)
    }

    pub fn login(&self, input: &str) -> Result<Session, AuthError> {
        self.login_at(input, Utc::now())
    }

    pub fn login_at(&self, input: &str, now: DateTime<Utc>) -> Result<Session, AuthError> {
        let matches: bool = input.as_bytes().ct_eq(self.passcode.as_bytes()).into();
        if !matches {
            log::info!("studio login rejected");
            return Err(AuthError::InvalidPasscode);
        }
        Ok(Session {
            started_at: now,
            expires_at: now + self.session_length,
        })
    }
}

/// Session persisted in the state directory.
#[derive(Debug, Clone)]
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn new(state_dir: &Path) -> Self {
        Self {
            path: state_dir.join(SESSION_FILENAME),
        }
    }

    pub fn save(&self, session: &Session) -> Result<(), AuthError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(session)?)?;
        Ok(())
    }

    /// The stored session if it is still active. Expired or unreadable
    /// session files are removed.
    pub fn resume(&self) -> Option<Session> {
        self.resume_at(Utc::now())
    }

    pub fn resume_at(&self, now: DateTime<Utc>) -> Option<Session> {
        let content = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str::<Session>(&content) {
            Ok(session) if session.is_active_at(now) => Some(session),
            Ok(_) => {
                log::debug!("studio session expired");
                self.clear().ok();
                None
            }
            Err(e) => {
                log::warn!("discarding unreadable session file: {e}");
                self.clear().ok();
                None
            }
        }
    }

    /// Resume or fail with [`AuthError::NotLoggedIn`].
    pub fn require(&self) -> Result<Session, AuthError> {
        self.resume().ok_or(AuthError::NotLoggedIn)
    }

    pub fn clear(&self) -> Result<(), AuthError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
