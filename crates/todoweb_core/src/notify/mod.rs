//! Transient success and error banners.
//!
//! [`NotificationSurface`] tracks what is on screen: one error slot that a
//! newer error replaces, plus independent success banners. Nothing is queued;
//! every banner runs its own timer. Callers pass the current [`Instant`] in,
//! so expiry is deterministic under test.
//!
//! A [`Notifier`] can additionally mirror each notice to the desktop.

use crate::error::AppError;
use serde::Serialize;
use std::time::{Duration, Instant};

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "linux")]
pub use linux::LinuxNotifier;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub use windows::WindowsNotifier;

pub const ERROR_DISPLAY: Duration = Duration::from_secs(5);
pub const SUCCESS_DISPLAY: Duration = Duration::from_secs(3);

const DISABLE_ENV_VAR: &str = "TODOWEB_DISABLE_NOTIFICATIONS";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Error,
    Success,
}

impl NoticeLevel {
    pub fn display_duration(self) -> Duration {
        match self {
            Self::Error => ERROR_DISPLAY,
            Self::Success => SUCCESS_DISPLAY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn error<M: Into<String>>(message: M) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn success<M: Into<String>>(message: M) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone)]
struct Banner {
    notice: Notice,
    expires_at: Instant,
}

impl Banner {
    fn new(notice: Notice, now: Instant) -> Self {
        let expires_at = now + notice.level.display_duration();
        Self { notice, expires_at }
    }

    fn is_visible(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

#[derive(Debug, Clone, Default)]
pub struct NotificationSurface {
    error: Option<Banner>,
    successes: Vec<Banner>,
}

impl NotificationSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, notice: Notice, now: Instant) {
        self.prune(now);
        match notice.level {
            NoticeLevel::Error => self.error = Some(Banner::new(notice, now)),
            NoticeLevel::Success => self.successes.push(Banner::new(notice, now)),
        }
    }

    pub fn show_error<M: Into<String>>(&mut self, message: M, now: Instant) {
        self.show(Notice::error(message), now);
    }

    pub fn show_success<M: Into<String>>(&mut self, message: M, now: Instant) {
        self.show(Notice::success(message), now);
    }

    pub fn hide_error(&mut self) {
        self.error = None;
    }

    /// Drops every banner whose timer has run out.
    pub fn prune(&mut self, now: Instant) {
        if self.error.as_ref().is_some_and(|banner| !banner.is_visible(now)) {
            self.error = None;
        }
        self.successes.retain(|banner| banner.is_visible(now));
    }

    /// Banners on screen at `now`, error first, successes oldest first.
    pub fn visible(&self, now: Instant) -> Vec<Notice> {
        self.error
            .iter()
            .chain(self.successes.iter())
            .filter(|banner| banner.is_visible(now))
            .map(|banner| banner.notice.clone())
            .collect()
    }
}

pub trait Notifier {
    fn notify(&self, notice: &Notice) -> Result<(), AppError>;
}

pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _notice: &Notice) -> Result<(), AppError> {
        Ok(())
    }
}

/// Desktop notifier when `enabled`, unless the environment disables it or the
/// platform has none.
pub fn notifier_from_env(enabled: bool) -> Result<Box<dyn Notifier>, AppError> {
    if !enabled || std::env::var(DISABLE_ENV_VAR).is_ok() {
        return Ok(Box::new(NoopNotifier));
    }

    match platform_notifier() {
        Ok(notifier) => Ok(notifier),
        Err(err) => match err {
            AppError::InvalidData(_) => Ok(Box::new(NoopNotifier)),
            other => Err(other),
        },
    }
}

#[cfg(target_os = "linux")]
pub fn platform_notifier() -> Result<Box<dyn Notifier>, AppError> {
    Ok(Box::new(LinuxNotifier))
}

#[cfg(windows)]
pub fn platform_notifier() -> Result<Box<dyn Notifier>, AppError> {
    Ok(Box::new(WindowsNotifier))
}

#[cfg(not(any(target_os = "linux", windows)))]
pub fn platform_notifier() -> Result<Box<dyn Notifier>, AppError> {
    Err(AppError::invalid_data(
        "notifications are not supported on this platform",
    ))
}
