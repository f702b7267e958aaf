//! Single-use status notices carried in the session between a redirect and the
//! next rendered page.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use ts_rs::TS;
use utoipa::ToSchema;

const NOTICES_KEY: &str = "notices";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Notice
///
/// A user-facing status message. Queued with `flash` and consumed by `take`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Queues a notice for the next rendered page.
///
/// # Errors
///
/// Returns an error if the session cannot be loaded or modified.
pub async fn flash(session: &Session, notice: Notice) -> Result<(), tower_sessions::session::Error> {
    let mut pending: Vec<Notice> = session.get(NOTICES_KEY).await?.unwrap_or_default();
    pending.push(notice);
    session.insert(NOTICES_KEY, pending).await
}

/// Removes and returns every pending notice.
///
/// # Errors
///
/// Returns an error if the session cannot be loaded or modified.
pub async fn take(session: &Session) -> Result<Vec<Notice>, tower_sessions::session::Error> {
    Ok(session
        .remove::<Vec<Notice>>(NOTICES_KEY)
        .await?
        .unwrap_or_default())
}
