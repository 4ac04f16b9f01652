//! UI updates - data pushed from the App layer to whatever renders it

use crate::app::AppState;

/// Severity of a user-facing notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A toast-style notification
#[derive(Debug, Clone)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub detail: String,
}

impl Notice {
    pub fn info(title: impl Into<String>, detail: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Info,
            title: title.into(),
            detail: detail.into(),
        }
    }

    pub fn error(title: impl Into<String>, detail: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Error,
            title: title.into(),
            detail: detail.into(),
        }
    }
}

/// Messages from the App layer to the UI layer
#[derive(Debug, Clone)]
pub enum UiUpdate {
    /// Fresh snapshot of the whole application state, sent after every
    /// transition
    State(Box<AppState>),
    Notice(Notice),
    /// A collection serialized for download
    ExportReady { file_name: String, json: String },
}
