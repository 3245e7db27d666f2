//! User-facing notifications and confirmations.

use crate::error::ReviewError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A message the host should show the grader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: "Error".to_string(),
            message: message.into(),
        }
    }

    /// Notice for an error the user should see, if any.
    pub fn from_error(err: &ReviewError) -> Option<Self> {
        err.is_user_visible().then(|| Notice::error(err.user_message()))
    }
}

/// Host hook for alerts and yes/no confirmations.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
    fn confirm(&self, question: &str) -> bool;
}

/// Native message dialogs.
#[derive(Debug, Clone, Copy, Default)]
pub struct DialogNotifier;

impl Notifier for DialogNotifier {
    fn notify(&self, notice: Notice) {
        let level = match notice.level {
            NoticeLevel::Info => rfd::MessageLevel::Info,
            NoticeLevel::Error => rfd::MessageLevel::Error,
        };
        rfd::MessageDialog::new()
            .set_level(level)
            .set_title(notice.title.as_str())
            .set_description(notice.message.as_str())
            .set_buttons(rfd::MessageButtons::Ok)
            .show();
    }

    fn confirm(&self, question: &str) -> bool {
        let answer = rfd::MessageDialog::new()
            .set_level(rfd::MessageLevel::Warning)
            .set_title("Confirm")
            .set_description(question)
            .set_buttons(rfd::MessageButtons::YesNo)
            .show();
        matches!(answer, rfd::MessageDialogResult::Yes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ActionKind;

    #[test]
    fn test_notice_from_error() {
        let notice = Notice::from_error(&ReviewError::Rejected("Permission denied".into())).unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.message, "Permission denied");
        assert!(Notice::from_error(&ReviewError::Cancelled).is_none());
        assert!(Notice::from_error(&ReviewError::Busy(ActionKind::AddComment)).is_some());
    }
}
