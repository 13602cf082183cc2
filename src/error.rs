use thiserror::Error;

use crate::platform::PlatformError;

const PERMISSION_GUIDANCE: &str =
    "the bot needs Manage Channels & Manage Roles, and its role must be above section roles.";

/// Everything an article command or a sweep step can fail with.
#[derive(Debug, Error)]
pub enum ArticleError {
    #[error("could not parse deadline {0:?}")]
    InvalidDeadline(String),
    #[error("command used outside of a server")]
    NotInGuild,
    #[error("target is not a text channel")]
    NotTextChannel,
    #[error("insufficient permissions: {0}")]
    MissingPermissions(String),
    #[error(transparent)]
    Platform(PlatformError),
}

impl From<PlatformError> for ArticleError {
    fn from(err: PlatformError) -> Self {
        match err {
            PlatformError::Forbidden(msg) => ArticleError::MissingPermissions(msg),
            other => ArticleError::Platform(other),
        }
    }
}

impl ArticleError {
    /// Short text shown to whoever invoked the command.
    ///
    /// Unclassified platform errors only expose their category.
    pub fn user_message(&self) -> String {
        match self {
            ArticleError::InvalidDeadline(_) => {
                "Couldn't parse the deadline. Use `YYYY-MM-DD HH:MM` (24-hour).".to_string()
            }
            ArticleError::NotInGuild => "This command must be used in a server.".to_string(),
            ArticleError::NotTextChannel => "Choose a text channel to archive.".to_string(),
            ArticleError::MissingPermissions(_) => {
                format!(":x: Missing permissions: {PERMISSION_GUIDANCE}")
            }
            ArticleError::Platform(err) => format!(":x: Error: {}", err.category()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forbidden_becomes_permission_error() {
        let err: ArticleError = PlatformError::Forbidden("Missing Access".into()).into();
        assert!(matches!(err, ArticleError::MissingPermissions(_)));
        assert!(err.user_message().contains("Manage Channels"));
    }

    #[test]
    fn platform_errors_only_show_category() {
        let err: ArticleError = PlatformError::Other {
            category: "Http",
            detail: "secret internals".into(),
        }
        .into();
        let msg = err.user_message();
        assert!(msg.contains("Http"));
        assert!(!msg.contains("secret"));
    }
}
