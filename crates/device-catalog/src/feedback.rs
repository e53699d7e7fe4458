/// A user-facing note produced during a sync run.
///
/// Row-level store failures are reported this way instead of as errors, so
/// the caller decides whether to print, log, or ignore them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    /// Progress or summary information.
    Info(String),
    /// A record was skipped or rejected but the run continued.
    Warning(String),
}

impl Feedback {
    pub fn info(msg: impl Into<String>) -> Self {
        Self::Info(msg.into())
    }

    pub fn warning(msg: impl Into<String>) -> Self {
        Self::Warning(msg.into())
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, Self::Warning(_))
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Info(msg) | Self::Warning(msg) => msg,
        }
    }
}

impl std::fmt::Display for Feedback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info(msg) => write!(f, "{msg}"),
            Self::Warning(msg) => write!(f, "warning: {msg}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warning_is_prefixed_when_displayed() {
        let fb = Feedback::warning("could not create Pixel: UNIQUE constraint failed");
        assert!(fb.is_warning());
        assert_eq!(
            fb.to_string(),
            "warning: could not create Pixel: UNIQUE constraint failed"
        );
    }

    #[test]
    fn info_displays_bare_message() {
        let fb = Feedback::info("2 duplicate devices skipped");
        assert!(!fb.is_warning());
        assert_eq!(fb.message(), "2 duplicate devices skipped");
        assert_eq!(fb.to_string(), "2 duplicate devices skipped");
    }
}
