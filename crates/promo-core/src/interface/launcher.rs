use crate::error::{Classified, ErrorClass};
use thiserror::Error as ThisError;

///
/// LaunchError
///

#[derive(Debug, ThisError)]
pub enum LaunchError {
    #[error("no url opener available on this platform")]
    Unsupported,

    #[error("failed to launch url opener: {0}")]
    Spawn(String),
}

impl Classified for LaunchError {
    fn class(&self) -> ErrorClass {
        ErrorClass::Launcher
    }
}

///
/// UrlLauncher
/// Opens a URL in a new foreground browsing surface. Fire-and-forget.
///

pub trait UrlLauncher {
    fn open_foreground(&self, url: &str) -> Result<(), LaunchError>;
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opener_failures_are_launcher_errors() {
        assert_eq!(LaunchError::Unsupported.class(), ErrorClass::Launcher);
        assert_eq!(
            LaunchError::Spawn("not found".to_string()).class(),
            ErrorClass::Launcher
        );
    }
}
