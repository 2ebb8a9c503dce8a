use promo_core::interface::{LaunchError, UrlLauncher};
use std::cell::{Cell, RefCell};

///
/// RecordingLauncher
/// Remembers every URL it was asked to open.
///

#[derive(Debug, Default)]
pub struct RecordingLauncher {
    opened: RefCell<Vec<String>>,
    fail: Cell<bool>,
}

impl RecordingLauncher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent open fail (still recorded).
    pub fn fail(&self) {
        self.fail.set(true);
    }

    #[must_use]
    pub fn opened(&self) -> Vec<String> {
        self.opened.borrow().clone()
    }
}

impl UrlLauncher for RecordingLauncher {
    fn open_foreground(&self, url: &str) -> Result<(), LaunchError> {
        self.opened.borrow_mut().push(url.to_string());

        if self.fail.get() {
            return Err(LaunchError::Spawn("scripted failure".to_string()));
        }

        Ok(())
    }
}
