use promo_core::interface::EnvReader;
use std::{cell::RefCell, collections::HashMap};

///
/// FakeEnv
///

#[derive(Debug, Default)]
pub struct FakeEnv {
    vars: RefCell<HashMap<String, String>>,
}

impl FakeEnv {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, name: &str, value: &str) {
        self.vars
            .borrow_mut()
            .insert(name.to_string(), value.to_string());
    }
}

impl EnvReader for FakeEnv {
    fn var(&self, name: &str) -> Option<String> {
        self.vars
            .borrow()
            .get(name)
            .filter(|v| !v.is_empty())
            .cloned()
    }
}
