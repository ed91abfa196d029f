//! Target-independent core of the ACPPS portal web shell.
//!
//! Everything here compiles natively so the control state machines can be
//! exercised without a browser; the wasm shell only moves values between
//! these types and the DOM.

use std::fmt;

pub mod acceptance;
pub mod api;
pub mod capacity;
pub mod config;
pub mod csrf;
pub mod error;
pub mod filter;
pub mod launcher;
pub mod poll;
pub mod redirect;
pub mod task;
pub mod url_template;

pub use error::{ClientError, ClientErrorKind};

/// Identifies one interactive control: a supervisor row id or a button id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ControlKey(String);

impl ControlKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ControlKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl From<String> for ControlKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl fmt::Display for ControlKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
