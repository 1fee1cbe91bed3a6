//! Key-release handling.
//!
//! The windowing layer forwards "key released" events here. Escape is the
//! only bound key: it asks the simulation to stop, after which the driver
//! runs the usual request-stop-then-join shutdown.

use std::fmt;
use std::str::FromStr;

use tracing::{debug, info};

use crate::lifecycle::RunFlag;

/// A released key, as reported by the windowing layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Escape,
    /// Any key without a binding, by name.
    Other(String),
}

impl Key {
    /// `"esc"` and `"escape"` (any case, surrounding whitespace ignored) name
    /// [`Key::Escape`].
    pub fn from_name(name: &str) -> Self {
        let name = name.trim();
        if name.eq_ignore_ascii_case("esc") || name.eq_ignore_ascii_case("escape") {
            Key::Escape
        } else {
            Key::Other(name.to_owned())
        }
    }
}

impl FromStr for Key {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Key::from_name(s))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Escape => f.write_str("Escape"),
            Key::Other(name) => f.write_str(name),
        }
    }
}

/// What the driver should do after a key release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    Continue,
    Shutdown,
}

/// React to a released key.
pub fn handle_key_release(key: &Key, flag: &RunFlag) -> InputOutcome {
    match key {
        Key::Escape => {
            info!("escape released; shutting down");
            flag.request_stop();
            InputOutcome::Shutdown
        }
        Key::Other(name) => {
            debug!(key = %name, "unbound key ignored");
            InputOutcome::Continue
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
