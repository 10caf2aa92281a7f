//! Engine tunables.
//!
//! Nothing in the protocol itself is configurable; this only carries the
//! policy knobs spec.md §5 hands to the *client* — the 16-second inactivity
//! timeout it suggests, and a byte ceiling on the download accumulator for
//! callers who want to enforce their own skepticism about announced lengths
//! (§5: "callers must treat announced lengths with skepticism").

use std::time::Duration;

/// Client-side policy the engine does not enforce on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Suggested inactivity timeout: (re)started on every `start_waiting`
    /// and `write_value` seen while waiting, cancelled on `finish_waiting`.
    pub inactivity_timeout: Duration,
    /// An optional ceiling on download accumulator growth, on top of
    /// whatever length the device announces. `None` means trust the device.
    pub max_accumulator_bytes: Option<u32>,
}

impl Default for EngineConfig {
    fn default() -> EngineConfig {
        EngineConfig {
            inactivity_timeout: Duration::from_secs(16),
            max_accumulator_bytes: None,
        }
    }
}
