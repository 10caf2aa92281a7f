//! Concrete transport implementations. The core engine only ever depends on
//! [`crate::interface::Transport`]; everything under this module is an
//! out-of-scope collaborator (spec.md §1(a)) kept here as a runnable demo.

#[cfg(feature = "bluetooth")]
pub mod ble;
