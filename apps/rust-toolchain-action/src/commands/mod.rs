//! Command modules for the toolchain action.
//!
//! - [`install`] - Install and configure a rustup toolchain
pub mod install;
