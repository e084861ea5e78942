//! Shared test utilities for Eclipse Guardian.
//!
//! # Modules
//!
//! - [`mock`] - Manual clock and recording power actuator
//! - [`fixtures`] - Small hand-built isolation-forest models
//! - [`samples`] - Scripted raw sample sequences
//! - [`prelude`] - Convenience re-exports
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! guardian-test-helpers = { workspace = true }
//! ```
//!
//! ```rust,ignore
//! use guardian_test_helpers::prelude::*;
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod prelude;
pub mod samples;

#[cfg(feature = "mock")]
#[cfg_attr(docsrs, doc(cfg(feature = "mock")))]
pub mod mock;

#[cfg(feature = "fixtures")]
#[cfg_attr(docsrs, doc(cfg(feature = "fixtures")))]
pub mod fixtures;
