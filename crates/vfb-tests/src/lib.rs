//! Integration tests for the vfb crates.
//!
//! This crate contains end-to-end tests that run frames through the public
//! API of vfb-core and vfb-ops together.
