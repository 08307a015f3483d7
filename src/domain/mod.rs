//! Domain logic and core data structures
//!
//! This module contains pure widget logic that is independent
//! of Win32 APIs and platform-specific implementations.

pub mod chrome;
pub mod core;
pub mod hit_zone;
pub mod interaction;
