//! Infrastructure layer — concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: the Chromium browser,
//! HTTP transfers, zip archives, the config file, and the timer.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod archive;
pub mod browser;
pub mod clock;
pub mod config;
pub mod http;
