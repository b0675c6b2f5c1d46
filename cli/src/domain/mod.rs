//! Domain layer — pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod command;
pub mod config;
pub mod error;
pub mod job;
pub mod payload;
pub mod session;
pub mod theme;

pub use command::RemoteCommand;
pub use config::{ThemerConfig, normalize_domain, resolve_target};
pub use error::{ConfigError, JobError, PackageError, RemoteError, SessionError};
pub use job::{Job, JobKind, JobStatus, UploadFields};
pub use payload::{UploadPayload, UploadReceipt};
pub use session::{Cookie, is_authenticated};
pub use theme::{SwapPlan, ThemeInfo, live_theme_id};
