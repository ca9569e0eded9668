//! Photo Organiser - sort camera dumps into a dated photo library
//!
//! This library provides:
//! - Capture date resolution from EXIF metadata
//! - A deterministic `<year>/<MM> - <Month>/<DD>` library layout
//! - An import engine with copy or move transfers that skips files
//!   already present in the library
//! - Per-file failure isolation and a report of touched directories

pub mod capture;
pub mod cli;
pub mod config;
pub mod error;
pub mod layout;
pub mod process;
pub mod report;
pub mod transfer;

pub use capture::{CaptureDate, CaptureDateResolver, ExifDateResolver};
pub use cli::Cli;
pub use config::{CollisionPolicy, Config, ConfigError, TransferMode};
pub use error::{Error, Result};
pub use layout::destination_for;
pub use process::ImportEngine;
pub use report::{FailureKind, FileFailure, FileOutcome, FileResult, ImportStats, TransferReport};
