//! Capture date resolution
//!
//! The import engine only needs the calendar date a photo was taken. How that
//! date is obtained is behind [`CaptureDateResolver`]; the default
//! implementation reads EXIF metadata (see [`exif::ExifDateResolver`]).

pub mod exif;

use crate::error::Result;
use chrono::{Datelike, NaiveDate};
use std::fmt;
use std::path::Path;

pub use exif::ExifDateResolver;

/// Calendar date a photo was taken, without time of day
///
/// Components are stored as given; range checks happen where the date is
/// turned into a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CaptureDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl CaptureDate {
    /// Build a date from raw components without validating them
    pub const fn from_parts(year: i32, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }
}

impl From<NaiveDate> for CaptureDate {
    fn from(date: NaiveDate) -> Self {
        Self::from_parts(date.year(), date.month(), date.day())
    }
}

impl fmt::Display for CaptureDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// Source of capture dates for files being imported
pub trait CaptureDateResolver {
    /// Resolve the capture date of the file at `path`
    fn resolve_capture_date(&self, path: &Path) -> Result<CaptureDate>;
}

impl<F> CaptureDateResolver for F
where
    F: Fn(&Path) -> Result<CaptureDate>,
{
    fn resolve_capture_date(&self, path: &Path) -> Result<CaptureDate> {
        self(path)
    }
}
