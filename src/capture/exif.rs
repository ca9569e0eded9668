//! EXIF capture date extraction

use super::{CaptureDate, CaptureDateResolver};
use crate::error::{Error, Result};
use chrono::{FixedOffset, Local, NaiveDate, NaiveDateTime};
use exif::{DateTime, Exif, In, Reader, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::trace;

/// Resolves capture dates from the `DateTimeOriginal` EXIF tag
#[derive(Debug, Clone, Copy, Default)]
pub struct ExifDateResolver;

impl ExifDateResolver {
    pub fn new() -> Self {
        Self
    }
}

impl CaptureDateResolver for ExifDateResolver {
    fn resolve_capture_date(&self, path: &Path) -> Result<CaptureDate> {
        let unavailable = |message: String| Error::MetadataUnavailable {
            path: path.to_path_buf(),
            message,
        };

        let file = File::open(path).map_err(|e| unavailable(e.to_string()))?;
        let mut reader = BufReader::new(file);

        let exif = Reader::new()
            .read_from_container(&mut reader)
            .map_err(|e| unavailable(e.to_string()))?;

        let original = read_date_time(&exif, Tag::DateTimeOriginal)
            .ok_or_else(|| unavailable("No DateTimeOriginal tag in EXIF data".into()))?;

        let date = local_date(&original)
            .ok_or_else(|| unavailable(format!("Unusable DateTimeOriginal value: {original}")))?;

        trace!(?path, %date, "Found EXIF capture date");
        Ok(date.into())
    }
}

/// Read an ASCII date tag, attaching the matching `OffsetTime*` tag when present
fn read_date_time(exif: &Exif, tag: Tag) -> Option<DateTime> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    let Value::Ascii(ref values) = field.value else {
        return None;
    };
    let mut date_time = DateTime::from_ascii(values.first()?).ok()?;

    let offset_tag = match tag {
        Tag::DateTimeOriginal => Tag::OffsetTimeOriginal,
        Tag::DateTimeDigitized => Tag::OffsetTimeDigitized,
        _ => Tag::OffsetTime,
    };
    if let Some(offset) = exif.get_field(offset_tag, In::PRIMARY)
        && let Value::Ascii(ref values) = offset.value
        && let Some(raw) = values.first()
    {
        // A malformed offset leaves the wall-clock time usable
        let _ = date_time.parse_offset(raw);
    }

    Some(date_time)
}

/// Truncate an EXIF timestamp to a calendar date
///
/// With a recorded UTC offset the instant is converted to the local timezone
/// first; without one the camera's wall-clock date is taken as is.
fn local_date(date_time: &DateTime) -> Option<NaiveDate> {
    let date = NaiveDate::from_ymd_opt(
        i32::from(date_time.year),
        u32::from(date_time.month),
        u32::from(date_time.day),
    )?;

    let Some(offset_minutes) = date_time.offset else {
        return Some(date);
    };

    let naive: NaiveDateTime = date.and_hms_opt(
        u32::from(date_time.hour),
        u32::from(date_time.minute),
        u32::from(date_time.second).min(59),
    )?;
    let offset = FixedOffset::east_opt(i32::from(offset_minutes) * 60)?;
    let instant = naive.and_local_timezone(offset).single()?;
    Some(instant.with_timezone(&Local).date_naive())
}

/// Minimal JPEG carrying an EXIF `DateTimeOriginal` tag, for tests
#[cfg(test)]
pub(crate) fn jpeg_with_date_original(value: &str) -> Vec<u8> {
    let mut ascii = value.as_bytes().to_vec();
    ascii.push(0);

    // Big-endian TIFF: header, IFD0 with an Exif pointer, Exif IFD with one tag
    let mut tiff: Vec<u8> = vec![0x4D, 0x4D, 0x00, 0x2A, 0x00, 0x00, 0x00, 0x08];
    tiff.extend_from_slice(&[0x00, 0x01]);
    tiff.extend_from_slice(&[0x87, 0x69, 0x00, 0x04, 0x00, 0x00, 0x00, 0x01]);
    tiff.extend_from_slice(&26u32.to_be_bytes());
    tiff.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);
    tiff.extend_from_slice(&[0x00, 0x01]);
    tiff.extend_from_slice(&[0x90, 0x03, 0x00, 0x02]);
    tiff.extend_from_slice(&(ascii.len() as u32).to_be_bytes());
    tiff.extend_from_slice(&44u32.to_be_bytes());
    tiff.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);
    tiff.extend_from_slice(&ascii);

    let mut segment = b"Exif\0\0".to_vec();
    segment.extend_from_slice(&tiff);

    let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE1];
    jpeg.extend_from_slice(&((segment.len() + 2) as u16).to_be_bytes());
    jpeg.extend_from_slice(&segment);
    jpeg.extend_from_slice(&[0xFF, 0xD9]);
    jpeg
}
