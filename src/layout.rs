//! Library layout: where a photo with a given capture date belongs
//!
//! Layout: `<target>/<year>/<MM> - <MonthName>/<DD>/`

use crate::capture::CaptureDate;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Destination directory for a capture date, relative to `target_root`
///
/// Pure path arithmetic; nothing is created on disk.
pub fn destination_for(target_root: &Path, date: &CaptureDate) -> Result<PathBuf> {
    let name = month_name(date.month)?;
    let month_dir = format!("{} - {}", two_digit(date.month)?, name);

    let mut dest = target_root.to_path_buf();
    dest.push(date.year.to_string());
    dest.push(month_dir);
    dest.push(two_digit(date.day)?);
    Ok(dest)
}

/// Destination file for `file_name` captured on `date`
pub fn destination_file_for(
    target_root: &Path,
    date: &CaptureDate,
    file_name: &std::ffi::OsStr,
) -> Result<PathBuf> {
    Ok(destination_for(target_root, date)?.join(file_name))
}

/// Render a month or day number as two digits
pub fn two_digit(n: u32) -> Result<String> {
    match n {
        1..=9 => Ok(format!("0{n}")),
        10..=31 => Ok(n.to_string()),
        _ => Err(Error::InvalidDateComponent {
            component: "day",
            value: i64::from(n),
            min: 1,
            max: 31,
        }),
    }
}

/// Full English month name
pub fn month_name(month: u32) -> Result<&'static str> {
    month
        .checked_sub(1)
        .and_then(|i| MONTH_NAMES.get(i as usize))
        .copied()
        .ok_or(Error::InvalidDateComponent {
            component: "month",
            value: i64::from(month),
            min: 1,
            max: 12,
        })
}
