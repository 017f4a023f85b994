//! File attribute conversion between the filesystem and ZIP records

use chrono::{Datelike, Local, NaiveDate, TimeZone, Timelike};
use filetime::FileTime;
use std::fs;
use std::io;
use std::path::Path;
use std::time::SystemTime;
use zip::DateTime;

/// Attributes captured for one entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryAttributes {
    /// Unix permission bits (if available)
    pub mode: Option<u32>,
    /// Modification time as a Unix timestamp
    pub mtime: Option<i64>,
}

impl EntryAttributes {
    /// Capture attributes from filesystem metadata
    pub fn from_metadata(metadata: &fs::Metadata) -> Self {
        Self {
            mode: permission_bits(metadata),
            mtime: metadata.modified().ok().and_then(system_time_to_unix),
        }
    }

    /// Modification time in the container's DOS representation
    pub fn zip_datetime(&self) -> Option<DateTime> {
        self.mtime.and_then(unix_to_zip_datetime)
    }

    /// Restore the captured attributes onto `path`
    pub fn apply(&self, path: &Path, permissions: bool, timestamps: bool) -> io::Result<()> {
        if timestamps {
            if let Some(mtime) = self.mtime {
                filetime::set_file_mtime(path, FileTime::from_unix_time(mtime, 0))?;
            }
        }

        if permissions {
            #[cfg(unix)]
            if let Some(mode) = self.mode {
                use std::os::unix::fs::PermissionsExt;
                fs::set_permissions(path, fs::Permissions::from_mode(mode & 0o7777))?;
            }
        }

        Ok(())
    }
}

#[cfg(unix)]
fn permission_bits(metadata: &fs::Metadata) -> Option<u32> {
    use std::os::unix::fs::PermissionsExt;
    Some(metadata.permissions().mode() & 0o7777)
}

#[cfg(not(unix))]
fn permission_bits(_metadata: &fs::Metadata) -> Option<u32> {
    None
}

fn system_time_to_unix(time: SystemTime) -> Option<i64> {
    let utc: chrono::DateTime<chrono::Utc> = time.into();
    Some(utc.timestamp())
}

/// Convert a Unix timestamp into a ZIP (local time, 2 second resolution) timestamp.
///
/// Returns `None` outside the representable 1980..=2107 range.
pub fn unix_to_zip_datetime(timestamp: i64) -> Option<DateTime> {
    let local = Local.timestamp_opt(timestamp, 0).earliest()?;
    DateTime::from_date_and_time(
        u16::try_from(local.year()).ok()?,
        local.month() as u8,
        local.day() as u8,
        local.hour() as u8,
        local.minute() as u8,
        local.second() as u8,
    )
    .ok()
}

/// Convert a ZIP timestamp back into a Unix timestamp
pub fn zip_datetime_to_unix(datetime: &DateTime) -> Option<i64> {
    let naive = NaiveDate::from_ymd_opt(
        datetime.year() as i32,
        datetime.month() as u32,
        datetime.day() as u32,
    )?
    .and_hms_opt(
        datetime.hour() as u32,
        datetime.minute() as u32,
        datetime.second() as u32,
    )?;
    naive
        .and_local_timezone(Local)
        .earliest()
        .map(|dt| dt.timestamp())
}
