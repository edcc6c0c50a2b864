// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Operations a device client must provide.
//!
//! Boolean operations report the device's verdict as `Ok(true)` / `Ok(false)`.
//! `Err` means the operation faulted; its context chain lists every cause,
//! outermost first.

use std::path::Path;

use anyhow::Result;
use chrono::NaiveDateTime;

pub use device_sync_common::FileEntry;

pub trait DeviceClient {
    /// Copy a local file to `destination` on the device.
    fn push_file(&mut self, source: &Path, destination: &str, overwrite: bool) -> Result<bool>;

    /// Copy `source` from the device to a local file.
    fn pull_file(&mut self, source: &str, destination: &Path, overwrite: bool) -> Result<bool>;

    fn start_process(&mut self, cmd: &str, parms: Option<&str>) -> Result<bool>;

    fn find_directories(&mut self, directory: &str, mask: &str) -> Result<Vec<FileEntry>>;

    fn find_files(&mut self, directory: &str, mask: &str) -> Result<Vec<FileEntry>>;

    fn create_directory(&mut self, directory: &str) -> Result<bool>;

    /// Set the last-modified time of a file on the device.
    fn set_file_date_time(&mut self, path: &str, timestamp: NaiveDateTime) -> Result<bool>;

    fn delete_file(&mut self, path: &str) -> Result<bool>;
}
