// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Command-line client for file transfer and process control on a device
//! reached over USB or LAN.

pub mod args;
pub mod cli;
pub mod client;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod transport;

pub const APP_NAME: &str = "device-sync";

pub use cli::{parse, run, Cli, Verb};
pub use client::{DeviceClient, FileEntry};
pub use dispatch::{dispatch, Outcome};
pub use error::{fault_messages, ParseError, ParseErrorKind};
