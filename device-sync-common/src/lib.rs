// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Common types for device-sync.
//!
//! Both the host tool and a device-side agent link against this crate so
//! that they agree on the request/response framing.

pub mod protocol;

// Re-export commonly used types
pub use protocol::{decode_frame, encode_frame, read_frame};
pub use protocol::{AckStatus, DeviceTime, FileEntry, Request, Response};
pub use protocol::{DEFAULT_LAN_PORT, FRAME_DELIMITER, MAX_DATA_BLOCK_SIZE, MAX_FRAME_SIZE};
