// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Shared protocol types for host <-> device communication.
//!
//! Every message is serialized with postcard and COBS-encoded, so a single
//! `0x00` byte terminates each frame on both serial and TCP links.

use std::io::{self, Read};

use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// TCP port a device agent listens on when reached over LAN.
pub const DEFAULT_LAN_PORT: u16 = 5050;

/// Maximum payload carried by a single data block.
pub const MAX_DATA_BLOCK_SIZE: usize = 1024;

/// Upper bound on an encoded frame, delimiter included.
pub const MAX_FRAME_SIZE: usize = 64 * 1024;

pub const FRAME_DELIMITER: u8 = 0x00;

// --- Command / Response protocol ---

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Open `path` on the device for writing `size` bytes.
    PushBegin {
        path: String,
        size: u64,
        crc32: u32,
        overwrite: bool,
    },
    DataBlock {
        offset: u64,
        data: Vec<u8>,
    },
    /// Commit the pushed file; the device verifies the CRC.
    PushFinish,
    PullBegin {
        path: String,
    },
    PullBlock {
        offset: u64,
        len: u32,
    },
    StartProcess {
        cmd: String,
        parms: Option<String>,
    },
    FindDirectories {
        directory: String,
        mask: String,
    },
    FindFiles {
        directory: String,
        mask: String,
    },
    CreateDirectory {
        path: String,
    },
    SetFileDateTime {
        path: String,
        timestamp: DeviceTime,
    },
    DeleteFile {
        path: String,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Ack(AckStatus),
    Entries(Vec<FileEntry>),
    FileInfo { size: u64, crc32: u32 },
    Data(Vec<u8>),
    /// The device raised an error. Outermost message first, root cause last.
    Fault(Vec<String>),
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckStatus {
    Ok,
    NotFound,
    AlreadyExists,
    AccessDenied,
    CrcError,
    IoError,
    BadCommand,
    BadState,
}

/// A named filesystem object reported by a directory search.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub name: String,
    pub is_directory: bool,
}

impl FileEntry {
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_directory: false,
        }
    }

    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_directory: true,
        }
    }
}

/// Calendar date and wall-clock time, in the device's local time zone.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

// --- Framing ---

/// Serialize a message into a COBS frame, delimiter included.
pub fn encode_frame<T: Serialize>(msg: &T) -> postcard::Result<Vec<u8>> {
    postcard::to_stdvec_cobs(msg)
}

/// Decode a COBS frame produced by [`encode_frame`]. The buffer is decoded in place.
pub fn decode_frame<T: DeserializeOwned>(frame: &mut [u8]) -> postcard::Result<T> {
    postcard::from_bytes_cobs(frame)
}

/// Read bytes up to and including the next frame delimiter.
///
/// Returns `UnexpectedEof` if the stream closes mid-frame and `InvalidData`
/// if the frame grows past [`MAX_FRAME_SIZE`].
pub fn read_frame<R: Read + ?Sized>(reader: &mut R) -> io::Result<Vec<u8>> {
    let mut frame = Vec::with_capacity(256);
    let mut byte = [0u8; 1];

    loop {
        match reader.read(&mut byte) {
            Ok(0) => {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "connection closed before end of frame",
                ))
            }
            Ok(_) => {
                frame.push(byte[0]);
                if byte[0] == FRAME_DELIMITER {
                    return Ok(frame);
                }
                if frame.len() > MAX_FRAME_SIZE {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("frame exceeds {} bytes", MAX_FRAME_SIZE),
                    ));
                }
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}
