// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Wire client: USB CDC serial or LAN (TCP) transport to a device agent.
//!
//! One request frame is answered by exactly one response frame. The link is
//! opened on the first request and lives until the transport is dropped.

use std::fmt;
use std::fs;
use std::io::{self, Read, Write};
use std::net::{IpAddr, SocketAddr, TcpStream, ToSocketAddrs};
use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{Datelike, NaiveDateTime, Timelike};
use crc::{Crc, CRC_32_ISO_HDLC};
use indicatif::{ProgressBar, ProgressStyle};

use device_sync_common::protocol::{
    decode_frame, encode_frame, read_frame, AckStatus, DeviceTime, FileEntry, Request, Response,
};
use device_sync_common::{DEFAULT_LAN_PORT, MAX_DATA_BLOCK_SIZE};

use crate::cli::Cli;
use crate::client::DeviceClient;
use crate::error::fault_from_messages;

/// Default timeout for device operations in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

pub const BAUD_RATE: u32 = 115200;

const CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

/// Where the device is reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// USB CDC serial port, e.g. `/dev/ttyACM0` or `COM3`.
    Usb { port: String },
    /// `host:port` of a device agent on the LAN.
    Lan { addr: String },
}

impl Endpoint {
    /// `--ip` wins over `--port`. Returns `None` when neither is given.
    pub fn resolve(ip: Option<&str>, port: Option<&str>) -> Option<Self> {
        if let Some(ip) = ip {
            return Some(Endpoint::Lan {
                addr: lan_address(ip),
            });
        }
        port.map(|port| Endpoint::Usb {
            port: port.to_string(),
        })
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Usb { port } => write!(f, "USB {}", port),
            Endpoint::Lan { addr } => write!(f, "LAN {}", addr),
        }
    }
}

/// Append [`DEFAULT_LAN_PORT`] unless `ip` already names a port.
fn lan_address(ip: &str) -> String {
    if let Ok(addr) = ip.parse::<IpAddr>() {
        return SocketAddr::new(addr, DEFAULT_LAN_PORT).to_string();
    }
    if ip.parse::<SocketAddr>().is_ok() {
        return ip.to_string();
    }
    match ip.rsplit_once(':') {
        Some((host, port)) if !host.is_empty() && port.parse::<u16>().is_ok() => ip.to_string(),
        _ => format!("{}:{}", ip, DEFAULT_LAN_PORT),
    }
}

trait Link: Read + Write + Send {}
impl<T: Read + Write + Send + ?Sized> Link for T {}

/// Device client speaking the framed request/response protocol.
pub struct Transport {
    endpoint: Option<Endpoint>,
    timeout: Duration,
    link: Option<Box<dyn Link>>,
}

impl Transport {
    /// Create a transport; nothing is opened until the first request.
    pub fn new(endpoint: Option<Endpoint>, timeout_ms: u64) -> Self {
        Self {
            endpoint,
            timeout: Duration::from_millis(timeout_ms),
            link: None,
        }
    }

    /// Transport for the endpoint selected on the command line.
    pub fn for_cli(cli: &Cli) -> Self {
        Self::new(
            Endpoint::resolve(cli.verb.ip(), cli.port.as_deref()),
            cli.timeout,
        )
    }

    pub fn endpoint(&self) -> Option<&Endpoint> {
        self.endpoint.as_ref()
    }

    fn link(&mut self) -> Result<&mut Box<dyn Link>> {
        let link = match self.link.take() {
            Some(link) => link,
            None => {
                let endpoint = self
                    .endpoint
                    .as_ref()
                    .ok_or_else(|| anyhow!("No device selected: pass --ip <ADDR> or --port <PORT>"))?;
                open(endpoint, self.timeout)?
            }
        };
        Ok(self.link.insert(link))
    }

    /// Send a request and wait for the response.
    pub fn send_recv(&mut self, req: &Request) -> Result<Response> {
        let frame = encode_frame(req).context("Failed to serialize request")?;
        let link = self.link()?;

        link.write_all(&frame)
            .and_then(|_| link.flush())
            .context("Failed to write to device")?;

        let mut frame = read_frame(link).map_err(|e| match e.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => {
                anyhow!("Timeout waiting for response")
            }
            _ => anyhow::Error::new(e).context("Failed to read from device"),
        })?;

        decode_frame(&mut frame).map_err(|e| {
            anyhow!(
                "Failed to deserialize response: {} (raw {} bytes: {:02x?})",
                e,
                frame.len(),
                &frame[..frame.len().min(32)]
            )
        })
    }

    /// Like [`send_recv`](Self::send_recv), but a device fault becomes an error.
    fn request(&mut self, req: &Request) -> Result<Response> {
        match self.send_recv(req)? {
            Response::Fault(messages) if messages.is_empty() => {
                bail!("Device reported an unspecified fault")
            }
            Response::Fault(messages) => Err(fault_from_messages(messages)),
            response => Ok(response),
        }
    }

    /// Expect a plain acknowledgement. Any status but `Ok` is a refusal.
    fn ack(&mut self, req: &Request) -> Result<bool> {
        match self.request(req)? {
            Response::Ack(AckStatus::Ok) => Ok(true),
            Response::Ack(status) => {
                tracing::warn!(?status, "device refused request");
                Ok(false)
            }
            other => bail!("Unexpected response: {:?}", other),
        }
    }

    fn entries(&mut self, req: &Request) -> Result<Vec<FileEntry>> {
        match self.request(req)? {
            Response::Entries(entries) => Ok(entries),
            Response::Ack(status) => bail!("Search failed: {:?}", status),
            other => bail!("Unexpected response: {:?}", other),
        }
    }
}

fn open(endpoint: &Endpoint, timeout: Duration) -> Result<Box<dyn Link>> {
    tracing::debug!(%endpoint, "opening link");

    match endpoint {
        Endpoint::Usb { port } => {
            let serial = serialport::new(port, BAUD_RATE)
                .timeout(timeout)
                .open()
                .with_context(|| format!("Failed to open serial port {}", port))?;
            Ok(Box::new(serial))
        }
        Endpoint::Lan { addr } => {
            let candidates = addr
                .to_socket_addrs()
                .with_context(|| format!("Failed to resolve {}", addr))?;

            let mut last_err = None;
            for candidate in candidates {
                match TcpStream::connect_timeout(&candidate, timeout) {
                    Ok(stream) => {
                        stream.set_read_timeout(Some(timeout))?;
                        stream.set_write_timeout(Some(timeout))?;
                        stream.set_nodelay(true)?;
                        return Ok(Box::new(stream));
                    }
                    Err(e) => last_err = Some(e),
                }
            }

            match last_err {
                Some(e) => Err(anyhow::Error::new(e).context(format!("Failed to connect to {}", addr))),
                None => bail!("No address found for {}", addr),
            }
        }
    }
}

fn progress_bar(len: u64) -> Result<ProgressBar> {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})",
            )?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

fn device_time(ts: NaiveDateTime) -> Result<DeviceTime> {
    Ok(DeviceTime {
        year: u16::try_from(ts.year()).with_context(|| format!("Year {} out of range", ts.year()))?,
        month: ts.month() as u8,
        day: ts.day() as u8,
        hour: ts.hour() as u8,
        minute: ts.minute() as u8,
        second: ts.second() as u8,
    })
}

impl DeviceClient for Transport {
    fn push_file(&mut self, source: &Path, destination: &str, overwrite: bool) -> Result<bool> {
        let data =
            fs::read(source).with_context(|| format!("Failed to read {}", source.display()))?;
        let size = data.len() as u64;
        let crc32 = CRC32.checksum(&data);
        tracing::info!(
            source = %source.display(),
            destination,
            size,
            crc32 = format_args!("0x{:08x}", crc32),
            "pushing file"
        );

        let begin = Request::PushBegin {
            path: destination.to_string(),
            size,
            crc32,
            overwrite,
        };
        if !self.ack(&begin)? {
            return Ok(false);
        }

        let pb = progress_bar(size)?;
        let mut offset = 0u64;
        for chunk in data.chunks(MAX_DATA_BLOCK_SIZE) {
            let block = Request::DataBlock {
                offset,
                data: chunk.to_vec(),
            };
            match self.ack(&block) {
                Ok(true) => {}
                Ok(false) => {
                    pb.abandon();
                    return Ok(false);
                }
                Err(e) => {
                    pb.abandon();
                    return Err(e.context(format!("Push failed at offset {}", offset)));
                }
            }
            offset += chunk.len() as u64;
            pb.set_position(offset);
        }
        pb.finish_and_clear();

        self.ack(&Request::PushFinish)
    }

    fn pull_file(&mut self, source: &str, destination: &Path, overwrite: bool) -> Result<bool> {
        if !overwrite && destination.exists() {
            tracing::warn!(destination = %destination.display(), "destination exists, not overwriting");
            return Ok(false);
        }

        let begin = Request::PullBegin {
            path: source.to_string(),
        };
        let (size, crc32) = match self.request(&begin)? {
            Response::FileInfo { size, crc32 } => (size, crc32),
            Response::Ack(status) => {
                tracing::warn!(?status, source, "device refused pull");
                return Ok(false);
            }
            other => bail!("Unexpected response: {:?}", other),
        };
        tracing::info!(source, size, crc32 = format_args!("0x{:08x}", crc32), "pulling file");

        let mut data = Vec::with_capacity(size.min(16 * 1024 * 1024) as usize);
        let pb = progress_bar(size)?;
        while (data.len() as u64) < size {
            let offset = data.len() as u64;
            let len = (size - offset).min(MAX_DATA_BLOCK_SIZE as u64) as u32;

            match self.request(&Request::PullBlock { offset, len }) {
                Ok(Response::Data(block)) if !block.is_empty() && block.len() <= len as usize => {
                    data.extend_from_slice(&block);
                }
                Ok(Response::Data(block)) => {
                    pb.abandon();
                    bail!(
                        "Device sent {} bytes at offset {} (asked for {})",
                        block.len(),
                        offset,
                        len
                    );
                }
                Ok(Response::Ack(status)) => {
                    pb.abandon();
                    tracing::warn!(?status, offset, "device stopped pull");
                    return Ok(false);
                }
                Ok(other) => {
                    pb.abandon();
                    bail!("Unexpected response at offset {}: {:?}", offset, other);
                }
                Err(e) => {
                    pb.abandon();
                    return Err(e.context(format!("Pull failed at offset {}", offset)));
                }
            }
            pb.set_position(data.len() as u64);
        }
        pb.finish_and_clear();

        let actual = CRC32.checksum(&data);
        if actual != crc32 {
            bail!(
                "CRC verification failed for {}: expected 0x{:08x}, got 0x{:08x}",
                source,
                crc32,
                actual
            );
        }

        fs::write(destination, &data)
            .with_context(|| format!("Failed to write {}", destination.display()))?;
        Ok(true)
    }

    fn start_process(&mut self, cmd: &str, parms: Option<&str>) -> Result<bool> {
        self.ack(&Request::StartProcess {
            cmd: cmd.to_string(),
            parms: parms.map(str::to_string),
        })
    }

    fn find_directories(&mut self, directory: &str, mask: &str) -> Result<Vec<FileEntry>> {
        self.entries(&Request::FindDirectories {
            directory: directory.to_string(),
            mask: mask.to_string(),
        })
    }

    fn find_files(&mut self, directory: &str, mask: &str) -> Result<Vec<FileEntry>> {
        self.entries(&Request::FindFiles {
            directory: directory.to_string(),
            mask: mask.to_string(),
        })
    }

    fn create_directory(&mut self, directory: &str) -> Result<bool> {
        self.ack(&Request::CreateDirectory {
            path: directory.to_string(),
        })
    }

    fn set_file_date_time(&mut self, path: &str, timestamp: NaiveDateTime) -> Result<bool> {
        self.ack(&Request::SetFileDateTime {
            path: path.to_string(),
            timestamp: device_time(timestamp)?,
        })
    }

    fn delete_file(&mut self, path: &str) -> Result<bool> {
        self.ack(&Request::DeleteFile {
            path: path.to_string(),
        })
    }
}
