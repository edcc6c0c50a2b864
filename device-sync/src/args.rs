// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Per-verb argument sets.
//!
//! Each verb owns one `clap::Args` struct. Paths on the device are kept as
//! plain strings since their separator convention belongs to the device;
//! local paths use `PathBuf`.

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use clap::Args;

use crate::APP_NAME;

/// Format used when a timestamp is echoed or rendered back into arguments.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// An illustrative invocation shown in a verb's help text.
#[derive(Debug, Clone)]
pub struct Example<T> {
    pub description: &'static str,
    pub args: T,
}

/// Behaviour shared by every verb's argument set.
pub trait VerbArgs: Sized {
    /// Subcommand name on the command line.
    const NAME: &'static str;

    /// IP address override, if the verb should go over LAN.
    fn ip(&self) -> Option<&str>;

    /// Rebuild the command-line tokens (after the verb) that parse back into `self`.
    fn to_args(&self) -> Vec<String>;

    fn examples() -> Vec<Example<Self>>;

    /// Render the examples as a help section.
    fn render_examples() -> String {
        let mut text = String::from("Examples:");
        for example in Self::examples() {
            let tokens: Vec<String> = example.args.to_args().iter().map(|t| quote(t)).collect();
            text.push_str(&format!(
                "\n  {}:\n    {} {} {}",
                example.description,
                APP_NAME,
                Self::NAME,
                tokens.join(" ")
            ));
        }
        text
    }
}

fn quote(token: &str) -> String {
    if token.is_empty() || token.contains(|c: char| c.is_whitespace() || c == '*' || c == '?') {
        format!("\"{}\"", token)
    } else {
        token.to_string()
    }
}

fn push_ip(tokens: &mut Vec<String>, ip: &Option<String>) {
    if let Some(ip) = ip {
        tokens.push("--ip".into());
        tokens.push(ip.clone());
    }
}

/// Parse a `--timestamp` value given in local time.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM:SS` and `YYYY-MM-DD HH:MM:SS`.
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime, String> {
    let value = value.trim();
    for format in [TIMESTAMP_FORMAT, "%Y-%m-%d %H:%M:%S"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(ts);
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| {
            format!(
                "invalid timestamp '{}' (expected YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS)",
                value
            )
        })
}

// --- push ---

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct PushArgs {
    /// IP address of device
    #[arg(long)]
    pub ip: Option<String>,

    /// Local file to push to the device
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    /// Destination path on the device
    #[arg(value_name = "DESTINATION")]
    pub destination: String,

    /// Fail instead of replacing an existing file on the device
    #[arg(long)]
    pub no_overwrite: bool,
}

impl VerbArgs for PushArgs {
    const NAME: &'static str = "push";

    fn ip(&self) -> Option<&str> {
        self.ip.as_deref()
    }

    fn to_args(&self) -> Vec<String> {
        let mut tokens = vec![
            self.source.display().to_string(),
            self.destination.clone(),
        ];
        if self.no_overwrite {
            tokens.push("--no-overwrite".into());
        }
        push_ip(&mut tokens, &self.ip);
        tokens
    }

    fn examples() -> Vec<Example<Self>> {
        vec![
            Example {
                description: "Push file in current directory over USB",
                args: PushArgs {
                    ip: None,
                    source: PathBuf::from("source.txt"),
                    destination: "/Temp/dest.txt".into(),
                    no_overwrite: false,
                },
            },
            Example {
                description: "Push file over LAN without replacing an existing one",
                args: PushArgs {
                    ip: Some("192.168.1.20".into()),
                    source: PathBuf::from("source.txt"),
                    destination: "/Temp/dest.txt".into(),
                    no_overwrite: true,
                },
            },
        ]
    }
}

// --- pull ---

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct PullArgs {
    /// IP address of device
    #[arg(long)]
    pub ip: Option<String>,

    /// File on the device to pull
    #[arg(value_name = "SOURCE")]
    pub source: String,

    /// Local destination. Default is the source's file name in the current directory
    #[arg(value_name = "DESTINATION")]
    pub destination: Option<PathBuf>,

    /// Fail instead of replacing an existing local file
    #[arg(long)]
    pub no_overwrite: bool,
}

impl VerbArgs for PullArgs {
    const NAME: &'static str = "pull";

    fn ip(&self) -> Option<&str> {
        self.ip.as_deref()
    }

    fn to_args(&self) -> Vec<String> {
        let mut tokens = vec![self.source.clone()];
        if let Some(destination) = &self.destination {
            tokens.push(destination.display().to_string());
        }
        if self.no_overwrite {
            tokens.push("--no-overwrite".into());
        }
        push_ip(&mut tokens, &self.ip);
        tokens
    }

    fn examples() -> Vec<Example<Self>> {
        vec![Example {
            description: "Pull file over USB",
            args: PullArgs {
                ip: None,
                source: "/Temp/source.txt".into(),
                destination: Some(PathBuf::from("c:\\temp\\dest.txt")),
                no_overwrite: false,
            },
        }]
    }
}

// --- start ---

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct StartArgs {
    /// IP address of device
    #[arg(long)]
    pub ip: Option<String>,

    /// Path to the program to execute on the device
    #[arg(value_name = "CMD")]
    pub cmd: String,

    /// Parameters passed to the program, joined with single spaces
    #[arg(value_name = "PARMS", trailing_var_arg = true, allow_hyphen_values = true)]
    pub parms: Vec<String>,
}

impl StartArgs {
    /// The parameter string handed to the device, if any parameters were given.
    pub fn joined_parms(&self) -> Option<String> {
        if self.parms.is_empty() {
            None
        } else {
            Some(self.parms.join(" "))
        }
    }
}

impl VerbArgs for StartArgs {
    const NAME: &'static str = "start";

    fn ip(&self) -> Option<&str> {
        self.ip.as_deref()
    }

    fn to_args(&self) -> Vec<String> {
        // Options first: everything after CMD is swallowed as a parameter
        let mut tokens = Vec::new();
        push_ip(&mut tokens, &self.ip);
        tokens.push(self.cmd.clone());
        tokens.extend(self.parms.iter().cloned());
        tokens
    }

    fn examples() -> Vec<Example<Self>> {
        vec![Example {
            description: "Start Audio Control Panel",
            args: StartArgs {
                ip: None,
                cmd: "/Windows/ctlpnl.exe".into(),
                parms: vec!["/Windows/Audio.cpl".into()],
            },
        }]
    }
}

// --- find ---

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct FindArgs {
    /// IP address of device
    #[arg(long)]
    pub ip: Option<String>,

    /// Directory on the device to search inside
    #[arg(value_name = "DIRECTORY")]
    pub directory: String,

    /// Name or pattern to search for
    #[arg(value_name = "MASK")]
    pub mask: String,
}

impl VerbArgs for FindArgs {
    const NAME: &'static str = "find";

    fn ip(&self) -> Option<&str> {
        self.ip.as_deref()
    }

    fn to_args(&self) -> Vec<String> {
        let mut tokens = vec![self.directory.clone(), self.mask.clone()];
        push_ip(&mut tokens, &self.ip);
        tokens
    }

    fn examples() -> Vec<Example<Self>> {
        vec![Example {
            description: "Find all text files in \\Windows",
            args: FindArgs {
                ip: None,
                directory: "/Windows/".into(),
                mask: "*.txt".into(),
            },
        }]
    }
}

// --- mkdir ---

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct MkdirArgs {
    /// IP address of device
    #[arg(long)]
    pub ip: Option<String>,

    /// Path of the directory to create on the device
    #[arg(value_name = "DIRECTORY")]
    pub directory: String,
}

impl VerbArgs for MkdirArgs {
    const NAME: &'static str = "mkdir";

    fn ip(&self) -> Option<&str> {
        self.ip.as_deref()
    }

    fn to_args(&self) -> Vec<String> {
        let mut tokens = vec![self.directory.clone()];
        push_ip(&mut tokens, &self.ip);
        tokens
    }

    fn examples() -> Vec<Example<Self>> {
        vec![Example {
            description: "Make a \\Temp directory",
            args: MkdirArgs {
                ip: None,
                directory: "/Temp".into(),
            },
        }]
    }
}

// --- touch ---

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct TouchArgs {
    /// IP address of device
    #[arg(long)]
    pub ip: Option<String>,

    /// Timestamp to set on the file (local time). Default is the current time
    #[arg(long, value_parser = parse_timestamp)]
    pub timestamp: Option<NaiveDateTime>,

    /// Path to the file on the device
    #[arg(value_name = "FILE")]
    pub directory: String,
}

impl VerbArgs for TouchArgs {
    const NAME: &'static str = "touch";

    fn ip(&self) -> Option<&str> {
        self.ip.as_deref()
    }

    fn to_args(&self) -> Vec<String> {
        let mut tokens = vec![self.directory.clone()];
        if let Some(ts) = &self.timestamp {
            tokens.push("--timestamp".into());
            tokens.push(ts.format(TIMESTAMP_FORMAT).to_string());
        }
        push_ip(&mut tokens, &self.ip);
        tokens
    }

    fn examples() -> Vec<Example<Self>> {
        vec![
            Example {
                description: "Touch file, using current date and time",
                args: TouchArgs {
                    ip: None,
                    timestamp: None,
                    directory: "/Temp/file.txt".into(),
                },
            },
            Example {
                description: "Touch file, using a specific date and time",
                args: TouchArgs {
                    ip: None,
                    timestamp: NaiveDate::from_ymd_opt(2018, 12, 25)
                        .and_then(|d| d.and_hms_opt(0, 0, 0)),
                    directory: "/Temp/file.txt".into(),
                },
            },
        ]
    }
}

// --- delete ---

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct DeleteArgs {
    /// IP address of device
    #[arg(long)]
    pub ip: Option<String>,

    /// Path to the file on the device
    #[arg(value_name = "FILE")]
    pub directory: String,
}

impl VerbArgs for DeleteArgs {
    const NAME: &'static str = "delete";

    fn ip(&self) -> Option<&str> {
        self.ip.as_deref()
    }

    fn to_args(&self) -> Vec<String> {
        let mut tokens = vec![self.directory.clone()];
        push_ip(&mut tokens, &self.ip);
        tokens
    }

    fn examples() -> Vec<Example<Self>> {
        vec![Example {
            description: "Delete a file over LAN",
            args: DeleteArgs {
                ip: Some("192.168.1.20".into()),
                directory: "/Temp/file.txt".into(),
            },
        }]
    }
}
