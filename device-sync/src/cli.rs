// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Command-line interface definitions.

use std::ffi::OsString;
use std::io::Write;

use clap::{ArgAction, CommandFactory, FromArgMatches, Parser, Subcommand};

use crate::args::{
    DeleteArgs, FindArgs, MkdirArgs, PullArgs, PushArgs, StartArgs, TouchArgs, VerbArgs,
};
use crate::client::DeviceClient;
use crate::dispatch::{dispatch, Outcome};
use crate::error::ParseError;
use crate::transport::DEFAULT_TIMEOUT_MS;
use crate::APP_NAME;

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = APP_NAME, version)]
#[command(about = "Transfer files and run processes on a device over USB or LAN")]
pub struct Cli {
    /// Serial port of a USB-attached device (e.g., /dev/ttyACM0)
    #[arg(short, long, global = true, env = "DEVICE_SYNC_PORT")]
    pub port: Option<String>,

    /// Response timeout in milliseconds
    #[arg(long, global = true, value_name = "MS", default_value_t = DEFAULT_TIMEOUT_MS)]
    pub timeout: u64,

    /// Log to stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub verb: Verb,
}

/// One device operation per invocation.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Verb {
    /// Push files to a device
    Push(PushArgs),

    /// Pull files from a device
    Pull(PullArgs),

    /// Start a process on the device
    Start(StartArgs),

    /// Search a directory on the device for directories and files whose names satisfy the mask
    Find(FindArgs),

    /// Create a new directory on the device
    Mkdir(MkdirArgs),

    /// Set the last modified time of a file on the device
    Touch(TouchArgs),

    /// Delete a file from the device
    Delete(DeleteArgs),
}

impl Verb {
    pub fn name(&self) -> &'static str {
        match self {
            Verb::Push(_) => PushArgs::NAME,
            Verb::Pull(_) => PullArgs::NAME,
            Verb::Start(_) => StartArgs::NAME,
            Verb::Find(_) => FindArgs::NAME,
            Verb::Mkdir(_) => MkdirArgs::NAME,
            Verb::Touch(_) => TouchArgs::NAME,
            Verb::Delete(_) => DeleteArgs::NAME,
        }
    }

    /// IP address override given with `--ip`.
    pub fn ip(&self) -> Option<&str> {
        match self {
            Verb::Push(a) => a.ip(),
            Verb::Pull(a) => a.ip(),
            Verb::Start(a) => a.ip(),
            Verb::Find(a) => a.ip(),
            Verb::Mkdir(a) => a.ip(),
            Verb::Touch(a) => a.ip(),
            Verb::Delete(a) => a.ip(),
        }
    }
}

/// The full clap command, with usage examples attached to every verb.
pub fn command() -> clap::Command {
    Cli::command()
        .mut_subcommand(PushArgs::NAME, |c| c.after_help(PushArgs::render_examples()))
        .mut_subcommand(PullArgs::NAME, |c| c.after_help(PullArgs::render_examples()))
        .mut_subcommand(StartArgs::NAME, |c| c.after_help(StartArgs::render_examples()))
        .mut_subcommand(FindArgs::NAME, |c| c.after_help(FindArgs::render_examples()))
        .mut_subcommand(MkdirArgs::NAME, |c| c.after_help(MkdirArgs::render_examples()))
        .mut_subcommand(TouchArgs::NAME, |c| c.after_help(TouchArgs::render_examples()))
        .mut_subcommand(DeleteArgs::NAME, |c| c.after_help(DeleteArgs::render_examples()))
}

/// Parse a full argument list, program name included.
pub fn parse<I, T>(args: I) -> Result<Cli, ParseError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let mut cmd = command();
    let verbs: Vec<String> = cmd
        .get_subcommands()
        .map(|c| c.get_name().to_string())
        .collect();

    let matches = cmd
        .try_get_matches_from_mut(args)
        .map_err(|e| ParseError::new(e, verbs.clone()))?;
    Cli::from_arg_matches(&matches).map_err(|e| ParseError::new(e.format(&mut cmd), verbs))
}

/// Parse `args`, connect a client for the parsed request and run it.
///
/// No client is created when parsing fails.
pub fn run<I, T, C, F>(args: I, connect: F, out: &mut dyn Write) -> Outcome
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    C: DeviceClient,
    F: FnOnce(&Cli) -> C,
{
    let cli = match parse(args) {
        Ok(cli) => cli,
        Err(err) => {
            tracing::debug!(kind = ?err.kind(), "command line rejected");
            let _ = err.print();
            return Outcome::Failure;
        }
    };

    let mut client = connect(&cli);
    dispatch(cli.verb, &mut client, out)
}
