// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Verb dispatch: one device call per invocation, rendered for the operator.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Result};
use chrono::{Local, NaiveDateTime};

use crate::args::{PullArgs, TouchArgs, TIMESTAMP_FORMAT};
use crate::cli::Verb;
use crate::client::DeviceClient;
use crate::error::fault_messages;

/// Printed whenever the device reports failure without a fault.
pub const GENERIC_FAILURE: &str = "An error occurred.";

/// Process exit status of a single invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

impl Outcome {
    pub fn code(self) -> i32 {
        match self {
            Outcome::Success => 0,
            Outcome::Failure => 1,
        }
    }
}

impl From<Outcome> for std::process::ExitCode {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Success => std::process::ExitCode::SUCCESS,
            Outcome::Failure => std::process::ExitCode::FAILURE,
        }
    }
}

/// Run `verb` against `client`, writing the operator-facing lines to `out`.
///
/// Faults are caught here: each message of the cause chain is printed on its
/// own line, root cause last.
pub fn dispatch(verb: Verb, client: &mut dyn DeviceClient, out: &mut dyn Write) -> Outcome {
    let name = verb.name();
    tracing::info!(verb = name, ip = verb.ip(), "dispatching");

    match execute(verb, client, out) {
        Ok(outcome) => {
            tracing::debug!(verb = name, ?outcome, "finished");
            outcome
        }
        Err(fault) => {
            tracing::debug!(verb = name, error = ?fault, "operation faulted");
            for line in fault_messages(&fault) {
                let _ = writeln!(out, "{}", line);
            }
            Outcome::Failure
        }
    }
}

fn execute(verb: Verb, client: &mut dyn DeviceClient, out: &mut dyn Write) -> Result<Outcome> {
    match verb {
        Verb::Push(args) => {
            let overwrite = !args.no_overwrite;
            writeln!(
                out,
                "PushFile({}, {}, {})",
                args.source.display(),
                args.destination,
                overwrite
            )?;
            let ok = client.push_file(&args.source, &args.destination, overwrite)?;
            report(out, ok, "push complete.")
        }
        Verb::Pull(args) => {
            let overwrite = !args.no_overwrite;
            let destination = pull_destination(&args)?;
            writeln!(
                out,
                "PullFile({}, {}, {})",
                args.source,
                destination.display(),
                overwrite
            )?;
            let ok = client.pull_file(&args.source, &destination, overwrite)?;
            report(out, ok, "pull complete.")
        }
        Verb::Start(args) => {
            let parms = args.joined_parms();
            writeln!(
                out,
                "StartProcess({}, {})",
                args.cmd,
                parms.as_deref().unwrap_or("")
            )?;
            let ok = client.start_process(&args.cmd, parms.as_deref())?;
            report(out, ok, "start process complete.")
        }
        Verb::Find(args) => {
            writeln!(out, "FindDirectories({}, {})", args.directory, args.mask)?;

            // Directory lines are written before the file search starts.
            for dir in client.find_directories(&args.directory, &args.mask)? {
                writeln!(out, "d {}", dir.name)?;
            }
            for file in client.find_files(&args.directory, &args.mask)? {
                writeln!(out, "f {}", file.name)?;
            }

            writeln!(out, "find complete.")?;
            Ok(Outcome::Success)
        }
        Verb::Mkdir(args) => {
            writeln!(out, "CreateDirectory({})", args.directory)?;
            let ok = client.create_directory(&args.directory)?;
            report(out, ok, "directory created.")
        }
        Verb::Touch(args) => {
            let timestamp = touch_timestamp(&args, out)?;
            writeln!(
                out,
                "SetFileDateTime({}, {})",
                args.directory,
                timestamp.format(TIMESTAMP_FORMAT)
            )?;
            let ok = client.set_file_date_time(&args.directory, timestamp)?;
            report(out, ok, "touch complete.")
        }
        Verb::Delete(args) => {
            writeln!(out, "DeleteFile({})", args.directory)?;
            let ok = client.delete_file(&args.directory)?;
            report(out, ok, "file deleted")
        }
    }
}

fn report(out: &mut dyn Write, ok: bool, done: &str) -> Result<Outcome> {
    if ok {
        writeln!(out, "{}", done)?;
        Ok(Outcome::Success)
    } else {
        writeln!(out, "{}", GENERIC_FAILURE)?;
        Ok(Outcome::Failure)
    }
}

/// Timestamp for `touch`: the one given, or the local time right now.
fn touch_timestamp(args: &TouchArgs, out: &mut dyn Write) -> Result<NaiveDateTime> {
    match args.timestamp {
        Some(ts) => Ok(ts),
        None => {
            writeln!(out, "using current date and time!")?;
            Ok(Local::now().naive_local())
        }
    }
}

/// Local path for `pull`: the one given, or the source's file name in the
/// current directory.
fn pull_destination(args: &PullArgs) -> Result<PathBuf> {
    if let Some(destination) = &args.destination {
        return Ok(destination.clone());
    }

    match args.source.rsplit(|c| c == '/' || c == '\\').next() {
        Some(name) if !name.is_empty() => Ok(PathBuf::from(name)),
        _ => bail!(
            "Cannot derive a local file name from '{}'; give a destination",
            args.source
        ),
    }
}
