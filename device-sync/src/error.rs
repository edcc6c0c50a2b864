// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Parse errors and fault formatting.

use std::io;

use clap::error::ErrorKind;
use thiserror::Error;

/// Why the command line could not be turned into a verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    UnknownVerb,
    MissingArgument,
    InvalidValue,
    /// `--help`, `--version`, or no verb at all. Still a non-zero exit.
    HelpRequested,
}

impl ParseErrorKind {
    fn from_clap(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::InvalidSubcommand | ErrorKind::MissingSubcommand => Self::UnknownVerb,
            ErrorKind::MissingRequiredArgument => Self::MissingArgument,
            ErrorKind::DisplayHelp
            | ErrorKind::DisplayVersion
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => Self::HelpRequested,
            _ => Self::InvalidValue,
        }
    }
}

#[derive(Debug, Error)]
#[error("{source}")]
pub struct ParseError {
    kind: ParseErrorKind,
    valid_verbs: Vec<String>,
    #[source]
    source: clap::Error,
}

impl ParseError {
    pub(crate) fn new(source: clap::Error, valid_verbs: Vec<String>) -> Self {
        Self {
            kind: ParseErrorKind::from_clap(source.kind()),
            valid_verbs,
            source,
        }
    }

    pub fn kind(&self) -> ParseErrorKind {
        self.kind
    }

    /// Verb names accepted by the parser, in declaration order.
    pub fn valid_verbs(&self) -> &[String] {
        &self.valid_verbs
    }

    /// Print usage or the error the way clap would: help to stdout, errors to stderr.
    pub fn print(&self) -> io::Result<()> {
        self.source.print()?;
        if self.kind == ParseErrorKind::UnknownVerb {
            eprintln!();
            eprintln!("Valid verbs: {}", self.valid_verbs.join(", "));
        }
        Ok(())
    }
}

/// Every non-empty message in a fault's cause chain, outermost first.
pub fn fault_messages(fault: &anyhow::Error) -> Vec<String> {
    fault
        .chain()
        .map(|cause| cause.to_string())
        .filter(|msg| !msg.trim().is_empty())
        .collect()
}

/// Build a fault from cause messages ordered outermost first, root cause last.
pub fn fault_from_messages<I, S>(messages: I) -> anyhow::Error
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let messages: Vec<String> = messages.into_iter().map(Into::into).collect();
    let mut layers = messages.into_iter().rev();
    let root = layers.next().unwrap_or_default();
    layers.fold(anyhow::Error::msg(root), |err, msg| err.context(msg))
}
