// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Push, pull and manage files on a device over USB or LAN.
//!
//! Usage:
//!   device-sync --port /dev/ttyACM0 push source.txt /Temp/dest.txt
//!   device-sync pull /Temp/source.txt --ip 192.168.1.20
//!   device-sync find /Windows "*.txt"
//!   device-sync touch /Temp/file.txt --timestamp 2018-12-25

use std::io;
use std::process::ExitCode;

use device_sync::transport::Transport;
use device_sync::{logging, run};

fn main() -> ExitCode {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    run(
        std::env::args_os(),
        |cli| {
            logging::init(cli.verbose);
            Transport::for_cli(cli)
        },
        &mut out,
    )
    .into()
}
