// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Dispatcher tests against a call-recording device client.

use std::path::Path;

use anyhow::Result;
use chrono::{Local, NaiveDate, NaiveDateTime};

use device_sync::error::fault_from_messages;
use device_sync::{dispatch, parse, run, DeviceClient, FileEntry, Outcome};

#[derive(Default)]
enum Reply {
    #[default]
    Accept,
    Refuse,
    Fault(Vec<&'static str>),
}

#[derive(Default)]
struct StubClient {
    reply: Reply,
    dirs: Vec<FileEntry>,
    files: Vec<FileEntry>,
    files_fault: Option<Vec<&'static str>>,
    calls: Vec<String>,
    timestamps: Vec<NaiveDateTime>,
}

impl StubClient {
    fn replying(reply: Reply) -> Self {
        Self {
            reply,
            ..Default::default()
        }
    }

    fn verdict(&mut self, call: String) -> Result<bool> {
        self.calls.push(call);
        match &self.reply {
            Reply::Accept => Ok(true),
            Reply::Refuse => Ok(false),
            Reply::Fault(messages) => Err(fault_from_messages(messages.clone())),
        }
    }
}

impl DeviceClient for StubClient {
    fn push_file(&mut self, source: &Path, destination: &str, overwrite: bool) -> Result<bool> {
        self.verdict(format!("push {} {} {}", source.display(), destination, overwrite))
    }

    fn pull_file(&mut self, source: &str, destination: &Path, overwrite: bool) -> Result<bool> {
        self.verdict(format!("pull {} {} {}", source, destination.display(), overwrite))
    }

    fn start_process(&mut self, cmd: &str, parms: Option<&str>) -> Result<bool> {
        self.verdict(format!("start {} {:?}", cmd, parms))
    }

    fn find_directories(&mut self, directory: &str, mask: &str) -> Result<Vec<FileEntry>> {
        self.calls.push(format!("dirs {} {}", directory, mask));
        match &self.reply {
            Reply::Fault(messages) => Err(fault_from_messages(messages.clone())),
            _ => Ok(self.dirs.clone()),
        }
    }

    fn find_files(&mut self, directory: &str, mask: &str) -> Result<Vec<FileEntry>> {
        self.calls.push(format!("files {} {}", directory, mask));
        match &self.files_fault {
            Some(messages) => Err(fault_from_messages(messages.clone())),
            None => Ok(self.files.clone()),
        }
    }

    fn create_directory(&mut self, directory: &str) -> Result<bool> {
        self.verdict(format!("mkdir {}", directory))
    }

    fn set_file_date_time(&mut self, path: &str, timestamp: NaiveDateTime) -> Result<bool> {
        self.timestamps.push(timestamp);
        self.verdict(format!("touch {}", path))
    }

    fn delete_file(&mut self, path: &str) -> Result<bool> {
        self.verdict(format!("delete {}", path))
    }
}

fn run_with(stub: &mut StubClient, argv: &[&str]) -> (Outcome, String) {
    let cli = parse(std::iter::once("device-sync").chain(argv.iter().copied()))
        .expect("test command line should parse");
    let mut out = Vec::new();
    let outcome = dispatch(cli.verb, stub, &mut out);
    (outcome, String::from_utf8(out).unwrap())
}

fn last_line(output: &str) -> &str {
    output.lines().last().unwrap_or_default()
}

const VALID_COMMANDS: [(&[&str], &str); 7] = [
    (&["push", "source.txt", "/Temp/dest.txt"], "push complete."),
    (&["pull", "/Temp/source.txt", "dest.txt"], "pull complete."),
    (&["start", "/Windows/ctlpnl.exe"], "start process complete."),
    (&["find", "/Windows", "*.txt"], "find complete."),
    (&["mkdir", "/Temp"], "directory created."),
    (&["touch", "/Temp/file.txt", "--timestamp", "2018-12-25"], "touch complete."),
    (&["delete", "/Temp/file.txt"], "file deleted"),
];

// =============================================================================
// Success paths
// =============================================================================

#[test]
fn test_every_verb_succeeds_with_completion_message() {
    for (argv, done) in VALID_COMMANDS {
        let mut stub = StubClient::default();
        let (outcome, output) = run_with(&mut stub, argv);
        assert_eq!(outcome, Outcome::Success, "{:?}", argv);
        assert_eq!(last_line(&output), done, "{:?}", argv);
        assert!(!stub.calls.is_empty(), "{:?} made no device call", argv);
    }
}

#[test]
fn test_push_echoes_request_then_completes() {
    let mut stub = StubClient::default();
    let (outcome, output) = run_with(&mut stub, &["push", "source.txt", "/Temp/dest.txt"]);

    assert_eq!(outcome, Outcome::Success);
    assert_eq!(
        output,
        "PushFile(source.txt, /Temp/dest.txt, true)\npush complete.\n"
    );
    assert_eq!(stub.calls, ["push source.txt /Temp/dest.txt true"]);
}

#[test]
fn test_push_no_overwrite_is_passed_through() {
    let mut stub = StubClient::default();
    let (_, output) = run_with(
        &mut stub,
        &["push", "source.txt", "/Temp/dest.txt", "--no-overwrite"],
    );
    assert!(output.starts_with("PushFile(source.txt, /Temp/dest.txt, false)"));
    assert_eq!(stub.calls, ["push source.txt /Temp/dest.txt false"]);
}

#[test]
fn test_pull_without_destination_uses_source_file_name() {
    let mut stub = StubClient::default();
    let (outcome, output) = run_with(&mut stub, &["pull", "/Temp/source.txt"]);
    assert_eq!(outcome, Outcome::Success);
    assert!(output.starts_with("PullFile(/Temp/source.txt, source.txt, true)"));
    assert_eq!(stub.calls, ["pull /Temp/source.txt source.txt true"]);
}

#[test]
fn test_start_joins_parameters() {
    let mut stub = StubClient::default();
    let (_, output) = run_with(
        &mut stub,
        &["start", "/Windows/ctlpnl.exe", "/Windows/Audio.cpl", "-q"],
    );
    assert!(output.starts_with("StartProcess(/Windows/ctlpnl.exe, /Windows/Audio.cpl -q)"));
    assert_eq!(
        stub.calls,
        ["start /Windows/ctlpnl.exe Some(\"/Windows/Audio.cpl -q\")"]
    );
}

#[test]
fn test_start_without_parameters() {
    let mut stub = StubClient::default();
    run_with(&mut stub, &["start", "/Windows/ctlpnl.exe"]);
    assert_eq!(stub.calls, ["start /Windows/ctlpnl.exe None"]);
}

#[test]
fn test_find_lists_directories_then_files() {
    let mut stub = StubClient {
        dirs: vec![FileEntry::directory("Fonts"), FileEntry::directory("Help")],
        files: vec![
            FileEntry::file("a.txt"),
            FileEntry::file("b.txt"),
            FileEntry::file("c.txt"),
        ],
        ..Default::default()
    };
    let (outcome, output) = run_with(&mut stub, &["find", "/Windows", "*.txt"]);

    assert_eq!(outcome, Outcome::Success);
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(
        lines,
        [
            "FindDirectories(/Windows, *.txt)",
            "d Fonts",
            "d Help",
            "f a.txt",
            "f b.txt",
            "f c.txt",
            "find complete.",
        ]
    );
    assert_eq!(stub.calls, ["dirs /Windows *.txt", "files /Windows *.txt"]);
}

#[test]
fn test_touch_with_timestamp_uses_it() {
    let mut stub = StubClient::default();
    let (_, output) = run_with(
        &mut stub,
        &["touch", "/Temp/file.txt", "--timestamp", "2018-12-25"],
    );

    let expected = NaiveDate::from_ymd_opt(2018, 12, 25)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    assert_eq!(stub.timestamps, [expected]);
    assert!(!output.contains("using current date and time!"));
    assert!(output.contains("SetFileDateTime(/Temp/file.txt, 2018-12-25T00:00:00)"));
}

#[test]
fn test_touch_without_timestamp_uses_dispatch_time() {
    let mut stub = StubClient::default();
    let cli = parse(["device-sync", "touch", "/Temp/file.txt"]).unwrap();

    let before = Local::now().naive_local();
    let mut out = Vec::new();
    let outcome = dispatch(cli.verb, &mut stub, &mut out);
    let after = Local::now().naive_local();

    assert_eq!(outcome, Outcome::Success);
    assert_eq!(stub.timestamps.len(), 1);
    let used = stub.timestamps[0];
    assert!(used >= before, "{} < {}", used, before);
    assert!(used <= after, "{} > {}", used, after);

    let output = String::from_utf8(out).unwrap();
    assert_eq!(output.lines().next(), Some("using current date and time!"));
}

#[test]
fn test_repeated_invocation_is_identical() {
    let argv = ["mkdir", "/Temp"];
    let mut stub = StubClient::default();
    let first = run_with(&mut stub, &argv);
    let second = run_with(&mut stub, &argv);
    assert_eq!(first, second);
    assert_eq!(stub.calls, ["mkdir /Temp", "mkdir /Temp"]);
}

// =============================================================================
// Failure signal
// =============================================================================

#[test]
fn test_refusal_prints_generic_error() {
    for (argv, _) in VALID_COMMANDS {
        if argv[0] == "find" {
            continue;
        }
        let mut stub = StubClient::replying(Reply::Refuse);
        let (outcome, output) = run_with(&mut stub, argv);
        assert_eq!(outcome, Outcome::Failure, "{:?}", argv);
        assert_eq!(last_line(&output), "An error occurred.", "{:?}", argv);
        assert_eq!(stub.calls.len(), 1, "{:?} should call the device once", argv);
    }
}

// =============================================================================
// Faults
// =============================================================================

#[test]
fn test_fault_prints_every_cause_deepest_last() {
    let mut stub = StubClient::replying(Reply::Fault(vec!["disk full", "connection reset"]));
    let (outcome, output) = run_with(&mut stub, &["push", "source.txt", "/Temp/dest.txt"]);

    assert_eq!(outcome, Outcome::Failure);
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(
        lines,
        [
            "PushFile(source.txt, /Temp/dest.txt, true)",
            "disk full",
            "connection reset",
        ]
    );
}

#[test]
fn test_fault_skips_empty_messages() {
    let mut stub = StubClient::replying(Reply::Fault(vec!["outer", "", "root"]));
    let (outcome, output) = run_with(&mut stub, &["delete", "/Temp/file.txt"]);
    assert_eq!(outcome, Outcome::Failure);
    assert_eq!(output, "DeleteFile(/Temp/file.txt)\nouter\nroot\n");
}

#[test]
fn test_find_fault_keeps_partial_listing() {
    let mut stub = StubClient {
        dirs: vec![FileEntry::directory("Fonts")],
        files_fault: Some(vec!["connection reset"]),
        ..Default::default()
    };
    let (outcome, output) = run_with(&mut stub, &["find", "/Windows", "*.txt"]);

    assert_eq!(outcome, Outcome::Failure);
    assert_eq!(
        output,
        "FindDirectories(/Windows, *.txt)\nd Fonts\nconnection reset\n"
    );
}

#[test]
fn test_find_fault_on_directories_skips_files() {
    let mut stub = StubClient::replying(Reply::Fault(vec!["path not found"]));
    let (outcome, output) = run_with(&mut stub, &["find", "/Nowhere", "*"]);
    assert_eq!(outcome, Outcome::Failure);
    assert_eq!(last_line(&output), "path not found");
    assert_eq!(stub.calls, ["dirs /Nowhere *"]);
}

#[test]
fn test_pull_of_directory_source_faults_before_device_call() {
    let mut stub = StubClient::default();
    let (outcome, output) = run_with(&mut stub, &["pull", "/Temp/"]);
    assert_eq!(outcome, Outcome::Failure);
    assert!(output.contains("Cannot derive a local file name"));
    assert!(stub.calls.is_empty());
}

// =============================================================================
// Parse failures never reach the device
// =============================================================================

#[test]
fn test_missing_required_field_makes_no_device_call() {
    let incomplete: [&[&str]; 8] = [
        &["push"],
        &["push", "source.txt"],
        &["pull"],
        &["start"],
        &["find", "/Windows"],
        &["mkdir"],
        &["touch", "--timestamp", "2018-12-25"],
        &["delete", "--ip", "10.0.0.2"],
    ];

    for argv in incomplete {
        let mut connected = false;
        let mut out = Vec::new();
        let outcome = run(
            std::iter::once("device-sync").chain(argv.iter().copied()),
            |_| {
                connected = true;
                StubClient::default()
            },
            &mut out,
        );
        assert_eq!(outcome, Outcome::Failure, "{:?}", argv);
        assert_eq!(outcome.code(), 1);
        assert!(!connected, "{:?} reached the device client", argv);
        assert!(out.is_empty(), "{:?} printed a request echo", argv);
    }
}

#[test]
fn test_run_dispatches_parsed_request() {
    let mut out = Vec::new();
    let mut endpoint_ip = None;
    let outcome = run(
        ["device-sync", "mkdir", "/Temp", "--ip", "10.0.0.2"],
        |cli| {
            endpoint_ip = cli.verb.ip().map(str::to_string);
            StubClient::default()
        },
        &mut out,
    );
    assert_eq!(outcome, Outcome::Success);
    assert_eq!(endpoint_ip.as_deref(), Some("10.0.0.2"));
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "CreateDirectory(/Temp)\ndirectory created.\n"
    );
}
