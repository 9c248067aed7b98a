// BrickWired - Chiplet Demo Host Tooling
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn temp_path(prefix: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    dir.push("brickwired-tests");
    let _ = std::fs::create_dir_all(&dir);

    let nonce = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    dir.join(format!("{}-{}", prefix, nonce))
}

fn write_temp_script(prefix: &str, contents: &str) -> PathBuf {
    let path = temp_path(prefix).with_extension("yaml");
    std::fs::write(&path, contents).expect("Failed to write temp script");
    path
}

#[test]
fn test_cli_help() {
    let output = Command::new(env!("CARGO_BIN_EXE_brickwired"))
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("BrickWired Session Host"));
}

#[test]
fn test_map_lists_participants_and_ports() {
    let output = Command::new(env!("CARGO_BIN_EXE_brickwired"))
        .arg("map")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    for name in ["memory", "core", "host", "monitor", "uart", "exit"] {
        assert!(stdout.contains(name), "map output missing '{}'", name);
    }
    assert!(stdout.contains("0xcccc"));
}

#[test]
fn test_decode_names_the_uart_port() {
    let output = Command::new(env!("CARGO_BIN_EXE_brickwired"))
        .args(["decode", "0x00cccc00c0000000"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("monitor"));
    assert!(stdout.contains("uart"));
}

#[test]
fn test_replay_hello_session() {
    let out_dir = temp_path("hello-out");

    let output = Command::new(env!("CARGO_BIN_EXE_brickwired"))
        .args([
            "replay",
            "--script",
            fixture("hello-session.yaml").to_str().unwrap(),
            "--no-uart-stdout",
            "--output-dir",
            out_dir.to_str().unwrap(),
        ])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(0));

    let uart = std::fs::read(out_dir.join("uart.log")).unwrap();
    assert_eq!(uart, b"Hello World!\n");

    let result: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(out_dir.join("result.json")).unwrap())
            .unwrap();
    assert_eq!(result["status"], "pass");
    assert_eq!(result["stop_reason"], "exit");
    assert_eq!(result["exit_code"], 0);
    assert_eq!(result["uart_text"], "Hello World!\n");
}

#[test]
fn test_replay_stops_at_exit_port() {
    let script = write_temp_script(
        "early-exit",
        r#"
schema_version: "1.0"
memory:
  size: "4 KiB"
requests:
  - { op: write, addr: 0x00cccc00d0000000, data: [5, 0, 0, 0] }
  - { op: write, addr: 0x00cccc00c0000000, data: [0x58] }
assertions:
  - expected_exit_code: 5
  - expected_stop_reason: exit
"#,
    );
    let out_dir = temp_path("early-exit-out");

    let output = Command::new(env!("CARGO_BIN_EXE_brickwired"))
        .args([
            "replay",
            "--script",
            script.to_str().unwrap(),
            "--no-uart-stdout",
            "--output-dir",
            out_dir.to_str().unwrap(),
        ])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(0));

    // The UART write after the exit latch must not have been replayed.
    let result: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(out_dir.join("result.json")).unwrap())
            .unwrap();
    assert_eq!(result["requests_executed"], 1);
    assert_eq!(result["uart_bytes"], 0);
}

#[test]
fn test_replay_assertion_fail_exit_1() {
    let script = write_temp_script(
        "assert-fail",
        r#"
schema_version: "1.0"
requests:
  - { op: write, addr: 0x00cccc00c0000000, data: [0x41] }
assertions:
  - uart_contains: "this string will not be present"
"#,
    );

    let output = Command::new(env!("CARGO_BIN_EXE_brickwired"))
        .args([
            "replay",
            "--script",
            script.to_str().unwrap(),
            "--no-uart-stdout",
        ])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_replay_bad_schema_exit_2() {
    let script = write_temp_script(
        "bad-schema",
        r#"
schema_version: "9.9"
requests: []
"#,
    );
    let out_dir = temp_path("bad-schema-out");

    let output = Command::new(env!("CARGO_BIN_EXE_brickwired"))
        .args([
            "replay",
            "--script",
            script.to_str().unwrap(),
            "--output-dir",
            out_dir.to_str().unwrap(),
        ])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(2));

    let result: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(out_dir.join("result.json")).unwrap())
            .unwrap();
    assert_eq!(result["status"], "config_error");
    assert_eq!(result["stop_reason"], "config_error");
}

#[test]
fn test_replay_unsupported_address_exit_3() {
    // The core region never backs host-visible storage.
    let script = write_temp_script(
        "core-write",
        r#"
schema_version: "1.0"
requests:
  - { op: write, addr: 0x0000444400000000, data: [1] }
"#,
    );

    let output = Command::new(env!("CARGO_BIN_EXE_brickwired"))
        .args([
            "replay",
            "--script",
            script.to_str().unwrap(),
            "--no-uart-stdout",
        ])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn test_replay_expected_request_error_passes() {
    let script = write_temp_script(
        "expected-error",
        r#"
schema_version: "1.0"
requests:
  - { op: write, addr: 0x0000444400000000, data: [1] }
assertions:
  - expected_stop_reason: request_error
"#,
    );

    let output = Command::new(env!("CARGO_BIN_EXE_brickwired"))
        .args([
            "replay",
            "--script",
            script.to_str().unwrap(),
            "--no-uart-stdout",
        ])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn test_replay_memory_round_trip_with_program() {
    let program = temp_path("program").with_extension("bin");
    std::fs::write(&program, [0x13, 0x00, 0x00, 0x00]).unwrap();

    let script = write_temp_script(
        "program-read",
        r#"
schema_version: "1.0"
memory:
  size: "4 KiB"
requests:
  - { op: read, addr: 0x0000000000000000, len: 4 }
assertions:
  - expected_stop_reason: trace_end
"#,
    );

    let output = Command::new(env!("CARGO_BIN_EXE_brickwired"))
        .args([
            "replay",
            "--script",
            script.to_str().unwrap(),
            "--program",
            program.to_str().unwrap(),
            "--no-uart-stdout",
        ])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(0));
}
