// BrickWired - Chiplet Demo Host Tooling
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use tracing::{error, info};

use brickwired_config::{parse_size, RequestOp, SessionAssertion, SessionScript, StopReason};
use brickwired_host::HostBus;
use brickwired_memmap as memmap;
use brickwired_memmap::monitor::MonitorPort;

const EXIT_PASS: u8 = 0;
const EXIT_ASSERT_FAIL: u8 = 1;
const EXIT_CONFIG_ERROR: u8 = 2;
const EXIT_RUNTIME_ERROR: u8 = 3;

const RESULT_SCHEMA_VERSION: &str = "1.0";

fn parse_u64_addr(s: &str) -> Result<u64, String> {
    let trimmed = s.trim();
    if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        u64::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex address '{}': {}", s, e))
    } else {
        trimmed
            .parse()
            .map_err(|e| format!("Invalid address '{}': {}", s, e))
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "BrickWired Session Host", long_about = None)]
struct Cli {
    /// Enable verbose tracing
    #[arg(short, long, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the demo address map.
    Map,

    /// Decode a global address into its fields.
    Decode(DecodeArgs),

    /// Replay a recorded session trace against the host memory agent.
    Replay(ReplayArgs),
}

#[derive(Parser, Debug)]
struct DecodeArgs {
    /// Address to decode, decimal or 0x-prefixed hex
    #[arg(value_parser = parse_u64_addr)]
    addr: u64,
}

#[derive(Parser, Debug)]
struct ReplayArgs {
    /// Path to the session script (YAML)
    #[arg(short = 'c', long)]
    script: PathBuf,

    /// Flat program image loaded into main memory (overrides the script)
    #[arg(long)]
    program: Option<PathBuf>,

    /// Memory backing-store size, e.g. "32 KiB" (overrides the script)
    #[arg(long)]
    memory_size: Option<String>,

    /// Disable UART stdout echo (still captured for assertions/artifacts)
    #[arg(long)]
    no_uart_stdout: bool,

    /// Directory to write session artifacts (result.json, uart.log)
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ReplayResult {
    result_schema_version: String,
    status: String,
    requests_executed: u64,
    stop_reason: StopReason,
    uart_bytes: u64,
    uart_text: String,
    exit_code: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    assertions: Vec<AssertionResult>,
    script_hash: String,
    config: ReplayConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
struct AssertionResult {
    assertion: SessionAssertion,
    passed: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct ReplayConfig {
    script: PathBuf,
    program: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing with appropriate level based on --trace flag
    if cli.trace {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .init();
    }

    match cli.command {
        Commands::Map => run_map(),
        Commands::Decode(args) => run_decode(args),
        Commands::Replay(args) => run_replay(args),
    }
}

fn run_map() -> ExitCode {
    println!("Address format: [8-bit reserved][16-bit chip ID][40-bit offset]");
    println!();
    println!(
        "{:<10} {:>8} {:>18} {:>18}",
        "chiplet", "chip ID", "low", "high"
    );
    for p in memmap::Participant::ALL {
        let range = p.range();
        println!(
            "{:<10} {:>#8x} {:>#18x} {:>#18x}",
            p.label(),
            p.chip_id(),
            range.low,
            range.high
        );
    }
    println!();
    println!("monitor ports:");
    for port in [MonitorPort::Uart, MonitorPort::Exit] {
        println!(
            "  {:<5} offset {:>#12x}  addr {:>#18x}",
            port.label(),
            port.offset(),
            port.address()
        );
    }
    ExitCode::from(EXIT_PASS)
}

fn run_decode(args: DecodeArgs) -> ExitCode {
    let addr = args.addr;
    println!("address   {:#018x}", addr);
    println!("reserved  {:#04x}", memmap::reserved(addr));
    println!("chip ID   {:#06x}", memmap::chip_id(addr));
    println!("offset    {:#012x}", memmap::offset(addr));
    match memmap::Participant::of(addr) {
        Some(p) => println!("chiplet   {}", p.label()),
        None => println!("chiplet   (unmapped)"),
    }
    if let Some(port) = MonitorPort::decode(addr) {
        println!("port      {}", port.label());
    }
    ExitCode::from(EXIT_PASS)
}

fn resolve_script_path(script: &Path, relative: &str) -> PathBuf {
    match script.parent() {
        Some(parent) => parent.join(relative),
        None => PathBuf::from(relative),
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

fn run_replay(args: ReplayArgs) -> ExitCode {
    let script_hash = std::fs::read(&args.script)
        .map(|bytes| sha256_hex(&bytes))
        .unwrap_or_default();

    let script = match SessionScript::from_file(&args.script) {
        Ok(s) => s,
        Err(e) => {
            let msg = format!("{:#}", e);
            error!("{}", msg);
            write_config_error_outputs(&args, &script_hash, msg);
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };

    let memory_size = {
        let requested = args
            .memory_size
            .as_deref()
            .or_else(|| script.memory.as_ref().map(|m| m.size.as_str()));
        match requested {
            Some(size) => match parse_size(size) {
                Ok(bytes) => bytes as usize,
                Err(e) => {
                    let msg = format!("Invalid memory size '{}': {:#}", size, e);
                    error!("{}", msg);
                    write_config_error_outputs(&args, &script_hash, msg);
                    return ExitCode::from(EXIT_CONFIG_ERROR);
                }
            },
            None => memmap::MAIN_MEMORY_SIZE as usize,
        }
    };

    let program_path = args.program.clone().or_else(|| {
        script
            .program
            .as_deref()
            .map(|p| resolve_script_path(&args.script, p))
    });

    let mut bus = HostBus::with_memory_size(memory_size);
    let uart_tx = Arc::new(Mutex::new(Vec::new()));
    bus.attach_uart_sink(uart_tx.clone(), !args.no_uart_stdout);

    if let Some(path) = &program_path {
        let loaded = std::fs::read(path)
            .with_context(|| format!("Failed to read program image {:?}", path))
            .and_then(|image| {
                bus.load_program(&image)
                    .context("Failed to load program image")
            });
        if let Err(e) = loaded {
            let msg = format!("{:#}", e);
            error!("{}", msg);
            write_config_error_outputs(&args, &script_hash, msg);
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    }

    info!(
        "Replaying {} request(s) from {:?}",
        script.requests.len(),
        args.script
    );

    let mut stop_reason = StopReason::TraceEnd;
    let mut requests_executed: u64 = 0;
    let mut message = None;

    for (index, request) in script.requests.iter().enumerate() {
        let outcome = match request.op {
            RequestOp::Write => bus.write(request.addr, &request.data),
            RequestOp::Read => match bus.read(request.addr, request.len.unwrap_or(1)) {
                Ok(data) => {
                    info!("read {:#018x} -> {:02x?}", request.addr, data);
                    Ok(())
                }
                Err(e) => Err(e),
            },
        };
        requests_executed += 1;

        if let Err(e) = outcome {
            let msg = format!("Request {} failed: {}", index, e);
            error!("{}", msg);
            message = Some(msg);
            stop_reason = StopReason::RequestError;
            break;
        }

        // The exit port ends the session; remaining requests are not replayed.
        if bus.exit_code().is_some() {
            stop_reason = StopReason::Exit;
            break;
        }
    }

    let uart_raw = uart_tx.lock().map(|g| g.clone()).unwrap_or_default();
    let uart_text = String::from_utf8_lossy(&uart_raw).to_string();
    let exit_code = bus.exit_code();

    let mut assertion_results = Vec::new();
    let mut all_passed = true;
    let mut expected_stop_reason_matched = false;

    for assertion in &script.assertions {
        let passed = match assertion {
            SessionAssertion::UartContains(a) => uart_text.contains(&a.uart_contains),
            SessionAssertion::UartEquals(a) => uart_text == a.uart_equals,
            SessionAssertion::ExpectedExitCode(a) => exit_code == Some(a.expected_exit_code),
            SessionAssertion::ExpectedStopReason(a) => a.expected_stop_reason == stop_reason,
        };

        if matches!(assertion, SessionAssertion::ExpectedStopReason(_)) && passed {
            expected_stop_reason_matched = true;
        }

        if !passed {
            all_passed = false;
            error!(
                "Assertion failed: {:?} (captured len={})",
                assertion,
                uart_text.len()
            );
        }

        assertion_results.push(AssertionResult {
            assertion: assertion.clone(),
            passed,
        });
    }

    let request_error = matches!(stop_reason, StopReason::RequestError);
    let status = if !all_passed {
        "fail"
    } else if request_error && !expected_stop_reason_matched {
        "error"
    } else {
        "pass"
    };

    let result = ReplayResult {
        result_schema_version: RESULT_SCHEMA_VERSION.to_string(),
        status: status.to_string(),
        requests_executed,
        stop_reason,
        uart_bytes: uart_raw.len() as u64,
        uart_text,
        exit_code,
        message,
        assertions: assertion_results,
        script_hash,
        config: ReplayConfig {
            script: args.script.clone(),
            program: program_path,
        },
    };
    write_outputs(args.output_dir.as_deref(), &result, &uart_raw);

    if !all_passed {
        ExitCode::from(EXIT_ASSERT_FAIL)
    } else if request_error && !expected_stop_reason_matched {
        ExitCode::from(EXIT_RUNTIME_ERROR)
    } else {
        ExitCode::from(EXIT_PASS)
    }
}

fn write_config_error_outputs(args: &ReplayArgs, script_hash: &str, message: String) {
    let result = ReplayResult {
        result_schema_version: RESULT_SCHEMA_VERSION.to_string(),
        status: "config_error".to_string(),
        requests_executed: 0,
        stop_reason: StopReason::ConfigError,
        uart_bytes: 0,
        uart_text: String::new(),
        exit_code: None,
        message: Some(message),
        assertions: Vec::new(),
        script_hash: script_hash.to_string(),
        config: ReplayConfig {
            script: args.script.clone(),
            program: args.program.clone(),
        },
    };
    write_outputs(args.output_dir.as_deref(), &result, &[]);
}

fn write_outputs(output_dir: Option<&Path>, result: &ReplayResult, uart_raw: &[u8]) {
    let Some(output_dir) = output_dir else {
        return;
    };

    if let Err(e) = std::fs::create_dir_all(output_dir) {
        error!("Failed to create output directory {:?}: {}", output_dir, e);
        return;
    }

    let result_path = output_dir.join("result.json");
    match std::fs::File::create(&result_path) {
        Ok(f) => {
            if let Err(e) = serde_json::to_writer_pretty(f, result) {
                error!("Failed to write result.json: {}", e);
            }
        }
        Err(e) => error!("Failed to create result.json: {}", e),
    }

    let uart_path = output_dir.join("uart.log");
    if let Err(e) = std::fs::write(&uart_path, uart_raw) {
        error!("Failed to write uart.log: {}", e);
    }
}
