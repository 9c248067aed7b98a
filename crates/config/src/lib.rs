// BrickWired - Chiplet Demo Host Tooling
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestOp {
    Write,
    Read,
}

/// One replayed transaction: a plain read or write into the global address
/// space, as the host would receive it from the fabric.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct Request {
    pub op: RequestOp,
    pub addr: u64,
    /// Payload bytes for writes.
    #[serde(default)]
    pub data: Vec<u8>,
    /// Byte count for reads.
    #[serde(default)]
    pub len: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct MemoryConfig {
    /// Backing-store size for the memory participant, e.g. "32 MiB".
    pub size: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct UartContainsAssertion {
    pub uart_contains: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct UartEqualsAssertion {
    pub uart_equals: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct ExitCodeAssertion {
    pub expected_exit_code: u32,
}

/// Why a replayed session stopped.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Runner failed before the session started.
    ConfigError,
    /// The trace ran to its end without an exit-port write.
    TraceEnd,
    /// The exit port latched a code.
    Exit,
    /// The host rejected a request.
    RequestError,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct StopReasonAssertion {
    pub expected_stop_reason: StopReason,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(untagged)]
pub enum SessionAssertion {
    UartContains(UartContainsAssertion),
    UartEquals(UartEqualsAssertion),
    ExpectedExitCode(ExitCodeAssertion),
    ExpectedStopReason(StopReasonAssertion),
}

/// A replayable host session: optional memory sizing and program image,
/// the request trace, and assertions over the observable outcome.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct SessionScript {
    pub schema_version: String,
    #[serde(default)]
    pub memory: Option<MemoryConfig>,
    /// Flat binary loaded into main memory at offset 0 before replay,
    /// resolved relative to the script file.
    #[serde(default)]
    pub program: Option<String>,
    #[serde(default)]
    pub requests: Vec<Request>,
    #[serde(default)]
    pub assertions: Vec<SessionAssertion>,
}

impl SessionScript {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let f = std::fs::File::open(&path)
            .with_context(|| format!("Failed to open session script at {:?}", path.as_ref()))?;
        let script: Self =
            serde_yaml::from_reader(f).context("Failed to parse Session Script YAML")?;
        script.validate()?;
        Ok(script)
    }

    pub fn validate(&self) -> Result<()> {
        if self.schema_version != "1.0" {
            anyhow::bail!(
                "Unsupported schema_version '{}'. Supported versions: '1.0'",
                self.schema_version
            );
        }

        if let Some(memory) = &self.memory {
            parse_size(&memory.size)
                .with_context(|| format!("Invalid memory size '{}'", memory.size))?;
        }

        for (index, request) in self.requests.iter().enumerate() {
            match request.op {
                RequestOp::Write => {
                    if request.data.is_empty() {
                        anyhow::bail!("Request {}: write carries no data bytes", index);
                    }
                    if request.len.is_some() {
                        anyhow::bail!("Request {}: 'len' is only valid on reads", index);
                    }
                }
                RequestOp::Read => {
                    if !request.data.is_empty() {
                        anyhow::bail!("Request {}: 'data' is only valid on writes", index);
                    }
                    match request.len {
                        None => anyhow::bail!("Request {}: read needs a 'len'", index),
                        Some(0) => anyhow::bail!("Request {}: read of zero bytes", index),
                        Some(_) => {}
                    }
                }
            }
        }

        Ok(())
    }
}

pub fn parse_size(size_str: &str) -> Result<u64> {
    use human_size::{Byte, Size, SpecificSize};
    let s: Size = size_str
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid size format: {}", e))?;
    let bytes: SpecificSize<Byte> = s.into();
    Ok(bytes.value() as u64)
}
