// BrickWired - Chiplet Demo Host Tooling
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::{HostError, HostResult};
use brickwired_memmap::monitor::MonitorPort;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// The monitor participant: a UART output port and an exit-code port.
///
/// UART bytes go to an optional shared capture sink and, unless muted, to
/// stdout. The first write to the exit port latches the session exit code.
#[derive(Debug, Default)]
pub struct MonitorDevice {
    sink: Option<Arc<Mutex<Vec<u8>>>>,
    echo_stdout: bool,
    exit_code: Option<u32>,
}

impl MonitorDevice {
    pub fn new() -> Self {
        Self {
            sink: None,
            echo_stdout: true,
            exit_code: None,
        }
    }

    /// Attach a UART capture sink.
    ///
    /// When `echo_stdout` is false, UART bytes will no longer be printed to
    /// stdout.
    pub fn set_sink(&mut self, sink: Option<Arc<Mutex<Vec<u8>>>>, echo_stdout: bool) {
        self.sink = sink;
        self.echo_stdout = echo_stdout;
    }

    pub fn exit_code(&self) -> Option<u32> {
        self.exit_code
    }

    pub fn write(&mut self, port: MonitorPort, data: &[u8]) -> HostResult<()> {
        match port {
            MonitorPort::Uart => {
                let Some(&byte) = data.first() else {
                    return Err(HostError::ShortWrite {
                        addr: port.address(),
                        expected: 1,
                        got: 0,
                    });
                };
                self.push_uart(byte);
                Ok(())
            }
            MonitorPort::Exit => {
                if data.len() < 4 {
                    return Err(HostError::ShortWrite {
                        addr: port.address(),
                        expected: 4,
                        got: data.len(),
                    });
                }
                let code = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);
                if self.exit_code.is_some() {
                    tracing::warn!("Exit port written again after latching; ignoring {}", code);
                } else {
                    tracing::info!("Exit code {} latched", code);
                    self.exit_code = Some(code);
                }
                Ok(())
            }
        }
    }

    fn push_uart(&mut self, value: u8) {
        if let Some(sink) = &self.sink {
            if let Ok(mut guard) = sink.lock() {
                guard.push(value);
            }
        }

        if self.echo_stdout {
            #[allow(unused_must_use)]
            {
                print!("{}", value as char);
                io::stdout().flush();
            }
        }
    }
}
