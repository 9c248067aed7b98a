// BrickWired - Chiplet Demo Host Tooling
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Host-side half of the demo address convention.
//!
//! The core issues plain read/write requests into the shared 64-bit address
//! space; this crate implements what the host does with them. Requests into
//! the memory region hit a flat byte store, requests to the two monitor
//! ports drive the UART capture and the exit-code latch, and everything else
//! is rejected.

pub mod bus;
pub mod memory;
pub mod monitor;

pub use bus::HostBus;
pub use memory::MainMemory;
pub use monitor::MonitorDevice;

#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("Unsupported address {0:#018x}")]
    UnmappedAddress(u64),
    #[error("Read from write-only monitor port at {0:#018x}")]
    MonitorRead(u64),
    #[error("Write of {got} byte(s) to {addr:#018x}; port expects at least {expected}")]
    ShortWrite {
        addr: u64,
        expected: usize,
        got: usize,
    },
    #[error("Program image of {image} bytes does not fit in {memory} bytes of main memory")]
    ImageOverflow { image: usize, memory: usize },
}

pub type HostResult<T> = Result<T, HostError>;
