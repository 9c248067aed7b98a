// BrickWired - Chiplet Demo Host Tooling
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Static address map for the chiplet demo.
//!
//! Four participants share one 64-bit UMI address space:
//!
//! 1. The main memory holding the program image
//! 2. The core running the demo program
//! 3. The host driving the session
//! 4. The monitor exposing the UART and exit-code ports
//!
//! Every address splits into three fixed bit-fields:
//!
//! ```text
//!  -------- ---------------- ----------------------------------------
//! |Reserved|    chip ID     |          component offset              |
//!  -------- ---------------- ----------------------------------------
//! | 8 bits |    16 bits     |                40 bits                 |
//!  -------- ---------------- ----------------------------------------
//! ```
//!
//! Chip IDs are arbitrary; uniqueness is the only criterion. The reserved
//! top byte is always zero. These values are an external interface: the
//! host interprets them literally, so they must stay bit-exact.

#![cfg_attr(not(test), no_std)]

/// Width of the reserved top field. Always zero.
pub const RESERVED_BITS: u32 = 8;

/// Width of the chip-ID field.
pub const CHIP_ID_BITS: u32 = 16;

/// Width of the per-participant component offset.
pub const OFFSET_BITS: u32 = 40;

/// Mask covering the 40-bit component offset.
pub const OFFSET_MASK: u64 = (1 << OFFSET_BITS) - 1;

/// Compose a global address from a chip ID and a component offset.
///
/// Offsets are masked to 40 bits, which also pins the reserved top byte
/// to zero.
pub const fn compose(chip_id: u16, offset: u64) -> u64 {
    ((chip_id as u64) << OFFSET_BITS) | (offset & OFFSET_MASK)
}

/// Chip-ID field of a global address.
pub const fn chip_id(addr: u64) -> u16 {
    ((addr >> OFFSET_BITS) & 0xFFFF) as u16
}

/// Component-offset field of a global address.
pub const fn offset(addr: u64) -> u64 {
    addr & OFFSET_MASK
}

/// Reserved top byte of a global address.
pub const fn reserved(addr: u64) -> u8 {
    (addr >> (OFFSET_BITS + CHIP_ID_BITS)) as u8
}

/// Inclusive address range owned by one participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressRange {
    pub low: u64,
    pub high: u64,
}

impl AddressRange {
    pub const fn contains(&self, addr: u64) -> bool {
        addr >= self.low && addr <= self.high
    }

    /// Number of addressable bytes in the range.
    pub const fn span(&self) -> u64 {
        self.high - self.low + 1
    }
}

/// Size of the main memory in bytes (32768 KiB).
pub const MAIN_MEMORY_SIZE: u64 = 32768 * 1024;

pub const MEM_CHIP_ID: u16 = 0x0000;
pub const CORE_CHIP_ID: u16 = 0x4444;
pub const HOST_CHIP_ID: u16 = 0x8888;
pub const MONITOR_CHIP_ID: u16 = 0xCCCC;

pub const MEM_ADDR_LOW: u64 = compose(MEM_CHIP_ID, 0);
pub const MEM_ADDR_HIGH: u64 = compose(MEM_CHIP_ID, MAIN_MEMORY_SIZE - 1);

pub const CORE_ADDR_LOW: u64 = compose(CORE_CHIP_ID, 0);
pub const CORE_ADDR_HIGH: u64 = compose(CORE_CHIP_ID, OFFSET_MASK);

pub const HOST_ADDR_LOW: u64 = compose(HOST_CHIP_ID, 0);
pub const HOST_ADDR_HIGH: u64 = compose(HOST_CHIP_ID, OFFSET_MASK);

pub const MONITOR_ADDR_LOW: u64 = compose(MONITOR_CHIP_ID, 0);
pub const MONITOR_ADDR_HIGH: u64 = compose(MONITOR_CHIP_ID, OFFSET_MASK);

/// One of the four fixed participants in the demo address space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Participant {
    Memory,
    Core,
    Host,
    Monitor,
}

impl Participant {
    pub const ALL: [Participant; 4] = [
        Participant::Memory,
        Participant::Core,
        Participant::Host,
        Participant::Monitor,
    ];

    pub const fn chip_id(self) -> u16 {
        match self {
            Participant::Memory => MEM_CHIP_ID,
            Participant::Core => CORE_CHIP_ID,
            Participant::Host => HOST_CHIP_ID,
            Participant::Monitor => MONITOR_CHIP_ID,
        }
    }

    pub const fn from_chip_id(id: u16) -> Option<Self> {
        match id {
            MEM_CHIP_ID => Some(Participant::Memory),
            CORE_CHIP_ID => Some(Participant::Core),
            HOST_CHIP_ID => Some(Participant::Host),
            MONITOR_CHIP_ID => Some(Participant::Monitor),
            _ => None,
        }
    }

    /// Participant owning the given global address, if any.
    pub const fn of(addr: u64) -> Option<Self> {
        if reserved(addr) != 0 {
            return None;
        }
        Self::from_chip_id(chip_id(addr))
    }

    pub const fn range(self) -> AddressRange {
        match self {
            Participant::Memory => AddressRange {
                low: MEM_ADDR_LOW,
                high: MEM_ADDR_HIGH,
            },
            Participant::Core => AddressRange {
                low: CORE_ADDR_LOW,
                high: CORE_ADDR_HIGH,
            },
            Participant::Host => AddressRange {
                low: HOST_ADDR_LOW,
                high: HOST_ADDR_HIGH,
            },
            Participant::Monitor => AddressRange {
                low: MONITOR_ADDR_LOW,
                high: MONITOR_ADDR_HIGH,
            },
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Participant::Memory => "memory",
            Participant::Core => "core",
            Participant::Host => "host",
            Participant::Monitor => "monitor",
        }
    }
}

/// Monitor ports.
///
/// The monitor owns the full 40-bit offset space, but only two offsets are
/// meaningful. The host rejects accesses to any other monitor offset.
pub mod monitor {
    use super::{compose, MONITOR_CHIP_ID};

    /// Component offset of the UART output port.
    pub const UART_OFFSET: u64 = 0xC000_0000;

    /// Component offset of the exit-code port.
    pub const EXIT_OFFSET: u64 = 0xD000_0000;

    /// Global address of the UART output port (0x00CC_CC00_C000_0000).
    pub const UART_ADDR: u64 = compose(MONITOR_CHIP_ID, UART_OFFSET);

    /// Global address of the exit-code port (0x00CC_CC00_D000_0000).
    pub const EXIT_ADDR: u64 = compose(MONITOR_CHIP_ID, EXIT_OFFSET);

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum MonitorPort {
        Uart,
        Exit,
    }

    impl MonitorPort {
        pub const fn offset(self) -> u64 {
            match self {
                MonitorPort::Uart => UART_OFFSET,
                MonitorPort::Exit => EXIT_OFFSET,
            }
        }

        pub const fn address(self) -> u64 {
            match self {
                MonitorPort::Uart => UART_ADDR,
                MonitorPort::Exit => EXIT_ADDR,
            }
        }

        /// Port behind a global address, if it targets one of the two
        /// monitor ports.
        pub const fn decode(addr: u64) -> Option<Self> {
            match addr {
                UART_ADDR => Some(MonitorPort::Uart),
                EXIT_ADDR => Some(MonitorPort::Exit),
                _ => None,
            }
        }

        /// Port behind a component offset within the monitor space.
        pub const fn from_offset(off: u64) -> Option<Self> {
            match off {
                UART_OFFSET => Some(MonitorPort::Uart),
                EXIT_OFFSET => Some(MonitorPort::Exit),
                _ => None,
            }
        }

        pub const fn label(self) -> &'static str {
            match self {
                MonitorPort::Uart => "uart",
                MonitorPort::Exit => "exit",
            }
        }
    }
}
