// BrickWired - Chiplet Demo Host Tooling
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::memory::MainMemory;
use crate::monitor::MonitorDevice;
use crate::{HostError, HostResult};
use brickwired_memmap as memmap;
use brickwired_memmap::monitor::MonitorPort;
use std::sync::{Arc, Mutex};

/// Dispatches request addresses across the demo address map.
///
/// Only the memory region and the two monitor ports are backed; a request
/// anywhere else is an error, mirroring what the host reports during a
/// live session.
pub struct HostBus {
    pub memory: MainMemory,
    pub monitor: MonitorDevice,
}

impl Default for HostBus {
    fn default() -> Self {
        Self::new()
    }
}

impl HostBus {
    /// Bus with the full memory region backed.
    pub fn new() -> Self {
        Self::with_memory_size(memmap::MAIN_MEMORY_SIZE as usize)
    }

    pub fn with_memory_size(size: usize) -> Self {
        Self {
            memory: MainMemory::new(size),
            monitor: MonitorDevice::new(),
        }
    }

    /// Attach a UART capture sink to the monitor.
    pub fn attach_uart_sink(&mut self, sink: Arc<Mutex<Vec<u8>>>, echo_stdout: bool) {
        self.monitor.set_sink(Some(sink), echo_stdout);
    }

    /// Program main memory from a flat binary image, starting at offset 0.
    pub fn load_program(&mut self, image: &[u8]) -> HostResult<()> {
        tracing::debug!("Loading {} byte program image", image.len());
        self.memory.load_image(image)
    }

    /// Exit code latched by the monitor, once the session has signalled one.
    pub fn exit_code(&self) -> Option<u32> {
        self.monitor.exit_code()
    }

    pub fn write(&mut self, addr: u64, data: &[u8]) -> HostResult<()> {
        tracing::trace!("write {:#018x} ({} bytes)", addr, data.len());

        if memmap::reserved(addr) != 0 {
            return Err(HostError::UnmappedAddress(addr));
        }

        let off = memmap::offset(addr);
        match memmap::chip_id(addr) {
            memmap::MEM_CHIP_ID => {
                if self.memory.write(off, data) {
                    Ok(())
                } else {
                    Err(HostError::UnmappedAddress(addr))
                }
            }
            memmap::MONITOR_CHIP_ID => match MonitorPort::from_offset(off) {
                Some(port) => self.monitor.write(port, data),
                None => Err(HostError::UnmappedAddress(addr)),
            },
            _ => Err(HostError::UnmappedAddress(addr)),
        }
    }

    pub fn read(&self, addr: u64, len: usize) -> HostResult<Vec<u8>> {
        tracing::trace!("read  {:#018x} ({} bytes)", addr, len);

        if memmap::reserved(addr) != 0 {
            return Err(HostError::UnmappedAddress(addr));
        }

        let off = memmap::offset(addr);
        match memmap::chip_id(addr) {
            memmap::MEM_CHIP_ID => self
                .memory
                .read(off, len)
                .map(|data| data.to_vec())
                .ok_or(HostError::UnmappedAddress(addr)),
            memmap::MONITOR_CHIP_ID => match MonitorPort::from_offset(off) {
                // Both ports are write-only.
                Some(_) => Err(HostError::MonitorRead(addr)),
                None => Err(HostError::UnmappedAddress(addr)),
            },
            _ => Err(HostError::UnmappedAddress(addr)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brickwired_memmap::monitor::{EXIT_ADDR, UART_ADDR};
    use brickwired_memmap::{compose, CORE_CHIP_ID, HOST_CHIP_ID, MONITOR_CHIP_ID};
    use std::sync::{Arc, Mutex};

    fn small_bus() -> HostBus {
        let mut bus = HostBus::with_memory_size(4096);
        bus.monitor.set_sink(None, false);
        bus
    }

    #[test]
    fn test_memory_round_trip() {
        let mut bus = small_bus();

        bus.write(compose(memmap::MEM_CHIP_ID, 0x100), &[1, 2, 3, 4])
            .unwrap();
        assert_eq!(
            bus.read(compose(memmap::MEM_CHIP_ID, 0x100), 4).unwrap(),
            vec![1, 2, 3, 4]
        );
    }

    #[test]
    fn test_memory_bounds_follow_backing_size() {
        let mut bus = small_bus();

        // In the region but outside the backing store.
        let err = bus
            .write(compose(memmap::MEM_CHIP_ID, 4096), &[0])
            .unwrap_err();
        assert!(matches!(err, HostError::UnmappedAddress(_)));
    }

    #[test]
    fn test_core_and_host_regions_unbacked() {
        let mut bus = small_bus();
        assert!(bus.write(compose(CORE_CHIP_ID, 0), &[0]).is_err());
        assert!(bus.write(compose(HOST_CHIP_ID, 0), &[0]).is_err());
        assert!(bus.read(compose(CORE_CHIP_ID, 0), 1).is_err());
    }

    #[test]
    fn test_monitor_off_port_offsets_rejected() {
        let mut bus = small_bus();
        let err = bus
            .write(compose(MONITOR_CHIP_ID, 0xB000_0000), &[b'x'])
            .unwrap_err();
        assert!(matches!(err, HostError::UnmappedAddress(_)));
    }

    #[test]
    fn test_monitor_ports_are_write_only() {
        let bus = small_bus();
        assert!(matches!(
            bus.read(UART_ADDR, 1).unwrap_err(),
            HostError::MonitorRead(_)
        ));
        assert!(matches!(
            bus.read(EXIT_ADDR, 4).unwrap_err(),
            HostError::MonitorRead(_)
        ));
    }

    #[test]
    fn test_reserved_byte_must_be_zero() {
        let mut bus = small_bus();
        let err = bus.write(UART_ADDR | (0xA5 << 56), &[b'x']).unwrap_err();
        assert!(matches!(err, HostError::UnmappedAddress(_)));
    }

    #[test]
    fn test_program_image_lands_at_offset_zero() {
        let mut bus = small_bus();
        bus.load_program(&[0xDE, 0xAD, 0xBE, 0xEF]).unwrap();
        assert_eq!(
            bus.read(compose(memmap::MEM_CHIP_ID, 0), 4).unwrap(),
            vec![0xDE, 0xAD, 0xBE, 0xEF]
        );
    }

    // The demo program's observable contract, end to end: each message byte
    // reaches the UART port in order, then a newline, then exit code 0.
    #[test]
    fn test_hello_world_session() {
        let mut bus = small_bus();
        let sink = Arc::new(Mutex::new(Vec::new()));
        bus.attach_uart_sink(sink.clone(), false);

        for &byte in b"Hello World!" {
            bus.write(UART_ADDR, &[byte, 0, 0, 0]).unwrap();
        }
        bus.write(UART_ADDR, &[b'\n', 0, 0, 0]).unwrap();
        bus.write(EXIT_ADDR, &0u32.to_le_bytes()).unwrap();

        assert_eq!(sink.lock().unwrap().as_slice(), b"Hello World!\n");
        assert_eq!(bus.exit_code(), Some(0));
    }
}
