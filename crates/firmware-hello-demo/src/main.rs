// BrickWired - Chiplet Demo Host Tooling
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

#![no_std]
#![no_main]

use panic_halt as _;
use riscv_rt::entry;

use brickwired_memmap::monitor::{EXIT_OFFSET, UART_OFFSET};

// The core addresses the monitor by 40-bit component offset; the fabric
// outside the core prepends the monitor chip ID on the way to the host.
// Each character travels in its own write request.
const UART_TX: *mut u32 = UART_OFFSET as usize as *mut u32;
const EXIT: *mut u32 = EXIT_OFFSET as usize as *mut u32;

const MESSAGE: &[u8] = b"Hello World!";

#[entry]
fn main() -> ! {
    for &byte in MESSAGE {
        unsafe {
            core::ptr::write_volatile(UART_TX, byte as u32);
        }
    }

    unsafe {
        core::ptr::write_volatile(UART_TX, b'\n' as u32);

        // Zero indicates a successful run.
        core::ptr::write_volatile(EXIT, 0);
    }

    // The host tears the session down once the exit code lands.
    loop {
        unsafe {
            riscv::asm::wfi();
        }
    }
}
