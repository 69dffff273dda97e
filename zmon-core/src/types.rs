// This file is part of zmon.
// Copyright (c) 2026 The zmon project developers. All rights reserved.
// Licensed under the MIT license. See LICENSE file in the project root for full license text.

use std::cell::RefCell;
use std::fmt;
use std::io::{self, BufRead, Write};
use std::rc::Rc;

use bit_field::BitField;

/// Shared ownership wrapper used to wire one device into multiple owners.
pub type Shared<T> = Rc<RefCell<T>>;

pub fn new_shared<T>(instance: T) -> Shared<T> {
    Rc::new(RefCell::new(instance))
}

/// A memory target is one of the addressable 16-bit byte spaces a monitor
/// command can act upon. Addresses wrap modulo the 16-bit space; a call is
/// not atomic across internal page/sector boundaries, so callers bound their
/// transfers into chunks.
pub trait MemoryTarget {
    /// Read `buf.len()` bytes starting at the specified address.
    fn read(&mut self, address: u16, buf: &mut [u8]);
    /// Write the given bytes starting at the specified address.
    fn write(&mut self, address: u16, data: &[u8]) -> io::Result<()>;
}

impl<T: MemoryTarget> MemoryTarget for Shared<T> {
    fn read(&mut self, address: u16, buf: &mut [u8]) {
        self.borrow_mut().read(address, buf)
    }

    fn write(&mut self, address: u16, data: &[u8]) -> io::Result<()> {
        self.borrow_mut().write(address, data)
    }
}

/// Auxiliary non-volatile storage. Writing a range that has not been erased
/// gives target-defined results; erasure is an explicit, user-invoked step,
/// never performed implicitly by a transfer.
pub trait FlashTarget: MemoryTarget {
    /// Erase the sector containing the specified address.
    fn erase_sector(&mut self, address: u16) -> io::Result<()>;
    /// Erase the entire chip.
    fn erase_chip(&mut self) -> io::Result<()>;
}

impl<T: FlashTarget> FlashTarget for Shared<T> {
    fn erase_sector(&mut self, address: u16) -> io::Result<()> {
        self.borrow_mut().erase_sector(address)
    }

    fn erase_chip(&mut self) -> io::Result<()> {
        self.borrow_mut().erase_chip()
    }
}

/// Execution engine of the externally driven processor.
pub trait Cpu {
    /// Reset the processor with the given reset vector.
    fn reset(&mut self, vector: u16);
    /// Run the processor at full speed.
    fn run(&mut self);
    /// Run with debugging enabled for the given cycle budget; 0 means run
    /// until a breakpoint or watchpoint hits.
    fn debug(&mut self, cycle_budget: u32);
    /// Snapshot the current bus lines.
    fn bus_status(&self) -> BusStatus;
}

/// Disk image emulation.
pub trait DriveController {
    fn mount(&mut self, drive: u8, path: &str) -> io::Result<()>;
    fn unmount(&mut self, drive: u8) -> io::Result<()>;
    /// Load the boot sector of drive 0; returns false when no boot image
    /// is present.
    fn boot_load(&mut self) -> io::Result<bool>;
}

/// Result summary of a hex file load.
#[derive(Clone, Copy, Debug)]
pub struct HexSummary {
    pub total: u32,
    pub min: u16,
    pub max: u16,
    pub errors: u32,
}

/// Hex record codec. The encoding rules live behind this boundary.
pub trait HexCodec {
    fn load(
        &mut self,
        target: &mut dyn MemoryTarget,
        input: &mut dyn BufRead,
    ) -> io::Result<HexSummary>;
    fn save(
        &mut self,
        target: &mut dyn MemoryTarget,
        start: u16,
        end: u16,
        output: &mut dyn Write,
    ) -> io::Result<()>;
}

/// Instruction disassembly over a memory target, display side effect only.
pub trait Disassembler {
    fn disassemble(
        &mut self,
        target: &mut dyn MemoryTarget,
        start: u16,
        end: u16,
        out: &mut dyn Write,
    ) -> io::Result<()>;
}

/// Physical UART configuration.
pub trait Uart {
    fn set_divisor(&mut self, port: u8, divisor: u16) -> io::Result<()>;
}

/// IO port driver.
pub trait PortIo {
    fn input(&mut self, port: u8) -> u8;
    fn output(&mut self, port: u8, value: u8);
}

/// Control line bit positions within `BusStatus::control`.
pub mod ctl {
    pub const M1: usize = 0;
    pub const MREQ: usize = 1;
    pub const IORQ: usize = 2;
    pub const RD: usize = 3;
    pub const WR: usize = 4;
    pub const HALT: usize = 5;
}

/// Snapshot of the processor bus lines.
#[derive(Clone, Copy, Debug, Default)]
pub struct BusStatus {
    pub address: u16,
    pub data: u8,
    pub control: u8,
}

impl fmt::Display for BusStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "addr={:04x} data={:02x}", self.address, self.data)?;
        let names = [
            (ctl::M1, "m1"),
            (ctl::MREQ, "mreq"),
            (ctl::IORQ, "iorq"),
            (ctl::RD, "rd"),
            (ctl::WR, "wr"),
            (ctl::HALT, "halt"),
        ];
        for (bit, name) in names.iter() {
            if self.control.get_bit(*bit) {
                write!(f, " {}", name)?;
            }
        }
        Ok(())
    }
}
