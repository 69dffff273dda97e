// This file is part of zmon.
// Copyright (c) 2026 The zmon project developers. All rights reserved.
// Licensed under the MIT license. See LICENSE file in the project root for full license text.

use std::fs::OpenOptions;
use std::io::{self, BufRead, Error, ErrorKind, Read, Seek, SeekFrom, Write};

use byteorder::{LittleEndian, ReadBytesExt};
use zmon_core::device::Ram;
use zmon_core::{
    BusStatus, Cpu, Disassembler, DriveController, HexCodec, HexSummary, MemoryTarget, PortIo,
    Shared, Uart,
};

pub const DRIVE_COUNT: usize = 4;

const SECTOR_SIZE: usize = 512;
const BOOT_SIGNATURE: u16 = 0xaa55;

/// Host build runs without a processor on the bus. Execution commands are
/// accepted and logged so command files still replay cleanly.
pub struct DetachedCpu {
    status: BusStatus,
}

impl DetachedCpu {
    pub fn new() -> Self {
        DetachedCpu {
            status: BusStatus::default(),
        }
    }
}

impl Cpu for DetachedCpu {
    fn reset(&mut self, vector: u16) {
        warn!(target: "cpu", "no processor attached; reset to {:04x} ignored", vector);
    }

    fn run(&mut self) {
        warn!(target: "cpu", "no processor attached; run ignored");
    }

    fn debug(&mut self, cycle_budget: u32) {
        warn!(
            target: "cpu",
            "no processor attached; debug budget {} ignored", cycle_budget
        );
    }

    fn bus_status(&self) -> BusStatus {
        self.status
    }
}

/// Drives backed by raw image files on the host filesystem. The bus memory
/// is shared so a successful boot can land the boot sector at address 0.
pub struct HostDrives {
    bus: Shared<Ram>,
    images: [Option<std::fs::File>; DRIVE_COUNT],
}

impl HostDrives {
    pub fn new(bus: Shared<Ram>) -> Self {
        HostDrives {
            bus,
            images: [None, None, None, None],
        }
    }

    fn check_drive(drive: u8) -> io::Result<usize> {
        let index = usize::from(drive);
        if index >= DRIVE_COUNT {
            return Err(Error::new(ErrorKind::InvalidInput, "invalid drive"));
        }
        Ok(index)
    }
}

impl DriveController for HostDrives {
    fn mount(&mut self, drive: u8, path: &str) -> io::Result<()> {
        let index = Self::check_drive(drive)?;
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        info!(target: "drive", "mounted {} on drive {}", path, drive);
        self.images[index] = Some(file);
        Ok(())
    }

    fn unmount(&mut self, drive: u8) -> io::Result<()> {
        let index = Self::check_drive(drive)?;
        match self.images[index].take() {
            Some(_) => {
                info!(target: "drive", "unmounted drive {}", drive);
                Ok(())
            }
            None => Err(Error::new(ErrorKind::InvalidInput, "drive not mounted")),
        }
    }

    fn boot_load(&mut self) -> io::Result<bool> {
        let file = match self.images[0].as_mut() {
            Some(file) => file,
            None => return Err(Error::new(ErrorKind::InvalidInput, "drive not mounted")),
        };
        file.seek(SeekFrom::Start(0))?;
        let mut sector = [0u8; SECTOR_SIZE];
        file.read_exact(&mut sector)?;
        let marker = (&sector[SECTOR_SIZE - 2..]).read_u16::<LittleEndian>()?;
        if marker != BOOT_SIGNATURE {
            return Ok(false);
        }
        self.bus.write(0x0000, &sector)?;
        info!(target: "drive", "boot sector loaded at 0000");
        Ok(true)
    }
}

/// Placeholder disassembler that renders raw bytes as data directives.
pub struct ByteDisasm;

impl Disassembler for ByteDisasm {
    fn disassemble(
        &mut self,
        target: &mut dyn MemoryTarget,
        start: u16,
        end: u16,
        out: &mut dyn Write,
    ) -> io::Result<()> {
        let mut byte = [0u8; 1];
        let mut addr = u32::from(start);
        while addr <= u32::from(end) {
            target.read(addr as u16, &mut byte);
            writeln!(out, "{:04x}  .db {:02x}", addr, byte[0])?;
            addr += 1;
        }
        Ok(())
    }
}

/// Stand-in for a hex record codec that has not been wired in.
pub struct DetachedHexCodec;

impl HexCodec for DetachedHexCodec {
    fn load(
        &mut self,
        _target: &mut dyn MemoryTarget,
        _input: &mut dyn BufRead,
    ) -> io::Result<HexSummary> {
        Err(Error::new(ErrorKind::Other, "no hex codec attached"))
    }

    fn save(
        &mut self,
        _target: &mut dyn MemoryTarget,
        _start: u16,
        _end: u16,
        _output: &mut dyn Write,
    ) -> io::Result<()> {
        Err(Error::new(ErrorKind::Other, "no hex codec attached"))
    }
}

/// Host build has no physical UART; divisor writes are retained and logged.
pub struct LogUart {
    divisors: [u16; 2],
}

impl LogUart {
    pub fn new() -> Self {
        LogUart { divisors: [0; 2] }
    }
}

impl Uart for LogUart {
    fn set_divisor(&mut self, port: u8, divisor: u16) -> io::Result<()> {
        let index = usize::from(port & 1);
        self.divisors[index] = divisor;
        info!(target: "uart", "uart {} divisor set to {}", index, divisor);
        Ok(())
    }
}

/// IO ports loop written values back, one latch per port.
pub struct LoopbackPorts {
    latch: [u8; 256],
}

impl LoopbackPorts {
    pub fn new() -> Self {
        LoopbackPorts { latch: [0; 256] }
    }
}

impl PortIo for LoopbackPorts {
    fn input(&mut self, port: u8) -> u8 {
        self.latch[usize::from(port)]
    }

    fn output(&mut self, port: u8, value: u8) {
        self.latch[usize::from(port)] = value;
    }
}
