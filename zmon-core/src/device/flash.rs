// This file is part of zmon.
// Copyright (c) 2026 The zmon project developers. All rights reserved.
// Licensed under the MIT license. See LICENSE file in the project root for full license text.

use std::io;

use crate::types::{FlashTarget, MemoryTarget};

pub const SECTOR_SIZE: usize = 0x1000;

/// Auxiliary non-volatile storage. The erased state is 0xff; a program
/// operation can only clear bits, so writing an un-erased range leaves the
/// AND of old and new contents behind. Erasure is a separate, explicit
/// operation.
pub struct Flash {
    data: Vec<u8>,
}

impl Flash {
    pub fn new(capacity: usize) -> Self {
        Self {
            data: vec![0xff; capacity],
        }
    }
}

impl MemoryTarget for Flash {
    fn read(&mut self, address: u16, buf: &mut [u8]) {
        let mut addr = address;
        for slot in buf.iter_mut() {
            *slot = self.data[usize::from(addr) % self.data.len()];
            addr = addr.wrapping_add(1);
        }
    }

    fn write(&mut self, address: u16, data: &[u8]) -> io::Result<()> {
        let len = self.data.len();
        let mut addr = address;
        for byte in data {
            self.data[usize::from(addr) % len] &= *byte;
            addr = addr.wrapping_add(1);
        }
        Ok(())
    }
}

impl FlashTarget for Flash {
    fn erase_sector(&mut self, address: u16) -> io::Result<()> {
        let base = usize::from(address) % self.data.len() / SECTOR_SIZE * SECTOR_SIZE;
        let end = (base + SECTOR_SIZE).min(self.data.len());
        for byte in self.data[base..end].iter_mut() {
            *byte = 0xff;
        }
        info!(target: "flash", "erased sector at {:04x}", base);
        Ok(())
    }

    fn erase_chip(&mut self) -> io::Result<()> {
        for byte in self.data.iter_mut() {
            *byte = 0xff;
        }
        info!(target: "flash", "erased chip");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn erased_flash_reads_ff() {
        let mut flash = Flash::new(0x10000);
        let mut buf = [0u8; 2];
        flash.read(0x1234, &mut buf);
        assert_eq!([0xff, 0xff], buf);
    }

    #[test]
    fn write_programs_erased_bytes() {
        let mut flash = Flash::new(0x10000);
        flash.write(0x2000, &[0x5a]).unwrap();
        let mut buf = [0u8; 1];
        flash.read(0x2000, &mut buf);
        assert_eq!(0x5a, buf[0]);
    }

    #[test]
    fn unerased_write_can_only_clear_bits() {
        let mut flash = Flash::new(0x10000);
        flash.write(0x2000, &[0x0f]).unwrap();
        flash.write(0x2000, &[0xf1]).unwrap();
        let mut buf = [0u8; 1];
        flash.read(0x2000, &mut buf);
        assert_eq!(0x01, buf[0]);
    }

    #[test]
    fn sector_erase_restores_erased_state() {
        let mut flash = Flash::new(0x10000);
        flash.write(0x2000, &[0x00]).unwrap();
        flash.write(0x3000, &[0x00]).unwrap();
        flash.erase_sector(0x2abc).unwrap();
        let mut buf = [0u8; 1];
        flash.read(0x2000, &mut buf);
        assert_eq!(0xff, buf[0]);
        // neighboring sector untouched
        flash.read(0x3000, &mut buf);
        assert_eq!(0x00, buf[0]);
    }

    #[test]
    fn chip_erase_clears_everything() {
        let mut flash = Flash::new(0x10000);
        flash.write(0x0000, &[0x00]).unwrap();
        flash.write(0xffff, &[0x00]).unwrap();
        flash.erase_chip().unwrap();
        let mut buf = [0u8; 1];
        flash.read(0x0000, &mut buf);
        assert_eq!(0xff, buf[0]);
        flash.read(0xffff, &mut buf);
        assert_eq!(0xff, buf[0]);
    }
}
