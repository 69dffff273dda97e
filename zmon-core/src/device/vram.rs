// This file is part of zmon.
// Copyright (c) 2026 The zmon project developers. All rights reserved.
// Licensed under the MIT license. See LICENSE file in the project root for full license text.

use std::io;

use crate::types::MemoryTarget;

/// Video memory behind the display controller port interface. Capacity is a
/// power of two smaller than the bus space; addresses are masked into it.
pub struct VideoRam {
    data: Vec<u8>,
    mask: usize,
}

impl VideoRam {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity.is_power_of_two());
        Self {
            data: vec![0x00; capacity],
            mask: capacity - 1,
        }
    }
}

impl MemoryTarget for VideoRam {
    fn read(&mut self, address: u16, buf: &mut [u8]) {
        let mut addr = address;
        for slot in buf.iter_mut() {
            *slot = self.data[usize::from(addr) & self.mask];
            addr = addr.wrapping_add(1);
        }
    }

    fn write(&mut self, address: u16, data: &[u8]) -> io::Result<()> {
        let mut addr = address;
        for byte in data {
            self.data[usize::from(addr) & self.mask] = *byte;
            addr = addr.wrapping_add(1);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addresses_are_masked_to_capacity() {
        let mut vram = VideoRam::new(0x4000);
        vram.write(0x4001, &[0x42]).unwrap();
        let mut buf = [0u8; 1];
        vram.read(0x0001, &mut buf);
        assert_eq!(0x42, buf[0]);
    }

    #[test]
    fn sequential_access_wraps_within_capacity() {
        let mut vram = VideoRam::new(0x4000);
        vram.write(0x3fff, &[0xaa, 0xbb]).unwrap();
        let mut buf = [0u8; 1];
        vram.read(0x3fff, &mut buf);
        assert_eq!(0xaa, buf[0]);
        vram.read(0x0000, &mut buf);
        assert_eq!(0xbb, buf[0]);
    }
}
