// This file is part of zmon.
// Copyright (c) 2026 The zmon project developers. All rights reserved.
// Licensed under the MIT license. See LICENSE file in the project root for full license text.

use std::io;

use crate::types::MemoryTarget;

/// Conventional bus memory. Addresses wrap modulo the 16-bit space.
pub struct Ram {
    data: Vec<u8>,
}

impl Ram {
    pub fn new(capacity: usize) -> Self {
        Self {
            data: vec![0x00; capacity],
        }
    }

    pub fn fill(&mut self, pattern: u8) {
        for byte in self.data.iter_mut() {
            *byte = pattern;
        }
    }
}

impl MemoryTarget for Ram {
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
            self.data[usize::from(addr) % len] = *byte;
            addr = addr.wrapping_add(1);
        }
        Ok(())
    }
}
