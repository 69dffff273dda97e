// This file is part of zmon.
// Copyright (c) 2026 The zmon project developers. All rights reserved.
// Licensed under the MIT license. See LICENSE file in the project root for full license text.

use std::fmt;

/// An inclusive range over the 16-bit address space. A disabled range is
/// represented by exactly one sentinel value, `ffff-0000`; every other
/// inverted pair is invalid and never constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddressRange {
    pub start: u16,
    pub end: u16,
}

impl AddressRange {
    /// The disabled sentinel.
    pub const DISABLED: AddressRange = AddressRange {
        start: 0xffff,
        end: 0x0000,
    };

    /// The full address space.
    pub const FULL: AddressRange = AddressRange {
        start: 0x0000,
        end: 0xffff,
    };

    pub fn new(start: u16, end: u16) -> Self {
        if start <= end {
            AddressRange { start, end }
        } else {
            AddressRange {
                start: end,
                end: start,
            }
        }
    }

    /// A range covering a single address.
    pub fn single(address: u16) -> Self {
        AddressRange {
            start: address,
            end: address,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.start <= self.end
    }

    pub fn contains(&self, address: u16) -> bool {
        self.is_enabled() && self.start <= address && address <= self.end
    }
}

impl fmt::Display for AddressRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}-{:04x}", self.start, self.end)
    }
}
