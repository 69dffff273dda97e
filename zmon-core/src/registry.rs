// This file is part of zmon.
// Copyright (c) 2026 The zmon project developers. All rights reserved.
// Licensed under the MIT license. See LICENSE file in the project root for full license text.

use std::fmt::Write;

use crate::range::AddressRange;

pub const DEBUG_CLASS_COUNT: usize = 6;

/// A named category of breakpoint or watchpoint with its own range slot.
/// Class identifiers are dense and stable; `ALL` fixes the display order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DebugClass {
    MemRead,
    MemWrite,
    IoRead,
    IoWrite,
    OpFetch,
    Bus,
}

impl DebugClass {
    pub const ALL: [DebugClass; DEBUG_CLASS_COUNT] = [
        DebugClass::MemRead,
        DebugClass::MemWrite,
        DebugClass::IoRead,
        DebugClass::IoWrite,
        DebugClass::OpFetch,
        DebugClass::Bus,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DebugClass::MemRead => "memrd",
            DebugClass::MemWrite => "memwr",
            DebugClass::IoRead => "iord",
            DebugClass::IoWrite => "iowr",
            DebugClass::OpFetch => "opfetch",
            DebugClass::Bus => "bus",
        }
    }

    /// Exact-match lookup against the class name table.
    pub fn from_name(name: &str) -> Option<DebugClass> {
        DebugClass::ALL.iter().copied().find(|c| c.name() == name)
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// A fixed-size collection of debug ranges, one slot per class. Two
/// independent registries exist for the monitor's lifetime, one for
/// breakpoints and one for watchpoints; they are never merged.
pub struct DebugRangeSet {
    label: &'static str,
    ranges: [AddressRange; DEBUG_CLASS_COUNT],
}

impl DebugRangeSet {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            ranges: [AddressRange::DISABLED; DEBUG_CLASS_COUNT],
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn get(&self, class: DebugClass) -> AddressRange {
        self.ranges[class.index()]
    }

    /// Set a class's range; a missing end address yields a single-address
    /// range.
    pub fn set(&mut self, class: DebugClass, start: u16, end: Option<u16>) {
        self.ranges[class.index()] = match end {
            Some(end) => AddressRange::new(start, end),
            None => AddressRange::single(start),
        };
    }

    /// Enable a class over the full address space.
    pub fn enable_full(&mut self, class: DebugClass) {
        self.ranges[class.index()] = AddressRange::FULL;
    }

    pub fn disable(&mut self, class: DebugClass) {
        self.ranges[class.index()] = AddressRange::DISABLED;
    }

    pub fn disable_all(&mut self) {
        for range in self.ranges.iter_mut() {
            *range = AddressRange::DISABLED;
        }
    }

    /// Range membership test used by the execution engine per fetch or
    /// access.
    pub fn contains(&self, class: DebugClass, address: u16) -> bool {
        self.get(class).contains(address)
    }

    /// Render every class's current range, or "disabled", one line each.
    pub fn status(&self) -> String {
        let mut buffer = String::new();
        for class in DebugClass::ALL.iter() {
            let range = self.get(*class);
            if range.is_enabled() {
                writeln!(buffer, "\t{}\t{}", class.name(), range).unwrap();
            } else {
                writeln!(buffer, "\t{}\tdisabled", class.name()).unwrap();
            }
        }
        buffer
    }
}
