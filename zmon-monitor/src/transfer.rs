// This file is part of zmon.
// Copyright (c) 2026 The zmon project developers. All rights reserved.
// Licensed under the MIT license. See LICENSE file in the project root for full license text.

//! Chunked streaming transfers between a memory target and a byte source or
//! sink. The chunk size bounds buffer usage and is the unit of
//! partial-failure granularity; targets do not guarantee atomicity across
//! their internal page boundaries.

use std::io::{self, Read, Write};

use zmon_core::MemoryTarget;

pub const CHUNK_SIZE: usize = 256;

/// Fill pattern for one 256-byte chunk.
pub enum FillPattern {
    Value(u8),
    Ascending,
    Descending,
}

impl FillPattern {
    /// Build the 256-byte pattern buffer tiled across the fill range.
    pub fn build(&self) -> [u8; CHUNK_SIZE] {
        let mut buf = [0u8; CHUNK_SIZE];
        match self {
            FillPattern::Value(value) => {
                for byte in buf.iter_mut() {
                    *byte = *value;
                }
            }
            FillPattern::Ascending => {
                for (i, byte) in buf.iter_mut().enumerate() {
                    *byte = i as u8;
                }
            }
            FillPattern::Descending => {
                for (i, byte) in buf.iter_mut().enumerate() {
                    *byte = 255 - i as u8;
                }
            }
        }
        buf
    }
}

/// Number of bytes in the inclusive range, zero when start > end.
fn span(start: u16, end: u16) -> u32 {
    if start > end {
        0
    } else {
        u32::from(end - start) + 1
    }
}

/// Copy from a byte source into a target, up to `limit` bytes, advancing
/// from `start`. The first short read terminates the transfer even when
/// length budget remains; the return value is the byte count actually
/// transferred, which may be less than the limit.
pub fn load(
    target: &mut dyn MemoryTarget,
    start: u16,
    source: &mut dyn Read,
    limit: u32,
) -> io::Result<u32> {
    let mut buf = [0u8; CHUNK_SIZE];
    let mut addr = start;
    let mut total = 0u32;
    let mut remaining = limit;
    while remaining > 0 {
        let count = source.read(&mut buf)?;
        if count == 0 {
            break;
        }
        let count = count.min(remaining as usize);
        target.write(addr, &buf[..count])?;
        addr = addr.wrapping_add(count as u16);
        total += count as u32;
        remaining -= count as u32;
        if count < CHUNK_SIZE {
            break;
        }
    }
    Ok(total)
}

/// Copy `[start, end]` inclusive from a target into a byte sink. A sink
/// write failure aborts immediately, leaving the sink partially written.
pub fn save(
    target: &mut dyn MemoryTarget,
    start: u16,
    end: u16,
    sink: &mut dyn Write,
) -> io::Result<u32> {
    let mut buf = [0u8; CHUNK_SIZE];
    let mut addr = start;
    let mut remaining = span(start, end);
    let mut total = 0u32;
    while remaining > 0 {
        let count = remaining.min(CHUNK_SIZE as u32) as usize;
        target.read(addr, &mut buf[..count]);
        sink.write_all(&buf[..count])?;
        addr = addr.wrapping_add(count as u16);
        total += count as u32;
        remaining -= count as u32;
    }
    Ok(total)
}

/// Compare `[start, end]` against a reference buffer covering the span
/// (index 0 corresponds to `start`). Mismatches are counted, optionally
/// logged per address, and are not errors; zero means verified.
pub fn verify(
    target: &mut dyn MemoryTarget,
    start: u16,
    end: u16,
    reference: &[u8],
    mut log: Option<&mut dyn Write>,
) -> io::Result<usize> {
    let total = span(start, end);
    if (reference.len() as u32) < total {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "reference buffer does not cover the range",
        ));
    }
    let mut buf = [0u8; CHUNK_SIZE];
    let mut addr = start;
    let mut pos = 0usize;
    let mut remaining = total;
    let mut mismatches = 0usize;
    while remaining > 0 {
        let count = remaining.min(CHUNK_SIZE as u32) as usize;
        target.read(addr, &mut buf[..count]);
        for (i, actual) in buf[..count].iter().enumerate() {
            let expected = reference[pos + i];
            if expected != *actual {
                mismatches += 1;
                if let Some(out) = log.as_mut() {
                    writeln!(
                        out,
                        "{:04x}: expected {:02x} but read {:02x}",
                        addr.wrapping_add(i as u16),
                        expected,
                        actual
                    )?;
                }
            }
        }
        addr = addr.wrapping_add(count as u16);
        pos += count;
        remaining -= count as u32;
    }
    Ok(mismatches)
}

/// Tile a fill pattern across `[start, end]`. Every chunk before the last
/// is the full 256-byte pattern; the final chunk is shrunk to the remaining
/// length and issued as a single write to the one selected target.
pub fn fill(
    target: &mut dyn MemoryTarget,
    start: u16,
    end: u16,
    pattern: &FillPattern,
) -> io::Result<u32> {
    let buf = pattern.build();
    let mut addr = start;
    let mut remaining = span(start, end);
    let mut total = 0u32;
    while remaining > 0 {
        let count = remaining.min(CHUNK_SIZE as u32) as usize;
        target.write(addr, &buf[..count])?;
        addr = addr.wrapping_add(count as u16);
        total += count as u32;
        remaining -= count as u32;
    }
    Ok(total)
}
