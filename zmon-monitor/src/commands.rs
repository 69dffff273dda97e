// This file is part of zmon.
// Copyright (c) 2026 The zmon project developers. All rights reserved.
// Licensed under the MIT license. See LICENSE file in the project root for full license text.

use std::cmp;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Error, ErrorKind, Seek, SeekFrom, Write};

use zmon_core::baud::select_divisor;
use zmon_core::{DebugClass, DebugRangeSet};

use crate::monitor::{fs_text, Monitor, Target, COMMANDS};
use crate::parse;
use crate::transfer::{self, FillPattern, CHUNK_SIZE};

// ---------------------------------------------------------------------------
// Memory commands
// ---------------------------------------------------------------------------

pub(crate) fn dump(m: &mut Monitor, args: &[&str]) -> io::Result<()> {
    dump_range(m, Target::Bus, args)
}

pub(crate) fn vdump(m: &mut Monitor, args: &[&str]) -> io::Result<()> {
    dump_range(m, Target::Video, args)
}

fn dump_range(m: &mut Monitor, target: Target, args: &[&str]) -> io::Result<()> {
    if args.len() < 2 {
        writeln!(m.output, "usage: {} <start> [end]", args[0])?;
        return Ok(());
    }
    let start = parse::hex_u16(args[1])?;
    let end = match args.get(2) {
        Some(value) => parse::hex_u16(value)?,
        None => cmp::min(u32::from(start) + 0xff, 0xffff) as u16,
    };
    let (tgt, out) = m.target_and_out(target)?;
    let mut row = [0u8; 16];
    // rows are 16-byte aligned
    let mut addr = u32::from(start) & !0xf;
    while addr <= u32::from(end) {
        tgt.read(addr as u16, &mut row);
        write!(out, "{:04x} ", addr)?;
        for byte in row.iter() {
            write!(out, " {:02x}", byte)?;
        }
        write!(out, "  ")?;
        for byte in row.iter() {
            let ch = if byte.is_ascii_graphic() || *byte == b' ' {
                *byte as char
            } else {
                '.'
            };
            write!(out, "{}", ch)?;
        }
        writeln!(out)?;
        addr += 16;
    }
    Ok(())
}

pub(crate) fn fill(m: &mut Monitor, args: &[&str]) -> io::Result<()> {
    fill_range(m, Target::Bus, args)
}

pub(crate) fn vfill(m: &mut Monitor, args: &[&str]) -> io::Result<()> {
    fill_range(m, Target::Video, args)
}

fn fill_range(m: &mut Monitor, target: Target, args: &[&str]) -> io::Result<()> {
    if args.len() < 4 {
        writeln!(m.output, "usage: {} <start> <end> <value|asc|desc>", args[0])?;
        return Ok(());
    }
    let start = parse::hex_u16(args[1])?;
    let end = parse::hex_u16(args[2])?;
    let pattern = parse_pattern(args[3])?;
    let (tgt, _) = m.target_and_out(target)?;
    transfer::fill(tgt, start, end, &pattern)?;
    Ok(())
}

pub(crate) fn verify(m: &mut Monitor, args: &[&str]) -> io::Result<()> {
    if args.len() < 4 {
        writeln!(m.output, "usage: verify <start> <end> <value|asc|desc>")?;
        return Ok(());
    }
    let start = parse::hex_u16(args[1])?;
    let end = parse::hex_u16(args[2])?;
    let pattern = parse_pattern(args[3])?;
    // Tile the pattern over the whole range, matching how fill lays it down
    // chunk by chunk.
    let chunk = pattern.build();
    let total = if start <= end {
        usize::from(end - start) + 1
    } else {
        0
    };
    let mut reference = Vec::with_capacity(total);
    while reference.len() < total {
        let take = cmp::min(CHUNK_SIZE, total - reference.len());
        reference.extend_from_slice(&chunk[..take]);
    }
    let (tgt, out) = m.target_and_out(Target::Bus)?;
    let mismatches = transfer::verify(tgt, start, end, &reference, Some(&mut *out))?;
    writeln!(out, "{} mismatches", mismatches)?;
    Ok(())
}

fn parse_pattern(token: &str) -> io::Result<FillPattern> {
    match token {
        "asc" => Ok(FillPattern::Ascending),
        "desc" => Ok(FillPattern::Descending),
        value => Ok(FillPattern::Value(parse::hex_u8(value)?)),
    }
}

pub(crate) fn poke(m: &mut Monitor, args: &[&str]) -> io::Result<()> {
    if args.len() < 2 {
        writeln!(m.output, "usage: poke <start> [value]")?;
        return Ok(());
    }
    let mut addr = parse::hex_u16(args[1])?;
    if let Some(value) = args.get(2) {
        let value = parse::hex_u8(value)?;
        return m.bus.write(addr, &[value]);
    }
    let Monitor {
        bus,
        input,
        output,
        ..
    } = m;
    writeln!(
        output,
        "enter valid hex to replace; blank to leave unchanged; 'x' to exit."
    )?;
    let mut line = String::new();
    loop {
        let mut byte = [0u8; 1];
        bus.read(addr, &mut byte);
        write!(output, "{:04x}={:02x} : ", addr, byte[0])?;
        output.flush()?;
        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let token = line.trim();
        if token == "x" {
            break;
        }
        if !token.is_empty() {
            match parse::hex_u8(token) {
                Ok(value) => bus.write(addr, &[value])?,
                Err(_) => break,
            }
        }
        addr = addr.wrapping_add(1);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// File transfer commands
// ---------------------------------------------------------------------------

pub(crate) fn loadbin(m: &mut Monitor, args: &[&str]) -> io::Result<()> {
    load_file(m, Target::Bus, args)
}

pub(crate) fn vload(m: &mut Monitor, args: &[&str]) -> io::Result<()> {
    load_file(m, Target::Video, args)
}

pub(crate) fn flash_load(m: &mut Monitor, args: &[&str]) -> io::Result<()> {
    load_file(m, Target::Flash, args)
}

fn load_file(m: &mut Monitor, target: Target, args: &[&str]) -> io::Result<()> {
    if args.len() < 3 {
        writeln!(m.output, "usage: {} <start> <filename> [offset] [count]", args[0])?;
        return Ok(());
    }
    let start = parse::hex_u16(args[1])?;
    let filename = args[2];
    let offset = match args.get(3) {
        Some(value) => u64::from(parse::hex_u16(value)?),
        None => 0,
    };
    let limit = match args.get(4) {
        Some(value) => u32::from(parse::hex_u16(value)?),
        None => u32::max_value(),
    };
    let mut file = match File::open(filename) {
        Ok(file) => file,
        Err(err) => {
            writeln!(m.output, "error opening file: {}", fs_text(&err))?;
            return Ok(());
        }
    };
    if offset > 0 {
        if let Err(err) = file.seek(SeekFrom::Start(offset)) {
            writeln!(m.output, "seek error: {}", fs_text(&err))?;
            return Ok(());
        }
    }
    let (tgt, out) = m.target_and_out(target)?;
    match transfer::load(tgt, start, &mut file, limit) {
        Ok(total) => writeln!(out, "loaded {} bytes from {}", total, filename)?,
        Err(err) => writeln!(out, "read error: {}", fs_text(&err))?,
    }
    Ok(())
}

pub(crate) fn savebin(m: &mut Monitor, args: &[&str]) -> io::Result<()> {
    if args.len() < 4 {
        writeln!(m.output, "usage: savebin <start> <end> <filename>")?;
        return Ok(());
    }
    let start = parse::hex_u16(args[1])?;
    let end = parse::hex_u16(args[2])?;
    let filename = args[3];
    let mut file = match File::create(filename) {
        Ok(file) => file,
        Err(err) => {
            writeln!(m.output, "error opening file: {}", fs_text(&err))?;
            return Ok(());
        }
    };
    let (tgt, out) = m.target_and_out(Target::Bus)?;
    match transfer::save(tgt, start, end, &mut file) {
        Ok(total) => writeln!(out, "saved {} bytes to {}", total, filename)?,
        Err(err) => writeln!(out, "write error: {}", fs_text(&err))?,
    }
    Ok(())
}

pub(crate) fn loadhex(m: &mut Monitor, args: &[&str]) -> io::Result<()> {
    let Monitor {
        bus,
        hex,
        input,
        output,
        ..
    } = m;
    let summary = match args.get(1) {
        Some(filename) => match File::open(filename) {
            Ok(file) => hex.load(&mut **bus, &mut BufReader::new(file)),
            Err(err) => {
                writeln!(output, "error opening file: {}", fs_text(&err))?;
                return Ok(());
            }
        },
        None => {
            writeln!(output, "loading from console; enter blank line to cancel")?;
            output.flush()?;
            hex.load(&mut **bus, &mut **input)
        }
    };
    let summary = summary?;
    writeln!(
        output,
        "loaded {} bytes to {:04x}-{:04x} with {} errors",
        summary.total, summary.min, summary.max, summary.errors
    )?;
    Ok(())
}

pub(crate) fn savehex(m: &mut Monitor, args: &[&str]) -> io::Result<()> {
    if args.len() < 3 {
        writeln!(m.output, "usage: savehex <start> <end> [filename]")?;
        return Ok(());
    }
    let start = parse::hex_u16(args[1])?;
    let end = parse::hex_u16(args[2])?;
    let Monitor {
        bus, hex, output, ..
    } = m;
    match args.get(3) {
        Some(filename) => match File::create(filename) {
            Ok(mut file) => hex.save(&mut **bus, start, end, &mut file)?,
            Err(err) => writeln!(output, "error opening file: {}", fs_text(&err))?,
        },
        None => hex.save(&mut **bus, start, end, &mut **output)?,
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Flash commands
// ---------------------------------------------------------------------------

pub(crate) fn erase(m: &mut Monitor, args: &[&str]) -> io::Result<()> {
    if args.len() != 2 {
        writeln!(m.output, "usage: erase <address|all>")?;
        return Ok(());
    }
    let flash = match m.flash.as_deref_mut() {
        Some(flash) => flash,
        None => return Err(Error::new(ErrorKind::Other, "flash storage not present")),
    };
    if args[1] == "all" {
        flash.erase_chip()?;
    } else {
        let address = parse::hex_u16(args[1])?;
        flash.erase_sector(address)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Execution commands
// ---------------------------------------------------------------------------

pub(crate) fn run(m: &mut Monitor, args: &[&str]) -> io::Result<()> {
    if let Some(value) = args.get(1) {
        let address = parse::hex_u16(value)?;
        info!(target: "monitor", "running at {:04x}", address);
        m.cpu.reset(address);
    }
    m.cpu.run();
    Ok(())
}

pub(crate) fn reset(m: &mut Monitor, args: &[&str]) -> io::Result<()> {
    let vector = match args.get(1) {
        Some(value) => parse::hex_u16(value)?,
        None => 0,
    };
    m.cpu.reset(vector);
    Ok(())
}

pub(crate) fn debug(m: &mut Monitor, args: &[&str]) -> io::Result<()> {
    if let Some(value) = args.get(1) {
        let address = parse::hex_u16(value)?;
        m.cpu.reset(address);
    }
    m.cpu.debug(0);
    Ok(())
}

pub(crate) fn step(m: &mut Monitor, args: &[&str]) -> io::Result<()> {
    let cycles = match args.get(1) {
        Some(value) => parse::dec_u32(value)?,
        None => 1,
    };
    m.cpu.debug(cycles);
    Ok(())
}

pub(crate) fn bus(m: &mut Monitor, _args: &[&str]) -> io::Result<()> {
    let status = m.cpu.bus_status();
    writeln!(m.output, "{}", status)?;
    Ok(())
}

pub(crate) fn disasm(m: &mut Monitor, args: &[&str]) -> io::Result<()> {
    if args.len() < 2 {
        writeln!(m.output, "usage: disasm <start> [end]")?;
        return Ok(());
    }
    let start = parse::hex_u16(args[1])?;
    let end = match args.get(2) {
        Some(value) => parse::hex_u16(value)?,
        None => cmp::min(u32::from(start) + 0xf, 0xffff) as u16,
    };
    let Monitor {
        bus,
        disasm,
        output,
        ..
    } = m;
    disasm.disassemble(&mut **bus, start, end, &mut **output)
}

// ---------------------------------------------------------------------------
// Breakpoints and watchpoints
// ---------------------------------------------------------------------------

pub(crate) fn break_(m: &mut Monitor, args: &[&str]) -> io::Result<()> {
    let Monitor {
        breaks, output, ..
    } = m;
    breakwatch(breaks, &mut **output, args)
}

pub(crate) fn watch(m: &mut Monitor, args: &[&str]) -> io::Result<()> {
    let Monitor {
        watches, output, ..
    } = m;
    breakwatch(watches, &mut **output, args)
}

fn breakwatch(set: &mut DebugRangeSet, out: &mut dyn Write, args: &[&str]) -> io::Result<()> {
    if args.len() == 1 {
        write!(out, "{}", set.status())?;
        writeln!(out, "usage: {} <type> [start] [end]", set.label())?;
        return Ok(());
    }
    if args[1] == "off" {
        set.disable_all();
        return Ok(());
    }
    let class = match DebugClass::from_name(args[1]) {
        Some(class) => class,
        None => {
            writeln!(out, "error: unknown type {}", args[1])?;
            return Ok(());
        }
    };
    if args.len() == 2 {
        set.enable_full(class);
    } else if args[2] == "off" {
        set.disable(class);
    } else {
        let start = parse::hex_u16(args[2])?;
        let end = match args.get(3) {
            Some(value) => Some(parse::hex_u16(value)?),
            None => None,
        };
        set.set(class, start, end);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Disk commands
// ---------------------------------------------------------------------------

pub(crate) fn mount(m: &mut Monitor, args: &[&str]) -> io::Result<()> {
    if args.len() != 3 {
        writeln!(m.output, "usage: mount <drive> <filename>")?;
        return Ok(());
    }
    let drive = parse::dec_u8(args[1])?;
    if let Err(err) = m.drives.mount(drive, args[2]) {
        writeln!(m.output, "error mounting drive: {}", fs_text(&err))?;
    }
    Ok(())
}

pub(crate) fn unmount(m: &mut Monitor, args: &[&str]) -> io::Result<()> {
    if args.len() != 2 {
        writeln!(m.output, "usage: unmount <drive>")?;
        return Ok(());
    }
    let drive = parse::dec_u8(args[1])?;
    if let Err(err) = m.drives.unmount(drive) {
        writeln!(m.output, "error unmounting drive: {}", fs_text(&err))?;
    }
    Ok(())
}

pub(crate) fn boot(m: &mut Monitor, args: &[&str]) -> io::Result<()> {
    if let Some(filename) = args.get(1) {
        if let Err(err) = m.drives.mount(0, filename) {
            writeln!(m.output, "error mounting drive: {}", fs_text(&err))?;
            return Ok(());
        }
    }
    match m.drives.boot_load() {
        Ok(true) => {
            info!(target: "monitor", "booting from drive 0");
            m.cpu.reset(0);
            m.cpu.run();
        }
        Ok(false) => writeln!(m.output, "no boot signature found")?,
        Err(err) => writeln!(m.output, "error booting drive: {}", fs_text(&err))?,
    }
    Ok(())
}

pub(crate) fn dir(m: &mut Monitor, args: &[&str]) -> io::Result<()> {
    let path = args.get(1).copied().unwrap_or(".");
    let entries = match fs::read_dir(path) {
        Ok(entries) => entries,
        Err(err) => {
            writeln!(m.output, "error reading directory: {}", fs_text(&err))?;
            return Ok(());
        }
    };
    let mut count = 0usize;
    for entry in entries {
        let entry = entry?;
        let mut name = entry.file_name().to_string_lossy().into_owned();
        if entry.file_type()?.is_dir() {
            name.push('/');
        }
        write!(m.output, "{:<14} ", name)?;
        count += 1;
        if count % 5 == 0 {
            writeln!(m.output)?;
        }
    }
    if count % 5 != 0 {
        writeln!(m.output)?;
    }
    writeln!(m.output, "{} item(s)", count)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Hardware commands
// ---------------------------------------------------------------------------

pub(crate) fn baud(m: &mut Monitor, args: &[&str]) -> io::Result<()> {
    if args.len() != 3 {
        writeln!(m.output, "usage: baud <uart> <rate>")?;
        return Ok(());
    }
    let uart = parse::dec_u8(args[1])? & 1;
    let rate = parse::dec_u32(args[2])?;
    let selection = select_divisor(m.clock_rate, rate);
    m.uart.set_divisor(uart, selection.divisor)?;
    writeln!(
        m.output,
        "UART {}: requested: {}, actual: {}",
        uart, rate, selection.actual
    )?;
    Ok(())
}

pub(crate) fn port_in(m: &mut Monitor, args: &[&str]) -> io::Result<()> {
    if args.len() != 2 {
        writeln!(m.output, "usage: in <port>")?;
        return Ok(());
    }
    let port = parse::hex_u8(args[1])?;
    let value = m.ports.input(port);
    writeln!(m.output, "read {:02x} from {:02x}", value, port)?;
    Ok(())
}

pub(crate) fn port_out(m: &mut Monitor, args: &[&str]) -> io::Result<()> {
    if args.len() != 3 {
        writeln!(m.output, "usage: out <port> <value>")?;
        return Ok(());
    }
    let port = parse::hex_u8(args[1])?;
    let value = parse::hex_u8(args[2])?;
    m.ports.output(port, value);
    Ok(())
}

// ---------------------------------------------------------------------------
// Console commands
// ---------------------------------------------------------------------------

pub(crate) fn cls(m: &mut Monitor, _args: &[&str]) -> io::Result<()> {
    write!(m.output, "\x1b[0m\x1b[;H\x1b[2J")?;
    m.output.flush()
}

pub(crate) fn help(m: &mut Monitor, _args: &[&str]) -> io::Result<()> {
    for entry in COMMANDS.iter() {
        writeln!(m.output, "{}\t{}", entry.name, entry.help)?;
    }
    Ok(())
}

pub(crate) fn do_file(m: &mut Monitor, args: &[&str]) -> io::Result<()> {
    if args.len() != 2 {
        writeln!(m.output, "usage: do <filename>")?;
        return Ok(());
    }
    m.exec_file(args[1])
}
