// This file is part of zmon.
// Copyright (c) 2026 The zmon project developers. All rights reserved.
// Licensed under the MIT license. See LICENSE file in the project root for full license text.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Error, ErrorKind, Write};

use zmon_core::{
    Cpu, DebugRangeSet, Disassembler, DriveController, FlashTarget, HexCodec, MemoryTarget,
    PortIo, Uart,
};

use crate::commands;

/// Maximum number of whitespace-separated tokens per command line.
pub const MAX_TOKENS: usize = 8;

pub const PROMPT: &str = "zmon>";

/// Bootstrap command file attempted once at startup; its absence is not an
/// error.
pub const AUTOEXEC: &str = "autoexec.mon";

pub type Handler = fn(&mut Monitor, &[&str]) -> io::Result<()>;

/// One command-table record. Name, help text and handler travel together so
/// the table cannot skew.
pub struct CmdEntry {
    pub name: &'static str,
    pub help: &'static str,
    pub handler: Handler,
}

/// The static command table, matched by exact case-sensitive name. Target
/// selection for memory commands is bound here, per entry, through
/// dedicated handler wrappers rather than inferred from the command name at
/// dispatch time.
pub(crate) const COMMANDS: &[CmdEntry] = &[
    CmdEntry { name: "baud", help: "configure UART baud rate", handler: commands::baud },
    CmdEntry { name: "boot", help: "boot from specified disk image", handler: commands::boot },
    CmdEntry { name: "break", help: "set breakpoints", handler: commands::break_ },
    CmdEntry { name: "bus", help: "display low-level bus status", handler: commands::bus },
    CmdEntry { name: "c", help: "shorthand to continue debugging", handler: commands::debug },
    CmdEntry { name: "cls", help: "clear screen", handler: commands::cls },
    CmdEntry { name: "debug", help: "debug code at address", handler: commands::debug },
    CmdEntry { name: "dir", help: "show directory listing", handler: commands::dir },
    CmdEntry { name: "disasm", help: "disassemble memory range", handler: commands::disasm },
    CmdEntry { name: "do", help: "execute a command file", handler: commands::do_file },
    CmdEntry { name: "dump", help: "dump memory in hex and ascii", handler: commands::dump },
    CmdEntry { name: "erase", help: "erase flash sector or chip", handler: commands::erase },
    CmdEntry { name: "fill", help: "fill memory with pattern", handler: commands::fill },
    CmdEntry { name: "flash", help: "load binary file to flash", handler: commands::flash_load },
    CmdEntry { name: "help", help: "list available commands", handler: commands::help },
    CmdEntry { name: "in", help: "read a value from an IO port", handler: commands::port_in },
    CmdEntry { name: "loadbin", help: "load binary file to memory", handler: commands::loadbin },
    CmdEntry { name: "loadhex", help: "load hex file to memory", handler: commands::loadhex },
    CmdEntry { name: "mount", help: "mount a disk image", handler: commands::mount },
    CmdEntry { name: "out", help: "write a value to an IO port", handler: commands::port_out },
    CmdEntry { name: "poke", help: "poke values into memory", handler: commands::poke },
    CmdEntry { name: "reset", help: "reset the processor, with optional vector", handler: commands::reset },
    CmdEntry { name: "run", help: "execute code at address", handler: commands::run },
    CmdEntry { name: "s", help: "shorthand for step", handler: commands::step },
    CmdEntry { name: "savebin", help: "save binary file from memory", handler: commands::savebin },
    CmdEntry { name: "savehex", help: "save hex file from memory", handler: commands::savehex },
    CmdEntry { name: "step", help: "step processor N cycles", handler: commands::step },
    CmdEntry { name: "unmount", help: "unmount a disk image", handler: commands::unmount },
    CmdEntry { name: "vdump", help: "dump video memory in hex and ascii", handler: commands::vdump },
    CmdEntry { name: "verify", help: "verify memory against fill pattern", handler: commands::verify },
    CmdEntry { name: "vfill", help: "fill video memory with pattern", handler: commands::vfill },
    CmdEntry { name: "vload", help: "load binary file to video memory", handler: commands::vload },
    CmdEntry { name: "watch", help: "set watch points", handler: commands::watch },
];

/// Memory target selected by a command-table entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Target {
    Bus,
    Flash,
    Video,
}

/// External collaborators and memory targets wired into the monitor at
/// startup. Flash and video are optional board features.
pub struct Devices {
    pub bus: Box<dyn MemoryTarget>,
    pub flash: Option<Box<dyn FlashTarget>>,
    pub video: Option<Box<dyn MemoryTarget>>,
    pub cpu: Box<dyn Cpu>,
    pub drives: Box<dyn DriveController>,
    pub hex: Box<dyn HexCodec>,
    pub disasm: Box<dyn Disassembler>,
    pub uart: Box<dyn Uart>,
    pub ports: Box<dyn PortIo>,
}

/// The interactive monitor. Single-threaded; each dispatched command runs
/// to completion before the next line is read.
pub struct Monitor {
    // Devices
    pub(crate) bus: Box<dyn MemoryTarget>,
    pub(crate) flash: Option<Box<dyn FlashTarget>>,
    pub(crate) video: Option<Box<dyn MemoryTarget>>,
    pub(crate) cpu: Box<dyn Cpu>,
    pub(crate) drives: Box<dyn DriveController>,
    pub(crate) hex: Box<dyn HexCodec>,
    pub(crate) disasm: Box<dyn Disassembler>,
    pub(crate) uart: Box<dyn Uart>,
    pub(crate) ports: Box<dyn PortIo>,
    // Configuration
    pub(crate) clock_rate: u32,
    // Debug range registries
    pub(crate) breaks: DebugRangeSet,
    pub(crate) watches: DebugRangeSet,
    // Console
    pub(crate) input: Box<dyn BufRead>,
    pub(crate) output: Box<dyn Write>,
}

impl Monitor {
    pub fn new(
        devices: Devices,
        input: Box<dyn BufRead>,
        output: Box<dyn Write>,
        clock_rate: u32,
    ) -> Self {
        Self {
            bus: devices.bus,
            flash: devices.flash,
            video: devices.video,
            cpu: devices.cpu,
            drives: devices.drives,
            hex: devices.hex,
            disasm: devices.disasm,
            uart: devices.uart,
            ports: devices.ports,
            clock_rate,
            breaks: DebugRangeSet::new("break"),
            watches: DebugRangeSet::new("watch"),
            input,
            output,
        }
    }

    /// Breakpoint registry, read-only view for the execution engine.
    pub fn breakpoints(&self) -> &DebugRangeSet {
        &self.breaks
    }

    /// Watchpoint registry, read-only view for the execution engine.
    pub fn watchpoints(&self) -> &DebugRangeSet {
        &self.watches
    }

    /// Main command loop. Runs the bootstrap command file first, then reads
    /// and dispatches one line at a time until the input is exhausted.
    pub fn run(&mut self) -> io::Result<()> {
        self.exec(AUTOEXEC, true)?;
        let mut buf = String::new();
        loop {
            write!(self.output, "{}", PROMPT)?;
            self.output.flush()?;
            buf.clear();
            if self.input.read_line(&mut buf)? == 0 {
                break;
            }
            self.dispatch(&buf)?;
        }
        Ok(())
    }

    /// Dispatch a single command line. User and I/O errors are reported to
    /// the console and never abort the loop; only console write failures
    /// propagate.
    pub fn dispatch(&mut self, line: &str) -> io::Result<()> {
        let args: Vec<&str> = line.split_whitespace().take(MAX_TOKENS).collect();
        if args.is_empty() {
            return Ok(());
        }
        match COMMANDS.iter().find(|entry| entry.name == args[0]) {
            Some(entry) => {
                debug!(target: "monitor", "dispatching {:?}", args);
                if let Err(err) = (entry.handler)(self, &args) {
                    writeln!(self.output, "error: {}", err)?;
                }
            }
            None => {
                writeln!(
                    self.output,
                    "unknown command: {}. type help for list.",
                    args[0]
                )?;
            }
        }
        Ok(())
    }

    /// Execute the commands in a file, echoing each line before dispatch.
    pub fn exec_file(&mut self, filename: &str) -> io::Result<()> {
        self.exec(filename, false)
    }

    fn exec(&mut self, filename: &str, bootstrap: bool) -> io::Result<()> {
        match File::open(filename) {
            Ok(file) => {
                info!(target: "monitor", "executing {}", filename);
                let reader = BufReader::new(file);
                for line in reader.lines() {
                    let line = line?;
                    writeln!(self.output, "{}>{}", filename, line)?;
                    self.dispatch(&line)?;
                }
                Ok(())
            }
            Err(ref err) if bootstrap && err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => {
                writeln!(self.output, "error opening file: {}", fs_text(&err))?;
                Ok(())
            }
        }
    }

    /// Resolve the memory target bound to a command entry, together with
    /// the console output. Optional targets report their absence.
    pub(crate) fn target_and_out(
        &mut self,
        target: Target,
    ) -> io::Result<(&mut dyn MemoryTarget, &mut dyn Write)> {
        let tgt: &mut dyn MemoryTarget = match target {
            Target::Bus => &mut *self.bus,
            Target::Flash => match self.flash.as_deref_mut() {
                Some(flash) => flash,
                None => return Err(Error::new(ErrorKind::Other, "flash storage not present")),
            },
            Target::Video => match self.video.as_deref_mut() {
                Some(video) => video,
                None => return Err(Error::new(ErrorKind::Other, "video memory not present")),
            },
        };
        Ok((tgt, &mut *self.output))
    }
}

/// Translate an I/O failure into the monitor's closed set of status
/// strings.
pub(crate) fn fs_text(err: &io::Error) -> &'static str {
    match err.kind() {
        ErrorKind::NotFound => "file not found",
        ErrorKind::PermissionDenied => "access denied",
        ErrorKind::AlreadyExists => "file already exists",
        ErrorKind::InvalidInput => "invalid parameter",
        ErrorKind::UnexpectedEof => "unexpected end of file",
        ErrorKind::WriteZero => "disk full",
        _ => "disk error",
    }
}
