// This file is part of zmon.
// Copyright (c) 2026 The zmon project developers. All rights reserved.
// Licensed under the MIT license. See LICENSE file in the project root for full license text.

use std::cell::RefCell;
use std::fs;
use std::io::{self, BufRead, Cursor, Write};
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Mutex;

use zmon_core::device::{Flash, Ram, VideoRam};
use zmon_core::{
    new_shared, BusStatus, Cpu, DebugClass, Disassembler, DriveController, HexCodec, HexSummary,
    MemoryTarget, PortIo, Shared, Uart,
};
use zmon_monitor::{Devices, Monitor};

#[derive(Clone)]
struct SharedBuf(Rc<RefCell<Vec<u8>>>);

impl SharedBuf {
    fn new() -> Self {
        SharedBuf(Rc::new(RefCell::new(Vec::new())))
    }

    fn text(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).unwrap()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

struct MockCpu {
    log: Rc<RefCell<Vec<String>>>,
}

impl Cpu for MockCpu {
    fn reset(&mut self, vector: u16) {
        self.log.borrow_mut().push(format!("reset {:04x}", vector));
    }

    fn run(&mut self) {
        self.log.borrow_mut().push("run".to_string());
    }

    fn debug(&mut self, cycle_budget: u32) {
        self.log
            .borrow_mut()
            .push(format!("debug {}", cycle_budget));
    }

    fn bus_status(&self) -> BusStatus {
        BusStatus {
            address: 0x1234,
            data: 0x56,
            control: 0,
        }
    }
}

struct MockDrives {
    log: Rc<RefCell<Vec<String>>>,
}

impl DriveController for MockDrives {
    fn mount(&mut self, drive: u8, path: &str) -> io::Result<()> {
        if path.ends_with("missing.img") {
            return Err(io::Error::new(io::ErrorKind::NotFound, "missing"));
        }
        self.log
            .borrow_mut()
            .push(format!("mount {} {}", drive, path));
        Ok(())
    }

    fn unmount(&mut self, drive: u8) -> io::Result<()> {
        self.log.borrow_mut().push(format!("unmount {}", drive));
        Ok(())
    }

    fn boot_load(&mut self) -> io::Result<bool> {
        Ok(false)
    }
}

struct DetachedHex;

impl HexCodec for DetachedHex {
    fn load(
        &mut self,
        _target: &mut dyn MemoryTarget,
        _input: &mut dyn BufRead,
    ) -> io::Result<HexSummary> {
        Err(io::Error::new(io::ErrorKind::Other, "no hex codec attached"))
    }

    fn save(
        &mut self,
        _target: &mut dyn MemoryTarget,
        _start: u16,
        _end: u16,
        _output: &mut dyn Write,
    ) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::Other, "no hex codec attached"))
    }
}

struct EchoDisasm;

impl Disassembler for EchoDisasm {
    fn disassemble(
        &mut self,
        target: &mut dyn MemoryTarget,
        start: u16,
        _end: u16,
        out: &mut dyn Write,
    ) -> io::Result<()> {
        let mut byte = [0u8; 1];
        target.read(start, &mut byte);
        writeln!(out, "{:04x}  {:02x}", start, byte[0])
    }
}

struct MockUart {
    log: Rc<RefCell<Vec<(u8, u16)>>>,
}

impl Uart for MockUart {
    fn set_divisor(&mut self, port: u8, divisor: u16) -> io::Result<()> {
        self.log.borrow_mut().push((port, divisor));
        Ok(())
    }
}

struct LatchPorts {
    latch: [u8; 256],
}

impl PortIo for LatchPorts {
    fn input(&mut self, port: u8) -> u8 {
        self.latch[usize::from(port)]
    }

    fn output(&mut self, port: u8, value: u8) {
        self.latch[usize::from(port)] = value;
    }
}

struct Bench {
    monitor: Monitor,
    ram: Shared<Ram>,
    flash: Shared<Flash>,
    video: Shared<VideoRam>,
    out: SharedBuf,
    cpu_log: Rc<RefCell<Vec<String>>>,
    uart_log: Rc<RefCell<Vec<(u8, u16)>>>,
    drive_log: Rc<RefCell<Vec<String>>>,
}

fn bench(input: &str) -> Bench {
    let ram = new_shared(Ram::new(0x10000));
    let flash = new_shared(Flash::new(0x8000));
    let video = new_shared(VideoRam::new(0x4000));
    let out = SharedBuf::new();
    let cpu_log = Rc::new(RefCell::new(Vec::new()));
    let uart_log = Rc::new(RefCell::new(Vec::new()));
    let drive_log = Rc::new(RefCell::new(Vec::new()));
    let devices = Devices {
        bus: Box::new(ram.clone()),
        flash: Some(Box::new(flash.clone())),
        video: Some(Box::new(video.clone())),
        cpu: Box::new(MockCpu {
            log: cpu_log.clone(),
        }),
        drives: Box::new(MockDrives {
            log: drive_log.clone(),
        }),
        hex: Box::new(DetachedHex),
        disasm: Box::new(EchoDisasm),
        uart: Box::new(MockUart {
            log: uart_log.clone(),
        }),
        ports: Box::new(LatchPorts { latch: [0; 256] }),
    };
    let monitor = Monitor::new(
        devices,
        Box::new(Cursor::new(input.as_bytes().to_vec())),
        Box::new(out.clone()),
        20_000_000,
    );
    Bench {
        monitor,
        ram,
        flash,
        video,
        out,
        cpu_log,
        uart_log,
        drive_log,
    }
}

fn bench_bare(input: &str) -> Bench {
    let mut bench = bench(input);
    let devices = Devices {
        bus: Box::new(bench.ram.clone()),
        flash: None,
        video: None,
        cpu: Box::new(MockCpu {
            log: bench.cpu_log.clone(),
        }),
        drives: Box::new(MockDrives {
            log: bench.drive_log.clone(),
        }),
        hex: Box::new(DetachedHex),
        disasm: Box::new(EchoDisasm),
        uart: Box::new(MockUart {
            log: bench.uart_log.clone(),
        }),
        ports: Box::new(LatchPorts { latch: [0; 256] }),
    };
    bench.monitor = Monitor::new(
        devices,
        Box::new(Cursor::new(input.as_bytes().to_vec())),
        Box::new(bench.out.clone()),
        20_000_000,
    );
    bench
}

fn ram_byte(ram: &Shared<Ram>, address: u16) -> u8 {
    let mut buf = [0u8; 1];
    ram.borrow_mut().read(address, &mut buf);
    buf[0]
}

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("zmon-test-{}-{}", std::process::id(), name))
}

// Tests that call Monitor::run depend on the working directory for the
// startup command file, so they take this lock.
static CWD_LOCK: Mutex<()> = Mutex::new(());

#[test]
fn fill_writes_pattern_to_bus() {
    let mut bench = bench("");
    bench.monitor.dispatch("fill 0000 001f aa").unwrap();
    for addr in 0x0000..=0x001f {
        assert_eq!(0xaa, ram_byte(&bench.ram, addr));
    }
    assert_eq!(0x00, ram_byte(&bench.ram, 0x0020));
}

#[test]
fn vfill_ascending_writes_to_video_only() {
    let mut bench = bench("");
    bench.monitor.dispatch("vfill 0000 00ff asc").unwrap();
    let mut buf = [0u8; 4];
    bench.video.borrow_mut().read(0x0000, &mut buf);
    assert_eq!([0x00, 0x01, 0x02, 0x03], buf);
    assert_eq!(0x00, ram_byte(&bench.ram, 0x0000));
}

#[test]
fn dump_renders_hex_and_ascii() {
    let mut bench = bench("");
    bench
        .ram
        .borrow_mut()
        .write(0x0100, b"Hello")
        .unwrap();
    bench.monitor.dispatch("dump 0100 010f").unwrap();
    let text = bench.out.text();
    assert!(text.contains("0100  48 65 6c 6c 6f"));
    assert!(text.contains("Hello"));
}

#[test]
fn dump_aligns_start_to_row() {
    let mut bench = bench("");
    bench.monitor.dispatch("dump 0105 0107").unwrap();
    assert!(bench.out.text().starts_with("0100 "));
}

#[test]
fn verify_reports_each_mismatch_and_count() {
    let mut bench = bench("");
    bench.monitor.dispatch("fill 0000 00ff 55").unwrap();
    bench.ram.borrow_mut().write(0x0002, &[0x56]).unwrap();
    bench.monitor.dispatch("verify 0000 00ff 55").unwrap();
    let text = bench.out.text();
    assert!(text.contains("0002: expected 55 but read 56"));
    assert!(text.contains("1 mismatches"));
}

#[test]
fn verify_clean_range_reports_zero() {
    let mut bench = bench("");
    bench.monitor.dispatch("fill 2000 21ff desc").unwrap();
    bench.monitor.dispatch("verify 2000 21ff desc").unwrap();
    assert!(bench.out.text().contains("0 mismatches"));
}

#[test]
fn missing_video_target_is_reported() {
    let mut bench = bench_bare("");
    bench.monitor.dispatch("vdump 0000").unwrap();
    assert!(bench.out.text().contains("error: video memory not present"));
}

#[test]
fn missing_flash_target_is_reported() {
    let mut bench = bench_bare("");
    bench.monitor.dispatch("erase all").unwrap();
    assert!(bench.out.text().contains("error: flash storage not present"));
}

#[test]
fn loadbin_copies_file_into_memory() {
    let path = temp_path("loadbin.bin");
    fs::write(&path, [0xde, 0xad, 0xbe, 0xef]).unwrap();
    let mut bench = bench("");
    bench
        .monitor
        .dispatch(&format!("loadbin 0200 {}", path.display()))
        .unwrap();
    fs::remove_file(&path).unwrap();
    assert_eq!(0xde, ram_byte(&bench.ram, 0x0200));
    assert_eq!(0xef, ram_byte(&bench.ram, 0x0203));
    assert!(bench.out.text().contains("loaded 4 bytes from"));
}

#[test]
fn loadbin_offset_and_count_are_hex() {
    let path = temp_path("loadbin-window.bin");
    let data: Vec<u8> = (0..0x40).collect();
    fs::write(&path, data).unwrap();
    let mut bench = bench("");
    // offset 10 means 0x10, not decimal ten
    bench
        .monitor
        .dispatch(&format!("loadbin 0300 {} 10 4", path.display()))
        .unwrap();
    fs::remove_file(&path).unwrap();
    assert_eq!(0x10, ram_byte(&bench.ram, 0x0300));
    assert_eq!(0x13, ram_byte(&bench.ram, 0x0303));
    assert_eq!(0x00, ram_byte(&bench.ram, 0x0304));
    assert!(bench.out.text().contains("loaded 4 bytes from"));
}

#[test]
fn loadbin_offset_accepts_hex_digits() {
    let path = temp_path("loadbin-hexoff.bin");
    let data: Vec<u8> = (0..0x10).collect();
    fs::write(&path, data).unwrap();
    let mut bench = bench("");
    bench
        .monitor
        .dispatch(&format!("loadbin 0400 {} a", path.display()))
        .unwrap();
    fs::remove_file(&path).unwrap();
    assert_eq!(0x0a, ram_byte(&bench.ram, 0x0400));
    assert!(bench.out.text().contains("loaded 6 bytes from"));
    assert!(!bench.out.text().contains("invalid number"));
}

#[test]
fn loadbin_missing_file_is_reported() {
    let mut bench = bench("");
    bench
        .monitor
        .dispatch("loadbin 0000 no-such-file.bin")
        .unwrap();
    assert!(bench
        .out
        .text()
        .contains("error opening file: file not found"));
}

#[test]
fn savebin_writes_range_to_file() {
    let path = temp_path("savebin.bin");
    let mut bench = bench("");
    bench.monitor.dispatch("fill 0010 001f a5").unwrap();
    bench
        .monitor
        .dispatch(&format!("savebin 0010 001f {}", path.display()))
        .unwrap();
    let data = fs::read(&path).unwrap();
    fs::remove_file(&path).unwrap();
    assert_eq!(vec![0xa5; 16], data);
    assert!(bench.out.text().contains("saved 16 bytes to"));
}

#[test]
fn detached_hex_codec_reports_error() {
    let mut bench = bench("");
    bench.monitor.dispatch("savehex 0000 000f").unwrap();
    assert!(bench.out.text().contains("error: no hex codec attached"));
}

#[test]
fn erase_all_restores_flash_to_blank() {
    let mut bench = bench("");
    bench
        .flash
        .borrow_mut()
        .write(0x0000, &[0x12, 0x34])
        .unwrap();
    bench.monitor.dispatch("erase all").unwrap();
    let mut buf = [0u8; 2];
    bench.flash.borrow_mut().read(0x0000, &mut buf);
    assert_eq!([0xff, 0xff], buf);
}

#[test]
fn flash_command_loads_into_flash_not_bus() {
    let path = temp_path("flash.bin");
    fs::write(&path, [0x5a, 0xa5]).unwrap();
    let mut bench = bench("");
    bench
        .monitor
        .dispatch(&format!("flash 1000 {}", path.display()))
        .unwrap();
    fs::remove_file(&path).unwrap();
    let mut buf = [0u8; 2];
    bench.flash.borrow_mut().read(0x1000, &mut buf);
    assert_eq!([0x5a, 0xa5], buf);
    assert_eq!(0x00, ram_byte(&bench.ram, 0x1000));
}

#[test]
fn breakpoints_and_watchpoints_are_independent() {
    let mut bench = bench("");
    bench.monitor.dispatch("break opfetch 0100 01ff").unwrap();
    bench.monitor.dispatch("watch memwr 8000").unwrap();
    assert!(bench
        .monitor
        .breakpoints()
        .contains(DebugClass::OpFetch, 0x0180));
    assert!(!bench
        .monitor
        .watchpoints()
        .contains(DebugClass::OpFetch, 0x0180));
    assert!(bench
        .monitor
        .watchpoints()
        .contains(DebugClass::MemWrite, 0x8000));
    assert!(!bench
        .monitor
        .watchpoints()
        .contains(DebugClass::MemWrite, 0x8001));
}

#[test]
fn break_off_disables_every_class() {
    let mut bench = bench("");
    bench.monitor.dispatch("break opfetch").unwrap();
    bench.monitor.dispatch("break memrd 0000 ffff").unwrap();
    bench.monitor.dispatch("break off").unwrap();
    assert!(!bench
        .monitor
        .breakpoints()
        .contains(DebugClass::OpFetch, 0x0000));
    assert!(!bench
        .monitor
        .breakpoints()
        .contains(DebugClass::MemRead, 0x0000));
}

#[test]
fn break_status_lists_classes() {
    let mut bench = bench("");
    bench.monitor.dispatch("break memrd 0100 01ff").unwrap();
    bench.monitor.dispatch("break").unwrap();
    let text = bench.out.text();
    assert!(text.contains("\tmemrd\t0100-01ff"));
    assert!(text.contains("\topfetch\tdisabled"));
    assert!(text.contains("usage: break"));
}

#[test]
fn break_unknown_class_is_reported() {
    let mut bench = bench("");
    bench.monitor.dispatch("break bogus 0100").unwrap();
    assert!(bench.out.text().contains("error: unknown type bogus"));
}

#[test]
fn baud_programs_uart_and_reports_actual_rate() {
    let mut bench = bench("");
    bench.monitor.dispatch("baud 0 115200").unwrap();
    assert_eq!(vec![(0u8, 10u16)], *bench.uart_log.borrow());
    assert!(bench
        .out
        .text()
        .contains("UART 0: requested: 115200, actual: 113636"));
}

#[test]
fn out_then_in_round_trips_port_latch() {
    let mut bench = bench("");
    bench.monitor.dispatch("out 10 5a").unwrap();
    bench.monitor.dispatch("in 10").unwrap();
    assert!(bench.out.text().contains("read 5a from 10"));
}

#[test]
fn run_with_address_resets_first() {
    let mut bench = bench("");
    bench.monitor.dispatch("run 0100").unwrap();
    assert_eq!(
        vec!["reset 0100".to_string(), "run".to_string()],
        *bench.cpu_log.borrow()
    );
}

#[test]
fn step_and_continue_use_debug_budgets() {
    let mut bench = bench("");
    bench.monitor.dispatch("s").unwrap();
    bench.monitor.dispatch("step 16").unwrap();
    bench.monitor.dispatch("c").unwrap();
    assert_eq!(
        vec![
            "debug 1".to_string(),
            "debug 16".to_string(),
            "debug 0".to_string()
        ],
        *bench.cpu_log.borrow()
    );
}

#[test]
fn bus_displays_status_snapshot() {
    let mut bench = bench("");
    bench.monitor.dispatch("bus").unwrap();
    assert!(bench.out.text().contains("addr=1234 data=56"));
}

#[test]
fn mount_and_unmount_reach_drive_controller() {
    let mut bench = bench("");
    bench.monitor.dispatch("mount 1 disk.img").unwrap();
    bench.monitor.dispatch("unmount 1").unwrap();
    assert_eq!(
        vec!["mount 1 disk.img".to_string(), "unmount 1".to_string()],
        *bench.drive_log.borrow()
    );
}

#[test]
fn mount_failure_is_reported() {
    let mut bench = bench("");
    bench.monitor.dispatch("mount 0 missing.img").unwrap();
    assert!(bench
        .out
        .text()
        .contains("error mounting drive: file not found"));
}

#[test]
fn boot_without_signature_is_reported() {
    let mut bench = bench("");
    bench.monitor.dispatch("boot").unwrap();
    assert!(bench.out.text().contains("no boot signature found"));
    assert!(bench.cpu_log.borrow().is_empty());
}

#[test]
fn debug_with_address_resets_first() {
    let mut bench = bench("");
    bench.monitor.dispatch("debug 0200").unwrap();
    assert_eq!(
        vec!["reset 0200".to_string(), "debug 0".to_string()],
        *bench.cpu_log.borrow()
    );
}

#[test]
fn poke_single_value_writes_without_prompt() {
    let mut bench = bench("");
    bench.monitor.dispatch("poke 0150 7e").unwrap();
    assert_eq!(0x7e, ram_byte(&bench.ram, 0x0150));
    assert!(bench.out.text().is_empty());
}

#[test]
fn poke_writes_and_skips_interactively() {
    let mut bench = bench("12\n\nx\n");
    bench.ram.borrow_mut().write(0x0101, &[0x77]).unwrap();
    bench.monitor.dispatch("poke 0100").unwrap();
    assert_eq!(0x12, ram_byte(&bench.ram, 0x0100));
    assert_eq!(0x77, ram_byte(&bench.ram, 0x0101));
    let text = bench.out.text();
    assert!(text.contains("0100=00 : "));
    assert!(text.contains("0101=77 : "));
}

#[test]
fn do_executes_command_file_and_echoes_lines() {
    let path = temp_path("do.mon");
    fs::write(&path, "fill 0000 000f 77\n").unwrap();
    let mut bench = bench("");
    bench
        .monitor
        .dispatch(&format!("do {}", path.display()))
        .unwrap();
    fs::remove_file(&path).unwrap();
    assert_eq!(0x77, ram_byte(&bench.ram, 0x0000));
    assert!(bench.out.text().contains(">fill 0000 000f 77"));
}

#[test]
fn disasm_uses_attached_disassembler() {
    let mut bench = bench("");
    bench.ram.borrow_mut().write(0x0400, &[0xc9]).unwrap();
    bench.monitor.dispatch("disasm 0400").unwrap();
    assert!(bench.out.text().contains("0400  c9"));
}

#[test]
fn unknown_command_is_reported() {
    let mut bench = bench("");
    bench.monitor.dispatch("frobnicate").unwrap();
    assert!(bench
        .out
        .text()
        .contains("unknown command: frobnicate. type help for list."));
}

#[test]
fn blank_line_is_ignored() {
    let mut bench = bench("");
    bench.monitor.dispatch("   \n").unwrap();
    assert!(bench.out.text().is_empty());
}

#[test]
fn help_lists_command_table() {
    let mut bench = bench("");
    bench.monitor.dispatch("help").unwrap();
    let text = bench.out.text();
    assert!(text.contains("dump\tdump memory in hex and ascii"));
    assert!(text.contains("baud\tconfigure UART baud rate"));
}

#[test]
fn bad_number_does_not_abort_the_loop() {
    let mut bench = bench("");
    bench.monitor.dispatch("dump zz").unwrap();
    bench.monitor.dispatch("fill 0000 0000 11").unwrap();
    assert!(bench.out.text().contains("error: invalid number zz"));
    assert_eq!(0x11, ram_byte(&bench.ram, 0x0000));
}

#[test]
fn run_loop_prompts_and_dispatches_until_eof() {
    let _guard = CWD_LOCK.lock().unwrap_or_else(|err| err.into_inner());
    let mut bench = bench("fill 0000 0003 11\n");
    bench.monitor.run().unwrap();
    assert_eq!(0x11, ram_byte(&bench.ram, 0x0003));
    assert!(bench.out.text().contains("zmon>"));
}

#[test]
fn startup_executes_autoexec_when_present() {
    let _guard = CWD_LOCK.lock().unwrap_or_else(|err| err.into_inner());
    let home = temp_path("autoexec-home");
    fs::create_dir_all(&home).unwrap();
    fs::write(home.join("autoexec.mon"), "fill 0040 0040 99\n").unwrap();
    let cwd = std::env::current_dir().unwrap();
    std::env::set_current_dir(&home).unwrap();
    let mut bench = bench("");
    let result = bench.monitor.run();
    std::env::set_current_dir(&cwd).unwrap();
    fs::remove_dir_all(&home).unwrap();
    result.unwrap();
    assert_eq!(0x99, ram_byte(&bench.ram, 0x0040));
    assert!(bench.out.text().contains("autoexec.mon>fill 0040 0040 99"));
}

#[test]
fn startup_without_autoexec_is_silent() {
    let _guard = CWD_LOCK.lock().unwrap_or_else(|err| err.into_inner());
    let mut bench = bench("");
    bench.monitor.run().unwrap();
    assert_eq!("zmon>", bench.out.text());
}

#[test]
fn do_missing_file_is_reported() {
    let mut bench = bench("");
    bench.monitor.dispatch("do no-such-file.mon").unwrap();
    assert!(bench
        .out
        .text()
        .contains("error opening file: file not found"));
}
