// This file is part of zmon.
// Copyright (c) 2026 The zmon project developers. All rights reserved.
// Licensed under the MIT license. See LICENSE file in the project root for full license text.

#[macro_use]
extern crate log;

mod cli;
mod machine;
mod util;

use std::io::{self, BufReader};
use std::process;

use structopt::StructOpt;
use zmon_core::device::{Flash, Ram, VideoRam};
use zmon_core::{new_shared, FlashTarget, MemoryTarget};
use zmon_monitor::{Devices, Monitor};

use crate::cli::Opt;
use crate::machine::{
    ByteDisasm, DetachedCpu, DetachedHexCodec, HostDrives, LogUart, LoopbackPorts,
};
use crate::util::Logger;

static NAME: &str = "zmon";

fn main() {
    let opt = Opt::from_args();
    match run(&opt) {
        Ok(_) => process::exit(0),
        Err(err) => {
            println!("Error: {}", err);
            process::exit(1)
        }
    };
}

fn run(opt: &Opt) -> Result<(), String> {
    let logger = Logger::build(opt.log_level.as_str(), &opt.log_target_level)?;
    Logger::enable(logger)?;
    info!("Starting {}", NAME);
    let devices = build_devices(opt)?;
    let input = Box::new(BufReader::new(io::stdin()));
    let output = Box::new(io::stdout());
    let mut monitor = Monitor::new(devices, input, output, opt.clock);
    if let Some(path) = &opt.exec {
        let path = path
            .to_str()
            .ok_or_else(|| "invalid command file path".to_string())?;
        monitor.exec_file(path).map_err(|err| format!("{}", err))?;
    }
    monitor.run().map_err(|err| format!("{}", err))?;
    Ok(())
}

fn build_devices(opt: &Opt) -> Result<Devices, String> {
    if opt.ram == 0 {
        return Err("ram size must be greater than zero".to_string());
    }
    if let Some(size) = opt.flash {
        if size == 0 {
            return Err("flash size must be greater than zero".to_string());
        }
    }
    if let Some(size) = opt.video {
        if size == 0 || !size.is_power_of_two() {
            return Err("video size must be a power of two".to_string());
        }
    }
    let ram = new_shared(Ram::new(opt.ram));
    Ok(Devices {
        bus: Box::new(ram.clone()),
        flash: opt
            .flash
            .map(|size| Box::new(Flash::new(size)) as Box<dyn FlashTarget>),
        video: opt
            .video
            .map(|size| Box::new(VideoRam::new(size)) as Box<dyn MemoryTarget>),
        cpu: Box::new(DetachedCpu::new()),
        drives: Box::new(HostDrives::new(ram)),
        hex: Box::new(DetachedHexCodec),
        disasm: Box::new(ByteDisasm),
        uart: Box::new(LogUart::new()),
        ports: Box::new(LoopbackPorts::new()),
    })
}
