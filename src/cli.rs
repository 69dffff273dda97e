// This file is part of zmon.
// Copyright (c) 2026 The zmon project developers. All rights reserved.
// Licensed under the MIT license. See LICENSE file in the project root for full license text.

use std::error::Error;
use std::path::PathBuf;

use structopt::StructOpt;

#[derive(StructOpt, Debug)]
#[structopt(name = "zmon")]
pub struct Opt {
    /// command file to execute after startup
    #[structopt(parse(from_os_str))]
    pub exec: Option<PathBuf>,

    // -- Board
    /// processor clock rate in Hz
    #[structopt(long, default_value = "20000000")]
    pub clock: u32,
    /// main memory size in bytes
    #[structopt(long, default_value = "65536")]
    pub ram: usize,
    /// attach flash storage of the given size in bytes
    #[structopt(long)]
    pub flash: Option<usize>,
    /// attach video memory of the given size in bytes (power of two)
    #[structopt(long)]
    pub video: Option<usize>,

    // -- Logging
    /// set log level
    #[structopt(long = "loglevel", default_value = "info")]
    pub log_level: String,
    /// set log level for a target
    #[structopt(long = "log", parse(try_from_str = parse_key_val))]
    pub log_target_level: Vec<(String, String)>,
}

fn parse_key_val<T, U>(s: &str) -> Result<(T, U), Box<dyn Error>>
where
    T: std::str::FromStr,
    T::Err: Error + 'static,
    U: std::str::FromStr,
    U::Err: Error + 'static,
{
    let pos = s
        .find('=')
        .ok_or_else(|| format!("invalid KEY=value: no `=` found in `{}`", s))?;
    Ok((s[..pos].parse()?, s[pos + 1..].parse()?))
}
