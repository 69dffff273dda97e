// This file is part of zmon.
// Copyright (c) 2026 The zmon project developers. All rights reserved.
// Licensed under the MIT license. See LICENSE file in the project root for full license text.

#[macro_use]
extern crate log;

mod commands;
mod monitor;
mod parse;
pub mod transfer;

pub use self::monitor::{Devices, Monitor, AUTOEXEC, MAX_TOKENS, PROMPT};
