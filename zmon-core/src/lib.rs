// This file is part of zmon.
// Copyright (c) 2026 The zmon project developers. All rights reserved.
// Licensed under the MIT license. See LICENSE file in the project root for full license text.

#[macro_use]
extern crate log;

pub mod baud;
pub mod device;
mod range;
mod registry;
mod types;

pub use self::range::AddressRange;
pub use self::registry::{DebugClass, DebugRangeSet, DEBUG_CLASS_COUNT};
pub use self::types::*;
