// This file is part of zmon.
// Copyright (c) 2026 The zmon project developers. All rights reserved.
// Licensed under the MIT license. See LICENSE file in the project root for full license text.

mod flash;
mod ram;
mod vram;

pub use self::flash::Flash;
pub use self::ram::Ram;
pub use self::vram::VideoRam;
