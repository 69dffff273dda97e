// This file is part of zmon.
// Copyright (c) 2026 The zmon project developers. All rights reserved.
// Licensed under the MIT license. See LICENSE file in the project root for full license text.

mod logger;

pub use self::logger::Logger;
