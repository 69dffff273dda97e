// This file is part of zmon.
// Copyright (c) 2026 The zmon project developers. All rights reserved.
// Licensed under the MIT license. See LICENSE file in the project root for full license text.

use std::collections::HashMap;
use std::str::FromStr;

use log::{Level, LevelFilter, Metadata, Record};

/// Console logger with an overall level and optional per-target overrides.
pub struct Logger {
    level: Level,
    targets: HashMap<String, Level>,
}

impl Logger {
    pub fn build(level: &str, target_levels: &[(String, String)]) -> Result<Logger, String> {
        let level =
            Level::from_str(level).map_err(|_| format!("invalid log level {}", level))?;
        let mut logger = Logger {
            level,
            targets: HashMap::new(),
        };
        for (target, level) in target_levels {
            logger.add_target(target.clone(), level)?;
        }
        Ok(logger)
    }

    pub fn enable(logger: Logger) -> Result<(), String> {
        let max_level = logger.max_level();
        log::set_boxed_logger(Box::new(logger))
            .map(|_| log::set_max_level(max_level))
            .map_err(|_| "cannot initialize logging".to_string())
    }

    pub fn add_target(&mut self, target: String, level: &str) -> Result<(), String> {
        let level = Level::from_str(level)
            .map_err(|_| format!("invalid log level {} for target {}", level, &target))?;
        self.targets.insert(target, level);
        Ok(())
    }

    fn max_level(&self) -> LevelFilter {
        self.targets
            .values()
            .fold(self.level, |max, level| max.max(*level))
            .to_level_filter()
    }
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        if let Some(target_level) = self.targets.get(metadata.target()) {
            metadata.level() <= *target_level
        } else {
            metadata.level() <= self.level
        }
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            println!(
                "{} [{}] - {}",
                record.level(),
                record.target(),
                record.args()
            );
        }
    }

    fn flush(&self) {}
}
