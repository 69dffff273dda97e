// This file is part of zmon.
// Copyright (c) 2026 The zmon project developers. All rights reserved.
// Licensed under the MIT license. See LICENSE file in the project root for full license text.

//! Baud divisor search against the divide-by-16 UART prescaler.

const PRESCALER: u32 = 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BaudSelection {
    pub divisor: u16,
    pub actual: u32,
}

/// Find the smallest divisor whose rate does not exceed the requested rate.
///
/// `actual = clock / (16 * (divisor + 1))` decreases monotonically with the
/// divisor, so the search terminates; the divisor-width overflow check is
/// the hard bound. When no divisor satisfies the request, the overflow
/// boundary value is returned rather than an error.
pub fn select_divisor(clock: u32, requested: u32) -> BaudSelection {
    let mut divisor: u16 = 0;
    loop {
        let actual = clock / (PRESCALER * (u32::from(divisor) + 1));
        if actual <= requested {
            return BaudSelection { divisor, actual };
        }
        divisor = divisor.wrapping_add(1);
        if divisor == 0 {
            let actual = clock / (PRESCALER * (u32::from(u16::max_value()) + 1));
            return BaudSelection {
                divisor: u16::max_value(),
                actual,
            };
        }
    }
}
