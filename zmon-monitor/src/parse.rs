// This file is part of zmon.
// Copyright (c) 2026 The zmon project developers. All rights reserved.
// Licensed under the MIT license. See LICENSE file in the project root for full license text.

//! Argument parsing helpers. Addresses and values are hexadecimal by
//! convention; drive numbers, UART ids and step counts are decimal.

use std::io::{Error, ErrorKind};

fn invalid(value: &str) -> Error {
    Error::new(ErrorKind::InvalidInput, format!("invalid number {}", value))
}

/// Parse a hex address or word, masking wider input into 16 bits.
pub fn hex_u16(value: &str) -> Result<u16, Error> {
    u32::from_str_radix(value, 16)
        .map(|num| (num & 0xffff) as u16)
        .map_err(|_| invalid(value))
}

/// Parse a hex byte, masking wider input into 8 bits.
pub fn hex_u8(value: &str) -> Result<u8, Error> {
    u32::from_str_radix(value, 16)
        .map(|num| (num & 0xff) as u8)
        .map_err(|_| invalid(value))
}

pub fn dec_u8(value: &str) -> Result<u8, Error> {
    value.parse::<u8>().map_err(|_| invalid(value))
}

pub fn dec_u32(value: &str) -> Result<u32, Error> {
    value.parse::<u32>().map_err(|_| invalid(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_u16_masks_wide_input() {
        assert_eq!(0x1234, hex_u16("1234").unwrap());
        assert_eq!(0x2345, hex_u16("12345").unwrap());
        assert_eq!(0x000f, hex_u16("f").unwrap());
    }

    #[test]
    fn hex_u8_masks_wide_input() {
        assert_eq!(0xff, hex_u8("ff").unwrap());
        assert_eq!(0xcd, hex_u8("abcd").unwrap());
    }

    #[test]
    fn rejects_garbage() {
        assert!(hex_u16("xyz").is_err());
        assert!(hex_u8("").is_err());
        assert!(dec_u8("f").is_err());
        assert!(dec_u32("-1").is_err());
    }

    #[test]
    fn decimal_parsers_take_base_ten() {
        assert_eq!(10, dec_u8("10").unwrap());
        assert_eq!(115_200, dec_u32("115200").unwrap());
    }
}
