/*
Copyright 2025 Connor Nolan

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

//! Bit-level helpers shared by the layout and encoding passes.

/// True if `x` fits in `n` bits two's complement.
pub fn is_signed_nbit(x: i64, n: u32) -> bool {
    debug_assert!(n > 0 && n < 64);
    let lo = -(1i64 << (n - 1));
    let hi = (1i64 << (n - 1)) - 1;
    lo <= x && x <= hi
}

/// True if `x` is in `[0, 2^n)`.
pub fn is_unsigned_nbit(x: i64, n: u32) -> bool {
    debug_assert!(n > 0 && n < 64);
    0 <= x && x < (1i64 << n)
}

/// Rounds `x` up to the next multiple of `a`. `a` must be a power of two.
pub fn align_up(x: u32, a: u32) -> u32 {
    debug_assert!(a.is_power_of_two());
    (x + (a - 1)) & !(a - 1)
}

/// `0x` followed by exactly 8 lowercase hex digits.
pub fn to_hex32(word: u32) -> String {
    format!("0x{word:08x}")
}

/// Exactly 32 `0`/`1` characters.
pub fn to_bin32(word: u32) -> String {
    format!("{word:032b}")
}

/// Parses an integer literal: optional sign, decimal or `0x` hex.
pub fn parse_int(token: &str) -> Option<i64> {
    let t = token.trim();
    let (negative, t) = match t.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, t.strip_prefix('+').unwrap_or(t)),
    };
    if t.is_empty() {
        return None;
    }
    let magnitude = if let Some(hex) = t.strip_prefix("0x").or_else(|| t.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).ok()?
    } else {
        t.parse::<i64>().ok()?
    };
    Some(if negative { -magnitude } else { magnitude })
}

// ------------- unit tests -------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_ranges() {
        assert!(is_signed_nbit(2047, 12));
        assert!(is_signed_nbit(-2048, 12));
        assert!(!is_signed_nbit(2048, 12));
        assert!(!is_signed_nbit(-2049, 12));
        assert!(is_signed_nbit(-(1 << 19), 20));
        assert!(!is_signed_nbit(1 << 19, 20));
    }

    #[test]
    fn test_unsigned_ranges() {
        assert!(is_unsigned_nbit(0, 5));
        assert!(is_unsigned_nbit(31, 5));
        assert!(!is_unsigned_nbit(32, 5));
        assert!(!is_unsigned_nbit(-1, 5));
    }

    #[test]
    fn test_align_up() {
        assert_eq!(align_up(0, 4), 0);
        assert_eq!(align_up(1, 4), 4);
        assert_eq!(align_up(4, 4), 4);
        assert_eq!(align_up(22, 4), 24);
        assert_eq!(align_up(5, 2), 6);
    }

    #[test]
    fn test_renderings() {
        assert_eq!(to_hex32(0x13), "0x00000013");
        assert_eq!(to_hex32(0xFFFFFFFF), "0xffffffff");
        assert_eq!(to_bin32(0x13).len(), 32);
        assert_eq!(to_bin32(1), format!("{}1", "0".repeat(31)));
    }

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int("42"), Some(42));
        assert_eq!(parse_int("-42"), Some(-42));
        assert_eq!(parse_int("+7"), Some(7));
        assert_eq!(parse_int("0x10"), Some(16));
        assert_eq!(parse_int("-0x800"), Some(-2048));
        assert_eq!(parse_int("0xFFFFFFFF"), Some(0xFFFF_FFFF));
        assert_eq!(parse_int("zebra"), None);
        assert_eq!(parse_int(""), None);
        assert_eq!(parse_int("-"), None);
    }
}
