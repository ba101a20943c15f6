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

//! Register names. Operands accept either the canonical `xN` spelling or
//! the ABI alias; both normalize to the index 0..31.

use std::fmt;

/// A canonical RV32I register, `x0`..`x31`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Reg {
    pub num: u8,
}

impl Reg {
    /// Hard zero.
    pub const X0: Reg = Reg { num: 0 };
    /// Return address (x1).
    pub const RA: Reg = Reg { num: 1 };
    /// Temporary x5, scratch base for store-to-symbol sequences.
    pub const T0: Reg = Reg { num: 5 };
    /// Temporary x6, scratch for tail calls.
    pub const T1: Reg = Reg { num: 6 };

    /// Normalizes an ABI name or `xN` token, case-insensitively.
    pub fn parse(token: &str) -> Option<Reg> {
        let t = token.trim().to_ascii_lowercase();
        if let Some(num) = abi_index(&t) {
            return Some(Reg { num });
        }
        let digits = t.strip_prefix('x')?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        match digits.parse::<u8>() {
            Ok(num) if num <= 31 => Some(Reg { num }),
            _ => None,
        }
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.num)
    }
}

fn abi_index(name: &str) -> Option<u8> {
    let num = match name {
        "zero" => 0,
        "ra" => 1,
        "sp" => 2,
        "gp" => 3,
        "tp" => 4,
        "t0" => 5,
        "t1" => 6,
        "t2" => 7,
        "s0" | "fp" => 8,
        "s1" => 9,
        "a0" => 10,
        "a1" => 11,
        "a2" => 12,
        "a3" => 13,
        "a4" => 14,
        "a5" => 15,
        "a6" => 16,
        "a7" => 17,
        "s2" => 18,
        "s3" => 19,
        "s4" => 20,
        "s5" => 21,
        "s6" => 22,
        "s7" => 23,
        "s8" => 24,
        "s9" => 25,
        "s10" => 26,
        "s11" => 27,
        "t3" => 28,
        "t4" => 29,
        "t5" => 30,
        "t6" => 31,
        _ => return None,
    };
    Some(num)
}

// ------------- unit tests -------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_names() {
        assert_eq!(Reg::parse("x0"), Some(Reg { num: 0 }));
        assert_eq!(Reg::parse("x31"), Some(Reg { num: 31 }));
        assert_eq!(Reg::parse("X7"), Some(Reg { num: 7 }));
        assert_eq!(Reg::parse("x32"), None);
        assert_eq!(Reg::parse("x"), None);
        assert_eq!(Reg::parse("xa"), None);
    }

    #[test]
    fn test_abi_names() {
        assert_eq!(Reg::parse("zero"), Some(Reg::X0));
        assert_eq!(Reg::parse("ra"), Some(Reg::RA));
        assert_eq!(Reg::parse("sp"), Some(Reg { num: 2 }));
        assert_eq!(Reg::parse("fp"), Some(Reg { num: 8 }));
        assert_eq!(Reg::parse("s0"), Some(Reg { num: 8 }));
        assert_eq!(Reg::parse("A0"), Some(Reg { num: 10 }));
        assert_eq!(Reg::parse("t6"), Some(Reg { num: 31 }));
        assert_eq!(Reg::parse("q0"), None);
    }

    #[test]
    fn test_display_is_canonical() {
        assert_eq!(Reg::parse("a5").unwrap().to_string(), "x15");
        assert_eq!(Reg::X0.to_string(), "x0");
    }
}
