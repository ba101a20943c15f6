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

//! The symbol table maps names to label addresses or `.equ` constants. It is
//! written only by pass one and read only by pass two. Also home to the
//! reserved `@pcrel_*` suffix handling shared by both passes.

use std::collections::HashMap;

pub type SymbolTable = HashMap<String, i64>;

/// The PC-relative half a suffixed symbol refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PcrelPart {
    Hi,
    Lo,
}

pub const PCREL_HI_SUFFIX: &str = "@pcrel_hi";
pub const PCREL_LO_SUFFIX: &str = "@pcrel_lo";

/// Splits `name@pcrel_hi`/`name@pcrel_lo` into the base name and the half
/// tag; unsuffixed names come back whole.
pub fn split_pcrel(name: &str) -> (&str, Option<PcrelPart>) {
    if let Some(base) = name.strip_suffix(PCREL_HI_SUFFIX) {
        (base, Some(PcrelPart::Hi))
    } else if let Some(base) = name.strip_suffix(PCREL_LO_SUFFIX) {
        (base, Some(PcrelPart::Lo))
    } else {
        (name, None)
    }
}

/// True for names a label must not use; they are generated internally by
/// pseudo-expansion.
pub fn is_reserved_name(name: &str) -> bool {
    split_pcrel(name).1.is_some()
}

// ------------- unit tests -------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_pcrel() {
        assert_eq!(split_pcrel("glob@pcrel_hi"), ("glob", Some(PcrelPart::Hi)));
        assert_eq!(split_pcrel("glob@pcrel_lo"), ("glob", Some(PcrelPart::Lo)));
        assert_eq!(split_pcrel("glob"), ("glob", None));
        assert_eq!(split_pcrel("pcrel_hi"), ("pcrel_hi", None));
    }

    #[test]
    fn test_reserved_names() {
        assert!(is_reserved_name("x@pcrel_hi"));
        assert!(is_reserved_name("x@pcrel_lo"));
        assert!(!is_reserved_name("x"));
        assert!(!is_reserved_name("x@other"));
    }
}
