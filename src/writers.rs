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

//! Output artifacts: one line per emitted word, hex and binary in parallel.

use std::fs;
use std::io;
use std::path::Path;

use crate::assembler::encoder::Encoded;
use crate::bits::{to_bin32, to_hex32};

pub fn hex_lines(words: &[Encoded]) -> Vec<String> {
    words.iter().map(|w| to_hex32(w.word)).collect()
}

pub fn bin_lines(words: &[Encoded]) -> Vec<String> {
    words.iter().map(|w| to_bin32(w.word)).collect()
}

fn write_lines(lines: Vec<String>, path: &Path) -> io::Result<()> {
    let mut out = lines.join("\n");
    if !out.is_empty() {
        out.push('\n');
    }
    fs::write(path, out)
}

pub fn write_hex(words: &[Encoded], path: &Path) -> io::Result<()> {
    write_lines(hex_lines(words), path)
}

pub fn write_bin(words: &[Encoded], path: &Path) -> io::Result<()> {
    write_lines(bin_lines(words), path)
}

// ------------- unit tests -------------

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(word: u32) -> Encoded {
        Encoded {
            word,
            pc: 0,
            line: 1,
            col: 1,
            mnemonic: "addi".to_string(),
        }
    }

    #[test]
    fn test_line_shapes() {
        let words = vec![encoded(0x13), encoded(0xFFFF_FFFF)];
        assert_eq!(hex_lines(&words), vec!["0x00000013", "0xffffffff"]);
        let bins = bin_lines(&words);
        assert!(bins.iter().all(|l| l.len() == 32));
        assert_eq!(bins[1], "1".repeat(32));
    }
}
