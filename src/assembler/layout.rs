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

//! Pass one: walk the expanded node stream, thread the per-section location
//! counters, size every data directive and assign each label its address.
//! The `.text` counter is cumulative across re-entries into the section.

use crate::assembler::symbol_table::{SymbolTable, is_reserved_name};
use crate::ast::{Directive, DirectiveArg, Node, Section};
use crate::bits::{align_up, parse_int};
use crate::diagnostics::{Diagnostic, error, warning};

#[derive(Debug, Clone)]
pub struct LayoutOptions {
    pub text_base: u32,
    pub data_base: u32,
    pub text_align: u32,
    pub data_align: u32,
    /// Align `.word` to 4, `.half` to 2, `.dword` to 8 before placing items.
    pub auto_align_types: bool,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            text_base: 0x0000_0000,
            data_base: 0x1000_0000,
            text_align: 4,
            data_align: 4,
            auto_align_types: true,
        }
    }
}

/// Result of pass one: the symbol table plus section geometry.
#[derive(Debug, Clone)]
pub struct Layout {
    pub symtab: SymbolTable,
    pub text_base: u32,
    pub data_base: u32,
    pub text_size: u32,
    pub data_size: u32,
}

// --- Directive argument decoding ---

/// One decoded data item: an integer or the raw bytes of a quoted string.
#[derive(Debug, Clone, PartialEq)]
enum Scalar {
    Int(i64),
    Bytes(Vec<u8>),
}

fn sized_directive(name: &str) -> Option<u32> {
    match name {
        ".byte" => Some(1),
        ".2byte" | ".half" | ".short" => Some(2),
        ".4byte" | ".word" => Some(4),
        ".8byte" | ".dword" | ".quad" => Some(8),
        _ => None,
    }
}

fn is_ascii_directive(name: &str) -> bool {
    matches!(name, ".ascii" | ".asciz")
}

fn is_space_directive(name: &str) -> bool {
    matches!(name, ".space" | ".skip")
}

fn is_align_directive(name: &str) -> bool {
    matches!(name, ".align" | ".balign" | ".p2align")
}

fn is_ignored_directive(name: &str) -> bool {
    matches!(name, ".globl" | ".global" | ".type" | ".size" | ".section")
}

/// Decodes `\n`, `\t`, `\0` and `\xNN` escapes; unknown escapes keep the
/// backslash verbatim.
fn decode_escapes(inner: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            let mut buf = [0u8; 4];
            out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            continue;
        }
        match chars.next() {
            Some('n') => out.push(b'\n'),
            Some('t') => out.push(b'\t'),
            Some('0') => out.push(0),
            Some('x') => {
                let hi = chars.peek().copied().and_then(|c| c.to_digit(16));
                if let Some(hi) = hi {
                    chars.next();
                    let lo = chars.peek().copied().and_then(|c| c.to_digit(16));
                    if let Some(lo) = lo {
                        chars.next();
                        out.push(((hi << 4) | lo) as u8);
                    } else {
                        out.push(hi as u8);
                    }
                } else {
                    out.extend_from_slice(b"\\x");
                }
            }
            Some(other) => {
                out.push(b'\\');
                let mut buf = [0u8; 4];
                out.extend_from_slice(other.encode_utf8(&mut buf).as_bytes());
            }
            None => out.push(b'\\'),
        }
    }
    out
}

/// Splits a joined argument string on commas, leaving double-quoted
/// stretches intact.
fn split_csv(s: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut cur = String::new();
    let mut in_quotes = false;
    for c in s.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                cur.push(c);
            }
            ',' if !in_quotes => {
                let tok = cur.trim();
                if !tok.is_empty() {
                    out.push(tok.to_string());
                }
                cur.clear();
            }
            _ => cur.push(c),
        }
    }
    let tok = cur.trim();
    if !tok.is_empty() {
        out.push(tok.to_string());
    }
    out
}

fn parse_scalar(token: &str) -> Option<Scalar> {
    let tok = token.trim();
    if tok.len() >= 2 && tok.starts_with('"') && tok.ends_with('"') {
        return Some(Scalar::Bytes(decode_escapes(&tok[1..tok.len() - 1])));
    }
    parse_int(tok).map(Scalar::Int)
}

/// Re-joins the whitespace-split argument tokens and interprets them as a
/// comma-separated item list. Unparseable tokens come back separately so
/// the caller can report them.
fn items_from_args(args: &[DirectiveArg]) -> (Vec<Scalar>, Vec<String>) {
    let joined = args
        .iter()
        .map(|a| match a {
            DirectiveArg::Token(t) => t.clone(),
            DirectiveArg::Value(v) => v.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ");

    let mut items = Vec::new();
    let mut invalid = Vec::new();
    for raw in split_csv(&joined) {
        let tok = raw.trim_end_matches(',').trim();
        if tok.is_empty() {
            continue;
        }
        match parse_scalar(tok) {
            Some(scalar) => items.push(scalar),
            None => invalid.push(tok.to_string()),
        }
    }
    (items, invalid)
}

// --- Pass one ---

/// Assigns label addresses and sizes both sections. Errors are accumulated;
/// the offending node simply does not advance the location counter.
pub fn first_pass(nodes: &[Node], opts: &LayoutOptions) -> (Layout, Vec<Diagnostic>) {
    let mut symtab = SymbolTable::new();
    let mut diags: Vec<Diagnostic> = Vec::new();

    let mut section: Option<Section> = None;
    let mut lc_text: u32 = 0;
    let mut lc_data: u32 = 0;

    for node in nodes {
        match node {
            Node::Directive(d) if d.name == ".text" || d.name == ".data" => {
                if d.name == ".text" {
                    section = Some(Section::Text);
                    if opts.text_align > 1 {
                        lc_text = align_up(lc_text, opts.text_align);
                    }
                } else {
                    section = Some(Section::Data);
                    if opts.data_align > 1 {
                        lc_data = align_up(lc_data, opts.data_align);
                    }
                }
            }

            Node::Label(label) => {
                // Anything placeable before an explicit section lands in .text.
                if section.is_none() {
                    section = Some(Section::Text);
                }
                let addr = match section {
                    Some(Section::Data) => opts.data_base as i64 + lc_data as i64,
                    _ => opts.text_base as i64 + lc_text as i64,
                };
                if is_reserved_name(&label.name) {
                    diags.push(
                        warning(format!(
                            "labels must not use the reserved PC-relative suffixes: '{}'",
                            label.name
                        ))
                        .at(label.line, label.col),
                    );
                }
                if symtab.contains_key(&label.name) {
                    diags.push(
                        error(format!("label or constant redefined: {}", label.name))
                            .at(label.line, label.col),
                    );
                } else {
                    symtab.insert(label.name.clone(), addr);
                }
            }

            Node::Directive(d) => {
                handle_directive(d, opts, &mut section, &mut lc_text, &mut lc_data, &mut symtab, &mut diags);
            }

            Node::Instruction(ins) => {
                if section.is_none() {
                    section = Some(Section::Text);
                }
                if section != Some(Section::Text) {
                    diags.push(
                        error("instruction outside the .text section").at(ins.line, ins.col),
                    );
                } else {
                    lc_text += 4;
                }
            }
        }
    }

    let layout = Layout {
        symtab,
        text_base: opts.text_base,
        data_base: opts.data_base,
        text_size: if opts.text_align > 1 {
            align_up(lc_text, opts.text_align)
        } else {
            lc_text
        },
        data_size: if opts.data_align > 1 {
            align_up(lc_data, opts.data_align)
        } else {
            lc_data
        },
    };
    (layout, diags)
}

fn handle_directive(
    d: &Directive,
    opts: &LayoutOptions,
    section: &mut Option<Section>,
    lc_text: &mut u32,
    lc_data: &mut u32,
    symtab: &mut SymbolTable,
    diags: &mut Vec<Diagnostic>,
) {
    let name = d.name.as_str();

    if name == ".equ" {
        match d.args.as_slice() {
            [DirectiveArg::Token(equ_name), DirectiveArg::Value(value)] => {
                if symtab.contains_key(equ_name) {
                    diags.push(
                        error(format!("constant or label redefined: {equ_name}")).at(d.line, d.col),
                    );
                } else {
                    symtab.insert(equ_name.clone(), *value);
                }
            }
            _ => diags.push(error(".equ requires a name and a value").at(d.line, d.col)),
        }
        return;
    }

    if is_ignored_directive(name) {
        return;
    }

    if is_align_directive(name) {
        if section.is_none() {
            *section = Some(Section::Text);
        }
        let (items, _) = items_from_args(&d.args);
        let Some(Scalar::Int(value)) = items.first() else {
            diags.push(error(format!("{name} requires an integer argument")).at(d.line, d.col));
            return;
        };
        let boundary = match name {
            ".balign" => (*value).max(1) as u32,
            // GNU style for RISC-V: .align and .p2align take a power of two.
            _ => 1u32 << (*value).max(0).min(31),
        };
        match section {
            Some(Section::Text) => *lc_text = align_up(*lc_text, boundary),
            _ => *lc_data = align_up(*lc_data, boundary),
        }
        return;
    }

    if is_space_directive(name) {
        if section.is_none() {
            *section = Some(Section::Text);
        }
        let (items, _) = items_from_args(&d.args);
        let Some(Scalar::Int(size)) = items.first() else {
            diags.push(error(format!("{name} requires a size in bytes")).at(d.line, d.col));
            return;
        };
        if *section == Some(Section::Text) {
            diags.push(error(format!("{name} is not allowed in .text")).at(d.line, d.col));
        } else {
            *lc_data += (*size).max(0) as u32;
        }
        return;
    }

    if let Some(size) = sized_directive(name) {
        if section.is_none() {
            *section = Some(Section::Text);
        }
        if *section != Some(Section::Data) {
            diags.push(error(format!("{name} is only allowed in .data")).at(d.line, d.col));
            return;
        }
        let (items, invalid) = items_from_args(&d.args);
        for tok in invalid {
            diags.push(error(format!("{name} has an invalid item: '{tok}'")).at(d.line, d.col));
        }
        if opts.auto_align_types {
            *lc_data = align_up(*lc_data, size);
        }
        *lc_data += size * items.len() as u32;
        return;
    }

    if is_ascii_directive(name) {
        if section.is_none() {
            *section = Some(Section::Text);
        }
        if *section != Some(Section::Data) {
            diags.push(error(format!("{name} is only allowed in .data")).at(d.line, d.col));
            return;
        }
        let (items, invalid) = items_from_args(&d.args);
        for tok in invalid {
            diags.push(error(format!("{name} has an invalid item: '{tok}'")).at(d.line, d.col));
        }
        let mut total: u32 = 0;
        for item in &items {
            total += match item {
                Scalar::Bytes(bytes) => bytes.len() as u32,
                Scalar::Int(_) => 1,
            };
        }
        if name == ".asciz" {
            total += 1; // trailing NUL
        }
        *lc_data += total;
    }

    // Unknown directives have no layout effect and are not an error.
}

// ------------- unit tests -------------
