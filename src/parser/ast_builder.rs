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

//! Builders that turn pest pairs for one source line into typed AST nodes.
//! A bad operand or directive argument records a diagnostic and is skipped;
//! the rest of the line is kept.

use crate::ast::{Directive, DirectiveArg, Imm, Instruction, Mem, Operand, Reg, Section, Sym};
use crate::bits::parse_int;
use crate::diagnostics::{Diagnostic, error};
use crate::parser::Rule;
use pest::iterators::Pair;

/// Identifier grammar: `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_ident(token: &str) -> bool {
    let mut chars = token.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub fn build_directive(
    pair: Pair<Rule>,
    lineno: usize,
    section: &mut Option<Section>,
    diags: &mut Vec<Diagnostic>,
) -> Option<Directive> {
    let col = pair.as_span().start_pos().line_col().1;
    let mut inner = pair.into_inner();
    let name = inner.next()?.as_str().to_ascii_lowercase();
    let tokens: Vec<&str> = inner
        .filter(|p| p.as_rule() == Rule::directive_arg)
        .map(|p| p.as_str())
        .collect();

    let args: Vec<DirectiveArg> = match name.as_str() {
        ".text" => {
            *section = Some(Section::Text);
            Vec::new()
        }
        ".data" => {
            *section = Some(Section::Data);
            Vec::new()
        }
        ".equ" => {
            if tokens.is_empty() {
                diags.push(error(".equ requires a name and a value").at(lineno, col));
                return None;
            }
            let equ_name = tokens[0].trim_end_matches(',');
            if !is_ident(equ_name) {
                diags.push(error(format!("invalid .equ name: '{equ_name}'")).at(lineno, col));
                return None;
            }
            let Some(value_tok) = tokens.get(1) else {
                diags.push(error("missing .equ value").at(lineno, col));
                return None;
            };
            let Some(value) = parse_int(value_tok.trim_end_matches(',')) else {
                diags.push(error(format!("invalid .equ value: '{value_tok}'")).at(lineno, col));
                return None;
            };
            vec![
                DirectiveArg::Token(equ_name.to_string()),
                DirectiveArg::Value(value),
            ]
        }
        // Everything else keeps its raw tokens; the layout pass interprets them.
        _ => tokens
            .into_iter()
            .map(|t| DirectiveArg::Token(t.to_string()))
            .collect(),
    };

    Some(Directive {
        name,
        args,
        line: lineno,
        col,
        section: *section,
    })
}

pub fn build_instruction(
    pair: Pair<Rule>,
    lineno: usize,
    section: Option<Section>,
    diags: &mut Vec<Diagnostic>,
) -> Option<Instruction> {
    let col = pair.as_span().start_pos().line_col().1;
    let mut inner = pair.into_inner();
    let mnemonic = inner.next()?.as_str().to_ascii_lowercase();

    let mut operands = Vec::new();
    for op_pair in inner.filter(|p| p.as_rule() == Rule::operand) {
        if let Some(op) = build_operand(op_pair, lineno, diags) {
            operands.push(op);
        }
    }

    Some(Instruction {
        mnemonic,
        operands,
        line: lineno,
        col,
        section,
    })
}

fn build_operand(pair: Pair<Rule>, lineno: usize, diags: &mut Vec<Diagnostic>) -> Option<Operand> {
    let col = pair.as_span().start_pos().line_col().1;
    let inner = pair.into_inner().next()?;
    match inner.as_rule() {
        Rule::memory => build_mem(inner, lineno, diags),
        Rule::number => match parse_int(inner.as_str()) {
            Some(value) => Some(Operand::Imm(Imm::numeric(value))),
            None => {
                diags.push(error(format!("invalid immediate: '{}'", inner.as_str())).at(lineno, col));
                None
            }
        },
        Rule::symbol => {
            let text = inner.as_str();
            // Register names win over symbols; suffixed names are never registers.
            if !text.contains('@') {
                if let Some(reg) = Reg::parse(text) {
                    return Some(Operand::Reg(reg));
                }
            }
            Some(Operand::Sym(Sym::new(text)))
        }
        Rule::junk => {
            diags.push(error(format!("invalid operand: '{}'", inner.as_str())).at(lineno, col));
            None
        }
        _ => None,
    }
}

fn build_mem(pair: Pair<Rule>, lineno: usize, diags: &mut Vec<Diagnostic>) -> Option<Operand> {
    let col = pair.as_span().start_pos().line_col().1;
    let mut offset = Imm::numeric(0);
    let mut base: Option<Reg> = None;

    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::mem_off => {
                let off = part.into_inner().next()?;
                match off.as_rule() {
                    Rule::number => match parse_int(off.as_str()) {
                        Some(value) => offset = Imm::numeric(value),
                        None => {
                            diags.push(
                                error(format!("invalid memory offset: '{}'", off.as_str()))
                                    .at(lineno, col),
                            );
                            return None;
                        }
                    },
                    // A symbolic offset is kept as a zero placeholder; the
                    // encoder rejects it where a numeric value is required.
                    Rule::ident => offset = Imm::symbolic(),
                    _ => {}
                }
            }
            Rule::mem_base => {
                let token = part.as_str();
                match Reg::parse(token) {
                    Some(reg) => base = Some(reg),
                    None => {
                        diags.push(error(format!("invalid register: '{token}'")).at(lineno, col));
                        return None;
                    }
                }
            }
            _ => {}
        }
    }

    Some(Operand::Mem(Mem {
        base: base?,
        offset,
    }))
}
