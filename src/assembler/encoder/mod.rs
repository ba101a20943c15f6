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

//! Pass two: walk the expanded node stream a second time and pack each
//! instruction into its 32-bit word, resolving symbols against the table
//! built by pass one. A failed instruction is reported and skipped; the PC
//! advances only for emitted words.

mod alu;
mod components;
mod control_flow;
mod load_store;
mod system;

use std::collections::HashMap;

use crate::assembler::symbol_table::SymbolTable;
use crate::ast::{Instruction, Node, Operand, Reg, Section};
use crate::bits::is_signed_nbit;
use crate::diagnostics::{Diagnostic, error};
use crate::isa::{self, Format};

/// One emitted machine word with its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct Encoded {
    pub word: u32,
    pub pc: u32,
    pub line: usize,
    pub col: usize,
    pub mnemonic: String,
}

pub(crate) struct Encoder<'a> {
    symtab: &'a SymbolTable,
    pc: u32,
    /// Pairs a `@pcrel_lo` consumer with its producing auipc:
    /// (rd, symbol) -> (pc of the auipc, emitted hi20).
    last_auipc: HashMap<(u8, String), (u32, i64)>,
    diags: Vec<Diagnostic>,
}

/// Encodes every instruction in the stream. `text_base` seeds the PC; the
/// symbol table is read-only from here on.
pub fn encode(
    nodes: &[Node],
    symtab: &SymbolTable,
    text_base: u32,
) -> (Vec<Encoded>, Vec<Diagnostic>) {
    let mut enc = Encoder {
        symtab,
        pc: text_base,
        last_auipc: HashMap::new(),
        diags: Vec::new(),
    };
    let mut words: Vec<Encoded> = Vec::new();
    let mut section: Option<Section> = None;

    for node in nodes {
        match node {
            Node::Directive(d) => {
                // Re-entering .text keeps the accumulated PC.
                if d.name == ".text" {
                    section = Some(Section::Text);
                } else if d.name == ".data" {
                    section = Some(Section::Data);
                }
            }
            Node::Label(_) => {} // placed during pass one
            Node::Instruction(ins) => {
                if section != Some(Section::Text) {
                    enc.diags
                        .push(error("instruction outside .text").at(ins.line, ins.col));
                    continue;
                }
                if let Some(word) = enc.encode_instruction(ins) {
                    words.push(Encoded {
                        word,
                        pc: enc.pc,
                        line: ins.line,
                        col: ins.col,
                        mnemonic: ins.mnemonic.clone(),
                    });
                    enc.pc += 4;
                }
            }
        }
    }

    (words, enc.diags)
}

impl<'a> Encoder<'a> {
    fn encode_instruction(&mut self, ins: &Instruction) -> Option<u32> {
        let Some(spec) = isa::lookup(&ins.mnemonic) else {
            self.diags.push(
                error(format!("unknown instruction: {}", ins.mnemonic))
                    .at(ins.line, ins.col)
                    .with_hint("is this a pseudo-instruction that was not expanded?"),
            );
            return None;
        };

        match spec.format {
            Format::R => self.encode_r_type(ins, &spec),
            Format::I => match spec.opcode {
                isa::OP_LOAD => self.encode_load(ins, &spec),
                isa::OP_JALR => self.encode_jalr(ins, &spec),
                _ if matches!(ins.mnemonic.as_str(), "slli" | "srli" | "srai") => {
                    self.encode_shift(ins, &spec)
                }
                _ => self.encode_alu_imm(ins, &spec),
            },
            Format::S => self.encode_store(ins, &spec),
            Format::B => self.encode_branch(ins, &spec),
            Format::U => self.encode_upper(ins, &spec),
            Format::J => self.encode_jal(ins, &spec),
            Format::System => self.encode_system(ins, &spec),
            Format::Fence => self.encode_fence(ins, &spec),
        }
    }

    // --- shared operand helpers ---

    fn expect_reg(&mut self, op: &Operand, ins: &Instruction) -> Option<Reg> {
        match op {
            Operand::Reg(reg) => Some(*reg),
            _ => {
                self.diags
                    .push(error("expected a register operand").at(ins.line, ins.col));
                None
            }
        }
    }

    /// Checks the signed 12-bit range and masks the field.
    fn check_imm12(&mut self, value: i64, ins: &Instruction) -> u32 {
        if !is_signed_nbit(value, 12) {
            self.diags.push(
                error("signed 12-bit immediate out of range (-2048..2047)").at(ins.line, ins.col),
            );
        }
        (value & 0xFFF) as u32
    }

    /// Checks the signed 20-bit range and masks the field.
    fn check_imm20(&mut self, value: i64, ins: &Instruction) -> u32 {
        if !is_signed_nbit(value, 20) {
            self.diags.push(
                error("20-bit upper immediate out of range (-524288..524287)")
                    .at(ins.line, ins.col),
            );
        }
        (value & 0xF_FFFF) as u32
    }
}

// ------------- unit tests -------------
