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

//! Branches, jumps and the upper-immediate pair. This is where the
//! auipc/@pcrel_lo coupling lives: a `auipc rd, sym@pcrel_hi` records
//! (rd, sym) -> (pc, hi20), and the following addi/jalr with
//! `sym@pcrel_lo` reads it back to compute the low half.

use crate::assembler::encoder::Encoder;
use crate::assembler::encoder::components::{pack_b, pack_i, pack_j, pack_u};
use crate::assembler::symbol_table::{PcrelPart, split_pcrel};
use crate::ast::{Instruction, Operand, Reg, Sym};
use crate::bits::is_signed_nbit;
use crate::diagnostics::{error, warning};
use crate::isa::InstrSpec;

impl<'a> Encoder<'a> {
    /// Branch/jump targets: a symbol resolves to `addr - pc`; a numeric
    /// immediate is already a byte offset. Unresolved symbols report an
    /// error and fall back to offset 0.
    fn resolve_target(&mut self, op: &Operand, ins: &Instruction) -> i64 {
        match op {
            Operand::Sym(sym) => {
                let (base, _) = split_pcrel(&sym.name);
                match self.symtab.get(base) {
                    Some(&addr) => addr - self.pc as i64,
                    None => {
                        self.diags
                            .push(error(format!("undefined symbol: {base}")).at(ins.line, ins.col));
                        0
                    }
                }
            }
            Operand::Imm(imm) => imm.value,
            _ => {
                self.diags.push(
                    error("branch or jump target must be a symbol or immediate")
                        .at(ins.line, ins.col),
                );
                0
            }
        }
    }

    /// Computes hi20 for `auipc rd, sym@pcrel_hi` with the rounding bias
    /// that keeps the paired low half in signed-12 range.
    fn resolve_pcrel_hi(&mut self, base: &str, ins: &Instruction) -> i64 {
        let addr = match self.symtab.get(base) {
            Some(&addr) => addr,
            None => {
                self.diags
                    .push(error(format!("undefined symbol: {base}")).at(ins.line, ins.col));
                0
            }
        };
        let rel = addr - self.pc as i64;
        (rel + 0x800) >> 12
    }

    /// Resolves `sym@pcrel_lo` against the auipc recorded for (rd, sym).
    /// Without a match, warns and computes against the current PC instead.
    pub(crate) fn resolve_pcrel_lo(&mut self, sym: &Sym, rd: Reg, ins: &Instruction) -> u32 {
        let (base, part) = split_pcrel(&sym.name);
        if part != Some(PcrelPart::Lo) {
            self.diags
                .push(error("expected a @pcrel_lo symbol").at(ins.line, ins.col));
        }
        let addr = self.symtab.get(base).copied().unwrap_or(0);
        match self.last_auipc.get(&(rd.num, base.to_string())) {
            Some(&(pc_hi, hi20)) => {
                let lo12 = (addr - pc_hi as i64) - (hi20 << 12);
                if !is_signed_nbit(lo12, 12) {
                    self.diags
                        .push(error("pcrel_lo out of range").at(ins.line, ins.col));
                }
                (lo12 & 0xFFF) as u32
            }
            None => {
                self.diags.push(
                    warning(format!(
                        "no earlier auipc matches {base}@pcrel_lo; computing against the current pc"
                    ))
                    .at(ins.line, ins.col),
                );
                let rel = addr - self.pc as i64;
                let hi20 = (rel + 0x800) >> 12;
                let lo12 = rel - (hi20 << 12);
                if !is_signed_nbit(lo12, 12) {
                    self.diags
                        .push(error("pcrel_lo out of range after fallback").at(ins.line, ins.col));
                }
                (lo12 & 0xFFF) as u32
            }
        }
    }

    pub(crate) fn encode_branch(&mut self, ins: &Instruction, spec: &InstrSpec) -> Option<u32> {
        if ins.operands.len() != 3 {
            self.diags.push(
                error(format!("{} expects rs1, rs2, offset", ins.mnemonic)).at(ins.line, ins.col),
            );
            return None;
        }
        let rs1 = self.expect_reg(&ins.operands[0], ins);
        let rs2 = self.expect_reg(&ins.operands[1], ins);
        let offset = self.resolve_target(&ins.operands[2], ins);
        if offset % 2 != 0 {
            self.diags
                .push(error("branch offset must be even").at(ins.line, ins.col));
        }
        if !is_signed_nbit(offset / 2, 12) {
            self.diags.push(
                error("branch offset out of range (-4096..4094)").at(ins.line, ins.col),
            );
        }
        let (rs1, rs2) = (rs1?, rs2?);
        Some(pack_b(
            offset,
            rs2.num as u32,
            rs1.num as u32,
            spec.funct3.unwrap_or(0),
            spec.opcode,
        ))
    }

    pub(crate) fn encode_jal(&mut self, ins: &Instruction, spec: &InstrSpec) -> Option<u32> {
        let [rd_op, target] = ins.operands.as_slice() else {
            self.diags
                .push(error("jal expects rd, offset").at(ins.line, ins.col));
            return None;
        };
        let rd = self.expect_reg(rd_op, ins);
        let offset = self.resolve_target(target, ins);
        if offset % 2 != 0 {
            self.diags
                .push(error("jump offset must be even").at(ins.line, ins.col));
        }
        if !is_signed_nbit(offset / 2, 20) {
            self.diags
                .push(error("jump offset out of range (±1 MiB)").at(ins.line, ins.col));
        }
        Some(pack_j(offset, rd?.num as u32, spec.opcode))
    }

    /// `jalr rd, rs1, imm`, `jalr rd, rs1, sym@pcrel_lo` or `jalr rd, imm(rs1)`.
    pub(crate) fn encode_jalr(&mut self, ins: &Instruction, spec: &InstrSpec) -> Option<u32> {
        let f3 = spec.funct3.unwrap_or(0);
        match ins.operands.as_slice() {
            [Operand::Reg(rd), Operand::Reg(rs1), third @ (Operand::Imm(_) | Operand::Sym(_))] => {
                let imm12 = match third {
                    Operand::Imm(imm) => self.check_imm12(imm.value, ins),
                    Operand::Sym(sym) => self.resolve_pcrel_lo(sym, *rd, ins),
                    _ => unreachable!(),
                };
                Some(pack_i(imm12, rs1.num as u32, f3, rd.num as u32, spec.opcode))
            }
            [rd_op, Operand::Mem(mem)] => {
                let rd = self.expect_reg(rd_op, ins)?;
                let imm12 = self.check_imm12(mem.offset.value, ins);
                Some(pack_i(
                    imm12,
                    mem.base.num as u32,
                    f3,
                    rd.num as u32,
                    spec.opcode,
                ))
            }
            _ => {
                self.diags
                    .push(error("invalid jalr form").at(ins.line, ins.col));
                None
            }
        }
    }

    /// lui takes a plain 20-bit immediate; auipc additionally accepts a
    /// `sym@pcrel_hi` operand and records the pairing context.
    pub(crate) fn encode_upper(&mut self, ins: &Instruction, spec: &InstrSpec) -> Option<u32> {
        let [Operand::Reg(rd), imm_op] = ins.operands.as_slice() else {
            self.diags.push(
                error(format!("{} expects rd, imm20", ins.mnemonic)).at(ins.line, ins.col),
            );
            return None;
        };
        let rd = *rd;
        match imm_op {
            Operand::Imm(imm) => {
                let imm20 = self.check_imm20(imm.value, ins);
                Some(pack_u(imm20, rd.num as u32, spec.opcode))
            }
            Operand::Sym(sym) => {
                let (base, part) = split_pcrel(&sym.name);
                if part == Some(PcrelPart::Hi) && ins.mnemonic == "auipc" {
                    let base = base.to_string();
                    let hi20 = self.resolve_pcrel_hi(&base, ins);
                    self.last_auipc.insert((rd.num, base), (self.pc, hi20));
                    Some(pack_u((hi20 & 0xF_FFFF) as u32, rd.num as u32, spec.opcode))
                } else {
                    self.diags.push(
                        error("only auipc accepts a @pcrel_hi symbol operand")
                            .at(ins.line, ins.col),
                    );
                    None
                }
            }
            _ => {
                self.diags
                    .push(error("invalid upper immediate operand").at(ins.line, ins.col));
                None
            }
        }
    }
}
