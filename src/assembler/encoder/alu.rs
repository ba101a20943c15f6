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

//! Register-register arithmetic, ALU immediates and shifts.

use crate::assembler::encoder::Encoder;
use crate::assembler::encoder::components::{pack_i, pack_r};
use crate::ast::{Instruction, Operand};
use crate::bits::is_unsigned_nbit;
use crate::diagnostics::error;
use crate::isa::InstrSpec;

impl<'a> Encoder<'a> {
    pub(crate) fn encode_r_type(&mut self, ins: &Instruction, spec: &InstrSpec) -> Option<u32> {
        if ins.operands.len() != 3 {
            self.diags.push(
                error(format!("{} expects rd, rs1, rs2", ins.mnemonic)).at(ins.line, ins.col),
            );
            return None;
        }
        let rd = self.expect_reg(&ins.operands[0], ins);
        let rs1 = self.expect_reg(&ins.operands[1], ins);
        let rs2 = self.expect_reg(&ins.operands[2], ins);
        let (rd, rs1, rs2) = (rd?, rs1?, rs2?);
        Some(pack_r(
            spec.funct7.unwrap_or(0),
            rs2.num as u32,
            rs1.num as u32,
            spec.funct3.unwrap_or(0),
            rd.num as u32,
            spec.opcode,
        ))
    }

    /// addi/slti/sltiu/xori/ori/andi. A `@pcrel_lo` symbol in the immediate
    /// slot resolves against the matching auipc recorded earlier.
    pub(crate) fn encode_alu_imm(&mut self, ins: &Instruction, spec: &InstrSpec) -> Option<u32> {
        if ins.operands.len() != 3 {
            self.diags.push(
                error(format!("{} expects rd, rs1, imm", ins.mnemonic)).at(ins.line, ins.col),
            );
            return None;
        }
        let rd = self.expect_reg(&ins.operands[0], ins);
        let rs1 = self.expect_reg(&ins.operands[1], ins);
        let imm12 = match &ins.operands[2] {
            Operand::Imm(imm) => self.check_imm12(imm.value, ins),
            Operand::Sym(sym) => self.resolve_pcrel_lo(sym, rd?, ins),
            _ => {
                self.diags.push(
                    error("immediate must be numeric (signed 12 bits)").at(ins.line, ins.col),
                );
                0
            }
        };
        let (rd, rs1) = (rd?, rs1?);
        Some(pack_i(
            imm12,
            rs1.num as u32,
            spec.funct3.unwrap_or(0),
            rd.num as u32,
            spec.opcode,
        ))
    }

    /// slli/srli/srai: shamt in imm[4:0], funct7 in imm[11:5].
    pub(crate) fn encode_shift(&mut self, ins: &Instruction, spec: &InstrSpec) -> Option<u32> {
        if ins.operands.len() != 3 {
            self.diags.push(
                error(format!("{} expects rd, rs1, shamt", ins.mnemonic)).at(ins.line, ins.col),
            );
            return None;
        }
        let rd = self.expect_reg(&ins.operands[0], ins);
        let rs1 = self.expect_reg(&ins.operands[1], ins);
        let imm12 = match &ins.operands[2] {
            Operand::Imm(imm) => {
                if !is_unsigned_nbit(imm.value, 5) {
                    self.diags
                        .push(error("shift amount out of range (0..31)").at(ins.line, ins.col));
                }
                (spec.funct7.unwrap_or(0) << 5) | (imm.value & 0x1F) as u32
            }
            _ => {
                self.diags
                    .push(error("shift amount must be a numeric immediate").at(ins.line, ins.col));
                0
            }
        };
        let (rd, rs1) = (rd?, rs1?);
        Some(pack_i(
            imm12,
            rs1.num as u32,
            spec.funct3.unwrap_or(0),
            rd.num as u32,
            spec.opcode,
        ))
    }
}
