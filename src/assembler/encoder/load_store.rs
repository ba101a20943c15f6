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

//! Loads (I-format) and stores (S-format). Both take a `imm(rs1)` memory
//! operand whose offset must have been written as a numeric literal.

use crate::assembler::encoder::Encoder;
use crate::assembler::encoder::components::{pack_i, pack_s};
use crate::ast::{ImmOrigin, Instruction, Mem, Operand};
use crate::diagnostics::error;
use crate::isa::InstrSpec;

impl<'a> Encoder<'a> {
    fn numeric_offset(&mut self, mem: &Mem, ins: &Instruction) -> Option<i64> {
        if mem.offset.origin != ImmOrigin::Numeric {
            self.diags.push(
                error("memory offset must be a numeric immediate (signed 12 bits)")
                    .at(ins.line, ins.col),
            );
            return None;
        }
        Some(mem.offset.value)
    }

    pub(crate) fn encode_load(&mut self, ins: &Instruction, spec: &InstrSpec) -> Option<u32> {
        let [rd_op, mem_op] = ins.operands.as_slice() else {
            self.diags.push(
                error(format!("{} expects rd, imm(rs1)", ins.mnemonic)).at(ins.line, ins.col),
            );
            return None;
        };
        let rd = self.expect_reg(rd_op, ins);
        let Operand::Mem(mem) = mem_op else {
            self.diags
                .push(error("invalid memory operand").at(ins.line, ins.col));
            return None;
        };
        let offset = self.numeric_offset(mem, ins)?;
        let imm12 = self.check_imm12(offset, ins);
        Some(pack_i(
            imm12,
            mem.base.num as u32,
            spec.funct3.unwrap_or(0),
            rd?.num as u32,
            spec.opcode,
        ))
    }

    pub(crate) fn encode_store(&mut self, ins: &Instruction, spec: &InstrSpec) -> Option<u32> {
        let [rs2_op, mem_op] = ins.operands.as_slice() else {
            self.diags.push(
                error(format!("{} expects rs2, imm(rs1)", ins.mnemonic)).at(ins.line, ins.col),
            );
            return None;
        };
        let rs2 = self.expect_reg(rs2_op, ins);
        let Operand::Mem(mem) = mem_op else {
            self.diags
                .push(error("invalid memory operand").at(ins.line, ins.col));
            return None;
        };
        let offset = self.numeric_offset(mem, ins)?;
        let imm12 = self.check_imm12(offset, ins);
        Some(pack_s(
            imm12,
            rs2?.num as u32,
            mem.base.num as u32,
            spec.funct3.unwrap_or(0),
            spec.opcode,
        ))
    }
}
