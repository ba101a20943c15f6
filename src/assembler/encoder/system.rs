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

//! System calls and memory ordering. All of these reuse the I-format
//! packer with fixed register fields.

use crate::assembler::encoder::Encoder;
use crate::assembler::encoder::components::pack_i;
use crate::ast::{Instruction, Operand};
use crate::diagnostics::error;
use crate::isa::InstrSpec;

/// Default fence mask: pred = succ = IORW, fm = 0.
const FENCE_IORW_IORW: u32 = 0xFF;

impl<'a> Encoder<'a> {
    pub(crate) fn encode_system(&mut self, ins: &Instruction, spec: &InstrSpec) -> Option<u32> {
        match ins.mnemonic.as_str() {
            "ecall" => Some(pack_i(0, 0, 0, 0, spec.opcode)),
            "ebreak" => Some(pack_i(1, 0, 0, 0, spec.opcode)),
            _ => {
                self.diags
                    .push(error("unsupported system instruction").at(ins.line, ins.col));
                None
            }
        }
    }

    pub(crate) fn encode_fence(&mut self, ins: &Instruction, spec: &InstrSpec) -> Option<u32> {
        let f3 = spec.funct3.unwrap_or(0);
        match ins.mnemonic.as_str() {
            "fence" => {
                let mut imm = FENCE_IORW_IORW;
                if let [Operand::Imm(mask)] = ins.operands.as_slice() {
                    imm = (mask.value & 0xFFF) as u32;
                }
                Some(pack_i(imm, 0, f3, 0, spec.opcode))
            }
            "fence.i" => Some(pack_i(0, 0, f3, 0, spec.opcode)),
            _ => {
                self.diags
                    .push(error("unsupported fence form").at(ins.line, ins.col));
                None
            }
        }
    }
}
