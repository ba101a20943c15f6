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

//! The static RV32I instruction table: one record per base mnemonic giving
//! its encoding format, opcode and funct3/funct7 fields. Pseudo-instructions
//! never appear here; they must be rewritten before encoding.

/// Encoding format, selects the bit packer in pass two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    R,
    I,
    S,
    B,
    U,
    J,
    System,
    Fence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstrSpec {
    pub format: Format,
    pub opcode: u32,
    pub funct3: Option<u32>,
    pub funct7: Option<u32>,
}

pub const OP_R: u32 = 0b0110011; // 0x33
pub const OP_I_ALU: u32 = 0b0010011; // 0x13
pub const OP_JALR: u32 = 0b1100111; // 0x67
pub const OP_LOAD: u32 = 0b0000011; // 0x03
pub const OP_STORE: u32 = 0b0100011; // 0x23
pub const OP_BRANCH: u32 = 0b1100011; // 0x63
pub const OP_LUI: u32 = 0b0110111; // 0x37
pub const OP_AUIPC: u32 = 0b0010111; // 0x17
pub const OP_JAL: u32 = 0b1101111; // 0x6F
pub const OP_SYSTEM: u32 = 0b1110011; // 0x73
pub const OP_MISC_MEM: u32 = 0b0001111; // 0x0F

const fn spec(format: Format, opcode: u32, funct3: Option<u32>, funct7: Option<u32>) -> InstrSpec {
    InstrSpec {
        format,
        opcode,
        funct3,
        funct7,
    }
}

/// Looks up the encoding record for a base mnemonic (already lowercased by
/// the parser, but tolerant of mixed case).
pub fn lookup(mnemonic: &str) -> Option<InstrSpec> {
    let m = mnemonic.to_ascii_lowercase();
    let sp = match m.as_str() {
        // R-type
        "add" => spec(Format::R, OP_R, Some(0b000), Some(0b0000000)),
        "sub" => spec(Format::R, OP_R, Some(0b000), Some(0b0100000)),
        "sll" => spec(Format::R, OP_R, Some(0b001), Some(0b0000000)),
        "slt" => spec(Format::R, OP_R, Some(0b010), Some(0b0000000)),
        "sltu" => spec(Format::R, OP_R, Some(0b011), Some(0b0000000)),
        "xor" => spec(Format::R, OP_R, Some(0b100), Some(0b0000000)),
        "srl" => spec(Format::R, OP_R, Some(0b101), Some(0b0000000)),
        "sra" => spec(Format::R, OP_R, Some(0b101), Some(0b0100000)),
        "or" => spec(Format::R, OP_R, Some(0b110), Some(0b0000000)),
        "and" => spec(Format::R, OP_R, Some(0b111), Some(0b0000000)),

        // I-type ALU immediates
        "addi" => spec(Format::I, OP_I_ALU, Some(0b000), None),
        "slti" => spec(Format::I, OP_I_ALU, Some(0b010), None),
        "sltiu" => spec(Format::I, OP_I_ALU, Some(0b011), None),
        "xori" => spec(Format::I, OP_I_ALU, Some(0b100), None),
        "ori" => spec(Format::I, OP_I_ALU, Some(0b110), None),
        "andi" => spec(Format::I, OP_I_ALU, Some(0b111), None),

        // Shifts: shamt lives in imm[4:0], funct7 distinguishes srli/srai
        "slli" => spec(Format::I, OP_I_ALU, Some(0b001), Some(0b0000000)),
        "srli" => spec(Format::I, OP_I_ALU, Some(0b101), Some(0b0000000)),
        "srai" => spec(Format::I, OP_I_ALU, Some(0b101), Some(0b0100000)),

        // Loads
        "lb" => spec(Format::I, OP_LOAD, Some(0b000), None),
        "lh" => spec(Format::I, OP_LOAD, Some(0b001), None),
        "lw" => spec(Format::I, OP_LOAD, Some(0b010), None),
        "lbu" => spec(Format::I, OP_LOAD, Some(0b100), None),
        "lhu" => spec(Format::I, OP_LOAD, Some(0b101), None),

        "jalr" => spec(Format::I, OP_JALR, Some(0b000), None),

        // Stores
        "sb" => spec(Format::S, OP_STORE, Some(0b000), None),
        "sh" => spec(Format::S, OP_STORE, Some(0b001), None),
        "sw" => spec(Format::S, OP_STORE, Some(0b010), None),

        // Conditional branches
        "beq" => spec(Format::B, OP_BRANCH, Some(0b000), None),
        "bne" => spec(Format::B, OP_BRANCH, Some(0b001), None),
        "blt" => spec(Format::B, OP_BRANCH, Some(0b100), None),
        "bge" => spec(Format::B, OP_BRANCH, Some(0b101), None),
        "bltu" => spec(Format::B, OP_BRANCH, Some(0b110), None),
        "bgeu" => spec(Format::B, OP_BRANCH, Some(0b111), None),

        // Upper immediates
        "lui" => spec(Format::U, OP_LUI, None, None),
        "auipc" => spec(Format::U, OP_AUIPC, None, None),

        "jal" => spec(Format::J, OP_JAL, None, None),

        // System: ecall imm=0, ebreak imm=1
        "ecall" => spec(Format::System, OP_SYSTEM, Some(0b000), None),
        "ebreak" => spec(Format::System, OP_SYSTEM, Some(0b000), None),

        // Memory ordering
        "fence" => spec(Format::Fence, OP_MISC_MEM, Some(0b000), None),
        "fence.i" => spec(Format::Fence, OP_MISC_MEM, Some(0b001), None),

        _ => return None,
    };
    Some(sp)
}

// ------------- unit tests -------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_r_type_fields() {
        let add = lookup("add").unwrap();
        assert_eq!(add.format, Format::R);
        assert_eq!(add.opcode, 0x33);
        assert_eq!(add.funct3, Some(0));
        assert_eq!(add.funct7, Some(0));

        let sub = lookup("sub").unwrap();
        assert_eq!(sub.funct7, Some(0b0100000));
    }

    #[test]
    fn test_shift_carries_funct7() {
        let srai = lookup("srai").unwrap();
        assert_eq!(srai.format, Format::I);
        assert_eq!(srai.funct7, Some(0b0100000));
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(lookup("ADDI"), lookup("addi"));
        assert_eq!(lookup("Fence.I"), lookup("fence.i"));
    }

    #[test]
    fn test_pseudos_are_absent() {
        assert_eq!(lookup("li"), None);
        assert_eq!(lookup("mv"), None);
        assert_eq!(lookup("ret"), None);
        assert_eq!(lookup("nop"), None);
    }

    #[test]
    fn test_unknown() {
        assert_eq!(lookup("mul"), None);
        assert_eq!(lookup("c.addi"), None);
    }
}
