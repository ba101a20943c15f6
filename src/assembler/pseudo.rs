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

//! Pseudo-instruction expansion: a pure node-list to node-list rewrite run
//! between parsing and layout, so later passes only ever see base RV32I
//! mnemonics. A pseudo whose operands do not match its expected shape is
//! passed through untouched and surfaces as an unknown instruction during
//! encoding.

use crate::ast::{Imm, Instruction, Mem, Node, Operand, Reg, Sym};

const LOADS: [&str; 5] = ["lb", "lh", "lw", "lbu", "lhu"];
const STORES: [&str; 3] = ["sb", "sh", "sw"];

fn remake(ins: &Instruction, mnemonic: &str, operands: Vec<Operand>) -> Instruction {
    Instruction {
        mnemonic: mnemonic.to_string(),
        operands,
        line: ins.line,
        col: ins.col,
        section: ins.section,
    }
}

fn suffixed(sym: &Sym, suffix: &str) -> Sym {
    Sym::new(format!("{}@{}", sym.name, suffix))
}

fn imm(value: i64) -> Operand {
    Operand::Imm(Imm::numeric(value))
}

fn fits_i12(value: i64) -> bool {
    (-2048..=2047).contains(&value)
}

/// `auipc rd, sym@pcrel_hi` followed by `addi rd, rd, sym@pcrel_lo`.
fn la_seq(ins: &Instruction, rd: Reg, sym: &Sym) -> Vec<Instruction> {
    vec![
        remake(ins, "auipc", vec![rd.into(), suffixed(sym, "pcrel_hi").into()]),
        remake(
            ins,
            "addi",
            vec![rd.into(), rd.into(), suffixed(sym, "pcrel_lo").into()],
        ),
    ]
}

fn li_seq(ins: &Instruction, rd: Reg, value: i64) -> Vec<Instruction> {
    if fits_i12(value) {
        return vec![remake(ins, "addi", vec![rd.into(), Reg::X0.into(), imm(value)])];
    }
    // The +0x800 bias keeps the low half in signed-12 range after the
    // sign extension applied to lui's operand.
    let upper = (value + 0x800) >> 12;
    let low = value - (upper << 12);
    vec![
        remake(ins, "lui", vec![rd.into(), imm(upper)]),
        remake(ins, "addi", vec![rd.into(), rd.into(), imm(low)]),
    ]
}

/// Returns the replacement sequence, or None when the mnemonic is not a
/// pseudo (or its operand shape does not match the table).
fn expand_instruction(ins: &Instruction) -> Option<Vec<Instruction>> {
    use Operand::{Imm as OImm, Reg as OReg, Sym as OSym};

    let seq = match (ins.mnemonic.as_str(), ins.operands.as_slice()) {
        ("nop", []) => vec![remake(ins, "addi", vec![Reg::X0.into(), Reg::X0.into(), imm(0)])],

        ("mv", [OReg(rd), OReg(rs)]) => {
            vec![remake(ins, "addi", vec![(*rd).into(), (*rs).into(), imm(0)])]
        }
        ("not", [OReg(rd), OReg(rs)]) => {
            vec![remake(ins, "xori", vec![(*rd).into(), (*rs).into(), imm(-1)])]
        }
        ("neg", [OReg(rd), OReg(rs)]) => {
            vec![remake(ins, "sub", vec![(*rd).into(), Reg::X0.into(), (*rs).into()])]
        }
        ("seqz", [OReg(rd), OReg(rs)]) => {
            vec![remake(ins, "sltiu", vec![(*rd).into(), (*rs).into(), imm(1)])]
        }
        ("snez", [OReg(rd), OReg(rs)]) => {
            vec![remake(ins, "sltu", vec![(*rd).into(), Reg::X0.into(), (*rs).into()])]
        }
        ("sltz", [OReg(rd), OReg(rs)]) => {
            vec![remake(ins, "slt", vec![(*rd).into(), (*rs).into(), Reg::X0.into()])]
        }
        ("sgtz", [OReg(rd), OReg(rs)]) => {
            vec![remake(ins, "slt", vec![(*rd).into(), Reg::X0.into(), (*rs).into()])]
        }

        // Compare-against-zero branches.
        ("beqz", [OReg(rs), target @ (OImm(_) | OSym(_))]) => {
            vec![remake(ins, "beq", vec![(*rs).into(), Reg::X0.into(), target.clone()])]
        }
        ("bnez", [OReg(rs), target @ (OImm(_) | OSym(_))]) => {
            vec![remake(ins, "bne", vec![(*rs).into(), Reg::X0.into(), target.clone()])]
        }
        ("blez", [OReg(rs), target @ (OImm(_) | OSym(_))]) => {
            vec![remake(ins, "bge", vec![Reg::X0.into(), (*rs).into(), target.clone()])]
        }
        ("bgez", [OReg(rs), target @ (OImm(_) | OSym(_))]) => {
            vec![remake(ins, "bge", vec![(*rs).into(), Reg::X0.into(), target.clone()])]
        }
        ("bltz", [OReg(rs), target @ (OImm(_) | OSym(_))]) => {
            vec![remake(ins, "blt", vec![(*rs).into(), Reg::X0.into(), target.clone()])]
        }
        ("bgtz", [OReg(rs), target @ (OImm(_) | OSym(_))]) => {
            vec![remake(ins, "blt", vec![Reg::X0.into(), (*rs).into(), target.clone()])]
        }

        // Reversed-comparison branches swap their register operands.
        ("bgt", [OReg(rs), OReg(rt), target @ (OImm(_) | OSym(_))]) => {
            vec![remake(ins, "blt", vec![(*rt).into(), (*rs).into(), target.clone()])]
        }
        ("ble", [OReg(rs), OReg(rt), target @ (OImm(_) | OSym(_))]) => {
            vec![remake(ins, "bge", vec![(*rt).into(), (*rs).into(), target.clone()])]
        }
        ("bgtu", [OReg(rs), OReg(rt), target @ (OImm(_) | OSym(_))]) => {
            vec![remake(ins, "bltu", vec![(*rt).into(), (*rs).into(), target.clone()])]
        }
        ("bleu", [OReg(rs), OReg(rt), target @ (OImm(_) | OSym(_))]) => {
            vec![remake(ins, "bgeu", vec![(*rt).into(), (*rs).into(), target.clone()])]
        }

        ("j", [target @ (OImm(_) | OSym(_))]) => {
            vec![remake(ins, "jal", vec![Reg::X0.into(), target.clone()])]
        }
        ("jal", [target @ (OImm(_) | OSym(_))]) => {
            vec![remake(ins, "jal", vec![Reg::RA.into(), target.clone()])]
        }
        ("jr", [OReg(rs)]) => {
            vec![remake(ins, "jalr", vec![Reg::X0.into(), (*rs).into(), imm(0)])]
        }
        ("jalr", [OReg(rs)]) => {
            vec![remake(ins, "jalr", vec![Reg::RA.into(), (*rs).into(), imm(0)])]
        }
        ("ret", []) => {
            vec![remake(ins, "jalr", vec![Reg::X0.into(), Reg::RA.into(), imm(0)])]
        }

        ("li", [OReg(rd), OImm(value)]) => li_seq(ins, *rd, value.value),
        ("li", [OReg(rd), OSym(sym)]) => la_seq(ins, *rd, sym),
        ("la", [OReg(rd), OSym(sym)]) => la_seq(ins, *rd, sym),

        ("call", [OSym(sym)]) => {
            let mut seq = la_seq(ins, Reg::RA, sym);
            // The la sequence's addi becomes the linking jalr.
            seq[1] = remake(
                ins,
                "jalr",
                vec![
                    Reg::RA.into(),
                    Reg::RA.into(),
                    suffixed(sym, "pcrel_lo").into(),
                ],
            );
            seq
        }
        ("call", [OImm(offset)]) => {
            vec![remake(ins, "jal", vec![Reg::RA.into(), imm(offset.value)])]
        }
        ("tail", [OSym(sym)]) => {
            vec![
                remake(
                    ins,
                    "auipc",
                    vec![Reg::T1.into(), suffixed(sym, "pcrel_hi").into()],
                ),
                remake(
                    ins,
                    "jalr",
                    vec![
                        Reg::X0.into(),
                        Reg::T1.into(),
                        suffixed(sym, "pcrel_lo").into(),
                    ],
                ),
            ]
        }
        ("tail", [OImm(offset)]) => {
            vec![remake(ins, "jal", vec![Reg::X0.into(), imm(offset.value)])]
        }

        // Loads/stores addressed by a bare symbol materialize the address
        // first; stores borrow x5 so the value register survives.
        (m, [OReg(rd), OSym(sym)]) if LOADS.contains(&m) => {
            let mut seq = la_seq(ins, *rd, sym);
            seq.push(remake(
                ins,
                m,
                vec![
                    (*rd).into(),
                    Operand::Mem(Mem {
                        base: *rd,
                        offset: Imm::numeric(0),
                    }),
                ],
            ));
            seq
        }
        (m, [OReg(rs2), OSym(sym)]) if STORES.contains(&m) => {
            let mut seq = la_seq(ins, Reg::T0, sym);
            seq.push(remake(
                ins,
                m,
                vec![
                    (*rs2).into(),
                    Operand::Mem(Mem {
                        base: Reg::T0,
                        offset: Imm::numeric(0),
                    }),
                ],
            ));
            seq
        }

        _ => return None,
    };
    Some(seq)
}

/// Rewrites every pseudo-instruction in the stream; all other nodes pass
/// through unchanged.
pub fn expand(nodes: Vec<Node>) -> Vec<Node> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            Node::Instruction(ins) => match expand_instruction(&ins) {
                Some(seq) => out.extend(seq.into_iter().map(Node::Instruction)),
                None => out.push(Node::Instruction(ins)),
            },
            other => out.push(other),
        }
    }
    out
}

// ------------- unit tests -------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn expand_src(src: &str) -> Vec<Instruction> {
        let (nodes, diags) = parse(src);
        assert!(diags.is_empty(), "unexpected diagnostics: {diags:?}");
        expand(nodes)
            .into_iter()
            .filter_map(|n| match n {
                Node::Instruction(ins) => Some(ins),
                _ => None,
            })
            .collect()
    }

    fn render(ins: &Instruction) -> String {
        let ops: Vec<String> = ins
            .operands
            .iter()
            .map(|op| match op {
                Operand::Reg(r) => r.to_string(),
                Operand::Imm(i) => i.value.to_string(),
                Operand::Sym(s) => s.name.clone(),
                Operand::Mem(m) => format!("{}({})", m.offset.value, m.base),
            })
            .collect();
        format!("{} {}", ins.mnemonic, ops.join(","))
    }

    #[test]
    fn test_nop_and_mv() {
        let out = expand_src("nop\nmv a0, a1\n");
        assert_eq!(render(&out[0]), "addi x0,x0,0");
        assert_eq!(render(&out[1]), "addi x10,x11,0");
    }

    #[test]
    fn test_unary_aliases() {
        let out = expand_src("not x1, x2\nneg x3, x4\nseqz x5, x6\nsnez x7, x8\nsltz x9, x10\nsgtz x11, x12\n");
        assert_eq!(render(&out[0]), "xori x1,x2,-1");
        assert_eq!(render(&out[1]), "sub x3,x0,x4");
        assert_eq!(render(&out[2]), "sltiu x5,x6,1");
        assert_eq!(render(&out[3]), "sltu x7,x0,x8");
        assert_eq!(render(&out[4]), "slt x9,x10,x0");
        assert_eq!(render(&out[5]), "slt x11,x0,x12");
    }

    #[test]
    fn test_zero_branches() {
        let out = expand_src("beqz x1, target\nbnez x1, 8\nblez x2, target\nbgez x2, target\nbltz x3, target\nbgtz x3, target\n");
        assert_eq!(render(&out[0]), "beq x1,x0,target");
        assert_eq!(render(&out[1]), "bne x1,x0,8");
        assert_eq!(render(&out[2]), "bge x0,x2,target");
        assert_eq!(render(&out[3]), "bge x2,x0,target");
        assert_eq!(render(&out[4]), "blt x3,x0,target");
        assert_eq!(render(&out[5]), "blt x0,x3,target");
    }

    #[test]
    fn test_swapped_branches() {
        let out = expand_src("bgt x1, x2, t\nble x1, x2, t\nbgtu x1, x2, t\nbleu x1, x2, t\n");
        assert_eq!(render(&out[0]), "blt x2,x1,t");
        assert_eq!(render(&out[1]), "bge x2,x1,t");
        assert_eq!(render(&out[2]), "bltu x2,x1,t");
        assert_eq!(render(&out[3]), "bgeu x2,x1,t");
    }

    #[test]
    fn test_jumps_and_ret() {
        let out = expand_src("j 16\njal 16\njr x5\njalr x5\nret\n");
        assert_eq!(render(&out[0]), "jal x0,16");
        assert_eq!(render(&out[1]), "jal x1,16");
        assert_eq!(render(&out[2]), "jalr x0,x5,0");
        assert_eq!(render(&out[3]), "jalr x1,x5,0");
        assert_eq!(render(&out[4]), "jalr x0,x1,0");
    }

    #[test]
    fn test_li_small() {
        let out = expand_src("li a0, 42\nli a1, -2048\n");
        assert_eq!(render(&out[0]), "addi x10,x0,42");
        assert_eq!(render(&out[1]), "addi x11,x0,-2048");
    }

    #[test]
    fn test_li_large_splits_with_rounding() {
        let out = expand_src("li a1, 0x12345678\n");
        assert_eq!(render(&out[0]), format!("lui x11,{}", 0x12345));
        assert_eq!(render(&out[1]), format!("addi x11,x11,{}", 0x678));

        // Low half above 0x7FF rounds the upper part up and goes negative.
        let out = expand_src("li a2, 0x12345FFF\n");
        assert_eq!(render(&out[0]), format!("lui x12,{}", 0x12346));
        assert_eq!(render(&out[1]), "addi x12,x12,-1");
    }

    #[test]
    fn test_li_symbol_becomes_la() {
        let out = expand_src("li a0, glob\n");
        assert_eq!(render(&out[0]), "auipc x10,glob@pcrel_hi");
        assert_eq!(render(&out[1]), "addi x10,x10,glob@pcrel_lo");
    }

    #[test]
    fn test_la_call_tail() {
        let out = expand_src("la a0, glob\ncall func\ncall 64\ntail func\ntail 64\n");
        assert_eq!(render(&out[0]), "auipc x10,glob@pcrel_hi");
        assert_eq!(render(&out[1]), "addi x10,x10,glob@pcrel_lo");
        assert_eq!(render(&out[2]), "auipc x1,func@pcrel_hi");
        assert_eq!(render(&out[3]), "jalr x1,x1,func@pcrel_lo");
        assert_eq!(render(&out[4]), "jal x1,64");
        assert_eq!(render(&out[5]), "auipc x6,func@pcrel_hi");
        assert_eq!(render(&out[6]), "jalr x0,x6,func@pcrel_lo");
        assert_eq!(render(&out[7]), "jal x0,64");
    }

    #[test]
    fn test_load_store_of_bare_symbol() {
        let out = expand_src("lw a0, counter\nsw a1, counter\n");
        assert_eq!(render(&out[0]), "auipc x10,counter@pcrel_hi");
        assert_eq!(render(&out[1]), "addi x10,x10,counter@pcrel_lo");
        assert_eq!(render(&out[2]), "lw x10,0(x10)");
        assert_eq!(render(&out[3]), "auipc x5,counter@pcrel_hi");
        assert_eq!(render(&out[4]), "addi x5,x5,counter@pcrel_lo");
        assert_eq!(render(&out[5]), "sw x11,0(x5)");
    }

    #[test]
    fn test_base_instructions_pass_through() {
        let out = expand_src("addi x1, x2, 3\nlw x1, 4(x2)\njal x1, 8\n");
        assert_eq!(render(&out[0]), "addi x1,x2,3");
        assert_eq!(render(&out[1]), "lw x1,4(x2)");
        assert_eq!(render(&out[2]), "jal x1,8");
    }

    #[test]
    fn test_shape_mismatch_passes_through() {
        // mv with an immediate is not a valid pseudo shape; the encoder
        // reports it later as an unknown mnemonic.
        let out = expand_src("mv a0, 5\n");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].mnemonic, "mv");
    }

    #[test]
    fn test_non_instructions_untouched() {
        let (nodes, _) = parse(".text\nstart:\nnop\n");
        let out = expand(nodes);
        assert!(matches!(out[0], Node::Directive(_)));
        assert!(matches!(out[1], Node::Label(_)));
        assert!(matches!(out[2], Node::Instruction(_)));
    }
}
