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

//! Line-oriented recognition of assembly source. Each line is stripped of
//! comments and handed to the pest grammar on its own, so one malformed
//! line yields one diagnostic and parsing continues to the end of the file.

pub mod ast_builder;

use crate::ast::{Label, Node, Section};
use crate::diagnostics::{Diagnostic, error};
use pest::Parser;
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "./grammar.pest"]
pub struct LineParser;

/// Removes everything from the first `#` or `//` to the end of the line.
fn strip_comment(line: &str) -> &str {
    let hash = line.find('#');
    let slashes = line.find("//");
    match (hash, slashes) {
        (Some(h), Some(s)) => &line[..h.min(s)],
        (Some(h), None) => &line[..h],
        (None, Some(s)) => &line[..s],
        (None, None) => line,
    }
}

/// Parses a whole source text into a flat node stream plus diagnostics.
/// Never aborts: bad lines and bad operands are reported and skipped.
pub fn parse(text: &str) -> (Vec<Node>, Vec<Diagnostic>) {
    let mut nodes: Vec<Node> = Vec::new();
    let mut diags: Vec<Diagnostic> = Vec::new();
    let mut section: Option<Section> = None;

    for (idx, raw) in text.lines().enumerate() {
        let lineno = idx + 1;
        let core = strip_comment(raw);
        if core.trim().is_empty() {
            continue;
        }

        let line_pair = match LineParser::parse(Rule::line, core) {
            Ok(mut pairs) => pairs.next().expect("line rule always yields one pair"),
            Err(err) => {
                let col = match err.line_col {
                    pest::error::LineColLocation::Pos((_, col)) => col,
                    pest::error::LineColLocation::Span((_, col), _) => col,
                };
                diags.push(
                    error(format!("syntax error: {}", err.variant.message())).at(lineno, col),
                );
                continue;
            }
        };

        for pair in line_pair.into_inner() {
            match pair.as_rule() {
                Rule::label => {
                    let col = pair.as_span().start_pos().line_col().1;
                    let name = pair
                        .into_inner()
                        .next()
                        .map(|p| p.as_str().to_string())
                        .unwrap_or_default();
                    nodes.push(Node::Label(Label {
                        name,
                        line: lineno,
                        col,
                        section,
                    }));
                }
                Rule::directive => {
                    if let Some(directive) =
                        ast_builder::build_directive(pair, lineno, &mut section, &mut diags)
                    {
                        nodes.push(Node::Directive(directive));
                    }
                }
                Rule::instruction => {
                    if let Some(instruction) =
                        ast_builder::build_instruction(pair, lineno, section, &mut diags)
                    {
                        nodes.push(Node::Instruction(instruction));
                    }
                }
                Rule::EOI => {}
                _ => {}
            }
        }
    }

    (nodes, diags)
}

// ------------- unit tests -------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{DirectiveArg, Imm, ImmOrigin, Operand, Reg};

    fn parse_ok(src: &str) -> Vec<Node> {
        let (nodes, diags) = parse(src);
        assert!(diags.is_empty(), "unexpected diagnostics: {diags:?}");
        nodes
    }

    fn only_instruction(src: &str) -> crate::ast::Instruction {
        let nodes = parse_ok(src);
        assert_eq!(nodes.len(), 1);
        match nodes.into_iter().next().unwrap() {
            Node::Instruction(ins) => ins,
            other => panic!("expected instruction, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_nop() {
        let ins = only_instruction("nop\n");
        assert_eq!(ins.mnemonic, "nop");
        assert!(ins.operands.is_empty());
        assert_eq!(ins.line, 1);
    }

    #[test]
    fn test_parse_addi() {
        let ins = only_instruction("addi x1, x2, -5\n");
        assert_eq!(ins.mnemonic, "addi");
        assert_eq!(
            ins.operands,
            vec![
                Operand::Reg(Reg { num: 1 }),
                Operand::Reg(Reg { num: 2 }),
                Operand::Imm(Imm::numeric(-5)),
            ]
        );
    }

    #[test]
    fn test_mnemonic_and_registers_case_insensitive() {
        let ins = only_instruction("ADDI A0, Zero, 0x10\n");
        assert_eq!(ins.mnemonic, "addi");
        assert_eq!(
            ins.operands,
            vec![
                Operand::Reg(Reg { num: 10 }),
                Operand::Reg(Reg::X0),
                Operand::Imm(Imm::numeric(16)),
            ]
        );
    }

    #[test]
    fn test_memory_operand_forms() {
        let ins = only_instruction("lw x1, 8(x2)\n");
        match &ins.operands[1] {
            Operand::Mem(mem) => {
                assert_eq!(mem.base, Reg { num: 2 });
                assert_eq!(mem.offset, Imm::numeric(8));
            }
            other => panic!("expected memory operand, got {other:?}"),
        }

        let ins = only_instruction("lw x1, (sp)\n");
        match &ins.operands[1] {
            Operand::Mem(mem) => {
                assert_eq!(mem.base, Reg { num: 2 });
                assert_eq!(mem.offset, Imm::numeric(0));
            }
            other => panic!("expected memory operand, got {other:?}"),
        }

        let ins = only_instruction("lb x5, -0x10(t0)\n");
        match &ins.operands[1] {
            Operand::Mem(mem) => assert_eq!(mem.offset, Imm::numeric(-16)),
            other => panic!("expected memory operand, got {other:?}"),
        }
    }

    #[test]
    fn test_symbolic_memory_offset_is_placeholder() {
        let ins = only_instruction("lw x1, count(x2)\n");
        match &ins.operands[1] {
            Operand::Mem(mem) => {
                assert_eq!(mem.offset.origin, ImmOrigin::Symbolic);
                assert_eq!(mem.offset.value, 0);
            }
            other => panic!("expected memory operand, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_memory_base_register() {
        let (nodes, diags) = parse("lw x1, 4(foo)\n");
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("invalid register"));
        // The instruction survives with the bad operand dropped.
        match &nodes[0] {
            Node::Instruction(ins) => assert_eq!(ins.operands.len(), 1),
            other => panic!("expected instruction, got {other:?}"),
        }
    }

    #[test]
    fn test_label_alone_and_with_instruction() {
        let nodes = parse_ok("loop:\nloop2: addi x0, x0, 0\n");
        assert_eq!(nodes.len(), 3);
        match &nodes[0] {
            Node::Label(l) => assert_eq!(l.name, "loop"),
            other => panic!("expected label, got {other:?}"),
        }
        match (&nodes[1], &nodes[2]) {
            (Node::Label(l), Node::Instruction(ins)) => {
                assert_eq!(l.name, "loop2");
                assert_eq!(ins.mnemonic, "addi");
                assert_eq!(ins.line, 2);
            }
            other => panic!("expected label + instruction, got {other:?}"),
        }
    }

    #[test]
    fn test_label_followed_by_directive() {
        let nodes = parse_ok(".data\ntable: .word 1,2,3\n");
        assert_eq!(nodes.len(), 3);
        match (&nodes[1], &nodes[2]) {
            (Node::Label(l), Node::Directive(d)) => {
                assert_eq!(l.name, "table");
                assert_eq!(d.name, ".word");
                assert_eq!(d.args, vec![DirectiveArg::Token("1,2,3".to_string())]);
            }
            other => panic!("expected label + directive, got {other:?}"),
        }
    }

    #[test]
    fn test_comments_stripped() {
        let nodes = parse_ok("# full line\n  addi x0, x0, 0 # trailing\n// slashes\nnop // tail\n");
        assert_eq!(nodes.len(), 2);
    }

    #[test]
    fn test_section_tracking() {
        let nodes = parse_ok(".text\nnop\n.data\nw: .word 1\n");
        match &nodes[1] {
            Node::Instruction(ins) => assert_eq!(ins.section, Some(Section::Text)),
            other => panic!("expected instruction, got {other:?}"),
        }
        match &nodes[3] {
            Node::Label(l) => assert_eq!(l.section, Some(Section::Data)),
            other => panic!("expected label, got {other:?}"),
        }
    }

    #[test]
    fn test_equ_comma_and_space_forms() {
        let nodes = parse_ok(".equ SIZE, 16\n.equ MASK 0xFF\n");
        for (node, name, value) in [(&nodes[0], "SIZE", 16), (&nodes[1], "MASK", 255)] {
            match node {
                Node::Directive(d) => {
                    assert_eq!(d.name, ".equ");
                    assert_eq!(
                        d.args,
                        vec![
                            DirectiveArg::Token(name.to_string()),
                            DirectiveArg::Value(value),
                        ]
                    );
                }
                other => panic!("expected directive, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_equ_errors() {
        let (nodes, diags) = parse(".equ\n.equ 9bad, 1\n.equ NAME\n.equ NAME, zebra\n");
        assert!(nodes.is_empty());
        assert_eq!(diags.len(), 4);
        assert!(diags.iter().all(|d| d.is_error()));
    }

    #[test]
    fn test_symbol_operand_with_relocation_suffix() {
        let ins = only_instruction("auipc a0, glob@pcrel_hi\n");
        match &ins.operands[1] {
            Operand::Sym(sym) => assert_eq!(sym.name, "glob@pcrel_hi"),
            other => panic!("expected symbol, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_operand_reported_and_skipped() {
        let (nodes, diags) = parse("addi x1, x2, $$$\n");
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("invalid operand"));
        match &nodes[0] {
            Node::Instruction(ins) => assert_eq!(ins.operands.len(), 2),
            other => panic!("expected instruction, got {other:?}"),
        }
    }

    #[test]
    fn test_bad_line_does_not_stop_parsing() {
        let (nodes, diags) = parse("addi x1 x2\nnop\n");
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("syntax error"));
        assert_eq!(nodes.len(), 1);
        match &nodes[0] {
            Node::Instruction(ins) => {
                assert_eq!(ins.mnemonic, "nop");
                assert_eq!(ins.line, 2);
            }
            other => panic!("expected instruction, got {other:?}"),
        }
    }
}
