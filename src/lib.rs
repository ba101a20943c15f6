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

//! Two-pass RV32I assembler: source text in, 32-bit machine words out, as
//! parallel hexadecimal and binary line listings. The pipeline is
//! parse -> pseudo expansion -> layout -> encode, with diagnostics
//! accumulated across every stage.

pub mod assembler;
pub mod ast;
pub mod bits;
pub mod diagnostics;
pub mod errors;
pub mod isa;
pub mod parser;
pub mod registers;
pub mod writers;

use assembler::encoder::{self, Encoded};
use assembler::layout::{self, Layout, LayoutOptions};
use assembler::pseudo;
use ast::Node;
use diagnostics::{Diagnostic, has_errors};

/// Everything one compilation produced: the expanded node stream, section
/// geometry, encoded words and all diagnostics in stage order.
#[derive(Debug, Clone)]
pub struct Assembly {
    pub nodes: Vec<Node>,
    pub layout: Layout,
    pub words: Vec<Encoded>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Assembly {
    /// Error-severity diagnostics suppress output emission.
    pub fn has_errors(&self) -> bool {
        has_errors(&self.diagnostics)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }
}

/// Runs the full pipeline with the default section bases and alignments.
pub fn assemble_source(text: &str, filename: Option<&str>) -> Assembly {
    assemble_with_options(text, filename, &LayoutOptions::default())
}

/// Runs the full pipeline with caller-provided section geometry.
pub fn assemble_with_options(
    text: &str,
    filename: Option<&str>,
    options: &LayoutOptions,
) -> Assembly {
    let (nodes, parse_diags) = parser::parse(text);
    let nodes = pseudo::expand(nodes);
    let (layout, layout_diags) = layout::first_pass(&nodes, options);
    let (words, encode_diags) = encoder::encode(&nodes, &layout.symtab, layout.text_base);

    let mut diagnostics = parse_diags;
    diagnostics.extend(layout_diags);
    diagnostics.extend(encode_diags);
    if let Some(file) = filename {
        for diag in &mut diagnostics {
            diag.file = Some(file.to_string());
        }
    }

    Assembly {
        nodes,
        layout,
        words,
        diagnostics,
    }
}
