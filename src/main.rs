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

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use rvasm::assemble_source;
use rvasm::errors::AssemblerError;
use rvasm::writers::{write_bin, write_hex};

/// Two-pass RV32I assembler emitting parallel hex and binary word listings.
#[derive(Parser)]
#[clap(version)]
struct Opts {
    /// Assembly source file (.s / .asm)
    source: PathBuf,
    /// Output path for hexadecimal words, one per line
    out_hex: PathBuf,
    /// Output path for binary words, one per line
    out_bin: PathBuf,
}

fn run(opts: &Opts) -> Result<()> {
    let text = fs::read_to_string(&opts.source).map_err(|source| AssemblerError::SourceRead {
        path: opts.source.clone(),
        source,
    })?;

    let assembly = assemble_source(&text, opts.source.to_str());

    for diag in &assembly.diagnostics {
        eprintln!("{diag}");
    }
    if assembly.has_errors() {
        return Err(AssemblerError::Failed(assembly.error_count()).into());
    }

    write_hex(&assembly.words, &opts.out_hex).map_err(|source| AssemblerError::OutputWrite {
        path: opts.out_hex.clone(),
        source,
    })?;
    write_bin(&assembly.words, &opts.out_bin).map_err(|source| AssemblerError::OutputWrite {
        path: opts.out_bin.clone(),
        source,
    })?;

    println!(
        "OK: {} instructions -> {}, {}",
        assembly.words.len(),
        opts.out_hex.display(),
        opts.out_bin.display()
    );
    Ok(())
}

fn main() -> ExitCode {
    let opts = Opts::parse();
    match run(&opts) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<AssemblerError>() {
                // Diagnostics already went to stderr; no extra banner.
                Some(AssemblerError::Failed(_)) => {}
                _ => eprintln!("ERROR: {err:#}"),
            }
            let code = err
                .downcast_ref::<AssemblerError>()
                .map(AssemblerError::exit_code)
                .unwrap_or(1);
            ExitCode::from(code)
        }
    }
}
