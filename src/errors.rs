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

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Top-level failures, each mapped to a process exit code. Diagnostics are
/// not errors in this sense; they are accumulated and printed separately.
#[derive(Error, Debug)]
pub enum AssemblerError {
    #[error("cannot read source file {path}: {source}")]
    SourceRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot write output file {path}: {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("assembly failed with {0} error(s)")]
    Failed(usize),
}

impl AssemblerError {
    pub fn exit_code(&self) -> u8 {
        match self {
            AssemblerError::Failed(_) => 1,
            AssemblerError::SourceRead { .. } => 2,
            AssemblerError::OutputWrite { .. } => 3,
        }
    }
}

// ------------- unit tests -------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(AssemblerError::Failed(3).exit_code(), 1);
        let read = AssemblerError::SourceRead {
            path: PathBuf::from("a.s"),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert_eq!(read.exit_code(), 2);
        let write = AssemblerError::OutputWrite {
            path: PathBuf::from("a.hex"),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };
        assert_eq!(write.exit_code(), 3);
    }
}
