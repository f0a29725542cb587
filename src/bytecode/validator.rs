// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//    http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
use std::fmt;

use log::debug;

use super::analysis::CodeAnalysis;
use super::bitmap::CodeBitmap;
use super::metadata::find_metadata;
use super::opcode;
use super::table::{opcode_table, OpcodeKind};
use crate::fork::{Fork, DEFAULT};
use crate::util::from_be_bytes;

/// Maximum size of deployed contract code.
pub const MAX_CODE_SIZE: usize = 24576;
/// Maximum size of initialisation code (EIP-3860).
pub const MAX_INITCODE_SIZE: usize = MAX_CODE_SIZE * 2;

// ===================================================================
// Analysis Error
// ===================================================================

/// Errors which can arise when validating a raw byte sequence.  All
/// of them are fatal to the analysis and none is retriable; execution
/// never begins for code which fails validation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AnalysisError {
    /// A byte outside the known opcode set was found at a position
    /// not covered by a push immediate.
    InvalidOpcode { offset: usize, opcode: u8 },
    /// A push instruction whose immediate would extend past the end
    /// of the runtime code.
    TruncatedPush { offset: usize },
    /// A statically resolvable jump whose target is not a real
    /// `JUMPDEST`.
    InvalidJumpDestination { offset: usize, target: usize },
    /// Runtime code exceeds the deployed-code size limit.
    BytecodeTooLarge { len: usize },
    /// Initialisation code exceeds the initcode size limit.
    InitcodeTooLarge { len: usize },
    /// The analysis ran out of an internal resource (e.g. the
    /// decoded-instruction budget).
    OutOfMemory,
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AnalysisError::InvalidOpcode { offset, opcode } => {
                write!(f, "invalid opcode 0x{opcode:02x} at offset {offset}")
            }
            AnalysisError::TruncatedPush { offset } => {
                write!(f, "truncated push immediate at offset {offset}")
            }
            AnalysisError::InvalidJumpDestination { offset, target } => {
                write!(f, "jump at offset {offset} targets invalid destination {target}")
            }
            AnalysisError::BytecodeTooLarge { len } => {
                write!(f, "bytecode length {len} exceeds limit {MAX_CODE_SIZE}")
            }
            AnalysisError::InitcodeTooLarge { len } => {
                write!(f, "initcode length {len} exceeds limit {MAX_INITCODE_SIZE}")
            }
            AnalysisError::OutOfMemory => {
                write!(f, "analysis resource budget exhausted")
            }
        }
    }
}

impl std::error::Error for AnalysisError {}

// ===================================================================
// Configuration
// ===================================================================

/// Distinguishes deployed code from initialisation code, which have
/// different size limits.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CodeKind {
    Runtime,
    Initcode,
}

impl CodeKind {
    pub fn size_limit(&self) -> usize {
        match self {
            CodeKind::Runtime => MAX_CODE_SIZE,
            CodeKind::Initcode => MAX_INITCODE_SIZE,
        }
    }
}

/// Configuration for a single analysis.
#[derive(Clone, Copy, Debug)]
pub struct AnalysisConfig {
    pub kind: CodeKind,
    pub fork: &'static Fork,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            kind: CodeKind::Runtime,
            fork: DEFAULT,
        }
    }
}

/// Hooks through which an analysis reports progress.  Observers are
/// handed in explicitly by the caller; the analyser holds no global
/// state of any kind.
pub trait AnalysisObserver {
    /// An instruction start was classified at the given offset.
    fn opcode_scanned(&mut self, _pc: usize, _opcode: u8) {}
    /// A real `JUMPDEST` was marked at the given offset.
    fn jumpdest_marked(&mut self, _pc: usize) {}
    /// A statically known jump was proven to land on a `JUMPDEST`.
    fn jump_resolved(&mut self, _pc: usize, _target: usize) {}
}

// ===================================================================
// Analyzer
// ===================================================================

/// Validates untrusted byte sequences and produces the analysis
/// artifact.  Construction is three linear passes: opcode and push
/// validation, `JUMPDEST` marking, and static jump verification.
pub struct CodeAnalyzer<'a> {
    config: AnalysisConfig,
    observer: Option<&'a mut dyn AnalysisObserver>,
}

/// Validate a byte sequence under the default configuration.
pub fn analyze(code: &[u8]) -> Result<CodeAnalysis, AnalysisError> {
    CodeAnalyzer::new(AnalysisConfig::default()).analyze(code)
}

impl<'a> CodeAnalyzer<'a> {
    pub fn new(config: AnalysisConfig) -> Self {
        CodeAnalyzer {
            config,
            observer: None,
        }
    }

    /// Attach an observer which will be notified of classification
    /// decisions as they are made.
    pub fn with_observer(mut self, observer: &'a mut dyn AnalysisObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Run the full validation over a given byte sequence.
    pub fn analyze(&mut self, code: &[u8]) -> Result<CodeAnalysis, AnalysisError> {
        // Enforce the size limit before touching anything else.
        let limit = self.config.kind.size_limit();
        if code.len() > limit {
            return Err(match self.config.kind {
                CodeKind::Runtime => AnalysisError::BytecodeTooLarge { len: code.len() },
                CodeKind::Initcode => AnalysisError::InitcodeTooLarge { len: code.len() },
            });
        }
        // Strip any trailing compiler metadata from the region to be
        // analysed.
        let metadata = find_metadata(code);
        let runtime_len = match &metadata {
            Some(m) => code.len() - m.len,
            None => code.len(),
        };
        let runtime = &code[..runtime_len];
        //
        let mut analysis = CodeAnalysis {
            full_code: code.to_vec(),
            runtime_len,
            op_start: CodeBitmap::new(runtime_len),
            push_data: CodeBitmap::new(runtime_len),
            jumpdest: CodeBitmap::new(runtime_len),
            metadata,
        };
        let table = opcode_table(self.config.fork);
        self.classify(runtime, &table, &mut analysis)?;
        self.mark_jumpdests(runtime, &mut analysis);
        self.verify_static_jumps(runtime, &analysis)?;
        //
        Ok(analysis)
    }

    /// Pass 1: walk the code instruction by instruction, rejecting
    /// unknown opcodes and truncated immediates, and classifying
    /// every byte as either an instruction start or immediate data.
    fn classify(
        &mut self,
        runtime: &[u8],
        table: &[super::table::OpcodeInfo; 256],
        analysis: &mut CodeAnalysis,
    ) -> Result<(), AnalysisError> {
        let mut pc = 0;
        while pc < runtime.len() {
            let op = runtime[pc];
            if table[op as usize].kind == OpcodeKind::Invalid {
                debug!("rejecting opcode 0x{op:02x} at offset {pc}");
                return Err(AnalysisError::InvalidOpcode { offset: pc, opcode: op });
            }
            analysis.op_start.set(pc);
            if let Some(o) = self.observer.as_deref_mut() {
                o.opcode_scanned(pc, op);
            }
            let width = opcode::push_width(op);
            if width > 0 {
                // The immediate must fit entirely within the runtime
                // code.
                if pc + width >= runtime.len() {
                    debug!("rejecting truncated push at offset {pc}");
                    return Err(AnalysisError::TruncatedPush { offset: pc });
                }
                for i in pc + 1..=pc + width {
                    analysis.push_data.set(i);
                }
            }
            pc += 1 + width;
        }
        Ok(())
    }

    /// Pass 2: every `0x5b` byte which begins an instruction is a
    /// real jump destination.  Immediate data can never be an
    /// instruction start, so checking the start bitmap suffices.
    fn mark_jumpdests(&mut self, runtime: &[u8], analysis: &mut CodeAnalysis) {
        let mut pc = 0;
        while let Some(found) = find_byte(runtime, opcode::JUMPDEST, pc) {
            if analysis.op_start.get(found) {
                analysis.jumpdest.set(found);
                if let Some(o) = self.observer.as_deref_mut() {
                    o.jumpdest_marked(found);
                }
            }
            pc = found + 1;
        }
    }

    /// Pass 3: any jump immediately preceded by a push has a
    /// statically known target, which must be a real `JUMPDEST`
    /// within the runtime code.  Jumps without a preceding push are
    /// left for the interpreter to validate at runtime.
    fn verify_static_jumps(
        &mut self,
        runtime: &[u8],
        analysis: &CodeAnalysis,
    ) -> Result<(), AnalysisError> {
        let mut previous: Option<usize> = None;
        let mut pc = 0;
        while pc < runtime.len() {
            let op = runtime[pc];
            if op == opcode::JUMP || op == opcode::JUMPI {
                if let Some(prev) = previous {
                    if opcode::is_push(runtime[prev]) {
                        let target = decode_target(&runtime[prev + 1..pc]);
                        let valid = target
                            .map(|t| analysis.is_valid_jumpdest(t))
                            .unwrap_or(false);
                        if !valid {
                            return Err(AnalysisError::InvalidJumpDestination {
                                offset: pc,
                                target: target.unwrap_or(usize::MAX),
                            });
                        }
                        if let Some(o) = self.observer.as_deref_mut() {
                            o.jump_resolved(pc, target.unwrap());
                        }
                    }
                }
            }
            previous = Some(pc);
            pc += opcode::instruction_length(op);
        }
        Ok(())
    }
}

/// Decode a big-endian push immediate as a jump target.  Targets too
/// wide for an address are reported as unrepresentable, since no such
/// offset can fall within any code.
fn decode_target(immediate: &[u8]) -> Option<usize> {
    // Strip leading zeroes so wide pushes of small values decode.
    let trimmed: &[u8] = match immediate.iter().position(|b| *b != 0) {
        Some(i) => &immediate[i..],
        None => return Some(0),
    };
    if trimmed.len() > 8 {
        return None;
    }
    usize::try_from(from_be_bytes(trimmed) as u64).ok()
}

/// Scan for the next occurrence of a byte at or after `from`.
fn find_byte(bytes: &[u8], needle: u8, from: usize) -> Option<usize> {
    bytes
        .get(from..)?
        .iter()
        .position(|b| *b == needle)
        .map(|i| from + i)
}

// ===================================================================
// Initcode Gas
// ===================================================================

/// The gas charged for initialisation code, at two gas per 32-byte
/// word (EIP-3860).
pub fn initcode_gas(len: usize) -> u64 {
    (len as u64).div_ceil(32) * 2
}
