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
use log::{debug, trace};

use super::gas::Gas;
use super::memory::Memory;
use super::stack::Stack;
use super::{CallOutcome, EvmError, Halt, Host, Word, CALL_DEPTH_LIMIT, STACK_LIMIT};
use crate::bytecode::CodeAnalysis;
use crate::program::{BlockInfo, Program, Tag};
use crate::util::word_from_be;

/// Executes one frame over a pre-decoded program.  The frame owns its
/// stack, memory, gas counter and return-data buffer; the analysis
/// artifact and program are shared read-only and all state access
/// goes through the host.
pub struct Interpreter<'a> {
    pub(crate) analysis: &'a CodeAnalysis,
    pub(crate) program: &'a Program,
    pub(crate) host: &'a mut dyn Host,
    pub(crate) stack: Stack,
    pub(crate) memory: Memory,
    pub(crate) gas: Gas,
    /// Output of the most recent completed inner call.
    pub(crate) returndata: Vec<u8>,
    /// Data carried out by `RETURN` / `REVERT`.
    pub(crate) output: Vec<u8>,
}

impl<'a> Interpreter<'a> {
    pub fn new(
        analysis: &'a CodeAnalysis,
        program: &'a Program,
        host: &'a mut dyn Host,
        gas_limit: u64,
    ) -> Self {
        Interpreter {
            analysis,
            program,
            host,
            stack: Stack::new(),
            memory: Memory::new(),
            gas: Gas::new(gas_limit),
            returndata: Vec::new(),
            output: Vec::new(),
        }
    }

    /// Run the frame to completion.  A snapshot is taken on entry and
    /// either committed (success), or rolled back (revert and every
    /// error).  Errors additionally consume all remaining gas.
    pub fn run(mut self) -> CallOutcome {
        if self.host.get_depth() > CALL_DEPTH_LIMIT {
            return CallOutcome::Failure {
                error: EvmError::CallDepthExceeded,
            };
        }
        let snapshot = self.host.create_snapshot();
        let halt = self.dispatch();
        debug!(
            "frame halted: {:?}, gas used {} of {}",
            halt,
            self.gas.used(),
            self.gas.limit()
        );
        match halt {
            Halt::Stop | Halt::SelfDestruct => CallOutcome::Success {
                output: Vec::new(),
                gas_left: self.gas.left(),
            },
            Halt::Return => CallOutcome::Success {
                output: self.output,
                gas_left: self.gas.left(),
            },
            Halt::Revert => {
                self.host.revert_to_snapshot(snapshot);
                CallOutcome::Revert {
                    output: self.output,
                    gas_left: self.gas.left(),
                }
            }
            Halt::Error(error) => {
                self.gas.consume_all();
                self.host.revert_to_snapshot(snapshot);
                CallOutcome::Failure { error }
            }
        }
    }

    /// The dispatch loop.  Every record computes its successor; jumps
    /// rewrite the index instead of interpreting a program counter.
    fn dispatch(&mut self) -> Halt {
        let mut ip = 0usize;
        loop {
            let inst = self.program.inst(ip);
            match inst.tag() {
                Tag::BlockInfo => {
                    let block = self.program.slim(inst.id()).block_info();
                    if let Err(e) = self.enter_block(&block) {
                        return Halt::Error(e);
                    }
                    ip += 1;
                }
                Tag::Exec => {
                    let payload = self.program.exec(inst.id());
                    if let Err(halt) = (payload.handler)(self, payload.opcode) {
                        return halt;
                    }
                    ip = payload.next as usize;
                }
                Tag::Word => {
                    let (offset, len, next) = self.program.slim(inst.id()).word();
                    let code = self.analysis.runtime_code();
                    let word = word_from_be(&code[offset..offset + len]);
                    if let Err(e) = self.stack.push(word) {
                        return Halt::Error(e);
                    }
                    ip = next as usize;
                }
                Tag::Pc => {
                    let payload = self.program.slim(inst.id());
                    if let Err(e) = self.stack.push(Word::from(payload.a)) {
                        return Halt::Error(e);
                    }
                    ip = payload.b as usize;
                }
                Tag::JumpPc => {
                    ip = self.program.slim(inst.id()).a as usize;
                }
                Tag::CondJumpPc => {
                    let payload = self.program.slim(inst.id());
                    match self.stack.pop() {
                        Ok(cond) if !cond.is_zero() => ip = payload.a as usize,
                        Ok(_) => ip = payload.b as usize,
                        Err(e) => return Halt::Error(e),
                    }
                }
                Tag::JumpUnresolved => match self.jump_target() {
                    Ok(target) => ip = target,
                    Err(halt) => return halt,
                },
                Tag::CondJumpUnresolved => {
                    let next = self.program.slim(inst.id()).a as usize;
                    // Destination sits above the condition.
                    let dest = match self.stack.pop() {
                        Ok(d) => d,
                        Err(e) => return Halt::Error(e),
                    };
                    match self.stack.pop() {
                        Ok(cond) if cond.is_zero() => ip = next,
                        Ok(_) => match self.resolve_jump(&dest) {
                            Ok(target) => ip = target,
                            Err(halt) => return halt,
                        },
                        Err(e) => return Halt::Error(e),
                    }
                }
                Tag::DynamicGas => {
                    let payload = self.program.dynamic(inst.id());
                    if let Err(halt) = (payload.charge)(self, payload.opcode) {
                        return halt;
                    }
                    if let Err(halt) = (payload.handler)(self, payload.opcode) {
                        return halt;
                    }
                    ip = payload.next as usize;
                }
                Tag::Noop => {
                    ip = self.program.slim(inst.id()).a as usize;
                }
            }
        }
    }

    /// The three block-entry checks.  Passing them lets every
    /// instruction in the block run without further static gas or
    /// stack validation.
    fn enter_block(&mut self, block: &BlockInfo) -> Result<(), EvmError> {
        trace!(
            "block entry: gas {} req {} growth {}",
            block.gas_cost,
            block.stack_req,
            block.stack_max_growth
        );
        self.gas.spend(block.gas_cost as u64)?;
        let depth = self.stack.len();
        if depth < block.stack_req as usize {
            return Err(EvmError::StackUnderflow);
        }
        if depth + block.stack_max_growth as usize > STACK_LIMIT {
            return Err(EvmError::StackOverflow);
        }
        Ok(())
    }

    fn jump_target(&mut self) -> Result<usize, Halt> {
        let dest = self.stack.pop()?;
        self.resolve_jump(&dest)
    }

    /// Validate a runtime-computed jump destination and translate it
    /// to the instruction index of its block.
    fn resolve_jump(&mut self, dest: &Word) -> Result<usize, Halt> {
        let pc = usize::try_from(*dest).map_err(|_| Halt::Error(EvmError::InvalidJump))?;
        if !self.analysis.is_valid_jumpdest(pc) {
            return Err(Halt::Error(EvmError::InvalidJump));
        }
        self.program
            .block_start_of(pc)
            .ok_or(Halt::Error(EvmError::InvalidJump))
    }
}
