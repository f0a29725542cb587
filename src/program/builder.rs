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
use log::debug;

use super::block::{BlockAccumulator, BlockInfo};
use super::instruction::{
    DynamicGasPayload, ExecPayload, Inst, Pc, Program, SlimPayload, Tag, MAX_INSTRUCTIONS, NO_PC,
};
use crate::bytecode::{opcode, opcode_table, AnalysisError, CodeAnalysis, OpcodeInfo, OpcodeKind};
use crate::execution::instructions::{charge_handler, handler};
use crate::fork::Fork;
use crate::util::word_from_be;

impl Program {
    /// Decode an analysis artifact into the instruction stream for a
    /// given fork: segment into basic blocks, aggregate per-block
    /// requirements, apply the local peephole rewrites, and resolve
    /// statically known jump targets to instruction indices.
    pub fn compile(analysis: &CodeAnalysis, fork: &Fork) -> Result<Program, AnalysisError> {
        Builder::new(analysis, fork).build()
    }
}

/// Transient decoded record.  The builder works over these, then
/// packs them into the tag-and-id form with exact-count payload
/// buckets.
#[derive(Clone, Copy, Debug)]
enum Rec {
    Block(BlockInfo),
    Exec { op: u8 },
    Word { offset: u32, len: u8 },
    PcValue { pc: u32 },
    JumpPc { target_pc: u32 },
    CondJumpPc { target_pc: u32 },
    JumpUnresolved,
    CondJumpUnresolved,
    DynamicGas { op: u8 },
    Noop,
}

struct Builder<'a> {
    analysis: &'a CodeAnalysis,
    table: [OpcodeInfo; 256],
    recs: Vec<Rec>,
    rec_pcs: Vec<Pc>,
    pc_to_block: Vec<Pc>,
    /// Index of the open block's placeholder record, if any.
    open: Option<usize>,
    acc: BlockAccumulator,
    /// Whether control can flow past the most recent record.
    fallthrough: bool,
    rewrites: usize,
}

impl<'a> Builder<'a> {
    fn new(analysis: &'a CodeAnalysis, fork: &Fork) -> Self {
        let runtime_len = analysis.runtime_code().len();
        Builder {
            analysis,
            table: opcode_table(fork),
            recs: Vec::new(),
            rec_pcs: Vec::new(),
            pc_to_block: vec![NO_PC; runtime_len],
            open: None,
            acc: BlockAccumulator::new(),
            fallthrough: true,
            rewrites: 0,
        }
    }

    fn build(mut self) -> Result<Program, AnalysisError> {
        let code = self.analysis.runtime_code().to_vec();
        let mut pc = 0;
        while pc < code.len() {
            let op = code[pc];
            let info = self.table[op as usize];
            // Jump destinations begin a block; dynamic-gas opcodes
            // are isolated into single-instruction blocks so their
            // stack traffic stays visible to the validator.
            if op == opcode::JUMPDEST || isolated(op, &info) {
                self.close_block();
            }
            self.ensure_block()?;
            self.acc.record(&info);
            self.pc_to_block[pc] = self.open.unwrap() as Pc;
            self.emit(pc, op, &info)?;
            if info.kind == OpcodeKind::Terminator || isolated(op, &info) {
                self.close_block();
            }
            pc += opcode::instruction_length(op);
        }
        // The stream must end on a terminator.
        if self.fallthrough {
            self.ensure_block()?;
            self.acc.record(&self.table[opcode::STOP as usize]);
            self.push_rec(Rec::Exec { op: opcode::STOP }, NO_PC)?;
        }
        self.close_block();
        if self.rewrites > 0 {
            debug!("applied {} peephole rewrites", self.rewrites);
        }
        self.pack()
    }

    // ------------------------------------------------------------
    // Block management
    // ------------------------------------------------------------

    fn ensure_block(&mut self) -> Result<(), AnalysisError> {
        if self.open.is_none() {
            self.acc = BlockAccumulator::new();
            self.open = Some(self.recs.len());
            self.push_rec(Rec::Block(BlockInfo::default()), NO_PC)?;
        }
        Ok(())
    }

    fn close_block(&mut self) {
        if let Some(index) = self.open.take() {
            self.recs[index] = Rec::Block(self.acc.finish());
        }
    }

    // ------------------------------------------------------------
    // Emission
    // ------------------------------------------------------------

    fn emit(&mut self, pc: usize, op: u8, info: &OpcodeInfo) -> Result<(), AnalysisError> {
        self.fallthrough = true;
        match info.kind {
            OpcodeKind::Push(len) => self.push_rec(
                Rec::Word {
                    offset: (pc + 1) as u32,
                    len,
                },
                pc as Pc,
            ),
            OpcodeKind::Pc => self.push_rec(Rec::PcValue { pc: pc as u32 }, pc as Pc),
            OpcodeKind::Terminator => self.emit_terminator(pc, op),
            _ if dynamic_record(op, info) => self.push_rec(Rec::DynamicGas { op }, pc as Pc),
            _ => self.emit_plain(pc, op),
        }
    }

    fn emit_terminator(&mut self, pc: usize, op: u8) -> Result<(), AnalysisError> {
        match op {
            opcode::JUMP => {
                self.fallthrough = false;
                match self.take_static_target() {
                    Some(target) => self.push_rec(
                        Rec::JumpPc {
                            target_pc: target as u32,
                        },
                        pc as Pc,
                    ),
                    None => self.push_rec(Rec::JumpUnresolved, pc as Pc),
                }
            }
            opcode::JUMPI => match self.take_static_target() {
                Some(target) => self.push_rec(
                    Rec::CondJumpPc {
                        target_pc: target as u32,
                    },
                    pc as Pc,
                ),
                None => self.push_rec(Rec::CondJumpUnresolved, pc as Pc),
            },
            opcode::SELFDESTRUCT => {
                self.fallthrough = false;
                self.push_rec(Rec::DynamicGas { op }, pc as Pc)
            }
            _ => {
                // STOP, RETURN, REVERT, INVALID.
                self.fallthrough = false;
                self.push_rec(Rec::Exec { op }, pc as Pc)
            }
        }
    }

    fn emit_plain(&mut self, pc: usize, op: u8) -> Result<(), AnalysisError> {
        match op {
            // PUSHn v ; POP and DUP1 ; POP cancel out.  The block
            // still charges both instructions.
            opcode::POP => match self.last_in_block() {
                Some(Rec::Word { .. }) | Some(Rec::Exec { op: opcode::DUP1 }) => {
                    self.pop_rec();
                    self.rewrites += 1;
                    Ok(())
                }
                _ => self.push_rec(Rec::Exec { op }, pc as Pc),
            },
            // DUP1 ; PUSH0 ; EQ tests the top against zero; the
            // push-and-compare collapses into ISZERO.
            opcode::EQ => match self.last_two_in_block() {
                Some((Rec::Exec { op: opcode::DUP1 }, Rec::Word { len: 0, .. })) => {
                    self.pop_rec();
                    self.rewrites += 1;
                    self.push_rec(
                        Rec::Exec {
                            op: opcode::ISZERO,
                        },
                        pc as Pc,
                    )
                }
                _ => self.push_rec(Rec::Exec { op }, pc as Pc),
            },
            _ => self.push_rec(Rec::Exec { op }, pc as Pc),
        }
    }

    /// If the record preceding a jump is a push whose value is a
    /// valid destination, neutralise the push and hand back the
    /// target.  Pushes of invalid targets stay on the stack for the
    /// interpreter to reject at runtime.
    fn take_static_target(&mut self) -> Option<usize> {
        let index = self.last_index_in_block()?;
        let Rec::Word { offset, len } = self.recs[index] else {
            return None;
        };
        let code = self.analysis.runtime_code();
        let range = offset as usize..offset as usize + len as usize;
        let target = usize::try_from(word_from_be(&code[range])).ok()?;
        if !self.analysis.is_valid_jumpdest(target) {
            return None;
        }
        self.recs[index] = Rec::Noop;
        self.rewrites += 1;
        Some(target)
    }

    // ------------------------------------------------------------
    // Record bookkeeping
    // ------------------------------------------------------------

    fn push_rec(&mut self, rec: Rec, pc: Pc) -> Result<(), AnalysisError> {
        if self.recs.len() >= MAX_INSTRUCTIONS {
            return Err(AnalysisError::OutOfMemory);
        }
        self.recs.push(rec);
        self.rec_pcs.push(pc);
        Ok(())
    }

    fn pop_rec(&mut self) {
        self.recs.pop();
        self.rec_pcs.pop();
    }

    fn last_index_in_block(&self) -> Option<usize> {
        let open = self.open?;
        (self.recs.len() > open + 1).then(|| self.recs.len() - 1)
    }

    fn last_in_block(&self) -> Option<Rec> {
        Some(self.recs[self.last_index_in_block()?])
    }

    fn last_two_in_block(&self) -> Option<(Rec, Rec)> {
        let last = self.last_index_in_block()?;
        let open = self.open?;
        (last > open + 1).then(|| (self.recs[last - 1], self.recs[last]))
    }

    // ------------------------------------------------------------
    // Packing
    // ------------------------------------------------------------

    /// Count tag frequencies, size the three payload buckets to the
    /// exact counts, and pack every record into its final
    /// tag-plus-id form.
    fn pack(self) -> Result<Program, AnalysisError> {
        let mut slim_count = 0;
        let mut exec_count = 0;
        let mut dynamic_count = 0;
        for rec in &self.recs {
            match rec {
                Rec::Exec { .. } => exec_count += 1,
                Rec::DynamicGas { .. } => dynamic_count += 1,
                Rec::JumpUnresolved => {}
                _ => slim_count += 1,
            }
        }
        //
        let mut insts = Vec::with_capacity(self.recs.len());
        let mut slim = Vec::with_capacity(slim_count);
        let mut exec = Vec::with_capacity(exec_count);
        let mut dynamic = Vec::with_capacity(dynamic_count);
        for (index, rec) in self.recs.iter().enumerate() {
            let next = (index + 1) as Pc;
            match *rec {
                Rec::Block(info) => {
                    insts.push(Inst::new(Tag::BlockInfo, slim.len()));
                    slim.push(SlimPayload::from_block(info));
                }
                Rec::Exec { op } => {
                    insts.push(Inst::new(Tag::Exec, exec.len()));
                    exec.push(ExecPayload {
                        handler: handler(op),
                        opcode: op,
                        next,
                    });
                }
                Rec::Word { offset, len } => {
                    insts.push(Inst::new(Tag::Word, slim.len()));
                    slim.push(SlimPayload::from_word(offset, len, next));
                }
                Rec::PcValue { pc } => {
                    insts.push(Inst::new(Tag::Pc, slim.len()));
                    slim.push(SlimPayload { a: pc, b: next });
                }
                Rec::JumpPc { target_pc } => {
                    insts.push(Inst::new(Tag::JumpPc, slim.len()));
                    slim.push(SlimPayload {
                        a: self.pc_to_block[target_pc as usize],
                        b: 0,
                    });
                }
                Rec::CondJumpPc { target_pc } => {
                    insts.push(Inst::new(Tag::CondJumpPc, slim.len()));
                    slim.push(SlimPayload {
                        a: self.pc_to_block[target_pc as usize],
                        b: next,
                    });
                }
                Rec::JumpUnresolved => {
                    insts.push(Inst::new(Tag::JumpUnresolved, 0));
                }
                Rec::CondJumpUnresolved => {
                    insts.push(Inst::new(Tag::CondJumpUnresolved, slim.len()));
                    slim.push(SlimPayload { a: next, b: 0 });
                }
                Rec::DynamicGas { op } => {
                    insts.push(Inst::new(Tag::DynamicGas, dynamic.len()));
                    dynamic.push(DynamicGasPayload {
                        charge: charge_handler(op),
                        handler: handler(op),
                        opcode: op,
                        next,
                    });
                }
                Rec::Noop => {
                    insts.push(Inst::new(Tag::Noop, slim.len()));
                    slim.push(SlimPayload { a: next, b: 0 });
                }
            }
        }
        //
        Ok(Program {
            insts,
            slim,
            exec,
            dynamic,
            pc_to_block_start: self.pc_to_block,
            inst_to_pc: self.rec_pcs,
        })
    }
}

/// Opcodes which get a block to themselves.
fn isolated(op: u8, info: &OpcodeInfo) -> bool {
    matches!(
        info.kind,
        OpcodeKind::CallFamily | OpcodeKind::CreateFamily | OpcodeKind::SStore
    ) || op == opcode::GAS
}

/// Opcodes emitted as dynamic-gas records.
fn dynamic_record(op: u8, info: &OpcodeInfo) -> bool {
    info.dynamic() || op == opcode::GAS || op == opcode::EXP
}
