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
use super::block::BlockInfo;
use crate::execution::{Halt, Interpreter};

/// Width of a decoded-instruction index.  The analysed program
/// counter also fits this width since code is capped well below it.
pub type Pc = u32;

/// Sentinel for "no instruction / no back-mapping at this position".
pub const NO_PC: Pc = Pc::MAX;

/// Hard cap on the number of decoded instruction records a single
/// program may hold.
pub const MAX_INSTRUCTIONS: usize = 65536;

/// An opcode handler.  Handlers receive the interpreter frame and the
/// originating opcode byte, and signal termination through `Halt`.
pub type OpHandler = fn(&mut Interpreter<'_>, u8) -> Result<(), Halt>;

// ===================================================================
// Instruction Record
// ===================================================================

/// Discriminates the decoded instruction records.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum Tag {
    /// Synthetic record opening a basic block; carries the block's
    /// aggregated gas and stack requirements.
    BlockInfo = 0,
    /// A plain opcode executed through its handler.
    Exec,
    /// A push; the payload references the immediate's byte range.
    Word,
    /// The `PC` opcode with its value already materialised.
    Pc,
    /// An unconditional jump resolved to an instruction index.
    JumpPc,
    /// A conditional jump resolved to an instruction index.
    CondJumpPc,
    /// An unconditional jump whose target is only known at runtime.
    JumpUnresolved,
    /// A conditional jump whose target is only known at runtime.
    CondJumpUnresolved,
    /// An opcode with a runtime-dependent gas component, charged
    /// before its body runs.
    DynamicGas,
    /// Placeholder left behind by a peephole rewrite.
    Noop,
}

impl Tag {
    fn from_u8(v: u8) -> Tag {
        match v {
            0 => Tag::BlockInfo,
            1 => Tag::Exec,
            2 => Tag::Word,
            3 => Tag::Pc,
            4 => Tag::JumpPc,
            5 => Tag::CondJumpPc,
            6 => Tag::JumpUnresolved,
            7 => Tag::CondJumpUnresolved,
            8 => Tag::DynamicGas,
            _ => Tag::Noop,
        }
    }
}

/// One decoded instruction: a tag in the low byte and a 24-bit
/// payload id in the rest.  Keeping the record to 32 bits keeps the
/// dispatch-hot array dense.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Inst(u32);

impl Inst {
    pub fn new(tag: Tag, id: usize) -> Self {
        debug_assert!(id < (1 << 24));
        Inst(((id as u32) << 8) | tag as u32)
    }

    pub fn tag(self) -> Tag {
        Tag::from_u8(self.0 as u8)
    }

    pub fn id(self) -> usize {
        (self.0 >> 8) as usize
    }
}

// ===================================================================
// Payload Buckets
// ===================================================================

/// Eight-byte payload bucket, shared by every record whose operands
/// fit two 32-bit fields.  The meaning of the fields depends on the
/// record's tag; the typed constructors below are the only way values
/// enter the bucket.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SlimPayload {
    pub a: u32,
    pub b: u32,
}

impl SlimPayload {
    pub(crate) fn from_block(info: BlockInfo) -> Self {
        SlimPayload {
            a: info.gas_cost,
            b: info.stack_req as u32 | (info.stack_max_growth as u32) << 16,
        }
    }

    pub fn block_info(self) -> BlockInfo {
        BlockInfo {
            gas_cost: self.a,
            stack_req: self.b as u16,
            stack_max_growth: (self.b >> 16) as u16,
        }
    }

    pub(crate) fn from_word(offset: u32, len: u8, next: Pc) -> Self {
        debug_assert!(offset < (1 << 24));
        SlimPayload {
            a: offset | (len as u32) << 24,
            b: next,
        }
    }

    /// Decompose a `Word` payload into `(offset, len, next)`.
    pub fn word(self) -> (usize, usize, Pc) {
        ((self.a & 0x00ff_ffff) as usize, (self.a >> 24) as usize, self.b)
    }
}

/// Sixteen-byte payload bucket for plain executed opcodes.
#[derive(Clone, Copy)]
pub struct ExecPayload {
    pub handler: OpHandler,
    pub opcode: u8,
    pub next: Pc,
}

/// Twenty-four-byte payload bucket for opcodes with a runtime gas
/// component: the charge function runs first, then the body.
#[derive(Clone, Copy)]
pub struct DynamicGasPayload {
    pub charge: OpHandler,
    pub handler: OpHandler,
    pub opcode: u8,
    pub next: Pc,
}

// ===================================================================
// Program
// ===================================================================

/// A validated, pre-decoded program: the instruction records, their
/// payload tables, and the mappings between byte offsets and
/// instruction indices.  Like the analysis artifact it is immutable
/// after construction and freely shareable.
pub struct Program {
    pub(super) insts: Vec<Inst>,
    pub(super) slim: Vec<SlimPayload>,
    pub(super) exec: Vec<ExecPayload>,
    pub(super) dynamic: Vec<DynamicGasPayload>,
    pub(super) pc_to_block_start: Vec<Pc>,
    pub(super) inst_to_pc: Vec<Pc>,
}

impl Program {
    /// Number of decoded instruction records.
    pub fn len(&self) -> usize {
        self.insts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.insts.is_empty()
    }

    pub fn inst(&self, index: usize) -> Inst {
        self.insts[index]
    }

    pub fn slim(&self, id: usize) -> SlimPayload {
        self.slim[id]
    }

    pub fn exec(&self, id: usize) -> ExecPayload {
        self.exec[id]
    }

    pub fn dynamic(&self, id: usize) -> DynamicGasPayload {
        self.dynamic[id]
    }

    /// The instruction index of the `BlockInfo` record enclosing the
    /// instruction at byte offset `pc`, if any instruction begins
    /// there.
    pub fn block_start_of(&self, pc: usize) -> Option<usize> {
        match self.pc_to_block_start.get(pc) {
            Some(&idx) if idx != NO_PC => Some(idx as usize),
            _ => None,
        }
    }

    /// The byte offset the given record was decoded from, if it has
    /// one (synthetic records do not).
    pub fn pc_of(&self, index: usize) -> Option<usize> {
        match self.inst_to_pc.get(index) {
            Some(&pc) if pc != NO_PC => Some(pc as usize),
            _ => None,
        }
    }

    /// Iterate the `(instruction index, BlockInfo)` pairs of the
    /// program in order.
    pub fn blocks(&self) -> impl Iterator<Item = (usize, BlockInfo)> + '_ {
        self.insts.iter().enumerate().filter_map(|(i, inst)| {
            (inst.tag() == Tag::BlockInfo).then(|| (i, self.slim[inst.id()].block_info()))
        })
    }
}
