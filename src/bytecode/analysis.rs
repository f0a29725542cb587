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
use ruint::aliases::U256;

use super::bitmap::CodeBitmap;
use super::metadata::Metadata;
use super::opcode;
use crate::util::word_from_be;

/// The product of a successful validation pass over a raw byte
/// sequence.  The artifact owns the code and its classification
/// bitmaps outright, is immutable once constructed, and may be shared
/// freely between concurrently executing frames.
///
/// Three bitmaps classify every byte of the runtime code:
///
/// * `op_start` — the byte begins a decoded instruction;
/// * `push_data` — the byte lies inside a push immediate;
/// * `jumpdest` — the byte is a `JUMPDEST` which really is an
///   instruction (i.e. not embedded inside an immediate).
///
/// No byte is ever both an instruction start and immediate data, and
/// every jump destination is an instruction start.
#[derive(Clone, Debug, PartialEq)]
pub struct CodeAnalysis {
    pub(super) full_code: Vec<u8>,
    pub(super) runtime_len: usize,
    pub(super) op_start: CodeBitmap,
    pub(super) push_data: CodeBitmap,
    pub(super) jumpdest: CodeBitmap,
    pub(super) metadata: Option<Metadata>,
}

impl CodeAnalysis {
    /// The code exactly as supplied, including any trailing metadata.
    pub fn full_code(&self) -> &[u8] {
        &self.full_code
    }

    /// The executable portion of the code, i.e. everything before
    /// the detected metadata block (if any).
    pub fn runtime_code(&self) -> &[u8] {
        &self.full_code[..self.runtime_len]
    }

    /// The detected trailing compiler metadata, if any.
    pub fn metadata(&self) -> Option<&Metadata> {
        self.metadata.as_ref()
    }

    /// Check whether a given offset holds a real `JUMPDEST`, i.e. one
    /// which is an instruction rather than immediate data.  Offsets
    /// past the end of the runtime code are never valid destinations.
    pub fn is_valid_jumpdest(&self, pc: usize) -> bool {
        self.jumpdest.get(pc)
    }

    /// Check whether a given offset begins an instruction.
    pub fn is_op_start(&self, pc: usize) -> bool {
        self.op_start.get(pc)
    }

    /// Check whether a given offset lies inside a push immediate.
    pub fn is_push_data(&self, pc: usize) -> bool {
        self.push_data.get(pc)
    }

    /// Determine the encoded length of the instruction at a given
    /// offset.
    pub fn instruction_length(&self, pc: usize) -> usize {
        opcode::instruction_length(self.full_code[pc])
    }

    /// Determine the offset of the instruction following the one at
    /// `pc`, or `None` once the end of the runtime code is reached.
    pub fn next_pc(&self, pc: usize) -> Option<usize> {
        if pc >= self.runtime_len {
            return None;
        }
        let next = pc + self.instruction_length(pc);
        (next < self.runtime_len).then_some(next)
    }

    /// Decode the `n`-byte big-endian immediate of the push
    /// instruction at `pc`.  Returns `None` if the immediate would
    /// extend past the end of the runtime code (which validation
    /// rules out for genuine push instructions).
    pub fn read_push_value(&self, pc: usize, n: usize) -> Option<U256> {
        if n > 32 || pc + 1 + n > self.runtime_len {
            return None;
        }
        Some(word_from_be(&self.full_code[pc + 1..pc + 1 + n]))
    }

    /// Total number of valid jump destinations in the runtime code.
    pub fn jumpdest_count(&self) -> usize {
        self.jumpdest.count_in_range(0, self.runtime_len)
    }

    /// Position of the first valid jump destination at or after
    /// `from`.
    pub fn next_jumpdest(&self, from: usize) -> Option<usize> {
        self.jumpdest.next_set(from)
    }

    /// The instruction-start bitmap.
    pub fn op_starts(&self) -> &CodeBitmap {
        &self.op_start
    }

    /// The push-immediate bitmap.
    pub fn push_data_map(&self) -> &CodeBitmap {
        &self.push_data
    }

    /// The jump-destination bitmap.
    pub fn jumpdests(&self) -> &CodeBitmap {
        &self.jumpdest
    }
}
