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
use crate::bytecode::OpcodeInfo;

/// Pre-aggregated requirements for one basic block.  Validating these
/// once at block entry lets every instruction inside the block run
/// without its own gas or stack checks.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct BlockInfo {
    /// Sum of the base gas cost of every instruction in the block.
    pub gas_cost: u32,
    /// Minimum stack depth required on entry so that no instruction
    /// in the block underflows.
    pub stack_req: u16,
    /// Maximum height the stack reaches above its entry depth at any
    /// point within the block.
    pub stack_max_growth: u16,
}

/// Accumulates block requirements one instruction at a time.  The
/// running stack change may go negative (the block consumes operands
/// pushed by its predecessors); requirements are clamped to zero only
/// once the block closes.
#[derive(Clone, Copy, Debug)]
pub(crate) struct BlockAccumulator {
    gas: u64,
    change: i32,
    req: i32,
    max_growth: i32,
}

impl BlockAccumulator {
    pub(crate) fn new() -> Self {
        BlockAccumulator {
            gas: 0,
            change: 0,
            req: 0,
            max_growth: 0,
        }
    }

    /// Fold one instruction into the running aggregates.
    pub(crate) fn record(&mut self, info: &OpcodeInfo) {
        self.gas += info.gas as u64;
        // An instruction needing k operands requires the entry stack
        // to cover whatever the block itself has not yet produced.
        let needed = info.stack_min as i32 - self.change;
        self.req = self.req.max(needed);
        self.change += info.stack_delta as i32;
        self.max_growth = self.max_growth.max(self.change);
    }

    /// Close the block, clamping negative requirements to zero.
    pub(crate) fn finish(self) -> BlockInfo {
        BlockInfo {
            gas_cost: self.gas.min(u32::MAX as u64) as u32,
            stack_req: self.req.clamp(0, u16::MAX as i32) as u16,
            stack_max_growth: self.max_growth.clamp(0, u16::MAX as i32) as u16,
        }
    }
}
