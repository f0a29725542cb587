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

use super::EvmError;

/// The gas schedule.  Static per-opcode base costs feed the opcode
/// table; the remainder are the runtime-dependent components charged
/// by the interpreter.  Values follow the Berlin-through-Cancun line
/// of the canonical schedule.
pub mod costs {
    pub const ZERO: u32 = 0;
    pub const BASE: u32 = 2;
    pub const VERYLOW: u32 = 3;
    pub const LOW: u32 = 5;
    pub const MID: u32 = 8;
    pub const HIGH: u32 = 10;
    pub const JUMPDEST: u32 = 1;
    pub const KECCAK256: u32 = 30;
    pub const KECCAK256_WORD: u32 = 6;
    pub const COPY_WORD: u32 = 3;
    pub const MEMORY_WORD: u32 = 3;
    pub const BLOCKHASH: u32 = 20;
    pub const LOG: u32 = 375;
    pub const LOG_TOPIC: u32 = 375;
    pub const LOG_BYTE: u32 = 8;
    pub const EXP: u32 = 10;
    pub const EXP_BYTE: u32 = 50;
    pub const CREATE: u32 = 32000;
    pub const CODE_DEPOSIT_BYTE: u32 = 200;
    pub const INITCODE_WORD: u32 = 2;
    pub const CALL_VALUE: u32 = 9000;
    pub const CALL_STIPEND: u32 = 2300;
    pub const NEW_ACCOUNT: u32 = 25000;
    pub const SELFDESTRUCT: u32 = 5000;
    pub const WARM_ACCESS: u32 = 100;
    pub const COLD_ACCOUNT_ACCESS: u32 = 2600;
    pub const COLD_SLOAD: u32 = 2100;
    pub const SSTORE_SENTRY: u32 = 2300;
    pub const SSTORE_SET: u32 = 20000;
    pub const SSTORE_RESET: u32 = 2900;
    pub const SSTORE_CLEARS_REFUND: u32 = 4800;
}

// ===================================================================
// Gas Counter
// ===================================================================

/// Tracks the gas of one frame.  Memory expansion is settled against
/// the running total already paid, so each grow charges exactly the
/// difference demanded by the quadratic formula.
pub struct Gas {
    limit: u64,
    remaining: u64,
    memory_paid: u64,
}

impl Gas {
    pub fn new(limit: u64) -> Self {
        Gas {
            limit,
            remaining: limit,
            memory_paid: 0,
        }
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn left(&self) -> u64 {
        self.remaining
    }

    pub fn used(&self) -> u64 {
        self.limit - self.remaining
    }

    pub fn spend(&mut self, amount: u64) -> Result<(), EvmError> {
        if amount > self.remaining {
            return Err(EvmError::OutOfGas);
        }
        self.remaining -= amount;
        Ok(())
    }

    /// Consume everything; the cancellation signal of a failing
    /// frame.
    pub fn consume_all(&mut self) {
        self.remaining = 0;
    }

    /// Return gas handed back by a completed inner frame.
    pub fn reclaim(&mut self, amount: u64) {
        self.remaining += amount;
    }

    /// The most gas that may be forwarded to an inner call: all but
    /// one sixty-fourth of what remains.
    pub fn forwardable(&self) -> u64 {
        self.remaining - self.remaining / 64
    }

    /// Charge for growing memory to `new_size` bytes (a multiple of
    /// 32).  Only the difference against what this frame has already
    /// paid is charged.
    pub fn charge_memory(&mut self, new_size: usize) -> Result<(), EvmError> {
        let total = memory_gas(new_size);
        if total > self.memory_paid {
            let net = total - self.memory_paid;
            self.spend(net)?;
            self.memory_paid = total;
        }
        Ok(())
    }
}

// ===================================================================
// Cost Formulae
// ===================================================================

/// Total cost of a memory of `size` bytes under the quadratic
/// expansion formula.
pub fn memory_gas(size: usize) -> u64 {
    let words = (size as u64).div_ceil(32);
    (costs::MEMORY_WORD as u64) * words + words * words / 512
}

/// Per-word cost of copying `len` bytes.
pub fn copy_gas(len: usize) -> u64 {
    (len as u64).div_ceil(32) * costs::COPY_WORD as u64
}

/// Per-word cost of hashing `len` bytes.
pub fn keccak_gas(len: usize) -> u64 {
    (len as u64).div_ceil(32) * costs::KECCAK256_WORD as u64
}

/// Runtime component of `EXP`: a per-byte charge on the exponent's
/// minimal big-endian width.
pub fn exp_gas(power: &U256) -> u64 {
    let bytes = (power.bit_len() as u64).div_ceil(8);
    costs::EXP_BYTE as u64 * bytes
}

/// Runtime component of `LOGn`: per-topic and per-byte charges.
pub fn log_gas(topics: usize, len: usize) -> u64 {
    costs::LOG_TOPIC as u64 * topics as u64 + costs::LOG_BYTE as u64 * len as u64
}
