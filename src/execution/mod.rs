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

pub mod gas;
mod host;
mod i256;
pub(crate) mod instructions;
mod interpreter;
mod memhost;
mod memory;
mod stack;

pub use host::*;
pub use interpreter::*;
pub use memhost::*;
pub use memory::*;
pub use stack::*;

/// The EVM machine word.  The interpreter is instantiated at this
/// single seam; the program-counter width lives at the corresponding
/// seam in the `program` module.
pub type Word = ruint::aliases::U256;

/// Maximum operand stack depth.
pub const STACK_LIMIT: usize = 1024;
/// Maximum nesting depth of message calls.
pub const CALL_DEPTH_LIMIT: usize = 1024;
/// Ceiling on a single frame's memory, in bytes.
pub const MEMORY_LIMIT: usize = 16 << 20;

// ===================================================================
// Errors
// ===================================================================

/// The ways a frame can fail.  Every one of these consumes all of the
/// frame's remaining gas and discards its state changes; none of them
/// invalidates the analysis artifact, which remains reusable.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EvmError {
    OutOfGas,
    StackUnderflow,
    StackOverflow,
    /// Reachable only if validation was bypassed; the analyser
    /// rejects code containing unknown opcodes.
    InvalidOpcode,
    /// A runtime-computed jump target which is not a `JUMPDEST`.
    InvalidJump,
    /// A memory, calldata or returndata access out of bounds.
    OutOfBounds,
    /// A state-mutating operation attempted under a static call.
    WriteInStatic,
    /// Call nesting exceeded the depth limit.
    CallDepthExceeded,
    /// A value transfer exceeding the sender's balance.
    InsufficientBalance,
    /// The implementation exhausted a resource (allocation failure).
    Allocation,
}

impl fmt::Display for EvmError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            EvmError::OutOfGas => "out of gas",
            EvmError::StackUnderflow => "stack underflow",
            EvmError::StackOverflow => "stack overflow",
            EvmError::InvalidOpcode => "invalid opcode",
            EvmError::InvalidJump => "invalid jump destination",
            EvmError::OutOfBounds => "access out of bounds",
            EvmError::WriteInStatic => "state change in static context",
            EvmError::CallDepthExceeded => "call depth exceeded",
            EvmError::InsufficientBalance => "insufficient balance",
            EvmError::Allocation => "allocation failure",
        };
        write!(f, "{s}")
    }
}

impl std::error::Error for EvmError {}

/// How a frame stops.  The first four variants are the terminator
/// instructions; `REVERT` is deliberately not an error, since it
/// refunds the remaining gas to the caller and carries a data buffer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Halt {
    Stop,
    Return,
    Revert,
    SelfDestruct,
    Error(EvmError),
}

impl From<EvmError> for Halt {
    fn from(e: EvmError) -> Halt {
        Halt::Error(e)
    }
}

// ===================================================================
// Outcome
// ===================================================================

/// The result of running a frame to completion, as seen by the
/// caller.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CallOutcome {
    /// `STOP`, `RETURN` or `SELFDESTRUCT`.
    Success { output: Vec<u8>, gas_left: u64 },
    /// `REVERT`: state changes discarded, remaining gas returned.
    Revert { output: Vec<u8>, gas_left: u64 },
    /// An execution error: all gas consumed, state discarded.
    Failure { error: EvmError },
}

impl CallOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CallOutcome::Success { .. })
    }

    pub fn gas_left(&self) -> u64 {
        match self {
            CallOutcome::Success { gas_left, .. } | CallOutcome::Revert { gas_left, .. } => {
                *gas_left
            }
            CallOutcome::Failure { .. } => 0,
        }
    }

    pub fn output(&self) -> &[u8] {
        match self {
            CallOutcome::Success { output, .. } | CallOutcome::Revert { output, .. } => output,
            CallOutcome::Failure { .. } => &[],
        }
    }
}
