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
use super::Word;
use crate::fork::Fork;

/// A contract account address.
pub type Address = [u8; 20];

/// Widen an address to a machine word.
pub fn address_to_word(addr: &Address) -> Word {
    let mut padded = [0u8; 32];
    padded[12..].copy_from_slice(addr);
    Word::from_be_bytes(padded)
}

/// Truncate a machine word to an address, keeping the low 20 bytes.
pub fn word_to_address(word: &Word) -> Address {
    let bytes: [u8; 32] = word.to_be_bytes();
    bytes[12..].try_into().unwrap()
}

// ===================================================================
// Call Parameters
// ===================================================================

/// The four message-call instructions.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CallScheme {
    Call,
    CallCode,
    DelegateCall,
    StaticCall,
}

/// The two contract-creation instructions.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CreateScheme {
    Create,
    Create2 { salt: Word },
}

/// What kind of nested frame is being requested.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CallKind {
    Call(CallScheme),
    Create(CreateScheme),
}

/// Everything the host needs to run a nested frame.  The interpreter
/// has already resolved the scheme's context rules when it builds
/// one of these: `target` is the address whose storage and balance
/// the frame sees, `code_address` the account whose code runs.
#[derive(Clone, Debug)]
pub struct CallRequest {
    pub kind: CallKind,
    /// Gas made available to the inner frame (stipend included).
    pub gas: u64,
    /// The `msg.sender` the inner frame observes.
    pub caller: Address,
    /// Context account: storage, balance and `ADDRESS` of the frame.
    pub target: Address,
    /// Account whose code is executed.  Ignored for creates.
    pub code_address: Address,
    /// The `msg.value` the inner frame observes.
    pub value: Word,
    /// Calldata, or initialisation code for creates.
    pub input: Vec<u8>,
    pub is_static: bool,
}

/// What came back from a nested frame.
#[derive(Clone, Debug, Default)]
pub struct CallResult {
    pub success: bool,
    /// Gas the inner frame did not use; zero after an error.
    pub gas_left: u64,
    /// Return or revert data.
    pub output: Vec<u8>,
    /// Address of the created contract, for successful creates.
    pub created: Option<Address>,
}

/// Block-level context served to `COINBASE`, `TIMESTAMP`, `NUMBER`,
/// `PREVRANDAO`, `GASLIMIT` and `BASEFEE`.
#[derive(Clone, Debug)]
pub struct BlockEnv {
    pub number: u64,
    pub timestamp: u64,
    pub prevrandao: Word,
    pub gas_limit: u64,
    pub coinbase: Address,
    pub base_fee: Word,
}

impl Default for BlockEnv {
    fn default() -> Self {
        BlockEnv {
            number: 1,
            timestamp: 1,
            prevrandao: Word::ZERO,
            gas_limit: 30_000_000,
            coinbase: [0u8; 20],
            base_fee: Word::ZERO,
        }
    }
}

// ===================================================================
// Host
// ===================================================================

/// Everything the interpreter delegates to its environment: account
/// state, storage, logs, nested calls, the access-list bookkeeping of
/// EIP-2929, the created-contract tracking of EIP-6780, and the
/// journalling that makes nested reverts atomic.
///
/// The core never mutates state directly; a host implementation owns
/// the journal and is free to serialise internally.  The `access_*`
/// methods warm their argument and return the gas to charge for the
/// access (cold or warm as the case may be).
pub trait Host {
    // ------------------------------------------------------------
    // Accounts and storage
    // ------------------------------------------------------------
    fn get_balance(&mut self, addr: &Address) -> Word;
    fn account_exists(&mut self, addr: &Address) -> bool;
    fn get_code(&mut self, addr: &Address) -> Vec<u8>;
    fn get_storage(&mut self, addr: &Address, key: &Word) -> Word;
    /// The value the slot held at the start of the transaction,
    /// needed by the SSTORE refund accounting.
    fn get_original_storage(&mut self, addr: &Address, key: &Word) -> Word;
    fn set_storage(&mut self, addr: &Address, key: &Word, value: Word);
    fn get_transient_storage(&mut self, addr: &Address, key: &Word) -> Word;
    fn set_transient_storage(&mut self, addr: &Address, key: &Word, value: Word);

    // ------------------------------------------------------------
    // Logs, calls, journalling
    // ------------------------------------------------------------
    fn emit_log(&mut self, addr: &Address, topics: &[Word], data: &[u8]);
    fn inner_call(&mut self, request: CallRequest) -> CallResult;
    fn create_snapshot(&mut self) -> usize;
    fn revert_to_snapshot(&mut self, id: usize);
    fn add_gas_refund(&mut self, delta: i64);

    // ------------------------------------------------------------
    // Access lists (EIP-2929)
    // ------------------------------------------------------------
    fn access_address(&mut self, addr: &Address) -> u64;
    fn access_storage_slot(&mut self, addr: &Address, key: &Word) -> u64;

    // ------------------------------------------------------------
    // Created contracts (EIP-6780) and destruction
    // ------------------------------------------------------------
    fn register_created_contract(&mut self, addr: &Address);
    fn was_created_in_tx(&mut self, addr: &Address) -> bool;
    fn mark_for_destruction(&mut self, contract: &Address, recipient: &Address);

    // ------------------------------------------------------------
    // Frame and transaction context
    // ------------------------------------------------------------
    fn get_tx_origin(&self) -> Address;
    fn get_caller(&self) -> Address;
    fn get_self_address(&self) -> Address;
    fn get_call_value(&self) -> Word;
    fn get_input(&self) -> &[u8];
    fn get_return_data(&self) -> &[u8];
    fn get_gas_price(&self) -> Word;
    fn get_chain_id(&self) -> u64;
    fn get_block_info(&self) -> BlockEnv;
    fn get_block_hash(&mut self, number: u64) -> Word;
    fn get_blob_hash(&self, index: usize) -> Word;
    fn get_blob_base_fee(&self) -> Word;
    fn get_is_static(&self) -> bool;
    fn get_depth(&self) -> usize;

    // ------------------------------------------------------------
    // Hardfork selection
    // ------------------------------------------------------------
    fn get_hardfork(&self) -> &'static Fork;
    fn is_hardfork_at_least(&self, fork: &Fork) -> bool {
        self.get_hardfork().is_at_least(fork)
    }
}
