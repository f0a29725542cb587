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
use std::collections::{HashMap, HashSet};

use log::debug;
use sha3::{Digest, Keccak256};

use super::gas::costs;
use super::{
    word_to_address, Address, BlockEnv, CallKind, CallOutcome, CallRequest, CallResult, CallScheme,
    CreateScheme, EvmError, Host, Interpreter, Word, CALL_DEPTH_LIMIT,
};
use crate::bytecode::{AnalysisConfig, CodeAnalyzer, CodeKind, MAX_CODE_SIZE};
use crate::fork::{Fork, DEFAULT, EIP_3541};
use crate::program::Program;

/// A self-contained reference implementation of the host interface:
/// an account map, journalled storage and logs, the EIP-2929 warm
/// sets, EIP-6780 created-contract tracking, and nested calls driven
/// by recursively instantiated interpreter frames.  It backs the
/// command-line `run` subcommand and the test suite.
pub struct MemoryHost {
    accounts: HashMap<Address, Account>,
    transient: HashMap<(Address, Word), Word>,
    original_storage: HashMap<(Address, Word), Word>,
    journal: Vec<JournalEntry>,
    warm_addresses: HashSet<Address>,
    warm_slots: HashSet<(Address, Word)>,
    created: HashSet<Address>,
    destroyed: Vec<(Address, Address)>,
    logs: Vec<LogRecord>,
    refund: i64,
    frames: Vec<FrameContext>,
    last_returndata: Vec<u8>,
    block: BlockEnv,
    tx: TxContext,
    fork: &'static Fork,
}

#[derive(Clone, Debug, Default)]
pub struct Account {
    pub balance: Word,
    pub nonce: u64,
    pub code: Vec<u8>,
    pub storage: HashMap<Word, Word>,
}

impl Account {
    fn is_empty(&self) -> bool {
        self.balance.is_zero() && self.nonce == 0 && self.code.is_empty()
    }
}

#[derive(Clone, Debug)]
pub struct LogRecord {
    pub address: Address,
    pub topics: Vec<Word>,
    pub data: Vec<u8>,
}

#[derive(Clone, Debug)]
struct FrameContext {
    caller: Address,
    address: Address,
    value: Word,
    input: Vec<u8>,
    is_static: bool,
}

#[derive(Clone, Debug)]
struct TxContext {
    origin: Address,
    gas_price: Word,
    chain_id: u64,
    blob_hashes: Vec<Word>,
    blob_base_fee: Word,
}

impl Default for TxContext {
    fn default() -> Self {
        TxContext {
            origin: [0u8; 20],
            gas_price: Word::ZERO,
            chain_id: 1,
            blob_hashes: Vec::new(),
            blob_base_fee: Word::ZERO,
        }
    }
}

/// One undoable state change.  Reverting to a snapshot pops entries
/// back to the snapshot's journal length, undoing each in reverse
/// order.
enum JournalEntry {
    Storage {
        addr: Address,
        key: Word,
        prev: Option<Word>,
    },
    Transient {
        addr: Address,
        key: Word,
        prev: Option<Word>,
    },
    Balance {
        addr: Address,
        prev: Word,
    },
    Nonce {
        addr: Address,
        prev: u64,
    },
    Code {
        addr: Address,
        prev: Vec<u8>,
    },
    AccountCreated {
        addr: Address,
    },
    Log,
    WarmAddress {
        addr: Address,
    },
    WarmSlot {
        addr: Address,
        key: Word,
    },
    Created {
        addr: Address,
    },
    Destroyed,
    Refund {
        prev: i64,
    },
}

impl Default for MemoryHost {
    fn default() -> Self {
        MemoryHost::new()
    }
}

impl MemoryHost {
    pub fn new() -> Self {
        MemoryHost {
            accounts: HashMap::new(),
            transient: HashMap::new(),
            original_storage: HashMap::new(),
            journal: Vec::new(),
            warm_addresses: HashSet::new(),
            warm_slots: HashSet::new(),
            created: HashSet::new(),
            destroyed: Vec::new(),
            logs: Vec::new(),
            refund: 0,
            frames: Vec::new(),
            last_returndata: Vec::new(),
            block: BlockEnv::default(),
            tx: TxContext::default(),
            fork: DEFAULT,
        }
    }

    pub fn with_fork(mut self, fork: &'static Fork) -> Self {
        self.fork = fork;
        self
    }

    pub fn with_block(mut self, block: BlockEnv) -> Self {
        self.block = block;
        self
    }

    /// Install an account, typically a contract under test.
    pub fn insert_account(&mut self, addr: Address, balance: Word, code: Vec<u8>) {
        let nonce = if code.is_empty() { 0 } else { 1 };
        self.accounts.insert(
            addr,
            Account {
                balance,
                nonce,
                code,
                storage: HashMap::new(),
            },
        );
    }

    /// Seed a storage slot ahead of a transaction, so it reads as
    /// "original" to the refund accounting.
    pub fn seed_storage(&mut self, addr: Address, key: Word, value: Word) {
        if let Some(account) = self.accounts.get_mut(&addr) {
            account.storage.insert(key, value);
        }
    }

    pub fn logs(&self) -> &[LogRecord] {
        &self.logs
    }

    pub fn destroyed(&self) -> &[(Address, Address)] {
        &self.destroyed
    }

    pub fn gas_refund(&self) -> i64 {
        self.refund
    }

    pub fn account(&self, addr: &Address) -> Option<&Account> {
        self.accounts.get(addr)
    }

    /// Run a top-level call against the current state: the entry
    /// point the command-line driver and tests use.  Warms the
    /// transaction-scoped addresses first, per EIP-2929/3651.
    pub fn transact(&mut self, request: CallRequest) -> CallResult {
        self.tx.origin = request.caller;
        self.warm_addresses.insert(request.caller);
        self.warm_addresses.insert(request.target);
        self.warm_addresses.insert(self.block.coinbase);
        self.inner_call(request)
    }

    // ------------------------------------------------------------
    // Journalled primitives
    // ------------------------------------------------------------

    fn account_mut(&mut self, addr: &Address) -> &mut Account {
        self.accounts.entry(*addr).or_default()
    }

    fn set_balance(&mut self, addr: &Address, balance: Word) {
        let prev = self.account_mut(addr).balance;
        self.journal.push(JournalEntry::Balance { addr: *addr, prev });
        self.account_mut(addr).balance = balance;
    }

    fn transfer(&mut self, from: &Address, to: &Address, value: Word) -> bool {
        if value.is_zero() {
            return true;
        }
        let from_balance = self.account_mut(from).balance;
        if from_balance < value {
            return false;
        }
        let to_balance = self.account_mut(to).balance;
        self.set_balance(from, from_balance - value);
        self.set_balance(to, to_balance + value);
        true
    }

    fn bump_nonce(&mut self, addr: &Address) -> u64 {
        let prev = self.account_mut(addr).nonce;
        self.journal.push(JournalEntry::Nonce { addr: *addr, prev });
        self.account_mut(addr).nonce = prev + 1;
        prev
    }

    fn set_code(&mut self, addr: &Address, code: Vec<u8>) {
        let prev = std::mem::take(&mut self.account_mut(addr).code);
        self.journal.push(JournalEntry::Code { addr: *addr, prev });
        self.account_mut(addr).code = code;
    }

    fn undo(&mut self, entry: JournalEntry) {
        match entry {
            JournalEntry::Storage { addr, key, prev } => {
                let storage = &mut self.account_mut(&addr).storage;
                match prev {
                    Some(value) => storage.insert(key, value),
                    None => storage.remove(&key),
                };
            }
            JournalEntry::Transient { addr, key, prev } => {
                match prev {
                    Some(value) => self.transient.insert((addr, key), value),
                    None => self.transient.remove(&(addr, key)),
                };
            }
            JournalEntry::Balance { addr, prev } => self.account_mut(&addr).balance = prev,
            JournalEntry::Nonce { addr, prev } => self.account_mut(&addr).nonce = prev,
            JournalEntry::Code { addr, prev } => self.account_mut(&addr).code = prev,
            JournalEntry::AccountCreated { addr } => {
                self.accounts.remove(&addr);
            }
            JournalEntry::Log => {
                self.logs.pop();
            }
            JournalEntry::WarmAddress { addr } => {
                self.warm_addresses.remove(&addr);
            }
            JournalEntry::WarmSlot { addr, key } => {
                self.warm_slots.remove(&(addr, key));
            }
            JournalEntry::Created { addr } => {
                self.created.remove(&addr);
            }
            JournalEntry::Destroyed => {
                self.destroyed.pop();
            }
            JournalEntry::Refund { prev } => self.refund = prev,
        }
    }

    // ------------------------------------------------------------
    // Frame execution
    // ------------------------------------------------------------

    fn run_frame(
        &mut self,
        code: &[u8],
        kind: CodeKind,
        gas: u64,
        context: FrameContext,
    ) -> CallOutcome {
        // An account without code succeeds immediately.
        if code.is_empty() {
            return CallOutcome::Success {
                output: Vec::new(),
                gas_left: gas,
            };
        }
        let config = AnalysisConfig {
            kind,
            fork: self.fork,
        };
        let analysis = match CodeAnalyzer::new(config).analyze(code) {
            Ok(a) => a,
            Err(e) => {
                debug!("frame code failed analysis: {e}");
                return CallOutcome::Failure {
                    error: EvmError::InvalidOpcode,
                };
            }
        };
        let program = match Program::compile(&analysis, self.fork) {
            Ok(p) => p,
            Err(e) => {
                debug!("frame code failed compilation: {e}");
                return CallOutcome::Failure {
                    error: EvmError::Allocation,
                };
            }
        };
        self.frames.push(context);
        let outcome = Interpreter::new(&analysis, &program, self, gas).run();
        self.frames.pop();
        outcome
    }

    fn do_call(&mut self, scheme: CallScheme, request: CallRequest) -> CallResult {
        let snapshot = self.create_snapshot();
        // Only a plain CALL moves value between distinct accounts.
        if scheme == CallScheme::Call
            && !self.transfer(&request.caller, &request.target, request.value)
        {
            return CallResult {
                success: false,
                gas_left: request.gas,
                output: Vec::new(),
                created: None,
            };
        }
        let code = self.get_code(&request.code_address);
        let context = FrameContext {
            caller: request.caller,
            address: request.target,
            value: request.value,
            input: request.input,
            is_static: request.is_static,
        };
        let outcome = self.run_frame(&code, CodeKind::Runtime, request.gas, context);
        if !outcome.is_success() {
            self.revert_to_snapshot(snapshot);
        }
        CallResult {
            success: outcome.is_success(),
            gas_left: outcome.gas_left(),
            output: outcome.output().to_vec(),
            created: None,
        }
    }

    fn do_create(&mut self, scheme: CreateScheme, request: CallRequest) -> CallResult {
        let failed = |gas_left| CallResult {
            success: false,
            gas_left,
            output: Vec::new(),
            created: None,
        };
        let snapshot = self.create_snapshot();
        let nonce = self.bump_nonce(&request.caller);
        let addr = match scheme {
            CreateScheme::Create => create_address(&request.caller, nonce),
            CreateScheme::Create2 { salt } => create2_address(&request.caller, &salt, &request.input),
        };
        // An existing account with code or nonce is a collision.
        // Like every other failure, it unwinds everything journalled
        // since frame entry, the nonce bump included.
        if let Some(account) = self.accounts.get(&addr) {
            if !account.code.is_empty() || account.nonce != 0 {
                self.revert_to_snapshot(snapshot);
                return failed(0);
            }
        }
        if !self.accounts.contains_key(&addr) {
            self.journal.push(JournalEntry::AccountCreated { addr });
            self.accounts.insert(addr, Account::default());
        }
        self.bump_nonce(&addr);
        self.register_created_contract(&addr);
        self.access_address(&addr);
        if !self.transfer(&request.caller, &addr, request.value) {
            self.revert_to_snapshot(snapshot);
            return failed(request.gas);
        }
        let context = FrameContext {
            caller: request.caller,
            address: addr,
            value: request.value,
            input: Vec::new(),
            is_static: request.is_static,
        };
        let outcome = self.run_frame(&request.input, CodeKind::Initcode, request.gas, context);
        match outcome {
            CallOutcome::Success { output, gas_left } => {
                // Deployed-code checks: the EIP-3541 0xef prefix ban,
                // the size cap, and the per-byte deposit charge.
                let deposit = output.len() as u64 * costs::CODE_DEPOSIT_BYTE as u64;
                let banned_prefix =
                    self.fork.active(&EIP_3541) && output.first() == Some(&0xef);
                if banned_prefix || output.len() > MAX_CODE_SIZE || deposit > gas_left {
                    self.revert_to_snapshot(snapshot);
                    return failed(0);
                }
                self.set_code(&addr, output);
                CallResult {
                    success: true,
                    gas_left: gas_left - deposit,
                    output: Vec::new(),
                    created: Some(addr),
                }
            }
            CallOutcome::Revert { output, gas_left } => {
                self.revert_to_snapshot(snapshot);
                CallResult {
                    success: false,
                    gas_left,
                    output,
                    created: None,
                }
            }
            CallOutcome::Failure { .. } => {
                self.revert_to_snapshot(snapshot);
                failed(0)
            }
        }
    }

    fn current_frame(&self) -> Option<&FrameContext> {
        self.frames.last()
    }
}

// ===================================================================
// Host Implementation
// ===================================================================

impl Host for MemoryHost {
    fn get_balance(&mut self, addr: &Address) -> Word {
        self.accounts.get(addr).map(|a| a.balance).unwrap_or_default()
    }

    fn account_exists(&mut self, addr: &Address) -> bool {
        self.accounts.get(addr).map(|a| !a.is_empty()).unwrap_or(false)
    }

    fn get_code(&mut self, addr: &Address) -> Vec<u8> {
        self.accounts
            .get(addr)
            .map(|a| a.code.clone())
            .unwrap_or_default()
    }

    fn get_storage(&mut self, addr: &Address, key: &Word) -> Word {
        self.accounts
            .get(addr)
            .and_then(|a| a.storage.get(key).copied())
            .unwrap_or_default()
    }

    fn get_original_storage(&mut self, addr: &Address, key: &Word) -> Word {
        match self.original_storage.get(&(*addr, *key)) {
            Some(value) => *value,
            None => self.get_storage(addr, key),
        }
    }

    fn set_storage(&mut self, addr: &Address, key: &Word, value: Word) {
        // First write in this transaction records the original value
        // for the refund accounting.
        if !self.original_storage.contains_key(&(*addr, *key)) {
            let original = self.get_storage(addr, key);
            self.original_storage.insert((*addr, *key), original);
        }
        let prev = self.account_mut(addr).storage.insert(*key, value);
        self.journal.push(JournalEntry::Storage {
            addr: *addr,
            key: *key,
            prev,
        });
    }

    fn get_transient_storage(&mut self, addr: &Address, key: &Word) -> Word {
        self.transient.get(&(*addr, *key)).copied().unwrap_or_default()
    }

    fn set_transient_storage(&mut self, addr: &Address, key: &Word, value: Word) {
        let prev = self.transient.insert((*addr, *key), value);
        self.journal.push(JournalEntry::Transient {
            addr: *addr,
            key: *key,
            prev,
        });
    }

    fn emit_log(&mut self, addr: &Address, topics: &[Word], data: &[u8]) {
        self.journal.push(JournalEntry::Log);
        self.logs.push(LogRecord {
            address: *addr,
            topics: topics.to_vec(),
            data: data.to_vec(),
        });
    }

    fn inner_call(&mut self, request: CallRequest) -> CallResult {
        if self.frames.len() >= CALL_DEPTH_LIMIT {
            return CallResult {
                success: false,
                gas_left: request.gas,
                output: Vec::new(),
                created: None,
            };
        }
        let result = match request.kind {
            CallKind::Call(scheme) => self.do_call(scheme, request),
            CallKind::Create(scheme) => self.do_create(scheme, request),
        };
        self.last_returndata = result.output.clone();
        result
    }

    fn create_snapshot(&mut self) -> usize {
        self.journal.len()
    }

    fn revert_to_snapshot(&mut self, id: usize) {
        while self.journal.len() > id {
            let entry = self.journal.pop().unwrap();
            self.undo(entry);
        }
    }

    fn add_gas_refund(&mut self, delta: i64) {
        self.journal.push(JournalEntry::Refund { prev: self.refund });
        self.refund += delta;
    }

    fn access_address(&mut self, addr: &Address) -> u64 {
        if self.warm_addresses.insert(*addr) {
            self.journal.push(JournalEntry::WarmAddress { addr: *addr });
            costs::COLD_ACCOUNT_ACCESS as u64
        } else {
            costs::WARM_ACCESS as u64
        }
    }

    fn access_storage_slot(&mut self, addr: &Address, key: &Word) -> u64 {
        if self.warm_slots.insert((*addr, *key)) {
            self.journal.push(JournalEntry::WarmSlot {
                addr: *addr,
                key: *key,
            });
            costs::COLD_SLOAD as u64
        } else {
            costs::WARM_ACCESS as u64
        }
    }

    fn register_created_contract(&mut self, addr: &Address) {
        if self.created.insert(*addr) {
            self.journal.push(JournalEntry::Created { addr: *addr });
        }
    }

    fn was_created_in_tx(&mut self, addr: &Address) -> bool {
        self.created.contains(addr)
    }

    fn mark_for_destruction(&mut self, contract: &Address, recipient: &Address) {
        // The balance always moves; the account itself is only swept
        // when it was created in this same transaction (EIP-6780).
        let balance = self.get_balance(contract);
        if contract != recipient {
            self.set_balance(contract, Word::ZERO);
            let recipient_balance = self.get_balance(recipient);
            self.set_balance(recipient, recipient_balance + balance);
        }
        if self.created.contains(contract) {
            self.journal.push(JournalEntry::Destroyed);
            self.destroyed.push((*contract, *recipient));
        }
    }

    fn get_tx_origin(&self) -> Address {
        self.tx.origin
    }

    fn get_caller(&self) -> Address {
        self.current_frame().map(|f| f.caller).unwrap_or_default()
    }

    fn get_self_address(&self) -> Address {
        self.current_frame().map(|f| f.address).unwrap_or_default()
    }

    fn get_call_value(&self) -> Word {
        self.current_frame().map(|f| f.value).unwrap_or_default()
    }

    fn get_input(&self) -> &[u8] {
        self.current_frame().map(|f| f.input.as_slice()).unwrap_or(&[])
    }

    fn get_return_data(&self) -> &[u8] {
        &self.last_returndata
    }

    fn get_gas_price(&self) -> Word {
        self.tx.gas_price
    }

    fn get_chain_id(&self) -> u64 {
        self.tx.chain_id
    }

    fn get_block_info(&self) -> BlockEnv {
        self.block.clone()
    }

    fn get_block_hash(&mut self, number: u64) -> Word {
        // A stand-in derivation; only the most recent 256 blocks
        // resolve, as on chain.
        if number >= self.block.number || self.block.number - number > 256 {
            return Word::ZERO;
        }
        let digest = Keccak256::digest(number.to_be_bytes());
        Word::from_be_bytes::<32>(digest.into())
    }

    fn get_blob_hash(&self, index: usize) -> Word {
        self.tx.blob_hashes.get(index).copied().unwrap_or_default()
    }

    fn get_blob_base_fee(&self) -> Word {
        self.tx.blob_base_fee
    }

    fn get_is_static(&self) -> bool {
        self.current_frame().map(|f| f.is_static).unwrap_or(false)
    }

    fn get_depth(&self) -> usize {
        self.frames.len()
    }

    fn get_hardfork(&self) -> &'static Fork {
        self.fork
    }
}

// ===================================================================
// Address Derivation
// ===================================================================

/// The `CREATE` address: the low 20 bytes of the hash of the RLP
/// encoding of `[sender, nonce]`.
pub fn create_address(sender: &Address, nonce: u64) -> Address {
    let mut rlp = Vec::with_capacity(32);
    rlp.push(0); // list header patched below
    rlp.push(0x80 + 20);
    rlp.extend_from_slice(sender);
    if nonce == 0 {
        rlp.push(0x80);
    } else if nonce < 0x80 {
        rlp.push(nonce as u8);
    } else {
        let bytes = nonce.to_be_bytes();
        let skip = bytes.iter().take_while(|b| **b == 0).count();
        rlp.push(0x80 + (8 - skip) as u8);
        rlp.extend_from_slice(&bytes[skip..]);
    }
    rlp[0] = 0xc0 + (rlp.len() - 1) as u8;
    let digest = Keccak256::digest(&rlp);
    word_to_address(&Word::from_be_bytes::<32>(digest.into()))
}

/// The `CREATE2` address: `keccak(0xff ++ sender ++ salt ++
/// keccak(initcode))`, low 20 bytes.
pub fn create2_address(sender: &Address, salt: &Word, initcode: &[u8]) -> Address {
    let code_hash = Keccak256::digest(initcode);
    let mut preimage = Vec::with_capacity(85);
    preimage.push(0xff);
    preimage.extend_from_slice(sender);
    let salt_bytes: [u8; 32] = salt.to_be_bytes();
    preimage.extend_from_slice(&salt_bytes);
    preimage.extend_from_slice(&code_hash);
    let digest = Keccak256::digest(&preimage);
    word_to_address(&Word::from_be_bytes::<32>(digest.into()))
}
