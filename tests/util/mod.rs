use evmrt::bytecode::{analyze, CodeAnalysis};
use evmrt::execution::{
    Address, CallKind, CallRequest, CallResult, CallScheme, MemoryHost, Word,
};
use evmrt::fork::DEFAULT;
use evmrt::program::Program;
use evmrt::util::FromHexString;

/// Address the contract under test is installed at.
pub const CONTRACT: Address = [0x11; 20];
/// Address the test transaction is sent from.
pub const SENDER: Address = [0x22; 20];

/// Parse a hex string into bytes, panicking on malformed input.
pub fn bytes(hex: &str) -> Vec<u8> {
    hex.from_hex_string().unwrap()
}

/// Analyse and compile a hex string, panicking on failure.
pub fn compile(hex: &str) -> (CodeAnalysis, Program) {
    let analysis = analyze(&bytes(hex)).unwrap();
    let program = Program::compile(&analysis, DEFAULT).unwrap();
    (analysis, program)
}

/// Build a host with the given code installed at `CONTRACT`.
pub fn host_with(code: &str, balance: u64) -> MemoryHost {
    let mut host = MemoryHost::new();
    host.insert_account(CONTRACT, Word::from(balance), bytes(code));
    host
}

/// The call request used by `run` and friends.
pub fn request(gas: u64, input: Vec<u8>) -> CallRequest {
    CallRequest {
        kind: CallKind::Call(CallScheme::Call),
        gas,
        caller: SENDER,
        target: CONTRACT,
        code_address: CONTRACT,
        value: Word::ZERO,
        input,
        is_static: false,
    }
}

/// Execute a hex contract with a given gas budget and no calldata.
pub fn run(code: &str, gas: u64) -> CallResult {
    run_on(&mut host_with(code, 0), gas, Vec::new())
}

/// Execute against an existing host.
pub fn run_on(host: &mut MemoryHost, gas: u64, input: Vec<u8>) -> CallResult {
    host.transact(request(gas, input))
}

/// A 32-byte big-endian word holding a small value, as returned by
/// contracts which `MSTORE` a result and return the word.
pub fn returned_word(value: u8) -> Vec<u8> {
    let mut word = vec![0u8; 32];
    word[31] = value;
    word
}
