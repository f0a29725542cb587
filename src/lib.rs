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

/// Functionality related to the structural analysis of raw bytecode.
/// This includes validating untrusted byte sequences, computing the
/// per-byte classification bitmaps, stripping trailing compiler
/// metadata and answering O(1) queries (e.g. whether a given byte
/// offset is a valid jump destination).
pub mod bytecode;
/// Functionality related to executing an analysed program.  This
/// includes the interpreter core, the operand stack, byte-addressable
/// memory, gas accounting and the host interface through which all
/// state access is delegated.
pub mod execution;
/// Functionality related to distinguishing different forks of the
/// EVM.  This includes mechanisms for identifying what EIPs are
/// active in the current execution.
pub mod fork;
/// Functionality related to the decoded instruction stream.  This
/// covers basic-block construction, per-block gas and stack
/// aggregation, and the peephole-optimised instruction records the
/// interpreter dispatches over.
pub mod program;
pub mod util;
