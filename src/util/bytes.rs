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

/// Convert a sequence of at most sixteen bytes in big endian form
/// into a `u128` value.
pub fn from_be_bytes(bytes: &[u8]) -> u128 {
    assert!(bytes.len() <= 16);
    let mut val = 0u128;
    for b in bytes {
        val = (val << 8) | (*b as u128);
    }
    val
}

/// Convert a sequence of at most 32 bytes in big endian form into a
/// 256-bit machine word.  Shorter sequences are zero-extended on the
/// left, matching how push immediates are widened.
pub fn word_from_be(bytes: &[u8]) -> U256 {
    assert!(bytes.len() <= 32);
    let mut padded = [0u8; 32];
    padded[32 - bytes.len()..].copy_from_slice(bytes);
    U256::from_be_bytes(padded)
}
