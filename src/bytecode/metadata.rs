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

/// Describes the metadata block the Solidity compiler appends to the
/// code it emits: a small CBOR map carrying the IPFS multihash of the
/// metadata file and the compiler version, followed by a two-byte
/// big-endian length.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Metadata {
    /// 34-byte IPFS multihash of the compiler metadata.
    pub ipfs: [u8; 34],
    /// Compiler version as `major.minor.patch` bytes.
    pub solc: [u8; 3],
    /// Total length of the trailing block, including the two-byte
    /// length suffix itself.
    pub len: usize,
}

/// Minimum CBOR payload length: map header, "ipfs" key, 34-byte
/// multihash with its two-byte string header, "solc" key and the
/// three version bytes.
const MIN_PAYLOAD: usize = 43;

/// Inspect the tail of a code sequence for a well-formed Solidity
/// metadata block.  On any malformation whatsoever the code is
/// treated as having no metadata; this can never fail analysis.
pub fn find_metadata(code: &[u8]) -> Option<Metadata> {
    if code.len() < 2 {
        return None;
    }
    // Final two bytes give the CBOR payload length.
    let suffix = &code[code.len() - 2..];
    let len = u16::from_be_bytes([suffix[0], suffix[1]]) as usize;
    if len < MIN_PAYLOAD || len + 2 > code.len() {
        return None;
    }
    let payload = &code[code.len() - 2 - len..code.len() - 2];
    let mut cursor = Cursor::new(payload);
    // CBOR map with two entries.
    cursor.expect(&[0xa2])?;
    // Key "ipfs", then a 34-byte string.
    cursor.expect(&[0x64, b'i', b'p', b'f', b's'])?;
    cursor.expect(&[0x58, 0x22])?;
    let ipfs = cursor.take(34)?;
    // Key "solc", then a 3-byte string.
    cursor.expect(&[0x64, b's', b'o', b'l', b'c'])?;
    cursor.expect(&[0x43])?;
    let solc = cursor.take(3)?;
    //
    Some(Metadata {
        ipfs: ipfs.try_into().unwrap(),
        solc: solc.try_into().unwrap(),
        len: len + 2,
    })
}

/// Minimal cursor over the CBOR payload.  All failures collapse to
/// `None` since any malformation simply means "no metadata".
struct Cursor<'a> {
    bytes: &'a [u8],
    index: usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Cursor { bytes, index: 0 }
    }

    fn expect(&mut self, pattern: &[u8]) -> Option<()> {
        let taken = self.take(pattern.len())?;
        (taken == pattern).then_some(())
    }

    fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        let start = self.index;
        self.index = start.checked_add(n)?;
        self.bytes.get(start..self.index)
    }
}
