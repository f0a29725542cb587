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
use std::cmp::Ordering;
use std::fmt;

// ===================================================================
// EIPS
// ===================================================================

pub const EIP_1153: EIP = EIP("Transient storage opcodes");
pub const EIP_1559: EIP = EIP("Fee market change for ETH 1.0 chain");
pub const EIP_2200: EIP = EIP("Structured definitions for net gas metering");
pub const EIP_2929: EIP = EIP("Gas cost increases for state access opcodes");
pub const EIP_3198: EIP = EIP("BASEFEE opcode");
pub const EIP_3529: EIP = EIP("Reduction in refunds");
pub const EIP_3541: EIP = EIP("Reject new contract code starting with the 0xEF byte");
pub const EIP_3651: EIP = EIP("Warm COINBASE");
pub const EIP_3675: EIP = EIP("Upgrade consensus to Proof-of-Stake");
pub const EIP_3855: EIP = EIP("PUSH0 instruction");
pub const EIP_3860: EIP = EIP("Limit and meter initcode");
pub const EIP_4399: EIP = EIP("Supplant DIFFICULTY opcode with PREVRANDAO");
pub const EIP_4844: EIP = EIP("Shard blob transactions");
pub const EIP_5656: EIP = EIP("MCOPY memory copying instruction");
pub const EIP_6780: EIP = EIP("SELFDESTRUCT only in same transaction");
pub const EIP_7516: EIP = EIP("BLOBBASEFEE opcode");

// ===================================================================
// Forks
// ===================================================================

pub const FRONTIER: Fork = Fork {
    name: "frontier",
    id: 2015_07_30,
    eips: &[],
};
pub const HOMESTEAD: Fork = Fork {
    name: "homestead",
    id: 2016_03_14,
    eips: &[],
};
pub const BYZANTIUM: Fork = Fork {
    name: "byzantium",
    id: 2017_10_16,
    eips: &[],
};
pub const CONSTANTINOPLE: Fork = Fork {
    name: "constantinople",
    id: 2019_02_28,
    eips: &[],
};
pub const ISTANBUL: Fork = Fork {
    name: "istanbul",
    id: 2019_12_07,
    eips: &[EIP_2200],
};
pub const BERLIN: Fork = Fork {
    name: "berlin",
    id: 2021_04_15,
    eips: &[EIP_2929],
};
pub const LONDON: Fork = Fork {
    name: "london",
    id: 2021_08_05,
    eips: &[EIP_1559, EIP_3198, EIP_3529, EIP_3541],
};
pub const PARIS: Fork = Fork {
    name: "paris",
    id: 2022_09_15,
    eips: &[EIP_3675, EIP_4399],
};
pub const SHANGHAI: Fork = Fork {
    name: "shanghai",
    id: 2023_04_12,
    eips: &[EIP_3651, EIP_3855, EIP_3860],
};
pub const CANCUN: Fork = Fork {
    name: "cancun",
    id: 2024_03_13,
    eips: &[EIP_1153, EIP_4844, EIP_5656, EIP_6780, EIP_7516],
};

/// All known forks, in activation order.
pub const FORKS: &[&Fork] = &[
    &FRONTIER,
    &HOMESTEAD,
    &BYZANTIUM,
    &CONSTANTINOPLE,
    &ISTANBUL,
    &BERLIN,
    &LONDON,
    &PARIS,
    &SHANGHAI,
    &CANCUN,
];

/// The fork assumed when nothing else is specified.
pub const DEFAULT: &Fork = &CANCUN;

// ===================================================================
// EIP
// ===================================================================

/// Represents a specific EIP supported by this system.  EIPs are
/// distinct from `Fork`s because they represent atomic changes
/// between forks.
#[derive(Debug, Eq, PartialEq)]
pub struct EIP(&'static str);

impl EIP {
    /// Short description of what this EIP changes.
    pub fn description(&self) -> &'static str {
        self.0
    }
}

// ===================================================================
// Fork Definition
// ===================================================================

/// Represents a top-level `Fork` in the Ethereum system.  A `Fork` is
/// a collection of the EIPs it activates.  Code can be parameterised
/// by querying the active fork to ascertain whether a specific `EIP`
/// is enabled or not.
#[derive(Debug, Eq, PartialEq)]
pub struct Fork {
    /// Human-readable fork name (as used on the command line).
    name: &'static str,
    /// Fork identifier which uniquely determines the fork based on
    /// its activation date.
    id: usize,
    /// List of EIPs activated by this fork.
    eips: &'static [EIP],
}

impl Fork {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Check whether a given EIP is active under this fork.  An EIP
    /// is active if it was introduced by this fork, or by any earlier
    /// fork.
    pub fn active(&self, eip: &EIP) -> bool {
        FORKS
            .iter()
            .filter(|f| f.id <= self.id)
            .any(|f| f.eips.contains(eip))
    }

    /// Check whether this fork is the given fork, or a later one.
    pub fn is_at_least(&self, other: &Fork) -> bool {
        self.id >= other.id
    }

    /// Resolve a fork from its lowercase name.
    pub fn from_name(name: &str) -> Option<&'static Fork> {
        FORKS.iter().find(|f| f.name == name).copied()
    }
}

impl PartialOrd for Fork {
    fn partial_cmp(&self, other: &Fork) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Fork {
    fn cmp(&self, other: &Fork) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl fmt::Display for Fork {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
