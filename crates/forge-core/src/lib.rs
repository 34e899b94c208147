use serde::{Deserialize, Serialize};

pub mod consensus;
pub mod constants;
pub mod hash;
pub mod ledger;
pub mod peers;
pub mod pow;
pub mod validate;

pub use consensus::{ChainFetch, FetchError};
pub use hash::block_hash;
pub use ledger::Ledger;
pub use peers::{InvalidPeerAddress, PeerRegistry};
pub use pow::ProofOfWork;
pub use validate::is_valid_chain;

/// A transfer of `amount` between two named parties. The engine records
/// intent only; no identity, sign, or balance checks are performed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub recipient: String,
    pub amount: i64,
}

/// One sealed batch of transactions. `index` is 1-based; the genesis block
/// carries the sentinel `previous_hash` of `"1"` and a fixed proof.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub timestamp: f64,
    pub transactions: Vec<Transaction>,
    pub proof: u64,
    pub previous_hash: String,
}

/// Wire form of a node's full chain, as served to peers and reports.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChainSnapshot {
    pub chain: Vec<Block>,
    pub length: usize,
}
