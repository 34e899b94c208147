use std::mem;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::info;

use crate::constants::{GENESIS_PREVIOUS_HASH, GENESIS_PROOF, REWARD_AMOUNT, REWARD_SENDER};
use crate::hash::block_hash;
use crate::pow::ProofOfWork;
use crate::{Block, ChainSnapshot, Transaction};

/// Owner of the chain and the pending-transaction pool. The only component
/// that mutates chain state; callers serialize `new_transaction`, `seal`,
/// and `replace_chain` behind a single lock.
#[derive(Clone, Debug)]
pub struct Ledger {
    chain: Vec<Block>,
    pending: Vec<Transaction>,
    node_id: String,
}

impl Ledger {
    /// A ledger with the genesis block already sealed; the chain is never
    /// empty from here on. `node_id` is credited with mining rewards.
    pub fn new(node_id: impl Into<String>) -> Self {
        let genesis = Block {
            index: 1,
            timestamp: unix_now(),
            transactions: Vec::new(),
            proof: GENESIS_PROOF,
            previous_hash: GENESIS_PREVIOUS_HASH.to_string(),
        };
        Self {
            chain: vec![genesis],
            pending: Vec::new(),
            node_id: node_id.into(),
        }
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    pub fn pending(&self) -> &[Transaction] {
        &self.pending
    }

    pub fn last_block(&self) -> &Block {
        self.chain.last().expect("chain always holds genesis")
    }

    /// Queues a transaction and returns the index of the block it will be
    /// committed under.
    pub fn new_transaction(
        &mut self,
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: i64,
    ) -> u64 {
        self.pending.push(Transaction {
            sender: sender.into(),
            recipient: recipient.into(),
            amount,
        });
        self.chain.len() as u64 + 1
    }

    /// Searches a proof against the last block and seals it. Long-running;
    /// callers that cannot block use `seal` directly with a proof found
    /// elsewhere.
    pub fn mine(&mut self, pow: &ProofOfWork) -> Block {
        let proof = pow.search(self.last_block().proof);
        self.seal(proof)
    }

    /// Commits a found proof: credits the mining reward into the pool (so
    /// the reward is part of the sealed batch), links to the last block by
    /// content hash, and appends a new block built from the drained pool.
    pub fn seal(&mut self, proof: u64) -> Block {
        self.new_transaction(REWARD_SENDER, self.node_id.clone(), REWARD_AMOUNT);
        let previous_hash = block_hash(self.last_block());
        let block = Block {
            index: self.chain.len() as u64 + 1,
            timestamp: unix_now(),
            transactions: mem::take(&mut self.pending),
            proof,
            previous_hash,
        };
        self.chain.push(block.clone());
        info!(
            index = block.index,
            txs = block.transactions.len(),
            "sealed block"
        );
        block
    }

    /// Wholesale replacement, used by consensus after the candidate chain
    /// has already passed validation.
    pub fn replace_chain(&mut self, chain: Vec<Block>) {
        info!(from = self.chain.len(), to = chain.len(), "replacing chain");
        self.chain = chain;
    }

    pub fn snapshot(&self) -> ChainSnapshot {
        ChainSnapshot {
            chain: self.chain.clone(),
            length: self.chain.len(),
        }
    }
}

fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before unix epoch")
        .as_secs_f64()
}
