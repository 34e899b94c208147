/// Sentinel `previous_hash` of the genesis block; not a real digest.
pub const GENESIS_PREVIOUS_HASH: &str = "1";
pub const GENESIS_PROOF: u64 = 100;

/// Synthetic sender credited on every mined block.
pub const REWARD_SENDER: &str = "0";
pub const REWARD_AMOUNT: i64 = 1;

/// Leading zero hex characters a proof digest must carry.
pub const POW_DIFFICULTY: usize = 4;
