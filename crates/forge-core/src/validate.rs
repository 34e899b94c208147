use crate::hash::block_hash;
use crate::pow::ProofOfWork;
use crate::Block;

/// Checks that a candidate chain is internally consistent: every block must
/// link to its predecessor's content hash and carry a proof valid against
/// the predecessor's. Chains of length 0 or 1 have no link to check and
/// pass trivially. Stateless; never touches a ledger's pending pool.
pub fn is_valid_chain(chain: &[Block], pow: &ProofOfWork) -> bool {
    chain.windows(2).all(|pair| {
        let (prev, curr) = (&pair[0], &pair[1]);
        curr.previous_hash == block_hash(prev) && pow.valid(prev.proof, curr.proof)
    })
}
