use sha2::{Digest, Sha256};

use crate::constants::POW_DIFFICULTY;

/// Proof-of-work parameterized by difficulty: the number of leading zero hex
/// characters required of the digest over the previous and candidate proofs,
/// written as concatenated decimal strings. The reference difficulty is 4
/// (expected ~65536 attempts per search); tests lower it.
#[derive(Clone, Copy, Debug)]
pub struct ProofOfWork {
    difficulty: usize,
}

impl Default for ProofOfWork {
    fn default() -> Self {
        Self {
            difficulty: POW_DIFFICULTY,
        }
    }
}

impl ProofOfWork {
    pub fn new(difficulty: usize) -> Self {
        Self { difficulty }
    }

    pub fn difficulty(&self) -> usize {
        self.difficulty
    }

    /// Smallest non-negative proof valid against `last_proof`, by exhaustive
    /// increasing scan from 0. CPU-bound and unbounded in the worst case;
    /// callers run it off the hot path.
    pub fn search(&self, last_proof: u64) -> u64 {
        let mut proof = 0;
        while !self.valid(last_proof, proof) {
            proof += 1;
        }
        proof
    }

    pub fn valid(&self, last_proof: u64, proof: u64) -> bool {
        let guess = format!("{last_proof}{proof}");
        let digest = Sha256::digest(guess.as_bytes());
        leading_zero_nibbles(&digest) >= self.difficulty
    }
}

/// Number of leading zero hex characters in `digest`.
pub fn leading_zero_nibbles(digest: &[u8]) -> usize {
    let mut total = 0;
    for byte in digest {
        if *byte == 0 {
            total += 2;
        } else {
            if byte >> 4 == 0 {
                total += 1;
            }
            break;
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_zero_nibbles_examples() {
        let mut digest = [0u8; 32];
        assert_eq!(leading_zero_nibbles(&digest), 64);
        digest[0] = 0x0F; // 00001111
        assert_eq!(leading_zero_nibbles(&digest), 1);
        digest[0] = 0xF0; // 11110000
        assert_eq!(leading_zero_nibbles(&digest), 0);
        digest = [0u8; 32];
        digest[1] = 0x80;
        assert_eq!(leading_zero_nibbles(&digest), 2);
        digest[1] = 0x08;
        assert_eq!(leading_zero_nibbles(&digest), 3);
    }

    #[test]
    fn valid_matches_hex_prefix() {
        // The predicate must agree with a literal check of the hex digest,
        // at the reference difficulty and below.
        for difficulty in [1usize, 2, 4] {
            let pow = ProofOfWork::new(difficulty);
            for (p, q) in [(100u64, 0u64), (1, 1), (42, 65_535), (7, 12_345)] {
                let digest = Sha256::digest(format!("{p}{q}").as_bytes());
                let expected = hex::encode(digest)
                    .chars()
                    .take(difficulty)
                    .all(|c| c == '0');
                assert_eq!(pow.valid(p, q), expected);
            }
        }
    }

    #[test]
    fn search_returns_smallest_proof() {
        let pow = ProofOfWork::new(1);
        for last_proof in [0u64, 100, 12_345] {
            let proof = pow.search(last_proof);
            assert!(pow.valid(last_proof, proof));
            for candidate in 0..proof {
                assert!(!pow.valid(last_proof, candidate));
            }
        }
    }

    #[test]
    fn zero_difficulty_accepts_everything() {
        let pow = ProofOfWork::new(0);
        assert!(pow.valid(1, 2));
        assert_eq!(pow.search(100), 0);
    }

    #[test]
    fn default_difficulty_is_reference() {
        assert_eq!(ProofOfWork::default().difficulty(), 4);
    }
}
