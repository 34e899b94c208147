use std::future::Future;

use thiserror::Error;
use tracing::{info, warn};

use crate::ledger::Ledger;
use crate::peers::PeerRegistry;
use crate::pow::ProofOfWork;
use crate::validate::is_valid_chain;
use crate::{Block, ChainSnapshot};

/// Why a peer's snapshot was unusable this round. Both kinds are recovered
/// locally: the peer is skipped and the scan continues.
#[derive(Clone, Debug, Error)]
pub enum FetchError {
    #[error("peer unreachable: {0}")]
    Unreachable(String),
    #[error("malformed chain snapshot: {0}")]
    Malformed(String),
}

/// Retrieves a peer's chain snapshot. Implementations own transport details
/// such as timeouts; the resolver only sees success or a `FetchError`.
pub trait ChainFetch {
    fn fetch_chain(
        &self,
        peer: &str,
    ) -> impl Future<Output = Result<ChainSnapshot, FetchError>> + Send;
}

/// Scans every registered peer for a chain strictly longer than `local_len`
/// that passes full validation, returning the longest such chain. Failed
/// fetches and invalid chains skip the peer for this round; ties never win,
/// so the outcome does not depend on peer iteration order.
pub async fn fetch_longest_valid<F>(
    local_len: usize,
    peers: &PeerRegistry,
    fetch: &F,
    pow: &ProofOfWork,
) -> Option<Vec<Block>>
where
    F: ChainFetch + Sync,
{
    let mut best_len = local_len;
    let mut best: Option<Vec<Block>> = None;

    for peer in peers.list() {
        let snapshot = match fetch.fetch_chain(peer).await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(peer, %err, "skipping peer");
                continue;
            }
        };
        if snapshot.length != snapshot.chain.len() {
            warn!(
                peer,
                reported = snapshot.length,
                actual = snapshot.chain.len(),
                "snapshot length mismatch, skipping peer"
            );
            continue;
        }
        if snapshot.length <= best_len {
            continue;
        }
        if !is_valid_chain(&snapshot.chain, pow) {
            warn!(
                peer,
                length = snapshot.length,
                "peer chain failed validation, skipping"
            );
            continue;
        }
        best_len = snapshot.length;
        best = Some(snapshot.chain);
    }
    best
}

/// Longest-valid-chain resolution: adopts the best peer chain if one beats
/// the local chain, returning whether a replacement happened.
pub async fn resolve<F>(
    ledger: &mut Ledger,
    peers: &PeerRegistry,
    fetch: &F,
    pow: &ProofOfWork,
) -> bool
where
    F: ChainFetch + Sync,
{
    match fetch_longest_valid(ledger.len(), peers, fetch, pow).await {
        Some(chain) => {
            info!(length = chain.len(), "adopting longer peer chain");
            ledger.replace_chain(chain);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[derive(Default)]
    struct StaticFetch {
        snapshots: HashMap<String, Result<ChainSnapshot, FetchError>>,
    }

    impl StaticFetch {
        fn with(mut self, peer: &str, result: Result<ChainSnapshot, FetchError>) -> Self {
            self.snapshots.insert(peer.to_string(), result);
            self
        }
    }

    impl ChainFetch for StaticFetch {
        async fn fetch_chain(&self, peer: &str) -> Result<ChainSnapshot, FetchError> {
            self.snapshots
                .get(peer)
                .cloned()
                .unwrap_or_else(|| Err(FetchError::Unreachable("no route".to_string())))
        }
    }

    fn mined_ledger(pow: &ProofOfWork, blocks: usize) -> Ledger {
        let mut ledger = Ledger::new("peer");
        for _ in 0..blocks {
            ledger.mine(pow);
        }
        ledger
    }

    fn registry(locations: &[&str]) -> PeerRegistry {
        let mut peers = PeerRegistry::new();
        for location in locations {
            peers.register(location).unwrap();
        }
        peers
    }

    #[tokio::test]
    async fn adopts_longest_valid_peer_chain() {
        let pow = ProofOfWork::new(1);
        let mut local = mined_ledger(&pow, 2); // length 3
        let short = mined_ledger(&pow, 1).snapshot(); // length 2
        let long = mined_ledger(&pow, 4).snapshot(); // length 5

        let peers = registry(&["10.0.0.1:8080", "10.0.0.2:8080"]);
        let fetch = StaticFetch::default()
            .with("10.0.0.1:8080", Ok(short))
            .with("10.0.0.2:8080", Ok(long.clone()));

        assert!(resolve(&mut local, &peers, &fetch, &pow).await);
        assert_eq!(local.len(), 5);
        assert_eq!(local.chain(), long.chain.as_slice());
    }

    #[tokio::test]
    async fn longer_but_invalid_chain_is_ignored() {
        let pow = ProofOfWork::new(1);
        let mut local = mined_ledger(&pow, 2);
        let before = local.chain().to_vec();

        let mut long = mined_ledger(&pow, 4).snapshot();
        long.chain[2].proof += 1;

        let peers = registry(&["10.0.0.2:8080"]);
        let fetch = StaticFetch::default().with("10.0.0.2:8080", Ok(long));

        assert!(!resolve(&mut local, &peers, &fetch, &pow).await);
        assert_eq!(local.chain(), before.as_slice());
    }

    #[tokio::test]
    async fn equal_length_never_replaces() {
        let pow = ProofOfWork::new(1);
        let mut local = mined_ledger(&pow, 2);
        let same = mined_ledger(&pow, 2).snapshot();

        let peers = registry(&["10.0.0.1:8080"]);
        let fetch = StaticFetch::default().with("10.0.0.1:8080", Ok(same));

        assert!(!resolve(&mut local, &peers, &fetch, &pow).await);
    }

    #[tokio::test]
    async fn unreachable_peer_does_not_abort_the_scan() {
        let pow = ProofOfWork::new(1);
        let mut local = mined_ledger(&pow, 0);
        let long = mined_ledger(&pow, 3).snapshot();

        let peers = registry(&["10.0.0.1:8080", "10.0.0.2:8080", "10.0.0.3:8080"]);
        let fetch = StaticFetch::default()
            .with(
                "10.0.0.1:8080",
                Err(FetchError::Unreachable("connection refused".to_string())),
            )
            .with(
                "10.0.0.2:8080",
                Err(FetchError::Malformed("not a snapshot".to_string())),
            )
            .with("10.0.0.3:8080", Ok(long));

        assert!(resolve(&mut local, &peers, &fetch, &pow).await);
        assert_eq!(local.len(), 4);
    }

    #[tokio::test]
    async fn inconsistent_length_field_is_treated_as_malformed() {
        let pow = ProofOfWork::new(1);
        let mut local = mined_ledger(&pow, 0);
        let mut lying = mined_ledger(&pow, 3).snapshot();
        lying.length = 40;

        let peers = registry(&["10.0.0.1:8080"]);
        let fetch = StaticFetch::default().with("10.0.0.1:8080", Ok(lying));

        assert!(!resolve(&mut local, &peers, &fetch, &pow).await);
        assert_eq!(local.len(), 1);
    }

    #[tokio::test]
    async fn no_peers_keeps_local_chain() {
        let pow = ProofOfWork::new(1);
        let mut local = mined_ledger(&pow, 1);
        let fetch = StaticFetch::default();

        assert!(!resolve(&mut local, &PeerRegistry::new(), &fetch, &pow).await);
        assert_eq!(local.len(), 2);
    }
}
