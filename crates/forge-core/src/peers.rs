use std::collections::HashSet;

use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq)]
#[error("no network location in peer address {0:?}")]
pub struct InvalidPeerAddress(pub String);

/// The set of peer network locations known to this node, stored as
/// `host[:port]`. Deduplicated; iteration order is unspecified and nothing
/// downstream may depend on it.
#[derive(Clone, Debug, Default)]
pub struct PeerRegistry {
    peers: HashSet<String>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the address's network location to the set, discarding any scheme
    /// and path. Re-registering a known location is a no-op; returns whether
    /// the location was new.
    pub fn register(&mut self, address: &str) -> Result<bool, InvalidPeerAddress> {
        let location = network_location(address)
            .ok_or_else(|| InvalidPeerAddress(address.to_string()))?;
        Ok(self.peers.insert(location.to_string()))
    }

    pub fn list(&self) -> Vec<&str> {
        self.peers.iter().map(String::as_str).collect()
    }

    pub fn contains(&self, location: &str) -> bool {
        self.peers.contains(location)
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}

/// `host[:port]` portion of an address, tolerating a scheme prefix and a
/// trailing path. None when no host remains.
fn network_location(address: &str) -> Option<&str> {
    let rest = match address.find("://") {
        Some(pos) => &address[pos + 3..],
        None => address,
    };
    let location = match rest.find('/') {
        Some(pos) => &rest[..pos],
        None => rest,
    };
    let location = location.trim();
    if location.is_empty() || location.starts_with(':') {
        return None;
    }
    Some(location)
}
