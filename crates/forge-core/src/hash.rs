use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::Block;

/// Content hash of a block: SHA-256 over the canonical JSON encoding,
/// returned as a 64-character lowercase hex string. Deterministic and
/// independent of how the block's fields were populated, which is what the
/// chain-link check relies on across nodes.
pub fn block_hash(block: &Block) -> String {
    let value = serde_json::to_value(block).expect("block serializes to JSON");
    let digest = Sha256::digest(canonical_json(&value).as_bytes());
    hex::encode(digest)
}

/// JSON text with object keys emitted in sorted order at every nesting
/// level, so structurally equal values encode identically no matter how
/// their maps were built.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (key, val)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.to_owned()).to_string());
                out.push(':');
                write_canonical(val, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        other => out.push_str(&other.to_string()),
    }
}
