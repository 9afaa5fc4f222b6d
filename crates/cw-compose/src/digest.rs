//! JSON text output and content digests of rendered configurations.

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::ComposeResult;

/// Pretty JSON text of a rendered configuration.
pub fn to_json_string(config: &Value) -> ComposeResult<String> {
    Ok(serde_json::to_string_pretty(config)?)
}

/// SHA-256 of the pretty JSON text, hex-encoded.
pub fn config_digest(config: &Value) -> ComposeResult<String> {
    let mut hasher = Sha256::new();
    hasher.update(to_json_string(config)?.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn digest_stability() {
        let config = json!({ "chip": { "vp_class": "pulp/chip", "vp_comps": ["soc"] } });
        let a = config_digest(&config).unwrap();
        let b = config_digest(&config).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn digest_tracks_key_order() {
        let a = json!({ "a": 1, "b": 2 });
        let b = json!({ "b": 2, "a": 1 });
        assert_ne!(config_digest(&a).unwrap(), config_digest(&b).unwrap());
    }
}
