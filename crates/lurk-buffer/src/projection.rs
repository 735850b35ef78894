//! Record projection: reshape or drop raw lines before display.

/// Transforms a raw source line before wrapping, or drops it.
///
/// Projections are pure: no I/O, no state. Returning `None` drops the
/// record, and the producer that read it compensates by reading one more
/// line.
pub trait Project: Send + Sync {
    fn project(&self, raw: &[u8]) -> Option<Vec<u8>>;
}

/// Keep every line unchanged.
pub struct Passthrough;

impl Project for Passthrough {
    fn project(&self, raw: &[u8]) -> Option<Vec<u8>> {
        Some(raw.to_vec())
    }
}

/// Re-emit JSON records compactly; drop lines that are not valid JSON.
pub struct JsonCompact;

impl Project for JsonCompact {
    fn project(&self, raw: &[u8]) -> Option<Vec<u8>> {
        let value: serde_json::Value = serde_json::from_slice(raw).ok()?;
        serde_json::to_vec(&value).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passthrough_keeps_bytes() {
        assert_eq!(Passthrough.project(b"hello"), Some(b"hello".to_vec()));
        assert_eq!(Passthrough.project(b""), Some(Vec::new()));
    }

    #[test]
    fn json_compact_normalizes() {
        let out = JsonCompact.project(br#"{ "a" : 1 ,  "b": [2, 3] }"#).unwrap();
        assert_eq!(out, br#"{"a":1,"b":[2,3]}"#.to_vec());
    }

    #[test]
    fn json_drops_invalid_lines() {
        assert_eq!(JsonCompact.project(b"not json"), None);
        assert_eq!(JsonCompact.project(b"{truncated"), None);
    }
}
