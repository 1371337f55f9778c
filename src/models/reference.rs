//! Entity references.
//!
//! Every stored document is identified by an [`ObjectRef`]: 12 bytes rendered
//! as 24 lowercase hex characters. References double as foreign keys between
//! collections; nothing in the storage layer checks that they point anywhere.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};

use chrono::Utc;
use once_cell::sync::Lazy;
use rand::Rng;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Length of the textual form of a reference
pub const REFERENCE_LEN: usize = 24;

/// Per-process random component, fixed for the lifetime of the process
static PROCESS_UNIQUE: Lazy<[u8; 5]> = Lazy::new(|| rand::thread_rng().gen());

/// Rolling counter, seeded randomly so two processes started in the same
/// second still diverge
static COUNTER: Lazy<AtomicU32> = Lazy::new(|| AtomicU32::new(rand::thread_rng().gen_range(0..0x00ff_ffff)));

/// Storage-native entity reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectRef([u8; 12]);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid reference format: {0:?}")]
pub struct InvalidReference(pub String);

impl ObjectRef {
    /// Generate a fresh reference: 4-byte timestamp, 5 random bytes, 3-byte counter
    pub fn generate() -> Self {
        let secs = Utc::now().timestamp() as u32;
        let count = COUNTER.fetch_add(1, Ordering::Relaxed) & 0x00ff_ffff;

        let mut bytes = [0u8; 12];
        bytes[0..4].copy_from_slice(&secs.to_be_bytes());
        bytes[4..9].copy_from_slice(&*PROCESS_UNIQUE);
        bytes[9..12].copy_from_slice(&count.to_be_bytes()[1..4]);
        Self(bytes)
    }

    pub fn bytes(&self) -> [u8; 12] {
        self.0
    }

    /// Render as the 24-char hex string exposed to callers
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

/// Whether `s` is a well-formed reference (exactly 24 hex characters)
pub fn is_valid_reference(s: &str) -> bool {
    s.len() == REFERENCE_LEN && s.bytes().all(|b| b.is_ascii_hexdigit())
}

impl FromStr for ObjectRef {
    type Err = InvalidReference;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !is_valid_reference(s) {
            return Err(InvalidReference(s.to_string()));
        }
        let mut bytes = [0u8; 12];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| InvalidReference(s.to_string()))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<ObjectRef> for String {
    fn from(r: ObjectRef) -> Self {
        r.to_hex()
    }
}

impl Serialize for ObjectRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ObjectRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Lenient resolution
// ---------------------------------------------------------------------------

/// Resolve a singular reference field.
///
/// Absent, empty or malformed input resolves to `None`; it is never an error.
/// Surrounding whitespace makes a value malformed.
pub fn resolve(raw: Option<&str>) -> Option<ObjectRef> {
    raw.filter(|s| !s.is_empty()).and_then(|s| s.parse().ok())
}

/// Resolve an array reference field element-wise.
///
/// Malformed elements are dropped and duplicates collapse to their first
/// occurrence, so the result is always a valid set in input order.
pub fn resolve_many<S: AsRef<str>>(raw: &[S]) -> Vec<ObjectRef> {
    let mut seen = HashSet::with_capacity(raw.len());
    raw.iter()
        .filter_map(|candidate| resolve(Some(candidate.as_ref())))
        .filter(|r| seen.insert(*r))
        .collect()
}

/// Render a reference set for a response
pub fn render_many(refs: &[ObjectRef]) -> Vec<String> {
    refs.iter().map(ObjectRef::to_hex).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_reference() {
        assert!(is_valid_reference("507f1f77bcf86cd799439011"));
        assert!(is_valid_reference("507F1F77BCF86CD799439011"));
        assert!(!is_valid_reference("507f1f77bcf86cd79943901"));
        assert!(!is_valid_reference("507f1f77bcf86cd7994390111"));
        assert!(!is_valid_reference("507f1f77bcf86cd79943901z"));
        assert!(!is_valid_reference(""));
    }

    #[test]
    fn test_parse_and_render() {
        let r: ObjectRef = "507F1F77BCF86CD799439011".parse().unwrap();
        assert_eq!(r.to_hex(), "507f1f77bcf86cd799439011");
        assert!("not-a-reference".parse::<ObjectRef>().is_err());
    }

    #[test]
    fn test_generate_is_unique() {
        let a = ObjectRef::generate();
        let b = ObjectRef::generate();
        assert_ne!(a, b);
        assert!(is_valid_reference(&a.to_hex()));
        assert_eq!(a.bytes()[4..9], b.bytes()[4..9]);
    }

    #[test]
    fn test_resolve_singular() {
        assert_eq!(resolve(None), None);
        assert_eq!(resolve(Some("")), None);
        assert_eq!(resolve(Some("bogus")), None);
        assert!(resolve(Some("507f1f77bcf86cd799439011")).is_some());
    }

    #[test]
    fn test_resolve_agrees_with_validator() {
        let inputs = [
            "507f1f77bcf86cd799439011",
            "507F1F77BCF86CD799439011",
            " 507f1f77bcf86cd799439011 ",
            " 507f1f77bcf86cd799439011",
            "507f1f77bcf86cd799439011\n",
            "\t507f1f77bcf86cd79943901",
            "507f1f77bcf86cd79943901z",
            "   ",
            "",
        ];
        for raw in inputs {
            assert_eq!(resolve(Some(raw)).is_some(), is_valid_reference(raw), "{:?}", raw);
        }
    }

    #[test]
    fn test_resolve_many_drops_invalid_and_duplicates() {
        let raw = vec![
            "507f1f77bcf86cd799439011",
            "nope",
            "507f1f77bcf86cd799439012",
            "507f1f77bcf86cd799439011",
            "",
        ];
        let resolved = resolve_many(&raw);
        assert_eq!(
            render_many(&resolved),
            vec!["507f1f77bcf86cd799439011", "507f1f77bcf86cd799439012"]
        );
    }

    #[test]
    fn test_serde_as_string() {
        let r: ObjectRef = "507f1f77bcf86cd799439011".parse().unwrap();
        let json = serde_json::to_value(r).unwrap();
        assert_eq!(json, serde_json::json!("507f1f77bcf86cd799439011"));
        let back: ObjectRef = serde_json::from_value(json).unwrap();
        assert_eq!(back, r);
    }
}
