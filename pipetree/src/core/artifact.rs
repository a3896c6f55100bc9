//! Artifact value types.

use base64::Engine as _;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// A unit of pipeline data, identified by its source locator.
///
/// The payload is only present when the producing provider loaded content.
/// Artifacts share no state with their provider once yielded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    /// Absolute path or URI of the artifact's source.
    pub identifier: String,

    /// The raw content, if loaded.
    #[serde(default)]
    pub payload: Option<Vec<u8>>,

    /// Provider-specific metadata.
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Artifact {
    /// Creates an artifact without payload.
    #[must_use]
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            payload: None,
            metadata: HashMap::new(),
        }
    }

    /// Creates an artifact carrying `payload`.
    #[must_use]
    pub fn with_payload(identifier: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            identifier: identifier.into(),
            payload: Some(payload),
            metadata: HashMap::new(),
        }
    }

    /// Adds metadata to the artifact.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Returns true if content was loaded.
    #[must_use]
    pub const fn has_payload(&self) -> bool {
        self.payload.is_some()
    }

    /// Returns the payload bytes.
    #[must_use]
    pub fn payload(&self) -> Option<&[u8]> {
        self.payload.as_deref()
    }

    /// Returns the payload length in bytes, zero when absent.
    #[must_use]
    pub fn payload_len(&self) -> usize {
        self.payload.as_ref().map_or(0, Vec::len)
    }

    /// Decodes the payload as UTF-8. `None` if absent or not valid UTF-8.
    #[must_use]
    pub fn payload_utf8(&self) -> Option<&str> {
        self.payload().and_then(|p| std::str::from_utf8(p).ok())
    }

    /// SHA-256 hex digest of the payload.
    #[must_use]
    pub fn content_hash(&self) -> Option<String> {
        self.payload().map(|p| hex::encode(Sha256::digest(p)))
    }

    /// Converts the artifact to a dictionary representation.
    ///
    /// The payload is base64 encoded.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("identifier".to_string(), serde_json::json!(self.identifier));

        if let Some(payload) = self.payload() {
            map.insert(
                "payload".to_string(),
                serde_json::json!(base64::engine::general_purpose::STANDARD.encode(payload)),
            );
        }

        if !self.metadata.is_empty() {
            let meta_map: serde_json::Map<String, serde_json::Value> =
                self.metadata.clone().into_iter().collect();
            map.insert("metadata".to_string(), serde_json::Value::Object(meta_map));
        }

        map
    }
}

/// One item of a provider enumeration.
///
/// Providers that do not load content yield bare identifiers; providers
/// configured to read content yield fully materialized artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum YieldedArtifact {
    /// The artifact's resolved identifier only.
    Identifier(String),
    /// A materialized artifact.
    Loaded(Artifact),
}

impl YieldedArtifact {
    /// Returns the identifier in either form.
    #[must_use]
    pub fn identifier(&self) -> &str {
        match self {
            Self::Identifier(id) => id,
            Self::Loaded(artifact) => &artifact.identifier,
        }
    }

    /// Returns the artifact when content was loaded.
    #[must_use]
    pub const fn as_artifact(&self) -> Option<&Artifact> {
        match self {
            Self::Identifier(_) => None,
            Self::Loaded(artifact) => Some(artifact),
        }
    }

    /// Converts into an artifact; identifiers become payload-less artifacts.
    #[must_use]
    pub fn into_artifact(self) -> Artifact {
        match self {
            Self::Identifier(id) => Artifact::new(id),
            Self::Loaded(artifact) => artifact,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_artifact_without_payload() {
        let artifact = Artifact::new("/data/foo.bar");

        assert_eq!(artifact.identifier, "/data/foo.bar");
        assert!(!artifact.has_payload());
        assert_eq!(artifact.payload_len(), 0);
        assert!(artifact.payload_utf8().is_none());
        assert!(artifact.content_hash().is_none());
    }

    #[test]
    fn test_artifact_with_payload() {
        let artifact = Artifact::with_payload("/data/foo.bar", b"foo bar baz".to_vec())
            .with_metadata("file_name", serde_json::json!("foo.bar"));

        assert_eq!(artifact.payload(), Some(&b"foo bar baz"[..]));
        assert_eq!(artifact.payload_utf8(), Some("foo bar baz"));
        assert_eq!(artifact.payload_len(), 11);
        assert_eq!(artifact.metadata.get("file_name"), Some(&serde_json::json!("foo.bar")));
    }

    #[test]
    fn test_binary_payload_is_not_utf8() {
        let artifact = Artifact::with_payload("/data/blob", vec![0xff, 0xfe, 0x00]);
        assert!(artifact.payload_utf8().is_none());
        assert_eq!(artifact.payload_len(), 3);
    }

    #[test]
    fn test_content_hash() {
        let artifact = Artifact::with_payload("/x", b"helloworld".to_vec());
        assert_eq!(
            artifact.content_hash().unwrap(),
            "936a185caaa266bb9cbe981e9e05cb78cd732b0b3280eb944412bb6f8f8f07af"
        );
    }

    #[test]
    fn test_to_dict_encodes_payload() {
        let artifact = Artifact::with_payload("/x", b"hi".to_vec());
        let dict = artifact.to_dict();

        assert_eq!(dict.get("identifier").unwrap(), "/x");
        assert_eq!(dict.get("payload").unwrap(), "aGk=");
        assert!(!dict.contains_key("metadata"));
    }

    #[test]
    fn test_yielded_artifact_accessors() {
        let bare = YieldedArtifact::Identifier("/a".to_string());
        assert_eq!(bare.identifier(), "/a");
        assert!(bare.as_artifact().is_none());
        assert_eq!(bare.into_artifact(), Artifact::new("/a"));

        let loaded = YieldedArtifact::Loaded(Artifact::with_payload("/b", vec![1]));
        assert_eq!(loaded.identifier(), "/b");
        assert_eq!(loaded.as_artifact().unwrap().payload_len(), 1);
    }
}
