//! StreamId - datastream identifier
//!
//! Backed by `Arc<str>` so the registry, dispatcher and log fields can all
//! hold the same id without reallocating.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Identifier of one datastream within a feed.
///
/// Opaque text; it is percent-encoded wherever it lands in a URL.
///
/// # Examples
/// ```
/// use contracts::StreamId;
///
/// let id: StreamId = "8".into();
/// assert_eq!(id, "8");
/// assert!(StreamId::check("power/w").is_ok());
/// assert!(StreamId::check("").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StreamId(Arc<str>);

impl StreamId {
    /// Create a new id without checking its contents.
    #[inline]
    pub fn new(s: &str) -> Self {
        Self(Arc::from(s))
    }

    /// Check that `s` can be used as a stream id.
    ///
    /// Returns a human-readable reason on rejection.
    pub fn check(s: &str) -> Result<(), String> {
        if s.is_empty() {
            return Err("stream id cannot be empty".to_string());
        }
        Ok(())
    }

    /// Get the underlying string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for StreamId {
    type Target = str;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for StreamId {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// Lets `HashMap<StreamId, _>` be queried with a plain `&str`.
impl Borrow<str> for StreamId {
    #[inline]
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StreamId {
    #[inline]
    fn from(s: &str) -> Self {
        Self(Arc::from(s))
    }
}

impl From<String> for StreamId {
    #[inline]
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StreamId({:?})", self.0)
    }
}

impl PartialEq<str> for StreamId {
    #[inline]
    fn eq(&self, other: &str) -> bool {
        self.0.as_ref() == other
    }
}

impl PartialEq<&str> for StreamId {
    #[inline]
    fn eq(&self, other: &&str) -> bool {
        self.0.as_ref() == *other
    }
}

impl Serialize for StreamId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for StreamId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_check_accepts_cosm_style_ids() {
        assert!(StreamId::check("8").is_ok());
        assert!(StreamId::check("power_w-1").is_ok());
    }

    #[test]
    fn test_check_rejects_only_empty() {
        assert!(StreamId::check("").unwrap_err().contains("empty"));
        assert!(StreamId::check("a/b").is_ok());
        assert!(StreamId::check("a b").is_ok());
        assert!(StreamId::check("50%").is_ok());
    }

    #[test]
    fn test_lookup_by_str() {
        let mut map: HashMap<StreamId, usize> = HashMap::new();
        map.insert("6".into(), 700);
        assert_eq!(map.get("6"), Some(&700));
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let id = StreamId::new("8");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"8\"");
    }
}
