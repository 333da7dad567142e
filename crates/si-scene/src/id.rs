//! Interned node identifiers for the scene graph.
//!
//! A `Spur` is 4 bytes, `Copy`, `Eq`+`Hash` in O(1), and comparisons never
//! touch the backing string — important here since `use`/`mask`/gradient-
//! parent references are resolved by id, over and over, during a single
//! `resolve` pass.

use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// An interned identifier: either an author-assigned `id="..."` or an
/// anonymous id synthesized for an unnamed node so it can still serve as a
/// `Referrers` stack key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(Spur);

impl NodeId {
    #[must_use]
    pub fn intern(s: &str) -> Self {
        NodeId(INTERNER.get_or_intern(s))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }

    /// A fresh id no author-supplied string can collide with, used for
    /// nodes the parser didn't assign an `id` to.
    #[must_use]
    pub fn anonymous() -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        Self::intern(&format!("\0anon_{n}"))
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(NodeId::intern(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_roundtrip() {
        let a = NodeId::intern("gradient1");
        let b = NodeId::intern("gradient1");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "gradient1");
    }

    #[test]
    fn anonymous_ids_are_unique_and_unreachable_by_name() {
        let a = NodeId::anonymous();
        let b = NodeId::anonymous();
        assert_ne!(a, b);
        assert_ne!(a, NodeId::intern("anon_0"));
    }
}
