//! Cycle detection for `use`/`mask`/gradient-`parent` reference chains.
//!
//! A plain "visited set" isn't enough: the same node can legitimately be
//! `use`d from two different, non-overlapping places in one document. What
//! must never happen is a node referencing an ancestor of itself in the
//! *current* reference chain. `Referrers` is that chain, pushed and
//! popped around each reference traversal.

use crate::id::NodeId;

/// A stack of ids currently being resolved-through, innermost last.
#[derive(Debug, Default)]
pub struct Referrers(Vec<NodeId>);

/// RAII guard popping a `Referrers` push on drop, so an early return from
/// a fallible resolve step can't leave the stack corrupted.
pub struct ReferrersGuard<'a> {
    stack: &'a mut Referrers,
}

impl Drop for ReferrersGuard<'_> {
    fn drop(&mut self) {
        self.stack.0.pop();
    }
}

impl Referrers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.0.contains(&id)
    }

    /// Push `id` onto the chain, returning a guard that pops it again.
    /// Callers check [`Self::contains`] *before* calling this.
    pub fn enter(&mut self, id: NodeId) -> ReferrersGuard<'_> {
        self.0.push(id);
        ReferrersGuard { stack: self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_pops_on_drop() {
        let mut r = Referrers::new();
        let a = NodeId::intern("a");
        {
            let _guard = r.enter(a);
            assert!(r.contains(a));
        }
        assert!(!r.contains(a));
    }

    #[test]
    fn guard_pops_even_on_early_return() {
        let mut r = Referrers::new();
        let a = NodeId::intern("cyclic");

        fn inner(r: &mut Referrers, id: NodeId) -> Result<(), ()> {
            let _guard = r.enter(id);
            Err(())
        }

        let _ = inner(&mut r, a);
        assert!(!r.contains(a));
    }
}
