//! Non-fatal resolution diagnostics. Unlike `si_core::SiError`, nothing
//! here stops the resolver — a dangling reference just drops the
//! referencing content and keeps going, so a single bad `href` doesn't
//! sink an otherwise-valid document.

use crate::id::NodeId;

/// One thing the resolver noticed and recovered from.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolveWarning {
    /// `use`/`mask`/gradient-`parent` named an id the graph doesn't have.
    DanglingReference { from: NodeId, target: NodeId },
    /// A `use`/mask/gradient-parent chain referred back to a node already
    /// on the `Referrers` stack.
    ReferenceCycle { from: NodeId, target: NodeId },
    /// A gradient stop's color itself resolved to a gradient reference,
    /// which `si_core` would reject as `BadGradientStopColor` — caught
    /// here first so the resolver can drop just the stop.
    GradientStopIsGradient { gradient: NodeId },
    /// A mask's content was empty after resolution (no drawable
    /// descendants); the mask is dropped and its target drawn unmasked.
    EmptyMask { mask: NodeId },
}

impl std::fmt::Display for ResolveWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolveWarning::DanglingReference { from, target } => {
                write!(f, "{from} references unknown id {target}")
            }
            ResolveWarning::ReferenceCycle { from, target } => {
                write!(f, "{from} -> {target} would close a reference cycle")
            }
            ResolveWarning::GradientStopIsGradient { gradient } => {
                write!(f, "gradient {gradient} has a stop colored by another gradient")
            }
            ResolveWarning::EmptyMask { mask } => {
                write!(f, "mask {mask} has no drawable content")
            }
        }
    }
}

/// Forwards every warning to a caller-supplied sink as it happens, rather
/// than accumulating them privately — a caller that doesn't care passes
/// a no-op closure, one that does can collect, log, or fail fast on the
/// first one.
pub struct WarningSink<'a> {
    sink: &'a mut dyn FnMut(ResolveWarning),
}

impl<'a> WarningSink<'a> {
    pub fn new(sink: &'a mut dyn FnMut(ResolveWarning)) -> Self {
        Self { sink }
    }

    pub fn push(&mut self, warning: ResolveWarning) {
        log::debug!("resolve warning: {warning}");
        (self.sink)(warning);
    }
}
