//! Resolver policy knobs left as implementation choices, mirroring
//! `si_core::BuilderConfig`'s role for the builder.

use si_core::BuilderConfig;

/// Configuration for [`crate::resolve::resolve`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolverConfig {
    /// Viewport used to seed bounds computation for nodes whose geometry
    /// is defined in percentages of the viewport (object-bounding-box-less
    /// gradients, mask region defaults). `(width, height)`.
    pub default_viewport: (f64, f64),
    /// Forwarded verbatim to the `Builder` this resolver drives.
    pub builder: BuilderConfig,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self { default_viewport: (100.0, 100.0), builder: BuilderConfig::default() }
    }
}
