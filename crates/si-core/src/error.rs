//! Error types surfaced by the codec, builder, and traverser.
//!
//! Every variant here corresponds to a fatal condition: a bad byte stream,
//! a malformed header, or a caller misusing the `Builder` state machine.
//! Non-fatal issues (missing references, cycles) never appear here — they
//! go through the resolver's warning sink in `si-scene` instead.

use thiserror::Error;

/// Current on-disk format version. Readers reject anything newer.
pub const FORMAT_VERSION: u16 = 1;

/// Fatal error produced while encoding, decoding, or building an IR stream.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum SiError {
    /// The 4-byte magic number did not match `0xB0B0_1E07`.
    #[error("malformed header: bad magic number")]
    MalformedHeader,

    /// The header's version field is newer than this reader supports.
    #[error("unsupported version {found} (max supported is {max_supported})")]
    UnsupportedVersion { found: u16, max_supported: u16 },

    /// A read ran past the end of the backing buffer.
    #[error("truncated stream: read past end of buffer")]
    Truncated,

    /// An opcode byte fell outside every known category range.
    #[error("bad opcode byte: {0:#04x}")]
    BadOpcode(u8),

    /// `END_GROUP` count didn't match `GROUP` count: non-zero group depth
    /// left over when a builder or traversal terminates.
    #[error("unbalanced groups: group depth non-zero at end")]
    UnbalancedGroups,

    /// An `END_GROUP` opcode arrived while the group depth was already 0.
    #[error("unexpected END_GROUP at depth 0")]
    UnexpectedEndGroup,

    /// A gradient stop's color was itself encoded as a gradient.
    #[error("gradient stop color must not itself be a gradient")]
    BadGradientStopColor,

    /// A `smallish_int` or other primitive value was malformed (stray
    /// continuation byte, reserved encoding, etc.), distinct from a plain
    /// short read (`Truncated`).
    #[error("malformed primitive encoding")]
    Malformed,

    /// A back-reference index pointed past the number of entities written
    /// so far (`hasPathNumber`/`hasPaintNumber`/`hasTransformNumber`).
    #[error("back-reference index {index} out of range (only {count} written so far)")]
    BadBackReference { index: u32, count: u32 },

    /// The caller invoked a `Builder` method in the wrong state (e.g.
    /// `path()` before `vector()`, or any event after `end_vector()`).
    /// This is a programming error, not bad data — hosts that embed the
    /// builder behind untrusted scripting can still recover from it.
    #[error("builder misuse: {0}")]
    BuilderMisuse(&'static str),

    /// A resolver asked its canonicalization tables for a key they should
    /// already hold (an image or string interned during the dry-run pass).
    /// Surfaces a desync between the dry-run walk and the emit walk
    /// instead of panicking.
    #[error("canonicalization lookup missed: {0}")]
    CanonicalizationMiss(&'static str),
}

/// Convenience alias used throughout the crate.
pub type SiResult<T> = Result<T, SiError>;
