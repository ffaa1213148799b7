//! Results of cart mutations.

use thiserror::Error;

use poscart_core::LocalId;

/// What a cart mutation did.
///
/// Mutations never fail. A rejected input leaves the collection untouched and
/// is reported as [`Outcome::Ignored`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A new line was appended.
    Appended(LocalId),
    /// The candidate was folded into an existing line.
    Merged { into: LocalId, clamped: bool },
    /// An existing line was changed in place.
    Updated(LocalId),
    /// Several lines were repriced (wholesale toggle).
    Repriced(usize),
    Removed(LocalId),
    /// The collection was bulk-loaded.
    Replaced { kept: usize, dropped: usize },
    Cleared,
    Ignored(IgnoreReason),
}

impl Outcome {
    /// Whether the collection was changed (or reset) by the mutation.
    pub fn is_applied(&self) -> bool {
        !matches!(self, Outcome::Ignored(_))
    }

    pub fn ignored_reason(&self) -> Option<IgnoreReason> {
        match self {
            Outcome::Ignored(reason) => Some(*reason),
            _ => None,
        }
    }
}

/// Why a mutation left the collection unchanged.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    #[error("line has no product id")]
    MissingProduct,

    #[error("quantity to add must be at least 1")]
    NonPositiveQuantity,

    #[error("quantity must not be negative")]
    NegativeQuantity,

    #[error("price must not be negative")]
    NegativePrice,

    #[error("no line with local id {0}")]
    UnknownLine(LocalId),

    #[error("local id {0} is already in use")]
    DuplicateLocalId(LocalId),

    #[error("line {0} would share its product and variant with another line")]
    IdentityConflict(LocalId),

    #[error("operation is not available in this context")]
    UnsupportedInContext,
}
