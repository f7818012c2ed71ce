//! ** idgen module **
//! Id namespaces and helpers for minting identifiers.
//!
//! Store-scoped ids come from a per-store sequence (`question-3`); ids that
//! must be unique across documents (questionnaires, responses) use v4 uuids.
use uuid::Uuid;

pub const NAMESPACE_QUESTION: &str = "question";

pub const NAMESPACE_OPTION: &str = "option";

pub const NAMESPACE_PROFESSOR: &str = "professor";

pub const NAMESPACE_FACILITY: &str = "facility";

pub const NAMESPACE_MAINTENANCE: &str = "maintenance";

/// Identifier types an [`OrderedStore`](crate::store::OrderedStore) can mint on its own.
pub trait MintId: Sized {
    /// Produce the id for sequence number `seq` within `namespace`.
    fn mint(namespace: &str, seq: u64) -> Self;

    /// Sequence number `id` was (or could have been) minted from, if any.
    fn seq_of(_namespace: &str, _id: &Self) -> Option<u64> {
        None
    }
}

impl MintId for String {
    fn mint(namespace: &str, seq: u64) -> Self {
        format!("{namespace}-{seq}")
    }

    fn seq_of(namespace: &str, id: &Self) -> Option<u64> {
        id.strip_prefix(namespace)?.strip_prefix('-')?.parse().ok()
    }
}

impl MintId for Uuid {
    fn mint(_namespace: &str, _seq: u64) -> Self {
        Uuid::new_v4()
    }
}

/// Fresh random id.
pub fn new_id() -> Uuid {
    Uuid::new_v4()
}

/// Fresh random id rendered as `<prefix>-<uuid>`.
pub fn prefixed_id(prefix: &str) -> String {
    format!("{prefix}-{}", new_id().simple())
}
