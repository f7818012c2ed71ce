//! Ordered entity store
//!
//! Every list screen of the editor (questions, answer options, professors,
//! facilities, maintenance tasks) is the same thing underneath: an ordered
//! collection of records with unique ids plus a single selection cursor. This
//! module implements that state machine once, generic over the record type.
//!
//! The store is a value. Each mutator borrows the current state and returns a
//! new one, leaving the original untouched; the backing [`im::Vector`] shares
//! structure between the two so snapshots stay cheap. Mutators report misuse
//! (`UnknownIdentifier`, `DuplicateIdentifier`, `IdentifierMismatch`) and let
//! the caller decide what to do with it. Read-only lookups return `Option`.

use std::fmt;

use im::Vector;
use thiserror::Error;

use crate::idgen::MintId;

/// Label suffix conventionally given to duplicated records.
pub const COPY_SUFFIX: &str = " (Copy)";

/// Append [`COPY_SUFFIX`] to a display label.
pub fn copy_label(label: &str) -> String {
    format!("{label}{COPY_SUFFIX}")
}

/// An item an [`OrderedStore`] can hold.
pub trait Record: Clone {
    type Id: Clone + Eq + fmt::Debug + fmt::Display + MintId;

    /// Identifier of this record; must be unique within a store.
    fn id(&self) -> &Self::Id;

    /// Copy of this record carrying `id`. Implementations usually also mark
    /// the display label with [`copy_label`].
    fn duplicate(&self, id: Self::Id) -> Self;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("no item with id '{0}'")]
    UnknownIdentifier(String),
    #[error("an item with id '{0}' already exists")]
    DuplicateIdentifier(String),
    #[error("update changed item id from '{expected}' to '{found}'")]
    IdentifierMismatch { expected: String, found: String },
}

/// Ordered collection of records with an optional selected record.
///
/// Invariants: ids are unique, and the selected id (if any) names a record
/// currently in the store.
#[derive(Debug, Clone)]
pub struct OrderedStore<T: Record> {
    namespace: String,
    items: Vector<T>,
    selected: Option<T::Id>,
    last_seq: u64,
}

impl<T: Record> OrderedStore<T> {
    /// Empty store minting ids within `namespace`.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            items: Vector::new(),
            selected: None,
            last_seq: 0,
        }
    }

    /// Store holding `items` in order, with nothing selected.
    ///
    /// # Errors
    /// `DuplicateIdentifier` if two items share an id.
    pub fn from_items(namespace: impl Into<String>, items: impl IntoIterator<Item = T>) -> Result<Self, StoreError> {
        items
            .into_iter()
            .try_fold(Self::new(namespace), |store, item| store.append(item))
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &T::Id> {
        self.items.iter().map(|item| item.id())
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn position(&self, id: &T::Id) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    pub fn contains(&self, id: &T::Id) -> bool {
        self.position(id).is_some()
    }

    pub fn find(&self, id: &T::Id) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn selected_id(&self) -> Option<&T::Id> {
        self.selected.as_ref()
    }

    pub fn selected(&self) -> Option<&T> {
        self.selected.as_ref().and_then(|id| self.find(id))
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }

    /// Id the store would mint next. Ids are never derived from the clock, and
    /// the sequence only moves forward, so a minted id is not handed out twice.
    pub fn next_id(&self) -> T::Id {
        self.mint().0
    }

    /// Add `item` at the end.
    ///
    /// # Errors
    /// `DuplicateIdentifier` if an item with the same id is already stored.
    pub fn append(&self, item: T) -> Result<Self, StoreError> {
        if self.contains(item.id()) {
            return Err(StoreError::DuplicateIdentifier(item.id().to_string()));
        }
        let mut next = self.clone();
        if let Some(seq) = T::Id::seq_of(&self.namespace, item.id()) {
            next.last_seq = next.last_seq.max(seq);
        }
        next.items.push_back(item);
        Ok(next)
    }

    /// Mint a fresh id, build the item from it and append it.
    ///
    /// # Errors
    /// `IdentifierMismatch` if `build` does not keep the id it was given.
    pub fn append_with(&self, build: impl FnOnce(T::Id) -> T) -> Result<(Self, T::Id), StoreError> {
        let (id, seq) = self.mint();
        let item = build(id.clone());
        ensure_same_id(&id, item.id())?;
        let mut next = self.clone();
        next.last_seq = seq;
        next.items.push_back(item);
        Ok((next, id))
    }

    /// Point the selection cursor at `id`.
    ///
    /// # Errors
    /// `UnknownIdentifier` if no item has that id.
    pub fn select_by_id(&self, id: &T::Id) -> Result<Self, StoreError> {
        self.index_of(id)?;
        let mut next = self.clone();
        next.selected = Some(id.clone());
        Ok(next)
    }

    /// Clear the selection. Always succeeds.
    pub fn deselect(&self) -> Self {
        let mut next = self.clone();
        next.selected = None;
        next
    }

    /// Replace the item `id` with `mutator(item)`, keeping its position.
    ///
    /// # Errors
    /// `UnknownIdentifier` if `id` is absent, `IdentifierMismatch` if the
    /// mutator changed the item's id.
    pub fn update_by_id(&self, id: &T::Id, mutator: impl FnOnce(T) -> T) -> Result<Self, StoreError> {
        let index = self.index_of(id)?;
        let updated = mutator(self.items[index].clone());
        ensure_same_id(id, updated.id())?;
        let mut next = self.clone();
        next.items.set(index, updated);
        Ok(next)
    }

    /// Remove the item `id`, clearing the selection if it pointed there.
    ///
    /// # Errors
    /// `UnknownIdentifier` if `id` is absent, including on an empty store.
    pub fn delete_by_id(&self, id: &T::Id) -> Result<Self, StoreError> {
        let index = self.index_of(id)?;
        let mut next = self.clone();
        next.items.remove(index);
        if next.selected.as_ref() == Some(id) {
            next.selected = None;
        }
        Ok(next)
    }

    /// Insert a copy of item `id` directly after it, under a freshly minted id.
    ///
    /// # Errors
    /// `UnknownIdentifier` if `id` is absent, `IdentifierMismatch` if the
    /// record's copier dropped the minted id.
    pub fn duplicate_by_id(&self, id: &T::Id) -> Result<Self, StoreError> {
        let index = self.index_of(id)?;
        let (fresh, seq) = self.mint();
        let copy = self.items[index].duplicate(fresh.clone());
        ensure_same_id(&fresh, copy.id())?;
        let mut next = self.clone();
        next.last_seq = seq;
        next.items.insert(index + 1, copy);
        Ok(next)
    }

    /// Move item `id` to `new_index`, clamped to the last position. Other
    /// items keep their relative order.
    ///
    /// # Errors
    /// `UnknownIdentifier` if `id` is absent.
    pub fn move_to(&self, id: &T::Id, new_index: usize) -> Result<Self, StoreError> {
        let from = self.index_of(id)?;
        let to = new_index.min(self.items.len() - 1);
        let mut next = self.clone();
        if from != to {
            let item = next.items.remove(from);
            next.items.insert(to, item);
        }
        Ok(next)
    }

    fn index_of(&self, id: &T::Id) -> Result<usize, StoreError> {
        self.position(id)
            .ok_or_else(|| StoreError::UnknownIdentifier(id.to_string()))
    }

    fn mint(&self) -> (T::Id, u64) {
        let mut seq = self.last_seq;
        loop {
            seq += 1;
            let id = T::Id::mint(&self.namespace, seq);
            if !self.contains(&id) {
                return (id, seq);
            }
        }
    }
}

/// Stores are equal when they hold equal items in the same order and select
/// the same id.
impl<T: Record + PartialEq> PartialEq for OrderedStore<T> {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items && self.selected == other.selected
    }
}

impl<'a, T: Record> IntoIterator for &'a OrderedStore<T> {
    type Item = &'a T;
    type IntoIter = im::vector::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

fn ensure_same_id<I: PartialEq + fmt::Display>(expected: &I, found: &I) -> Result<(), StoreError> {
    if expected == found {
        Ok(())
    } else {
        Err(StoreError::IdentifierMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        })
    }
}
