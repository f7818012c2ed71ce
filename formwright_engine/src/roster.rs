//! Named-entity list editors.
//!
//! Professors, facilities and maintenance tasks are all edited the same way:
//! type a name, add it, then pick, rename, copy, reorder or drop entries. A
//! [`Roster`] is that editor for one [`RosterKind`], built on
//! [`OrderedStore`]. The kind only decides the screen title and the id
//! namespace.

use std::fmt;

use formwright_data::{Id, NamedEntity};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::idgen::{NAMESPACE_FACILITY, NAMESPACE_MAINTENANCE, NAMESPACE_PROFESSOR};
use crate::store::{OrderedStore, Record, StoreError, copy_label};

impl Record for NamedEntity {
    type Id = Id;

    fn id(&self) -> &Id {
        &self.id
    }

    fn duplicate(&self, id: Id) -> Self {
        NamedEntity {
            id,
            name: copy_label(&self.name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RosterKind {
    Professor,
    Facility,
    Maintenance,
}

impl RosterKind {
    pub fn title(self) -> &'static str {
        match self {
            RosterKind::Professor => "Professors",
            RosterKind::Facility => "Facilities",
            RosterKind::Maintenance => "Maintenance",
        }
    }

    pub fn namespace(self) -> &'static str {
        match self {
            RosterKind::Professor => NAMESPACE_PROFESSOR,
            RosterKind::Facility => NAMESPACE_FACILITY,
            RosterKind::Maintenance => NAMESPACE_MAINTENANCE,
        }
    }
}

impl fmt::Display for RosterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Roster {
    kind: RosterKind,
    entries: OrderedStore<NamedEntity>,
}

impl Roster {
    pub fn new(kind: RosterKind) -> Self {
        Self {
            kind,
            entries: OrderedStore::new(kind.namespace()),
        }
    }

    /// Roster over previously saved entries.
    ///
    /// # Errors
    /// `DuplicateIdentifier` if two entries share an id.
    pub fn from_entries(kind: RosterKind, entries: Vec<NamedEntity>) -> Result<Self, StoreError> {
        Ok(Self {
            kind,
            entries: OrderedStore::from_items(kind.namespace(), entries)?,
        })
    }

    pub fn kind(&self) -> RosterKind {
        self.kind
    }

    pub fn entries(&self) -> &OrderedStore<NamedEntity> {
        &self.entries
    }

    pub fn selected(&self) -> Option<&NamedEntity> {
        self.entries.selected()
    }

    pub fn to_vec(&self) -> Vec<NamedEntity> {
        self.entries.to_vec()
    }

    /// Add an entry named `name` (trimmed) and select it. Blank input leaves
    /// the roster as it is.
    ///
    /// # Errors
    /// Only on a broken store invariant; see [`OrderedStore::append_with`].
    pub fn add(&self, name: &str) -> Result<Self, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            debug!("ignoring blank {} name", self.kind.namespace());
            return Ok(self.clone());
        }
        let (entries, id) = self.entries.append_with(|id| NamedEntity::new(id, name))?;
        debug!("added {} '{id}'", self.kind.namespace());
        Ok(self.with_entries(entries.select_by_id(&id)?))
    }

    /// # Errors
    /// `UnknownIdentifier` if `id` is absent.
    pub fn rename(&self, id: &Id, name: &str) -> Result<Self, StoreError> {
        let entries = self.entries.update_by_id(id, |mut entry| {
            entry.name = name.to_string();
            entry
        })?;
        Ok(self.with_entries(entries))
    }

    /// # Errors
    /// `UnknownIdentifier` if `id` is absent.
    pub fn remove(&self, id: &Id) -> Result<Self, StoreError> {
        Ok(self.with_entries(self.entries.delete_by_id(id)?))
    }

    /// # Errors
    /// `UnknownIdentifier` if `id` is absent.
    pub fn duplicate(&self, id: &Id) -> Result<Self, StoreError> {
        Ok(self.with_entries(self.entries.duplicate_by_id(id)?))
    }

    /// # Errors
    /// `UnknownIdentifier` if `id` is absent.
    pub fn move_to(&self, id: &Id, new_index: usize) -> Result<Self, StoreError> {
        Ok(self.with_entries(self.entries.move_to(id, new_index)?))
    }

    /// # Errors
    /// `UnknownIdentifier` if `id` is absent.
    pub fn select(&self, id: &Id) -> Result<Self, StoreError> {
        Ok(self.with_entries(self.entries.select_by_id(id)?))
    }

    pub fn deselect(&self) -> Self {
        self.with_entries(self.entries.deselect())
    }

    fn with_entries(&self, entries: OrderedStore<NamedEntity>) -> Self {
        Self { kind: self.kind, entries }
    }
}
