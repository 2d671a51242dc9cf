pub mod models;

use crate::error::{ConsoleError, Result, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Source of record ids. Implementations must never hand out the same id
/// twice within a session.
pub trait IdGenerator: Send {
    fn next_id(&mut self) -> RecordId;
}

/// Strictly increasing counter.
#[derive(Debug, Clone)]
pub struct Sequence {
    next: u64,
}

impl Sequence {
    pub fn starting_at(first: u64) -> Self {
        Self { next: first }
    }
}

impl Default for Sequence {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

impl IdGenerator for Sequence {
    fn next_id(&mut self) -> RecordId {
        let id = RecordId(self.next);
        self.next += 1;
        id
    }
}

/// A domain record that can live in a [`RecordStore`].
pub trait Record: Clone {
    /// User-entered fields for a new record; everything else is defaulted.
    type Draft;

    fn id(&self) -> RecordId;
    fn validate_draft(draft: &Self::Draft) -> Result<(), ValidationError>;
    fn from_draft(id: RecordId, draft: Self::Draft) -> Self;
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Records that take part in free-text search.
pub trait Searchable {
    fn search_fields(&self) -> Vec<&str>;
}

/// A field with exactly two allowed values.
pub trait TwoValued: Copy + PartialEq + fmt::Debug {
    fn flipped(self) -> Self;
}

/// Rejects text that is empty after trimming.
pub fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField { field });
    }
    Ok(())
}

/// Case-insensitive substring match. An empty query matches everything.
pub fn matches_query(fields: &[&str], query: &str) -> bool {
    let needle = query.to_lowercase();
    needle.is_empty() || fields.iter().any(|f| f.to_lowercase().contains(&needle))
}

/// Ordered in-memory collection backing one panel.
pub struct RecordStore<T> {
    records: Vec<T>,
    ids: Box<dyn IdGenerator>,
}

impl<T: Record> RecordStore<T> {
    pub fn new() -> Self {
        Self::with_generator(Sequence::default())
    }

    pub fn with_generator(ids: impl IdGenerator + 'static) -> Self {
        Self {
            records: Vec::new(),
            ids: Box::new(ids),
        }
    }

    /// Starts from existing records; new ids continue after the largest one.
    pub fn seeded(records: Vec<T>) -> Self {
        let next = records.iter().map(|r| r.id().0).max().unwrap_or(0) + 1;
        Self {
            records,
            ids: Box::new(Sequence::starting_at(next)),
        }
    }

    pub fn list(&self) -> &[T] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: RecordId) -> Option<&T> {
        self.records.iter().find(|r| r.id() == id)
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.get(id).is_some()
    }

    pub fn filter<P>(&self, mut predicate: P) -> Vec<&T>
    where
        P: FnMut(&T) -> bool,
    {
        self.records.iter().filter(|r| predicate(r)).collect()
    }

    pub fn add(&mut self, draft: T::Draft) -> Result<&T> {
        T::validate_draft(&draft)?;
        let id = self.ids.next_id();
        debug_assert!(!self.contains(id), "id generator reused {id}");
        self.records.push(T::from_draft(id, draft));
        let idx = self.records.len() - 1;
        Ok(&self.records[idx])
    }

    /// Applies `patch` to a copy of the record and keeps it only if the
    /// result is still valid.
    pub fn update<F>(&mut self, id: RecordId, patch: F) -> Result<&T>
    where
        F: FnOnce(&mut T),
    {
        let idx = self.position(id)?;
        let mut candidate = self.records[idx].clone();
        patch(&mut candidate);
        if candidate.id() != id {
            return Err(ValidationError::InvalidTransition {
                field: "id",
                from: id.to_string(),
                to: candidate.id().to_string(),
            }
            .into());
        }
        candidate.validate()?;
        self.records[idx] = candidate;
        Ok(&self.records[idx])
    }

    pub fn remove(&mut self, id: RecordId) -> Result<T> {
        let idx = self.position(id)?;
        Ok(self.records.remove(idx))
    }

    /// Flips a two-valued field and returns its new value.
    pub fn toggle<V, F>(&mut self, id: RecordId, field: F) -> Result<V>
    where
        V: TwoValued,
        F: FnOnce(&mut T) -> &mut V,
    {
        let idx = self.position(id)?;
        let slot = field(&mut self.records[idx]);
        *slot = (*slot).flipped();
        Ok(*slot)
    }

    fn position(&self, id: RecordId) -> Result<usize> {
        self.records
            .iter()
            .position(|r| r.id() == id)
            .ok_or(ConsoleError::NotFound(id))
    }
}

impl<T: Record + Searchable> RecordStore<T> {
    pub fn search(&self, query: &str) -> Vec<&T> {
        self.filter(|r| matches_query(&r.search_fields(), query))
    }
}

impl<T: Record> Default for RecordStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for RecordStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordStore")
            .field("records", &self.records)
            .finish_non_exhaustive()
    }
}
