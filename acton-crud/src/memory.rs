//! In-memory repository
//!
//! [`InMemoryRepository`] keeps entities in a shared ordered map and implements
//! the full [`Repository`] contract: filters (every operator, `%`/`_`
//! wildcards for `like`), sorting, pagination and transactions.
//!
//! Inserts, updates and deletes are staged in the transaction's write set and
//! applied together under the store's write lock on commit; rollback discards
//! the set. Readers only ever see committed data. A commit whose write set
//! contradicts what another transaction committed in the meantime (an insert
//! onto a taken id, an update of a deleted row) fails as a whole. Identifiers
//! come from a counter that is not rolled back, like a database sequence.
//!
//! Handy for tests, demos and prototyping before a real backend exists.
//!
//! # Example
//!
//! ```rust
//! use acton_crud::filter::{FieldSchema, FieldType, FilterValue, QueryBuilder};
//! use acton_crud::memory::{Identified, InMemoryRepository};
//! use acton_crud::repository::Repository;
//!
//! #[derive(Clone)]
//! struct Tag { id: i64, name: String }
//!
//! impl Identified for Tag {
//!     fn id(&self) -> i64 { self.id }
//!     fn set_id(&mut self, id: i64) { self.id = id; }
//!     fn field(&self, name: &str) -> Option<FilterValue> {
//!         match name {
//!             "name" => Some(self.name.as_str().into()),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! let repository = InMemoryRepository::with_entities(vec![
//!     Tag { id: 1, name: "rust".into() },
//!     Tag { id: 2, name: "ruby".into() },
//! ]);
//!
//! let schema = FieldSchema::new().with_field("name", FieldType::Text);
//! let query = QueryBuilder::new(&schema).build([("name[like]", "ru_t")]).unwrap();
//! assert_eq!(repository.find_all(&query).unwrap().len(), 1);
//! ```

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::filter::{Comparison, FilterExpression, FilterOperator, FilterValue, Query};
use crate::repository::{
    Repository, RepositoryError, RepositoryOperation, RepositoryResult, SortOrder, Transaction,
};

/// Entity that can live in an [`InMemoryRepository`]
pub trait Identified: Clone + Send + Sync {
    /// Current identifier; zero or negative means not yet assigned
    fn id(&self) -> i64;

    /// Assign the identifier generated on insert
    fn set_id(&mut self, id: i64);

    /// Value of a filterable or sortable field
    fn field(&self, name: &str) -> Option<FilterValue>;
}

/// Transaction counters, for asserting finalization behaviour
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransactionStats {
    /// Transactions opened
    pub begun: u32,
    /// Successful commits
    pub committed: u32,
    /// Rollbacks
    pub rolled_back: u32,
    /// Releases
    pub ended: u32,
}

#[derive(Debug, Default)]
struct Faults {
    mutation: Option<String>,
    commit: Option<String>,
    refuse_delete: bool,
}

#[derive(Debug, Default)]
struct Diagnostics {
    stats: TransactionStats,
    faults: Faults,
}

#[derive(Debug)]
struct Store<E> {
    entities: BTreeMap<i64, E>,
    next_id: i64,
}

/// Pending change to one id inside a transaction
#[derive(Debug)]
enum Staged<E> {
    Insert(E),
    Update(E),
    Delete,
}

/// Repository backed by a shared in-memory map
#[derive(Debug)]
pub struct InMemoryRepository<E> {
    store: Arc<RwLock<Store<E>>>,
    diagnostics: Arc<Mutex<Diagnostics>>,
}

impl<E> Clone for InMemoryRepository<E> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            diagnostics: Arc::clone(&self.diagnostics),
        }
    }
}

impl<E: Identified> Default for InMemoryRepository<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Identified> InMemoryRepository<E> {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::with_entities(Vec::new())
    }

    /// Create a repository holding `entities`, keyed by their current ids
    pub fn with_entities(entities: Vec<E>) -> Self {
        let entities: BTreeMap<i64, E> = entities.into_iter().map(|e| (e.id(), e)).collect();
        let next_id = entities.keys().next_back().copied().unwrap_or(0).max(0) + 1;
        Self {
            store: Arc::new(RwLock::new(Store { entities, next_id })),
            diagnostics: Arc::new(Mutex::new(Diagnostics::default())),
        }
    }

    /// Number of stored entities
    pub fn len(&self) -> usize {
        self.store
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entities
            .len()
    }

    /// Check if the repository is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Transaction counters so far
    pub fn stats(&self) -> TransactionStats {
        self.diagnostics().stats
    }

    /// Make the next insert, update or delete fail with `message`
    pub fn fail_next_mutation(&self, message: impl Into<String>) {
        self.diagnostics().faults.mutation = Some(message.into());
    }

    /// Make the next commit fail with `message`
    pub fn fail_next_commit(&self, message: impl Into<String>) {
        self.diagnostics().faults.commit = Some(message.into());
    }

    /// Make the next delete report that nothing was removed
    pub fn refuse_next_delete(&self) {
        self.diagnostics().faults.refuse_delete = true;
    }

    fn diagnostics(&self) -> std::sync::MutexGuard<'_, Diagnostics> {
        self.diagnostics.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn injected_failure(&self, operation: RepositoryOperation) -> RepositoryResult<()> {
        match self.diagnostics().faults.mutation.take() {
            Some(message) => Err(RepositoryError::database_error(operation, message)),
            None => Ok(()),
        }
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Store<E>> {
        self.store.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<E: Identified> Repository<E> for InMemoryRepository<E> {
    type Transaction = MemoryTransaction<E>;

    fn find_all(&self, query: &Query) -> RepositoryResult<Vec<E>> {
        let store = self.store.read().unwrap_or_else(PoisonError::into_inner);

        let mut found: Vec<E> = store
            .entities
            .values()
            .filter(|entity| query.filter().map_or(true, |expr| evaluate(*entity, expr)))
            .cloned()
            .collect();

        if let Some(sort) = query.sort() {
            found.sort_by(|a, b| {
                let ordering = a
                    .field(&sort.field)
                    .partial_cmp(&b.field(&sort.field))
                    .unwrap_or(Ordering::Equal);
                match sort.order {
                    SortOrder::Asc => ordering,
                    SortOrder::Desc => ordering.reverse(),
                }
            });
        }

        Ok(match query.pagination() {
            Some(pagination) => pagination.apply(found),
            None => found,
        })
    }

    fn find_by_id(&self, id: i64) -> RepositoryResult<Option<E>> {
        let store = self.store.read().unwrap_or_else(PoisonError::into_inner);
        Ok(store.entities.get(&id).cloned())
    }

    fn begin_transaction(&self) -> RepositoryResult<MemoryTransaction<E>> {
        self.diagnostics().stats.begun += 1;
        Ok(MemoryTransaction {
            store: Arc::clone(&self.store),
            diagnostics: Arc::clone(&self.diagnostics),
            writes: BTreeMap::new(),
        })
    }

    fn insert(&self, tx: &mut MemoryTransaction<E>, mut entity: E) -> RepositoryResult<E> {
        self.injected_failure(RepositoryOperation::Insert)?;

        let id = if entity.id() > 0 {
            entity.id()
        } else {
            let mut store = self.write();
            let id = store.next_id;
            store.next_id += 1;
            entity.set_id(id);
            id
        };

        if tx.visible(id) {
            return Err(RepositoryError::already_exists("entity", id.to_string()));
        }

        let staged = match tx.writes.remove(&id) {
            // Re-creating an id deleted earlier in this transaction
            Some(Staged::Delete) => Staged::Update(entity.clone()),
            _ => Staged::Insert(entity.clone()),
        };
        tx.writes.insert(id, staged);
        Ok(entity)
    }

    fn update(&self, tx: &mut MemoryTransaction<E>, entity: E) -> RepositoryResult<E> {
        self.injected_failure(RepositoryOperation::Update)?;

        let id = entity.id();
        if !tx.visible(id) {
            return Err(RepositoryError::not_found("entity", id.to_string()));
        }

        let staged = match tx.writes.remove(&id) {
            Some(Staged::Insert(_)) => Staged::Insert(entity.clone()),
            _ => Staged::Update(entity.clone()),
        };
        tx.writes.insert(id, staged);
        Ok(entity)
    }

    fn delete_by_id(&self, tx: &mut MemoryTransaction<E>, id: i64) -> RepositoryResult<bool> {
        self.injected_failure(RepositoryOperation::Delete)?;
        if std::mem::take(&mut self.diagnostics().faults.refuse_delete) {
            return Ok(false);
        }
        if !tx.visible(id) {
            return Ok(false);
        }

        if !matches!(tx.writes.remove(&id), Some(Staged::Insert(_))) {
            tx.writes.insert(id, Staged::Delete);
        }
        Ok(true)
    }
}

/// Transaction handle of an [`InMemoryRepository`]
///
/// Writes are staged here and reach the shared store only on commit.
#[derive(Debug)]
pub struct MemoryTransaction<E> {
    store: Arc<RwLock<Store<E>>>,
    diagnostics: Arc<Mutex<Diagnostics>>,
    writes: BTreeMap<i64, Staged<E>>,
}

impl<E: Identified> MemoryTransaction<E> {
    fn diagnostics(&self) -> std::sync::MutexGuard<'_, Diagnostics> {
        self.diagnostics.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether `id` exists as seen from inside this transaction
    fn visible(&self, id: i64) -> bool {
        match self.writes.get(&id) {
            Some(Staged::Insert(_) | Staged::Update(_)) => true,
            Some(Staged::Delete) => false,
            None => self
                .store
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .entities
                .contains_key(&id),
        }
    }
}

impl<E: Identified> Transaction for MemoryTransaction<E> {
    fn commit(&mut self) -> RepositoryResult<()> {
        if let Some(message) = self.diagnostics().faults.commit.take() {
            return Err(RepositoryError::transaction_failed(
                RepositoryOperation::Commit,
                message,
            ));
        }

        let mut store = self.store.write().unwrap_or_else(PoisonError::into_inner);

        // Check the whole write set before applying any of it
        for (id, staged) in &self.writes {
            let present = store.entities.contains_key(id);
            let conflict = match staged {
                Staged::Insert(_) => present,
                Staged::Update(_) => !present,
                Staged::Delete => false,
            };
            if conflict {
                return Err(RepositoryError::transaction_failed(
                    RepositoryOperation::Commit,
                    format!("id {id} was changed by a concurrent transaction"),
                ));
            }
        }

        for (id, staged) in std::mem::take(&mut self.writes) {
            match staged {
                Staged::Insert(entity) | Staged::Update(entity) => {
                    store.next_id = store.next_id.max(id + 1);
                    store.entities.insert(id, entity);
                }
                Staged::Delete => {
                    store.entities.remove(&id);
                }
            }
        }
        drop(store);

        self.diagnostics().stats.committed += 1;
        Ok(())
    }

    fn rollback(&mut self) -> RepositoryResult<()> {
        self.writes.clear();
        self.diagnostics().stats.rolled_back += 1;
        Ok(())
    }

    fn end(&mut self) -> RepositoryResult<()> {
        self.diagnostics().stats.ended += 1;
        Ok(())
    }
}

/// Evaluate a typed filter expression against one entity
pub fn evaluate<E: Identified>(entity: &E, expression: &FilterExpression<FilterValue>) -> bool {
    match expression {
        FilterExpression::Comparison(comparison) => compare(entity, comparison),
        FilterExpression::Conjunction(children) => {
            children.iter().all(|child| evaluate(entity, child))
        }
    }
}

fn compare<E: Identified>(entity: &E, comparison: &Comparison<FilterValue>) -> bool {
    let Some(actual) = entity.field(&comparison.field) else {
        return false;
    };
    let expected = &comparison.value;

    match comparison.operator {
        FilterOperator::Eq => actual == *expected,
        FilterOperator::Ne => actual != *expected,
        FilterOperator::Gt => actual.partial_cmp(expected) == Some(Ordering::Greater),
        FilterOperator::Gte => matches!(
            actual.partial_cmp(expected),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        FilterOperator::Lt => actual.partial_cmp(expected) == Some(Ordering::Less),
        FilterOperator::Lte => matches!(
            actual.partial_cmp(expected),
            Some(Ordering::Less | Ordering::Equal)
        ),
        FilterOperator::Like => match (&actual, expected) {
            (FilterValue::Text(value), FilterValue::Text(pattern)) => like(value, pattern),
            _ => false,
        },
        FilterOperator::In => match expected {
            FilterValue::List(items) => items.contains(&actual),
            _ => false,
        },
    }
}

/// SQL `LIKE` matching: `%` is any run of characters, `_` exactly one
pub fn like(value: &str, pattern: &str) -> bool {
    let value: Vec<char> = value.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();

    let (mut v, mut p) = (0, 0);
    // Last `%` seen and the value position it is currently matched up to
    let mut backtrack: Option<(usize, usize)> = None;

    while v < value.len() {
        match pattern.get(p) {
            Some('%') => {
                backtrack = Some((p, v));
                p += 1;
            }
            Some(&c) if c == '_' || c == value[v] => {
                v += 1;
                p += 1;
            }
            _ => match backtrack {
                Some((star, matched)) => {
                    backtrack = Some((star, matched + 1));
                    p = star + 1;
                    v = matched + 1;
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|c| *c == '%')
}
