use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use farmops_assets::Asset;
use farmops_core::{Entity, ExpectedVersion};
use farmops_finance::{FinancialTransaction, Transaction};
use farmops_inventory::{Product, ProductVariant};
use farmops_livestock::{Activity, Batch, BatchActivity, BroilerBatch};
use farmops_parties::{Person, Vendor};

use super::{Repository, StoreError, StoreResult, Tracking, UnitOfWork, UnitOfWorkFactory};

/// Committed rows of one aggregate type, with a version per row.
struct Table<E: Entity> {
    rows: HashMap<E::Id, (u64, E)>,
    order: Vec<E::Id>,
}

impl<E: Entity> Default for Table<E> {
    fn default() -> Self {
        Self {
            rows: HashMap::new(),
            order: Vec::new(),
        }
    }
}

impl<E: Entity> Table<E> {
    fn insert(&mut self, entity: E) {
        let id = entity.id().clone();
        self.order.push(id.clone());
        self.rows.insert(id, (1, entity));
    }

    fn replace(&mut self, entity: E) {
        if let Some(row) = self.rows.get_mut(entity.id()) {
            row.0 += 1;
            row.1 = entity;
        }
    }

    fn iter(&self) -> impl Iterator<Item = &E> {
        self.order
            .iter()
            .filter_map(|id| self.rows.get(id).map(|(_, entity)| entity))
    }
}

#[derive(Default)]
struct Tables {
    by_type: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl Tables {
    fn table<E: Entity>(&self) -> Option<&Table<E>> {
        self.by_type
            .get(&TypeId::of::<E>())
            .and_then(|table| table.downcast_ref::<Table<E>>())
    }

    fn table_mut<E: Entity>(&mut self) -> &mut Table<E> {
        self.by_type
            .entry(TypeId::of::<E>())
            .or_insert_with(|| Box::new(Table::<E>::default()))
            .downcast_mut::<Table<E>>()
            .expect("tables are keyed by their entity type")
    }
}

/// Shared in-memory store. Units of work opened on it stage their writes and
/// commit them under the write lock.
#[derive(Default)]
pub struct InMemoryDatabase {
    tables: RwLock<Tables>,
    commits: AtomicU64,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `save_changes` calls that wrote at least one row.
    pub fn commit_count(&self) -> u64 {
        self.commits.load(Ordering::SeqCst)
    }

    /// Committed state of one row, bypassing any unit of work.
    pub fn find<E: Entity>(&self, id: &E::Id) -> Option<E> {
        let tables = self.tables.read().ok()?;
        tables
            .table::<E>()
            .and_then(|table| table.rows.get(id))
            .map(|(_, entity)| entity.clone())
    }

    pub fn count<E: Entity>(&self) -> usize {
        match self.tables.read() {
            Ok(tables) => tables.table::<E>().map_or(0, |table| table.rows.len()),
            Err(_) => 0,
        }
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| StoreError::Backend("table lock poisoned".to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| StoreError::Backend("table lock poisoned".to_string()))
    }
}

impl UnitOfWorkFactory for Arc<InMemoryDatabase> {
    fn begin(&self, cancel: CancellationToken) -> Box<dyn UnitOfWork> {
        Box::new(InMemoryUnitOfWork::new(Arc::clone(self), cancel))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteKind {
    Create,
    Update,
}

struct StagedWrite<E: Entity> {
    kind: WriteKind,
    entity: E,
    expected: ExpectedVersion,
}

/// Type-erased staged write, checked and applied at commit.
trait Pending: Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn check(&self, tables: &Tables) -> StoreResult<()>;
    fn apply(self: Box<Self>, tables: &mut Tables);
}

impl<E: Entity> Pending for StagedWrite<E> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn check(&self, tables: &Tables) -> StoreResult<()> {
        let id = self.entity.id();
        let row = tables.table::<E>().and_then(|table| table.rows.get(id));
        match (self.kind, row) {
            (WriteKind::Create, None) => Ok(()),
            (WriteKind::Create, Some(_)) => Err(StoreError::AlreadyExists {
                kind: E::KIND,
                id: id.to_string(),
            }),
            (WriteKind::Update, None) => Err(StoreError::NotFound {
                kind: E::KIND,
                id: id.to_string(),
            }),
            (WriteKind::Update, Some((actual, _))) => match self.expected.violated_by(*actual) {
                Some(expected) => Err(StoreError::Conflict {
                    kind: E::KIND,
                    id: id.to_string(),
                    expected,
                    actual: *actual,
                }),
                None => Ok(()),
            },
        }
    }

    fn apply(self: Box<Self>, tables: &mut Tables) {
        let StagedWrite { kind, entity, .. } = *self;
        let table = tables.table_mut::<E>();
        match kind {
            WriteKind::Create => table.insert(entity),
            WriteKind::Update => table.replace(entity),
        }
    }
}

fn staged_for<'a, E: Entity>(
    staged: &'a [Box<dyn Pending>],
    id: &E::Id,
) -> Option<&'a StagedWrite<E>> {
    staged
        .iter()
        .filter_map(|write| write.as_any().downcast_ref::<StagedWrite<E>>())
        .find(|write| write.entity.id() == id)
}

fn tracking_key<E: Entity>(id: &E::Id) -> (TypeId, String) {
    (TypeId::of::<E>(), id.to_string())
}

/// Request-scoped unit of work over an `InMemoryDatabase`.
///
/// Each id has at most one staged write: updating a row this unit of work
/// already staged replaces the staged entity in place.
pub struct InMemoryUnitOfWork {
    db: Arc<InMemoryDatabase>,
    cancel: CancellationToken,
    staged: Mutex<Vec<Box<dyn Pending>>>,
    tracked: Mutex<HashMap<(TypeId, String), u64>>,
}

impl InMemoryUnitOfWork {
    pub fn new(db: Arc<InMemoryDatabase>, cancel: CancellationToken) -> Self {
        Self {
            db,
            cancel,
            staged: Mutex::new(Vec::new()),
            tracked: Mutex::new(HashMap::new()),
        }
    }

    /// Writes staged but not yet committed.
    pub fn pending_writes(&self) -> usize {
        self.staged.lock().map_or(0, |staged| staged.len())
    }

    fn ensure_live(&self) -> StoreResult<()> {
        if self.cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        Ok(())
    }

    fn staged(&self) -> StoreResult<MutexGuard<'_, Vec<Box<dyn Pending>>>> {
        self.staged
            .lock()
            .map_err(|_| StoreError::Backend("staging area poisoned".to_string()))
    }

    fn tracked(&self) -> StoreResult<MutexGuard<'_, HashMap<(TypeId, String), u64>>> {
        self.tracked
            .lock()
            .map_err(|_| StoreError::Backend("tracking map poisoned".to_string()))
    }
}

#[async_trait]
impl<E: Entity> Repository<E> for InMemoryUnitOfWork {
    async fn get_by_id(&self, id: &E::Id, tracking: Tracking) -> StoreResult<Option<E>> {
        self.ensure_live()?;

        if let Some(write) = staged_for::<E>(&self.staged()?, id) {
            return Ok(Some(write.entity.clone()));
        }

        let tables = self.db.read()?;
        let Some((version, entity)) = tables.table::<E>().and_then(|table| table.rows.get(id)) else {
            return Ok(None);
        };
        if tracking == Tracking::Tracked {
            self.tracked()?.insert(tracking_key::<E>(id), *version);
        }
        Ok(Some(entity.clone()))
    }

    async fn get_all(&self) -> StoreResult<Vec<E>> {
        self.ensure_live()?;

        let staged = self.staged()?;
        let writes: Vec<&StagedWrite<E>> = staged
            .iter()
            .filter_map(|write| write.as_any().downcast_ref::<StagedWrite<E>>())
            .collect();

        let tables = self.db.read()?;
        let mut all: Vec<E> = match tables.table::<E>() {
            Some(table) => table
                .iter()
                .map(|committed| {
                    writes
                        .iter()
                        .find(|write| write.entity.id() == committed.id())
                        .map_or_else(|| committed.clone(), |write| write.entity.clone())
                })
                .collect(),
            None => Vec::new(),
        };
        all.extend(
            writes
                .iter()
                .filter(|write| write.kind == WriteKind::Create)
                .map(|write| write.entity.clone()),
        );
        Ok(all)
    }

    async fn create(&self, entity: E) -> StoreResult<()> {
        self.ensure_live()?;

        let mut staged = self.staged()?;
        if staged_for::<E>(&staged, entity.id()).is_some() {
            return Err(StoreError::AlreadyExists {
                kind: E::KIND,
                id: entity.id().to_string(),
            });
        }
        staged.push(Box::new(StagedWrite {
            kind: WriteKind::Create,
            entity,
            expected: ExpectedVersion::Any,
        }));
        Ok(())
    }

    async fn update(&self, entity: E) -> StoreResult<()> {
        self.ensure_live()?;

        let expected = self
            .tracked()?
            .get(&tracking_key::<E>(entity.id()))
            .copied()
            .map_or(ExpectedVersion::Any, ExpectedVersion::Exact);

        let mut staged = self.staged()?;
        if let Some(existing) = staged
            .iter_mut()
            .filter_map(|write| write.as_any_mut().downcast_mut::<StagedWrite<E>>())
            .find(|write| write.entity.id() == entity.id())
        {
            existing.entity = entity;
            return Ok(());
        }
        staged.push(Box::new(StagedWrite {
            kind: WriteKind::Update,
            entity,
            expected,
        }));
        Ok(())
    }
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    fn batches(&self) -> &dyn Repository<Batch> {
        self
    }

    fn batch_activities(&self) -> &dyn Repository<BatchActivity> {
        self
    }

    fn broiler_batches(&self) -> &dyn Repository<BroilerBatch> {
        self
    }

    fn activities(&self) -> &dyn Repository<Activity> {
        self
    }

    fn transactions(&self) -> &dyn Repository<Transaction> {
        self
    }

    fn financial_transactions(&self) -> &dyn Repository<FinancialTransaction> {
        self
    }

    fn products(&self) -> &dyn Repository<Product> {
        self
    }

    fn product_variants(&self) -> &dyn Repository<ProductVariant> {
        self
    }

    fn vendors(&self) -> &dyn Repository<Vendor> {
        self
    }

    fn persons(&self) -> &dyn Repository<Person> {
        self
    }

    fn assets(&self) -> &dyn Repository<Asset> {
        self
    }

    async fn save_changes(&self) -> StoreResult<usize> {
        self.ensure_live()?;

        let mut staged = self.staged()?;
        if staged.is_empty() {
            return Ok(0);
        }

        let mut tables = self.db.write()?;
        for write in staged.iter() {
            write.check(&tables)?;
        }

        let written = staged.len();
        for write in staged.drain(..) {
            write.apply(&mut tables);
        }
        drop(tables);

        self.db.commits.fetch_add(1, Ordering::SeqCst);
        self.tracked()?.clear();
        debug!(rows = written, "unit of work committed");
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use farmops_core::PersonId;
    use farmops_parties::ContactInfo;

    use super::*;
    use crate::store::Stored;

    fn person(n: u128, name: &str) -> Person {
        Person::new(PersonId::from(Uuid::from_u128(n)), name, ContactInfo::default(), None)
    }

    fn open(db: &Arc<InMemoryDatabase>) -> Box<dyn UnitOfWork> {
        db.begin(CancellationToken::new())
    }

    async fn seed(db: &Arc<InMemoryDatabase>, people: &[Person]) {
        let uow = open(db);
        for p in people {
            uow.persons().create(p.clone()).await.unwrap();
        }
        uow.save_changes().await.unwrap();
    }

    #[tokio::test]
    async fn staged_writes_are_private_until_saved() {
        let db = Arc::new(InMemoryDatabase::new());
        let writer = open(&db);
        let reader = open(&db);
        let alice = person(1, "Alice");

        writer.persons().create(alice.clone()).await.unwrap();

        assert_eq!(writer.persons().get_by_id(alice.id(), Tracking::NoTracking).await.unwrap(), Some(alice.clone()));
        assert_eq!(reader.persons().get_by_id(alice.id(), Tracking::NoTracking).await.unwrap(), None);
        assert_eq!(db.count::<Person>(), 0);

        assert_eq!(writer.save_changes().await.unwrap(), 1);
        assert_eq!(db.find::<Person>(alice.id()), Some(alice));
        assert_eq!(db.commit_count(), 1);
    }

    #[tokio::test]
    async fn get_all_overlays_staged_writes_in_insertion_order() {
        let db = Arc::new(InMemoryDatabase::new());
        seed(&db, &[person(1, "Alice"), person(2, "Bob")]).await;

        let uow = open(&db);
        let mut bob = person(2, "Bob");
        bob.rename("Robert");
        uow.persons().update(bob).await.unwrap();
        uow.persons().create(person(3, "Carol")).await.unwrap();

        let names: Vec<String> = Person::repository(uow.as_ref())
            .get_all()
            .await
            .unwrap()
            .iter()
            .map(|p| p.name().to_string())
            .collect();
        assert_eq!(names, ["Alice", "Robert", "Carol"]);
    }

    #[tokio::test]
    async fn second_tracked_update_conflicts() {
        let db = Arc::new(InMemoryDatabase::new());
        let alice = person(1, "Alice");
        seed(&db, &[alice.clone()]).await;

        let first = open(&db);
        let second = open(&db);
        let mut a = first.persons().get_by_id(alice.id(), Tracking::Tracked).await.unwrap().unwrap();
        let mut b = second.persons().get_by_id(alice.id(), Tracking::Tracked).await.unwrap().unwrap();
        a.rename("Alicia");
        b.rename("Ally");
        first.persons().update(a).await.unwrap();
        second.persons().update(b).await.unwrap();

        first.save_changes().await.unwrap();
        let err = second.save_changes().await.unwrap_err();

        assert!(matches!(err, StoreError::Conflict { expected: 1, actual: 2, .. }));
        assert_eq!(db.find::<Person>(alice.id()).unwrap().name(), "Alicia");
    }

    #[tokio::test]
    async fn untracked_update_is_last_writer_wins() {
        let db = Arc::new(InMemoryDatabase::new());
        let alice = person(1, "Alice");
        seed(&db, &[alice.clone()]).await;

        let first = open(&db);
        let second = open(&db);
        let mut a = alice.clone();
        a.rename("Alicia");
        let mut b = alice.clone();
        b.rename("Ally");
        first.persons().update(a).await.unwrap();
        second.persons().update(b).await.unwrap();

        first.save_changes().await.unwrap();
        second.save_changes().await.unwrap();

        assert_eq!(db.find::<Person>(alice.id()).unwrap().name(), "Ally");
    }

    #[tokio::test]
    async fn failed_save_applies_nothing() {
        let db = Arc::new(InMemoryDatabase::new());
        seed(&db, &[person(1, "Alice")]).await;

        let uow = open(&db);
        uow.persons().create(person(2, "Bob")).await.unwrap();
        uow.persons().create(person(1, "Alice again")).await.unwrap();

        let err = uow.save_changes().await.unwrap_err();

        assert!(matches!(err, StoreError::AlreadyExists { kind: "person", .. }));
        assert_eq!(db.count::<Person>(), 1);
        assert_eq!(db.commit_count(), 1);
    }

    #[tokio::test]
    async fn update_of_missing_row_is_not_found_at_commit() {
        let db = Arc::new(InMemoryDatabase::new());
        let uow = open(&db);

        uow.persons().update(person(9, "Ghost")).await.unwrap();

        let err = uow.save_changes().await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { kind: "person", .. }));
    }

    #[tokio::test]
    async fn update_after_create_folds_into_the_create() {
        let db = Arc::new(InMemoryDatabase::new());
        let uow = InMemoryUnitOfWork::new(db.clone(), CancellationToken::new());
        let mut alice = person(1, "Alice");

        Repository::<Person>::create(&uow, alice.clone()).await.unwrap();
        alice.rename("Alicia");
        Repository::<Person>::update(&uow, alice.clone()).await.unwrap();

        assert_eq!(uow.pending_writes(), 1);
        uow.save_changes().await.unwrap();
        assert_eq!(db.find::<Person>(alice.id()).unwrap().name(), "Alicia");
    }

    #[tokio::test]
    async fn cancelled_unit_of_work_refuses_io() {
        let db = Arc::new(InMemoryDatabase::new());
        let cancel = CancellationToken::new();
        let uow = db.begin(cancel.clone());
        uow.persons().create(person(1, "Alice")).await.unwrap();

        cancel.cancel();

        assert_eq!(uow.persons().get_all().await.unwrap_err(), StoreError::Cancelled);
        assert_eq!(uow.save_changes().await.unwrap_err(), StoreError::Cancelled);
        assert_eq!(db.count::<Person>(), 0);
    }

    #[test]
    fn store_errors_map_onto_execution_faults() {
        use farmops_core::ExecutionError;

        let conflict = StoreError::Conflict {
            kind: "person",
            id: "x".into(),
            expected: 1,
            actual: 2,
        };
        assert!(matches!(ExecutionError::from(conflict), ExecutionError::Conflict(_)));
        assert_eq!(ExecutionError::from(StoreError::Cancelled), ExecutionError::Cancelled);
        assert!(matches!(
            ExecutionError::from(StoreError::Backend("down".into())),
            ExecutionError::Internal(msg) if msg == "down"
        ));
    }
}
