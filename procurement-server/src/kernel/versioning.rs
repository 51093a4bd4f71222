//! Optimistic versioning with history snapshots, shared by tenders and bids.
//!
//! Every live entity carries a version. An edit first stores the current state as a history row
//! tagged with the current version, then writes the new state with `version + 1`, but only if the
//! live row still has the version that was read. A rollback restores the fields of a history row.

use {
    crate::api::RestError,
    axum::async_trait,
    std::fmt::Debug,
};

pub use crate::kernel::entities::Version;

/// What a rollback does with the history that follows the restored snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RollbackPolicy {
    /// The state before the rollback is snapshotted and the restored state gets a new version.
    /// Versions only ever increase.
    AppendHistory,
    /// The restored state takes the version of the snapshot and every later snapshot is deleted.
    TruncateHistory,
}

pub trait Versioned: Clone + Debug + Send + Sync + 'static {
    type Id: Copy + Debug + Send + Sync + 'static;
    type Changes: Send + 'static;

    const ROLLBACK_POLICY: RollbackPolicy;

    fn id(&self) -> Self::Id;
    fn version(&self) -> Version;
    fn set_version(&mut self, version: Version);
    fn apply_changes(&mut self, changes: Self::Changes);
    /// The error returned when the live entity does not exist.
    fn not_found() -> RestError;
}

/// Storage of the live rows and history rows of one versioned entity.
#[async_trait]
pub trait VersionedTable<E: Versioned>: Send {
    async fn get_live(&mut self, id: E::Id) -> Result<Option<E>, RestError>;
    /// Stores a snapshot keyed by `(id, version)`, replacing an existing snapshot with the same key.
    async fn add_history(&mut self, snapshot: &E) -> Result<(), RestError>;
    async fn get_history(&mut self, id: E::Id, version: Version) -> Result<Option<E>, RestError>;
    /// Writes every field of `entity` to the live row if its version is still `expected_version`.
    /// Returns false when no row matched.
    async fn update_if_version(
        &mut self,
        entity: &E,
        expected_version: Version,
    ) -> Result<bool, RestError>;
    /// Deletes the snapshots with a version greater than `version` and returns how many were removed.
    async fn remove_history_after(&mut self, id: E::Id, version: Version)
        -> Result<u64, RestError>;
}

pub async fn edit<E, T>(table: &mut T, id: E::Id, changes: E::Changes) -> Result<E, RestError>
where
    E: Versioned,
    T: VersionedTable<E> + ?Sized,
{
    let current = table.get_live(id).await?.ok_or_else(E::not_found)?;
    table.add_history(&current).await?;

    let mut updated = current.clone();
    updated.apply_changes(changes);
    updated.set_version(current.version() + 1);
    if !table.update_if_version(&updated, current.version()).await? {
        tracing::info!(id = ?id, version = current.version(), "Concurrent edit detected");
        return Err(RestError::VersionConflict);
    }
    Ok(updated)
}

pub async fn rollback<E, T>(table: &mut T, id: E::Id, version: Version) -> Result<E, RestError>
where
    E: Versioned,
    T: VersionedTable<E> + ?Sized,
{
    let snapshot = table
        .get_history(id, version)
        .await?
        .ok_or(RestError::VersionNotFound { version })?;
    let current = table.get_live(id).await?.ok_or_else(E::not_found)?;

    let mut restored = snapshot;
    match E::ROLLBACK_POLICY {
        RollbackPolicy::AppendHistory => {
            table.add_history(&current).await?;
            restored.set_version(current.version() + 1);
            if !table.update_if_version(&restored, current.version()).await? {
                return Err(RestError::VersionConflict);
            }
        }
        RollbackPolicy::TruncateHistory => {
            restored.set_version(version);
            if !table.update_if_version(&restored, current.version()).await? {
                return Err(RestError::VersionConflict);
            }
            let removed = table.remove_history_after(id, version).await?;
            tracing::debug!(id = ?id, version, removed, "Pruned history after rollback");
        }
    }
    Ok(restored)
}
