//! Association reconciliation.
//!
//! Given the stored links of a parent and the desired links, compute the
//! minimal set of removals and additions and apply them through a
//! [`LinkWriter`]. Links are compared by key for identity and by whole value
//! for staleness: a stored link whose key is still desired but whose other
//! fields differ is removed and the desired value added. There is no
//! update-in-place.
//!
//! Reconciliation is not atomic on its own. Callers run it inside a
//! transaction scope so a failed write rolls back the earlier ones.

use std::collections::HashMap;
use std::hash::Hash;

use async_trait::async_trait;
use tracing::debug;

use super::Error;

/// Side-effecting sink for link writes.
///
/// Implementations issue single-row deletes and inserts. They are only ever
/// asked to remove links that exist and add links whose key is absent, so a
/// composite primary key on the store side never fires during a well-formed
/// reconciliation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkWriter<L: Send + Sync + 'static>: Send {
    /// Delete one stored link.
    async fn remove(&mut self, link: &L) -> Result<(), Error>;

    /// Insert one desired link.
    async fn add(&mut self, link: &L) -> Result<(), Error>;
}

/// Writes needed to turn the stored set into the desired set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkChanges<L> {
    /// Stored links to delete, in stored order.
    pub removals: Vec<L>,
    /// Desired links to insert, in desired order.
    pub additions: Vec<L>,
}

impl<L> LinkChanges<L> {
    /// True when the stored set already matches.
    pub fn is_empty(&self) -> bool {
        self.removals.is_empty() && self.additions.is_empty()
    }
}

/// Counts of writes performed by [`reconcile_links`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    /// Links deleted.
    pub removed: usize,
    /// Links inserted.
    pub added: usize,
}

/// Compute the removals and additions turning `current` into `desired`.
///
/// When `desired` repeats a key, its last occurrence wins.
pub fn diff_links<L, K, F>(current: &[L], desired: &[L], key: F) -> LinkChanges<L>
where
    L: Clone + PartialEq,
    K: Eq + Hash,
    F: Fn(&L) -> K,
{
    let mut desired_by_key: HashMap<K, (usize, &L)> = HashMap::with_capacity(desired.len());
    for (index, link) in desired.iter().enumerate() {
        desired_by_key.insert(key(link), (index, link));
    }
    let current_by_key: HashMap<K, &L> = current.iter().map(|link| (key(link), link)).collect();

    let removals = current
        .iter()
        .filter(|stored| match desired_by_key.get(&key(*stored)) {
            Some((_, wanted)) => *wanted != *stored,
            None => true,
        })
        .cloned()
        .collect();

    let additions = desired
        .iter()
        .enumerate()
        .filter(|(index, wanted)| {
            let link_key = key(*wanted);
            let is_last = desired_by_key
                .get(&link_key)
                .is_some_and(|(last, _)| last == index);
            is_last
                && current_by_key
                    .get(&link_key)
                    .is_none_or(|stored| *stored != *wanted)
        })
        .map(|(_, wanted)| wanted.clone())
        .collect();

    LinkChanges {
        removals,
        additions,
    }
}

/// Reconcile stored links with desired links through `writer`.
///
/// Removals run before additions so a changed link's old row is gone before
/// its replacement is inserted. The first failing write stops the run and its
/// error is returned unchanged.
///
/// # Errors
///
/// Propagates the first error returned by `writer`.
pub async fn reconcile_links<L, K, F, W>(
    current: &[L],
    desired: &[L],
    key: F,
    writer: &mut W,
) -> Result<ReconcileSummary, Error>
where
    L: Clone + PartialEq + Send + Sync + 'static,
    K: Eq + Hash,
    F: Fn(&L) -> K,
    W: LinkWriter<L> + ?Sized,
{
    let changes = diff_links(current, desired, key);
    let mut summary = ReconcileSummary::default();
    for link in &changes.removals {
        writer.remove(link).await?;
        summary.removed += 1;
    }
    for link in &changes.additions {
        writer.add(link).await?;
        summary.added += 1;
    }
    debug!(removed = summary.removed, added = summary.added, "links reconciled");
    Ok(summary)
}
