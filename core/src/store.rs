//! In-memory, ordered list of one resource type.
//!
//! # Design
//! The store is plain data with explicit entry points; it never talks to
//! the network. Every change bumps `revision`, so a view can poll it to know
//! when to re-render instead of sharing mutable state with the controller.

use crate::resource::Resource;

/// Where the list is in its load lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    /// Created, nothing fetched yet.
    #[default]
    Empty,
    Loading,
    Ready,
    /// The last load failed; the items from before it are kept.
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct ResourceStore<R: Resource> {
    items: Vec<R>,
    revision: u64,
    load_state: LoadState,
}

impl<R: Resource> Default for ResourceStore<R> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            revision: 0,
            load_state: LoadState::Empty,
        }
    }
}

impl<R: Resource> ResourceStore<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[R] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Monotonic change counter.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    pub fn get(&self, id: &R::Id) -> Option<&R> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn contains(&self, id: &R::Id) -> bool {
        self.get(id).is_some()
    }

    pub fn filter<'a>(
        &'a self,
        mut keep: impl FnMut(&R) -> bool + 'a,
    ) -> impl Iterator<Item = &'a R> + 'a {
        self.items.iter().filter(move |item| keep(*item))
    }

    /// Copy of the current list, for restoring after a failed mutation.
    pub fn snapshot(&self) -> Vec<R> {
        self.items.clone()
    }

    pub fn set_load_state(&mut self, state: LoadState) {
        if self.load_state != state {
            self.load_state = state;
            self.revision += 1;
        }
    }

    /// Replace the whole list with what the server returned.
    pub fn replace_all(&mut self, items: Vec<R>) {
        self.items = items;
        self.load_state = LoadState::Ready;
        self.revision += 1;
    }

    pub fn prepend(&mut self, item: R) {
        self.items.insert(0, item);
        self.revision += 1;
    }

    /// Replace the entry with the same id, keeping its position.
    /// Returns `false` when no entry matched.
    pub fn replace(&mut self, item: R) -> bool {
        let Some(slot) = self.items.iter_mut().find(|existing| existing.id() == item.id()) else {
            return false;
        };
        *slot = item;
        self.revision += 1;
        true
    }

    pub fn remove(&mut self, id: &R::Id) -> Option<R> {
        let index = self.items.iter().position(|item| item.id() == id)?;
        self.revision += 1;
        Some(self.items.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use uuid::Uuid;

    use super::*;
    use crate::types::{Attendance, AttendanceStatus};

    fn record(id: u64) -> Attendance {
        Attendance {
            id,
            employee: Uuid::nil(),
            employee_name: format!("Employee {id}"),
            date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            status: AttendanceStatus::Present,
        }
    }

    fn ids(store: &ResourceStore<Attendance>) -> Vec<u64> {
        store.items().iter().map(|r| r.id).collect()
    }

    #[test]
    fn new_store_is_empty() {
        let store = ResourceStore::<Attendance>::new();
        assert!(store.is_empty());
        assert_eq!(store.load_state(), &LoadState::Empty);
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn replace_all_marks_ready() {
        let mut store = ResourceStore::new();
        store.replace_all(vec![record(1), record(2)]);
        assert_eq!(ids(&store), vec![1, 2]);
        assert_eq!(store.load_state(), &LoadState::Ready);
    }

    #[test]
    fn prepend_puts_item_first() {
        let mut store = ResourceStore::new();
        store.replace_all(vec![record(1), record(2)]);
        store.prepend(record(3));
        assert_eq!(ids(&store), vec![3, 1, 2]);
    }

    #[test]
    fn replace_keeps_position() {
        let mut store = ResourceStore::new();
        store.replace_all(vec![record(1), record(2), record(3)]);
        let mut changed = record(2);
        changed.status = AttendanceStatus::Absent;

        assert!(store.replace(changed));
        assert_eq!(ids(&store), vec![1, 2, 3]);
        assert_eq!(store.get(&2).unwrap().status, AttendanceStatus::Absent);
        assert_eq!(store.get(&1).unwrap(), &record(1));
    }

    #[test]
    fn replace_unknown_id_is_a_no_op() {
        let mut store = ResourceStore::new();
        store.replace_all(vec![record(1)]);
        let before = store.revision();
        assert!(!store.replace(record(9)));
        assert_eq!(store.revision(), before);
    }

    #[test]
    fn remove_returns_the_removed_item() {
        let mut store = ResourceStore::new();
        store.replace_all(vec![record(1), record(2)]);
        assert_eq!(store.remove(&1), Some(record(1)));
        assert_eq!(store.remove(&1), None);
        assert_eq!(ids(&store), vec![2]);
    }

    #[test]
    fn every_change_bumps_revision() {
        let mut store = ResourceStore::new();
        store.replace_all(vec![record(1)]);
        store.prepend(record(2));
        store.remove(&1);
        assert_eq!(store.revision(), 3);
    }

    #[test]
    fn filter_yields_matching_items_in_order() {
        let mut store = ResourceStore::new();
        store.replace_all(vec![record(1), record(2), record(3)]);
        let odd: Vec<u64> = store.filter(|r| r.id % 2 == 1).map(|r| r.id).collect();
        assert_eq!(odd, vec![1, 3]);
    }
}
