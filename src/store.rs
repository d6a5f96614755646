// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Thread-safe in-memory entity store.
//!
//! Each entity kind lives in a [`Table`]: a [`DashMap`] keyed by id, with a
//! per-table sequence number stamped on first insert so listings come back in
//! insertion order.
//!
//! [`Table::modify`] runs a closure while holding the entry's write lock. That
//! is the store's compare-and-swap primitive: whatever the closure reads and
//! writes is atomic with respect to every other access to the same id.

use crate::base::{BookId, LoanId, UserId};
use crate::book::Book;
use crate::loan::Loan;
use crate::page::{Page, PageRequest};
use crate::user::User;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug)]
struct Stored<V> {
    seq: u64,
    record: V,
}

/// One keyed collection of records.
#[derive(Debug)]
pub struct Table<K, V>
where
    K: Eq + Hash,
{
    rows: DashMap<K, Stored<V>>,
    next_seq: AtomicU64,
}

impl<K, V> Table<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self {
            rows: DashMap::new(),
            next_seq: AtomicU64::new(0),
        }
    }

    /// Returns a snapshot of the record, if present.
    pub fn get(&self, id: &K) -> Option<V> {
        self.rows.get(id).map(|row| row.record.clone())
    }

    pub fn contains(&self, id: &K) -> bool {
        self.rows.contains_key(id)
    }

    /// Inserts or replaces the record under `id`.
    ///
    /// A replaced record keeps its original position in listings.
    pub fn save(&self, id: K, record: V) -> V {
        match self.rows.entry(id) {
            Entry::Occupied(mut entry) => {
                entry.get_mut().record = record.clone();
            }
            Entry::Vacant(entry) => {
                let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
                entry.insert(Stored {
                    seq,
                    record: record.clone(),
                });
            }
        }
        record
    }

    /// Runs `f` against the record under its entry write lock.
    ///
    /// Returns `None` without calling `f` if `id` is absent.
    pub fn modify<R>(&self, id: &K, f: impl FnOnce(&mut V) -> R) -> Option<R> {
        self.rows.get_mut(id).map(|mut row| f(&mut row.record))
    }

    /// Lists records matching `predicate` in insertion order.
    ///
    /// `page` must already be clamped to a non-zero size.
    pub fn list(&self, predicate: impl Fn(&V) -> bool, page: PageRequest) -> Page<V> {
        let mut matches: Vec<(u64, V)> = self
            .rows
            .iter()
            .filter(|row| predicate(&row.record))
            .map(|row| (row.seq, row.record.clone()))
            .collect();
        matches.sort_unstable_by_key(|(seq, _)| *seq);

        let total = matches.len();
        let items = matches
            .into_iter()
            .skip(page.offset())
            .take(page.size)
            .map(|(_, record)| record)
            .collect();

        Page {
            items,
            page: page.page,
            size: page.size,
            total,
        }
    }

    /// Every record, deleted ones included, in insertion order.
    pub fn snapshot(&self) -> Vec<V> {
        let mut rows: Vec<(u64, V)> = self
            .rows
            .iter()
            .map(|row| (row.seq, row.record.clone()))
            .collect();
        rows.sort_unstable_by_key(|(seq, _)| *seq);
        rows.into_iter().map(|(_, record)| record).collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<K, V> Default for Table<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Storage for books, loans, and users.
#[derive(Debug, Default)]
pub struct Store {
    books: Table<BookId, Book>,
    loans: Table<LoanId, Loan>,
    users: Table<UserId, User>,
    /// Normalized email to owning user, for uniqueness.
    emails: DashMap<String, UserId>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn books(&self) -> &Table<BookId, Book> {
        &self.books
    }

    pub fn loans(&self) -> &Table<LoanId, Loan> {
        &self.loans
    }

    pub fn users(&self) -> &Table<UserId, User> {
        &self.users
    }

    /// Reserves `email` for `user_id`.
    ///
    /// Returns `false` if another user already holds it.
    pub(crate) fn claim_email(&self, email: String, user_id: UserId) -> bool {
        // Entry API keeps check-and-insert atomic.
        match self.emails.entry(email) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(user_id);
                true
            }
        }
    }
}
