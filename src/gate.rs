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

//! Book availability gate.
//!
//! The only writer of [`Book::is_borrowed`]. Guarantees at most one open loan
//! per book:
//!
//! ```text
//!  available ──try_borrow──► borrowed ──release──► available
//!                               │
//!                               └──try_borrow──► AlreadyLoaned (no change)
//! ```

use crate::LibraryError;
use crate::base::BookId;
use crate::book::Book;
use crate::store::Store;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct AvailabilityGate {
    store: Arc<Store>,
}

impl AvailabilityGate {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Flips the book from available to borrowed and returns the new snapshot.
    ///
    /// The check and the write happen under the book's entry lock, so
    /// concurrent callers for the same book see exactly one success.
    ///
    /// # Errors
    ///
    /// - [`LibraryError::BookNotFound`] - Book is absent or soft-deleted.
    /// - [`LibraryError::AlreadyLoaned`] - Book is already borrowed; nothing changes.
    pub fn try_borrow(&self, book_id: BookId) -> Result<Book, LibraryError> {
        let result = self
            .store
            .books()
            .modify(&book_id, |book| {
                if book.is_deleted {
                    return Err(LibraryError::BookNotFound(book_id));
                }
                if book.is_borrowed {
                    return Err(LibraryError::AlreadyLoaned);
                }
                book.is_borrowed = true;
                Ok(book.clone())
            })
            .ok_or(LibraryError::BookNotFound(book_id))?;

        match &result {
            Ok(_) => debug!(%book_id, "book borrowed"),
            Err(e) => debug!(%book_id, error = %e, "borrow rejected"),
        }
        result
    }

    /// Marks the book available.
    ///
    /// Unconditional: callers guarantee a loan is only closed once. Works on
    /// soft-deleted books so loans on withdrawn titles can still be returned.
    ///
    /// # Errors
    ///
    /// - [`LibraryError::BookNotFound`] - Book is absent.
    pub fn release(&self, book_id: BookId) -> Result<Book, LibraryError> {
        let book = self
            .store
            .books()
            .modify(&book_id, |book| {
                if !book.is_borrowed {
                    warn!(%book_id, "releasing a book that was not marked borrowed");
                }
                book.is_borrowed = false;
                book.clone()
            })
            .ok_or(LibraryError::BookNotFound(book_id))?;

        debug!(%book_id, "book released");
        Ok(book)
    }

    /// Fails with [`LibraryError::BookNotFound`] unless a live book exists.
    pub fn ensure_exists(&self, book_id: BookId) -> Result<(), LibraryError> {
        match self.store.books().get(&book_id) {
            Some(book) if !book.is_deleted => Ok(()),
            _ => Err(LibraryError::BookNotFound(book_id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::NewBook;

    fn gate_with_book() -> (AvailabilityGate, Arc<Store>, BookId) {
        let store = Arc::new(Store::new());
        let book = NewBook::new("Dune", "F. Herbert", "Sci-Fi").into_book();
        let id = book.id;
        store.books().save(id, book);
        (AvailabilityGate::new(Arc::clone(&store)), store, id)
    }

    #[test]
    fn borrow_marks_book_borrowed() {
        let (gate, store, id) = gate_with_book();
        let book = gate.try_borrow(id).unwrap();
        assert!(book.is_borrowed);
        assert!(store.books().get(&id).unwrap().is_borrowed);
    }

    #[test]
    fn second_borrow_is_rejected() {
        let (gate, store, id) = gate_with_book();
        gate.try_borrow(id).unwrap();
        assert_eq!(gate.try_borrow(id), Err(LibraryError::AlreadyLoaned));
        assert!(store.books().get(&id).unwrap().is_borrowed);
    }

    #[test]
    fn unknown_book_is_not_found() {
        let (gate, _, _) = gate_with_book();
        let missing = BookId::new();
        assert_eq!(gate.try_borrow(missing), Err(LibraryError::BookNotFound(missing)));
        assert_eq!(gate.release(missing), Err(LibraryError::BookNotFound(missing)));
    }

    #[test]
    fn deleted_book_cannot_be_borrowed_but_can_be_released() {
        let (gate, store, id) = gate_with_book();
        gate.try_borrow(id).unwrap();
        store.books().modify(&id, |book| book.is_deleted = true);

        let book = gate.release(id).unwrap();
        assert!(!book.is_borrowed);
        assert_eq!(gate.try_borrow(id), Err(LibraryError::BookNotFound(id)));
    }

    #[test]
    fn release_then_borrow_again() {
        let (gate, _, id) = gate_with_book();
        gate.try_borrow(id).unwrap();
        gate.release(id).unwrap();
        assert!(gate.try_borrow(id).is_ok());
    }
}
