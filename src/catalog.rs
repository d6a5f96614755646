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

//! Book catalog and user directory.
//!
//! Plain record management with no cross-entity rules, apart from refusing to
//! withdraw a book that is out on loan.

use crate::base::{BookId, Role, UserId};
use crate::book::{Book, BookPatch, NewBook};
use crate::config::EngineConfig;
use crate::page::{Page, PageRequest};
use crate::store::Store;
use crate::user::{NewUser, User, UserPatch, normalize_email};
use crate::LibraryError;
use std::sync::Arc;
use tracing::info;

pub struct Catalog {
    store: Arc<Store>,
    config: EngineConfig,
}

impl Catalog {
    pub fn new(store: Arc<Store>, config: EngineConfig) -> Self {
        Self { store, config }
    }

    pub fn add_book(&self, new_book: NewBook) -> Result<Book, LibraryError> {
        new_book.validate()?;
        let book = new_book.into_book();
        let book = self.store.books().save(book.id, book);
        info!(book_id = %book.id, title = %book.title, "book added");
        Ok(book)
    }

    pub fn find_book(&self, book_id: BookId) -> Result<Book, LibraryError> {
        self.store
            .books()
            .get(&book_id)
            .filter(|book| !book.is_deleted)
            .ok_or(LibraryError::BookNotFound(book_id))
    }

    pub fn list_books(&self, page: PageRequest) -> Page<Book> {
        let page = page.clamp(self.config.default_page_size, self.config.max_page_size);
        self.store.books().list(|book| !book.is_deleted, page)
    }

    /// Overwrites the descriptive fields present in `patch`.
    pub fn update_book(&self, book_id: BookId, patch: BookPatch) -> Result<Book, LibraryError> {
        patch.validate()?;
        self.store
            .books()
            .modify(&book_id, |book| {
                if book.is_deleted {
                    return Err(LibraryError::BookNotFound(book_id));
                }
                patch.apply(book);
                Ok(book.clone())
            })
            .ok_or(LibraryError::BookNotFound(book_id))?
    }

    /// Withdraws a book from the catalog.
    ///
    /// # Errors
    ///
    /// - [`LibraryError::BookNotFound`] - Book is absent or already withdrawn.
    /// - [`LibraryError::AlreadyLoaned`] - Book is out on loan.
    pub fn delete_book(&self, book_id: BookId) -> Result<(), LibraryError> {
        self.store
            .books()
            .modify(&book_id, |book| {
                if book.is_deleted {
                    return Err(LibraryError::BookNotFound(book_id));
                }
                if book.is_borrowed {
                    return Err(LibraryError::AlreadyLoaned);
                }
                book.is_deleted = true;
                Ok(())
            })
            .ok_or(LibraryError::BookNotFound(book_id))??;

        info!(%book_id, "book withdrawn");
        Ok(())
    }

    /// Registers a user. Emails are unique regardless of case.
    pub fn register_user(&self, new_user: NewUser) -> Result<User, LibraryError> {
        new_user.validate()?;
        let user = new_user.into_user();
        if !self.store.claim_email(normalize_email(&user.email), user.id) {
            return Err(LibraryError::DuplicateEmail);
        }
        let user = self.store.users().save(user.id, user);
        info!(user_id = %user.id, role = %user.role, "user registered");
        Ok(user)
    }

    pub fn find_user(&self, user_id: UserId) -> Result<User, LibraryError> {
        self.store
            .users()
            .get(&user_id)
            .filter(|user| !user.is_deleted)
            .ok_or(LibraryError::UserNotFound(user_id))
    }

    pub fn set_role(&self, user_id: UserId, role: Role) -> Result<User, LibraryError> {
        let user = self
            .store
            .users()
            .modify(&user_id, |user| {
                if user.is_deleted {
                    return Err(LibraryError::UserNotFound(user_id));
                }
                user.role = role;
                Ok(user.clone())
            })
            .ok_or(LibraryError::UserNotFound(user_id))??;

        info!(%user_id, %role, "user role changed");
        Ok(user)
    }

    /// Applies a self-service edit to a live user's names.
    pub fn update_profile(&self, user_id: UserId, patch: UserPatch) -> Result<User, LibraryError> {
        patch.validate()?;
        let user = self
            .store
            .users()
            .modify(&user_id, |user| {
                if user.is_deleted {
                    return Err(LibraryError::UserNotFound(user_id));
                }
                patch.apply(user);
                Ok(user.clone())
            })
            .ok_or(LibraryError::UserNotFound(user_id))??;

        info!(%user_id, "profile updated");
        Ok(user)
    }

    pub fn delete_user(&self, user_id: UserId) -> Result<(), LibraryError> {
        self.store
            .users()
            .modify(&user_id, |user| {
                if user.is_deleted {
                    return Err(LibraryError::UserNotFound(user_id));
                }
                user.is_deleted = true;
                Ok(())
            })
            .ok_or(LibraryError::UserNotFound(user_id))??;

        info!(%user_id, "user deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::new(Arc::new(Store::new()), EngineConfig::default())
    }

    #[test]
    fn added_book_is_listed_and_found() {
        let catalog = catalog();
        let book = catalog
            .add_book(NewBook::new("Emma", "J. Austen", "Classic"))
            .unwrap();

        assert_eq!(catalog.find_book(book.id).unwrap(), book);
        assert_eq!(catalog.list_books(PageRequest::default()).items, vec![book]);
    }

    #[test]
    fn invalid_book_is_not_stored() {
        let catalog = catalog();
        assert!(catalog.add_book(NewBook::new("", "J. Austen", "Classic")).is_err());
        assert_eq!(catalog.list_books(PageRequest::default()).total, 0);
    }

    #[test]
    fn borrowed_book_cannot_be_withdrawn() {
        let catalog = catalog();
        let book = catalog
            .add_book(NewBook::new("Dracula", "B. Stoker", "Horror"))
            .unwrap();
        catalog.store.books().modify(&book.id, |b| b.is_borrowed = true);

        assert_eq!(catalog.delete_book(book.id), Err(LibraryError::AlreadyLoaned));
        assert!(catalog.find_book(book.id).is_ok());
    }

    #[test]
    fn withdrawn_book_is_hidden() {
        let catalog = catalog();
        let book = catalog
            .add_book(NewBook::new("Dracula", "B. Stoker", "Horror"))
            .unwrap();
        catalog.delete_book(book.id).unwrap();

        assert_eq!(catalog.find_book(book.id), Err(LibraryError::BookNotFound(book.id)));
        assert!(catalog.list_books(PageRequest::default()).is_empty());
        assert_eq!(catalog.delete_book(book.id), Err(LibraryError::BookNotFound(book.id)));
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let catalog = catalog();
        catalog
            .register_user(NewUser::new("a@library.com", "A", "A", Role::Customer))
            .unwrap();
        let result = catalog.register_user(NewUser::new("A@Library.com", "B", "B", Role::Manager));
        assert_eq!(result, Err(LibraryError::DuplicateEmail));
    }

    #[test]
    fn role_change_and_delete() {
        let catalog = catalog();
        let user = catalog
            .register_user(NewUser::new("c@library.com", "C", "C", Role::Customer))
            .unwrap();

        assert_eq!(catalog.set_role(user.id, Role::Manager).unwrap().role, Role::Manager);
        catalog.delete_user(user.id).unwrap();
        assert_eq!(catalog.find_user(user.id), Err(LibraryError::UserNotFound(user.id)));
        assert_eq!(
            catalog.set_role(user.id, Role::Customer),
            Err(LibraryError::UserNotFound(user.id))
        );
    }

    #[test]
    fn profile_update_applies_present_fields() {
        let catalog = catalog();
        let user = catalog
            .register_user(NewUser::new("d@library.com", "Dora", "Reader", Role::Customer))
            .unwrap();

        let patch = UserPatch {
            last_name: Some("Writer".to_string()),
            ..UserPatch::default()
        };
        let updated = catalog.update_profile(user.id, patch).unwrap();
        assert_eq!(updated.first_name, "Dora");
        assert_eq!(updated.last_name, "Writer");
        assert_eq!(catalog.find_user(user.id).unwrap(), updated);
    }

    #[test]
    fn profile_update_rejects_deleted_user_and_blank_names() {
        let catalog = catalog();
        let user = catalog
            .register_user(NewUser::new("e@library.com", "Eve", "Reader", Role::Customer))
            .unwrap();

        let blank = UserPatch {
            first_name: Some("  ".to_string()),
            ..UserPatch::default()
        };
        assert!(catalog.update_profile(user.id, blank).is_err());
        assert_eq!(catalog.find_user(user.id).unwrap().first_name, "Eve");

        catalog.delete_user(user.id).unwrap();
        assert_eq!(
            catalog.update_profile(user.id, UserPatch::default()),
            Err(LibraryError::UserNotFound(user.id))
        );
    }
}
