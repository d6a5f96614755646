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

//! Catalog and user seeding from CSV, plus a small demo data set.

use crate::base::Role;
use crate::book::NewBook;
use crate::catalog::Catalog;
use crate::store::Store;
use crate::user::{NewUser, User};
use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use std::io::Read;
use tracing::warn;

/// Raw book row. Fields: `title, author, category`
#[derive(Debug, Deserialize)]
struct BookRecord {
    title: String,
    author: String,
    category: String,
}

/// Raw user row. Fields: `email, first_name, last_name, role`
#[derive(Debug, Deserialize)]
struct UserRecord {
    email: String,
    first_name: String,
    last_name: String,
    role: String,
}

/// Imports books from a CSV reader, returning how many were added.
///
/// Malformed rows and books that fail validation are skipped with a warning.
///
/// # CSV Format
///
/// ```csv
/// title,author,category
/// Dune,F. Herbert,Sci-Fi
/// ```
///
/// # Errors
///
/// Returns a CSV error if the header cannot be read.
pub fn import_books<R: Read>(catalog: &Catalog, reader: R) -> Result<usize, csv::Error> {
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .has_headers(true)
        .from_reader(reader);
    rdr.headers()?;

    let mut added = 0;
    for (line, result) in rdr.deserialize::<BookRecord>().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!(row = line + 1, error = %e, "skipping malformed book row");
                continue;
            }
        };
        match catalog.add_book(NewBook::new(record.title, record.author, record.category)) {
            Ok(_) => added += 1,
            Err(e) => warn!(row = line + 1, error = %e, "skipping invalid book"),
        }
    }
    Ok(added)
}

/// Imports users from a CSV reader, returning how many were registered.
///
/// # CSV Format
///
/// ```csv
/// email,first_name,last_name,role
/// manager@library.com,Manager,Manager,MANAGER
/// ```
///
/// # Errors
///
/// Returns a CSV error if the header cannot be read.
pub fn import_users<R: Read>(catalog: &Catalog, reader: R) -> Result<Vec<User>, csv::Error> {
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .has_headers(true)
        .from_reader(reader);
    rdr.headers()?;

    let mut users = Vec::new();
    for (line, result) in rdr.deserialize::<UserRecord>().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!(row = line + 1, error = %e, "skipping malformed user row");
                continue;
            }
        };
        let role = match record.role.parse::<Role>() {
            Ok(role) => role,
            Err(e) => {
                warn!(row = line + 1, error = %e, "skipping user with unknown role");
                continue;
            }
        };
        let new_user = NewUser::new(record.email, record.first_name, record.last_name, role);
        match catalog.register_user(new_user) {
            Ok(user) => users.push(user),
            Err(e) => warn!(row = line + 1, error = %e, "skipping user"),
        }
    }
    Ok(users)
}

const DEMO_BOOKS: &[(&str, &str, &str)] = &[
    ("Dune", "F. Herbert", "Sci-Fi"),
    ("It", "S. King", "Horror"),
    ("Murder", "A. Christie", "Mystery"),
    ("Fahrenheit 451", "R. Bradbury", "Dystopian"),
    ("Brave New World", "A. Huxley", "Sci-Fi"),
    ("Emma", "J. Austen", "Classic"),
    ("Pride and Prejudice", "J. Austen", "Classic"),
    ("Dracula", "B. Stoker", "Horror"),
    ("Neuromancer", "W. Gibson", "Sci-Fi"),
    ("The Hobbit", "J.R.R. Tolkien", "Fantasy"),
];

/// Seeds the demo catalog and a manager account into an empty store.
///
/// Returns the manager when one was created. Books are only added when the
/// catalog is empty, and the manager only when no users exist.
pub fn load_demo_data(catalog: &Catalog, store: &Store) -> Option<User> {
    if store.books().is_empty() {
        for (title, author, category) in DEMO_BOOKS {
            if let Err(e) = catalog.add_book(NewBook::new(*title, *author, *category)) {
                warn!(title, error = %e, "demo book rejected");
            }
        }
    }

    if !store.users().is_empty() {
        return None;
    }
    catalog
        .register_user(NewUser::new(
            "manager@library.com",
            "Manager",
            "Manager",
            Role::Manager,
        ))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::page::PageRequest;
    use std::io::Cursor;
    use std::sync::Arc;

    fn catalog() -> (Catalog, Arc<Store>) {
        let store = Arc::new(Store::new());
        (Catalog::new(Arc::clone(&store), EngineConfig::default()), store)
    }

    #[test]
    fn parse_books_with_whitespace() {
        let (catalog, _) = catalog();
        let csv = "title,author,category\n Dune , F. Herbert , Sci-Fi \nEmma,J. Austen,Classic\n";

        assert_eq!(import_books(&catalog, Cursor::new(csv)).unwrap(), 2);
        let books = catalog.list_books(PageRequest::default()).items;
        assert_eq!(books[0].title, "Dune");
        assert_eq!(books[1].author, "J. Austen");
    }

    #[test]
    fn skip_malformed_and_invalid_books() {
        let (catalog, _) = catalog();
        let csv = "title,author,category\n\
                   Dune,F. Herbert,Sci-Fi\n\
                   only-one-field\n\
                   ,No Title,Classic\n\
                   Emma,J. Austen,Classic\n";

        assert_eq!(import_books(&catalog, Cursor::new(csv)).unwrap(), 2);
    }

    #[test]
    fn parse_users_with_roles() {
        let (catalog, _) = catalog();
        let csv = "email,first_name,last_name,role\n\
                   boss@library.com,Boss,One,MANAGER\n\
                   reader@library.com,Ada,Reader,customer\n\
                   ghost@library.com,Ghost,User,ADMIN\n\
                   boss@library.com,Dup,Licate,CUSTOMER\n";

        let users = import_users(&catalog, Cursor::new(csv)).unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].role, Role::Manager);
        assert_eq!(users[1].role, Role::Customer);
    }

    #[test]
    fn demo_data_is_loaded_once() {
        let (catalog, store) = catalog();

        let manager = load_demo_data(&catalog, &store).unwrap();
        assert_eq!(manager.role, Role::Manager);
        assert_eq!(store.books().len(), DEMO_BOOKS.len());

        assert!(load_demo_data(&catalog, &store).is_none());
        assert_eq!(store.books().len(), DEMO_BOOKS.len());
    }
}
