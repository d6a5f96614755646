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

//! # Library Loans
//!
//! This library provides the loan lifecycle engine of a library backend:
//! borrowing and returning books, soft-deleting loans, and restricting which
//! loans a requester may see by role and ownership.
//!
//! ## Core Components
//!
//! - [`LoanEngine`]: Opens, closes, lists, and retires loans
//! - [`AvailabilityGate`]: Guards the one-open-loan-per-book rule
//! - [`Store`]: Concurrent in-memory storage for books, loans, and users
//! - [`Catalog`]: Book catalog and user directory
//! - [`LibraryError`]: Error types for rule violations
//!
//! ## Example
//!
//! ```
//! use library_loans_rs::{Catalog, EngineConfig, LoanEngine, NewBook, Requester, Store, UserId};
//! use std::sync::Arc;
//!
//! let store = Arc::new(Store::new());
//! let catalog = Catalog::new(Arc::clone(&store), EngineConfig::default());
//! let engine = LoanEngine::new(Arc::clone(&store));
//!
//! let book = catalog.add_book(NewBook::new("Dune", "F. Herbert", "Sci-Fi")).unwrap();
//! let reader = Requester::customer(UserId::new());
//!
//! // Borrow the book
//! let loan = engine.create_loan(book.id, &reader).unwrap();
//! assert!(catalog.find_book(book.id).unwrap().is_borrowed);
//!
//! // Return it
//! engine.return_loan(loan.id).unwrap();
//! assert!(!catalog.find_book(book.id).unwrap().is_borrowed);
//! ```
//!
//! ## Thread Safety
//!
//! All components are `Send + Sync` and meant to be shared behind an [`Arc`](std::sync::Arc).
//! Concurrent borrowers of the same book race on an atomic compare-and-swap,
//! so exactly one of them wins.

mod base;
pub mod book;
pub mod catalog;
pub mod clock;
pub mod config;
mod engine;
pub mod error;
pub mod gate;
pub mod http;
pub mod loan;
pub mod logging;
pub mod page;
pub mod seed;
pub mod store;
pub mod user;

pub use base::{BookId, LoanId, Requester, Role, UserId};
pub use book::{Book, BookPatch, NewBook};
pub use catalog::Catalog;
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{DeletePolicy, EngineConfig, ServerConfig};
pub use engine::LoanEngine;
pub use error::{ErrorKind, LibraryError};
pub use gate::AvailabilityGate;
pub use loan::{Loan, LoanPatch, LoanStatus, LoanView};
pub use page::{Page, PageRequest};
pub use store::Store;
pub use user::{NewUser, User, UserPatch};
