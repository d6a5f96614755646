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

//! Loan lifecycle engine.
//!
//! The [`LoanEngine`] is the central component that opens, closes, and
//! retires loans, keeping each book's `is_borrowed` flag in step with its
//! loans through the [`AvailabilityGate`].
//!
//! # Operations
//!
//! - **Create**: Borrow the book through the gate, then record the loan.
//! - **Return**: Release the book, then stamp the return date.
//! - **Find**: Managers see every live loan; customers see only their own.
//! - **Delete**: Soft delete; see [`DeletePolicy`] for the book's fate.
//! - **Update**: Patch the book or borrow date, re-running the gate on a book change.
//!
//! # Thread Safety
//!
//! Loan writes run under the loan's entry lock and may then take a book's
//! entry lock; loan creation takes the book lock and releases it before
//! touching loans. Locks are therefore always acquired loan → book, never
//! the other way round.

use crate::base::{BookId, LoanId, Requester, Role};
use crate::clock::{Clock, SystemClock};
use crate::config::{DeletePolicy, EngineConfig};
use crate::gate::AvailabilityGate;
use crate::loan::{Loan, LoanPatch, LoanView};
use crate::page::{Page, PageRequest};
use crate::store::Store;
use crate::LibraryError;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Loan lifecycle engine over a shared [`Store`].
///
/// # Invariants
///
/// - A book is borrowed iff a live loan with no return date references it
///   (under [`DeletePolicy::ReleaseBook`]).
/// - A return date, once set, never changes.
/// - A loan's customer is fixed at creation.
/// - Soft-deleted loans are invisible to every operation.
pub struct LoanEngine {
    store: Arc<Store>,
    gate: AvailabilityGate,
    config: EngineConfig,
    clock: Arc<dyn Clock>,
}

impl LoanEngine {
    /// Creates an engine with default configuration and the system clock.
    pub fn new(store: Arc<Store>) -> Self {
        Self::with_config(store, EngineConfig::default())
    }

    pub fn with_config(store: Arc<Store>, config: EngineConfig) -> Self {
        Self::with_clock(store, config, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<Store>, config: EngineConfig, clock: Arc<dyn Clock>) -> Self {
        LoanEngine {
            gate: AvailabilityGate::new(Arc::clone(&store)),
            store,
            config,
            clock,
        }
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Borrows `book_id` on behalf of `requester`.
    ///
    /// The book is marked borrowed before the loan is recorded; if the gate
    /// refuses, no loan is created.
    ///
    /// # Errors
    ///
    /// - [`LibraryError::BookNotFound`] - Book is absent or soft-deleted.
    /// - [`LibraryError::AlreadyLoaned`] - Book already has an open loan.
    pub fn create_loan(
        &self,
        book_id: BookId,
        requester: &Requester,
    ) -> Result<LoanView, LibraryError> {
        if let Err(e) = self.gate.try_borrow(book_id) {
            warn!(%book_id, customer_id = %requester.id, error = %e, "loan refused");
            return Err(e);
        }

        let loan = Loan::open(book_id, requester.id, self.clock.today());
        let loan = self.store.loans().save(loan.id, loan);

        info!(loan_id = %loan.id, %book_id, customer_id = %requester.id, "loan created");
        Ok(loan.view())
    }

    /// Closes an open loan and makes its book available again.
    ///
    /// # Errors
    ///
    /// - [`LibraryError::LoanNotFound`] - Loan is absent or soft-deleted.
    /// - [`LibraryError::AlreadyReturned`] - Loan already carries a return date.
    /// - [`LibraryError::BookNotFound`] - Loan references a missing book; the
    ///   loan is left untouched.
    pub fn return_loan(&self, loan_id: LoanId) -> Result<LoanView, LibraryError> {
        let today = self.clock.today();

        let loan = self
            .store
            .loans()
            .modify(&loan_id, |loan| {
                if loan.is_deleted {
                    return Err(LibraryError::LoanNotFound(loan_id));
                }
                if loan.returned_date.is_some() {
                    return Err(LibraryError::AlreadyReturned);
                }

                // Book first: an orphaned reference must leave the loan open.
                self.gate.release(loan.book_id)?;
                loan.returned_date = Some(today);
                Ok(loan.clone())
            })
            .ok_or(LibraryError::LoanNotFound(loan_id))?;

        match loan {
            Ok(loan) => {
                info!(%loan_id, book_id = %loan.book_id, "loan returned");
                Ok(loan.view())
            }
            Err(e) => {
                warn!(%loan_id, error = %e, "return refused");
                Err(e)
            }
        }
    }

    /// Lists live loans visible to `requester`, in creation order.
    pub fn find_all(&self, requester: &Requester, page: PageRequest) -> Page<LoanView> {
        let page = page.clamp(self.config.default_page_size, self.config.max_page_size);
        let loans = self.store.loans();

        let result = match requester.role {
            Role::Manager => loans.list(|loan| !loan.is_deleted, page),
            Role::Customer => loans.list(
                |loan| !loan.is_deleted && loan.customer_id == requester.id,
                page,
            ),
        };

        debug!(
            requester = %requester.id,
            role = %requester.role,
            total = result.total,
            "loans listed"
        );
        result.map(|loan| loan.view())
    }

    /// Fetches one live loan.
    ///
    /// # Errors
    ///
    /// - [`LibraryError::LoanNotFound`] - Loan is absent or soft-deleted.
    /// - [`LibraryError::Unauthorized`] - Requester is a customer who does not own the loan.
    pub fn find_by_id(
        &self,
        loan_id: LoanId,
        requester: &Requester,
    ) -> Result<LoanView, LibraryError> {
        let loan = self.live_loan(loan_id)?;

        match requester.role {
            Role::Manager => {}
            Role::Customer if loan.customer_id == requester.id => {}
            Role::Customer => {
                warn!(%loan_id, requester = %requester.id, "loan view denied");
                return Err(LibraryError::Unauthorized);
            }
        }

        Ok(loan.view())
    }

    /// Soft-deletes a loan.
    ///
    /// For an open loan, the book is released under
    /// [`DeletePolicy::ReleaseBook`] and stays borrowed under
    /// [`DeletePolicy::RetainBorrow`].
    ///
    /// # Errors
    ///
    /// - [`LibraryError::LoanNotFound`] - Loan is absent or already deleted.
    pub fn delete_by_id(&self, loan_id: LoanId) -> Result<(), LibraryError> {
        let policy = self.config.delete_policy;

        let book_id = self
            .store
            .loans()
            .modify(&loan_id, |loan| {
                if loan.is_deleted {
                    return Err(LibraryError::LoanNotFound(loan_id));
                }
                let was_open = loan.is_open();
                loan.is_deleted = true;

                if was_open && policy == DeletePolicy::ReleaseBook {
                    if let Err(e) = self.gate.release(loan.book_id) {
                        warn!(%loan_id, book_id = %loan.book_id, error = %e, "deleted loan referenced a missing book");
                    }
                } else if was_open {
                    warn!(%loan_id, book_id = %loan.book_id, "open loan deleted; book stays borrowed");
                }
                Ok(loan.book_id)
            })
            .ok_or(LibraryError::LoanNotFound(loan_id))??;

        info!(%loan_id, %book_id, "loan deleted");
        Ok(())
    }

    /// Applies `patch` to a live loan.
    ///
    /// Moving an open loan to another book borrows the new book through the
    /// gate before releasing the old one, so the move fails cleanly if the
    /// new book is taken. A returned loan may be pointed at any live book.
    ///
    /// # Errors
    ///
    /// - [`LibraryError::LoanNotFound`] - Loan is absent or soft-deleted.
    /// - [`LibraryError::InvalidLoanDates`] - New borrow date falls after the return date.
    /// - [`LibraryError::BookNotFound`] - New book is absent or soft-deleted.
    /// - [`LibraryError::AlreadyLoaned`] - New book already has an open loan.
    pub fn update_by_id(
        &self,
        loan_id: LoanId,
        patch: LoanPatch,
    ) -> Result<LoanView, LibraryError> {
        let loan = self
            .store
            .loans()
            .modify(&loan_id, |loan| {
                if loan.is_deleted {
                    return Err(LibraryError::LoanNotFound(loan_id));
                }

                if let (Some(borrowed), Some(returned)) = (patch.borrowed_date, loan.returned_date)
                {
                    if borrowed > returned {
                        return Err(LibraryError::InvalidLoanDates);
                    }
                }

                match patch.book_id {
                    Some(new_book) if new_book != loan.book_id => {
                        if loan.is_open() {
                            self.gate.try_borrow(new_book)?;
                            if let Err(e) = self.gate.release(loan.book_id) {
                                warn!(%loan_id, book_id = %loan.book_id, error = %e, "moved loan off a missing book");
                            }
                        } else {
                            self.gate.ensure_exists(new_book)?;
                        }
                        loan.book_id = new_book;
                    }
                    _ => {}
                }

                if let Some(borrowed) = patch.borrowed_date {
                    loan.borrowed_date = borrowed;
                }
                Ok(loan.clone())
            })
            .ok_or(LibraryError::LoanNotFound(loan_id))??;

        info!(%loan_id, book_id = %loan.book_id, "loan updated");
        Ok(loan.view())
    }

    fn live_loan(&self, loan_id: LoanId) -> Result<Loan, LibraryError> {
        self.store
            .loans()
            .get(&loan_id)
            .filter(|loan| !loan.is_deleted)
            .ok_or(LibraryError::LoanNotFound(loan_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::UserId;
    use crate::book::NewBook;
    use crate::clock::FixedClock;
    use chrono::NaiveDate;

    fn setup() -> (LoanEngine, Arc<FixedClock>, BookId) {
        let store = Arc::new(Store::new());
        let book = NewBook::new("It", "S. King", "Horror").into_book();
        let book_id = book.id;
        store.books().save(book_id, book);

        let clock = Arc::new(FixedClock::new(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()));
        let engine = LoanEngine::with_clock(store, EngineConfig::default(), clock.clone());
        (engine, clock, book_id)
    }

    #[test]
    fn loan_dates_follow_the_clock() {
        let (engine, clock, book_id) = setup();
        let customer = Requester::customer(UserId::new());

        let loan = engine.create_loan(book_id, &customer).unwrap();
        assert_eq!(loan.borrowed_date, NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());

        clock.advance(14);
        let returned = engine.return_loan(loan.id).unwrap();
        assert_eq!(
            returned.returned_date,
            Some(NaiveDate::from_ymd_opt(2025, 6, 15).unwrap())
        );
    }

    #[test]
    fn orphaned_loan_cannot_be_returned() {
        let (engine, _, _) = setup();
        let orphan = Loan::open(BookId::new(), UserId::new(), engine.clock.today());
        let loan_id = orphan.id;
        engine.store.loans().save(loan_id, orphan);

        let result = engine.return_loan(loan_id);
        assert!(matches!(result, Err(LibraryError::BookNotFound(_))));
        assert!(engine.store.loans().get(&loan_id).unwrap().returned_date.is_none());
    }

    #[test]
    fn borrow_date_cannot_pass_return_date() {
        let (engine, clock, book_id) = setup();
        let loan = engine
            .create_loan(book_id, &Requester::customer(UserId::new()))
            .unwrap();
        clock.advance(3);
        engine.return_loan(loan.id).unwrap();

        let patch = LoanPatch {
            borrowed_date: NaiveDate::from_ymd_opt(2025, 7, 1),
            ..LoanPatch::default()
        };
        assert_eq!(
            engine.update_by_id(loan.id, patch),
            Err(LibraryError::InvalidLoanDates)
        );
    }
}
