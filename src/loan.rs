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

//! Loan records.
//!
//! Loans follow two independent state machines:
//! - [`LoanStatus::Open`] → [`LoanStatus::Returned`] (via return, terminal)
//! - active → deleted (via soft delete, terminal)
//!
//! A deleted loan is invisible to every read and write.

use crate::base::{BookId, LoanId, UserId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A loan of one book to one customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    pub id: LoanId,
    pub book_id: BookId,
    pub customer_id: UserId,
    pub borrowed_date: NaiveDate,
    pub returned_date: Option<NaiveDate>,
    pub is_deleted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanStatus {
    Open,
    Returned,
}

impl Loan {
    pub(crate) fn open(book_id: BookId, customer_id: UserId, today: NaiveDate) -> Self {
        Self {
            id: LoanId::new(),
            book_id,
            customer_id,
            borrowed_date: today,
            returned_date: None,
            is_deleted: false,
        }
    }

    pub fn status(&self) -> LoanStatus {
        match self.returned_date {
            None => LoanStatus::Open,
            Some(_) => LoanStatus::Returned,
        }
    }

    /// Open loans hold their book borrowed.
    pub fn is_open(&self) -> bool {
        !self.is_deleted && self.returned_date.is_none()
    }

    pub fn view(&self) -> LoanView {
        LoanView {
            id: self.id,
            book_id: self.book_id,
            customer_id: self.customer_id,
            borrowed_date: self.borrowed_date,
            returned_date: self.returned_date,
        }
    }
}

/// Externally visible projection of a [`Loan`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanView {
    pub id: LoanId,
    pub book_id: BookId,
    pub customer_id: UserId,
    pub borrowed_date: NaiveDate,
    pub returned_date: Option<NaiveDate>,
}

/// Partial update of a loan. `None` leaves a field as is.
///
/// The customer and the return date are not patchable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanPatch {
    #[serde(default)]
    pub book_id: Option<BookId>,
    #[serde(default)]
    pub borrowed_date: Option<NaiveDate>,
}
