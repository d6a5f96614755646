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

//! Error types for library operations.
//!
//! Every variant is a business-rule outcome, never a transient fault, so none
//! of them is worth retrying.

use crate::base::{BookId, LoanId, UserId};
use thiserror::Error;

/// Library operation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LibraryError {
    /// Referenced book does not exist
    #[error("book doesn't exist: {0}")]
    BookNotFound(BookId),

    /// Referenced loan does not exist or was soft-deleted
    #[error("loan doesn't exist: {0}")]
    LoanNotFound(LoanId),

    /// Referenced user does not exist or was soft-deleted
    #[error("user doesn't exist: {0}")]
    UserNotFound(UserId),

    /// Book already has an open loan
    #[error("this book is already loaned")]
    AlreadyLoaned,

    /// Loan already carries a return date
    #[error("this loan has already been returned")]
    AlreadyReturned,

    /// Requester neither manages the library nor owns the loan
    #[error("you are not authorized to view this loan")]
    Unauthorized,

    /// Requester's role does not permit the operation
    #[error("operation not permitted for this role")]
    Forbidden,

    /// A descriptive field failed validation
    #[error("{field} {reason}")]
    InvalidField {
        field: &'static str,
        reason: &'static str,
    },

    /// Borrow date would fall after the return date
    #[error("borrowed date cannot be after returned date")]
    InvalidLoanDates,

    /// Email is already registered
    #[error("email is already registered")]
    DuplicateEmail,
}

/// Externally visible class of a [`LibraryError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Referenced entity is absent (404-equivalent).
    NotFound,
    /// Business rule or validation failure (400-equivalent).
    RuleViolation,
    /// Requester may not perform the operation (403-equivalent).
    Authorization,
}

impl LibraryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::BookNotFound(_) | Self::LoanNotFound(_) | Self::UserNotFound(_) => {
                ErrorKind::NotFound
            }
            Self::AlreadyLoaned
            | Self::AlreadyReturned
            | Self::InvalidField { .. }
            | Self::InvalidLoanDates
            | Self::DuplicateEmail => ErrorKind::RuleViolation,
            Self::Unauthorized | Self::Forbidden => ErrorKind::Authorization,
        }
    }
}
