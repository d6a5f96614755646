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

//! Core identifier types, roles, and the requester identity.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generates a fresh random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }
    };
}

entity_id!(
    /// Unique identifier for a catalog book.
    BookId
);

entity_id!(
    /// Unique identifier for a loan record.
    LoanId
);

entity_id!(
    /// Unique identifier for a registered user.
    UserId
);

/// Role held by a registered user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Staff member: sees every loan and administers the catalog.
    Manager,
    /// Patron: borrows and returns books, sees only their own loans.
    #[default]
    Customer,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Manager => f.write_str("MANAGER"),
            Self::Customer => f.write_str("CUSTOMER"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MANAGER" => Ok(Self::Manager),
            "CUSTOMER" => Ok(Self::Customer),
            other => Err(format!("unknown role `{other}`")),
        }
    }
}

/// The authenticated identity on whose behalf an operation runs.
///
/// Resolved upstream (see [`crate::http`]); the engine only reads the id and
/// the role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requester {
    pub id: UserId,
    pub role: Role,
}

impl Requester {
    pub fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }

    pub fn manager(id: UserId) -> Self {
        Self::new(id, Role::Manager)
    }

    pub fn customer(id: UserId) -> Self {
        Self::new(id, Role::Customer)
    }

    /// Fails with [`LibraryError::Forbidden`](crate::LibraryError::Forbidden)
    /// unless the requester holds one of `allowed`.
    pub fn require(&self, allowed: &[Role]) -> Result<(), crate::LibraryError> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(crate::LibraryError::Forbidden)
        }
    }
}
