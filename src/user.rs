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

//! Registered users. Credentials live elsewhere; only identity and role are kept.

use crate::LibraryError;
use crate::base::{Role, UserId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub is_deleted: bool,
}

/// Input for registering a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub role: Role,
}

impl NewUser {
    pub fn new(
        email: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            email: email.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            role,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), LibraryError> {
        let email = self.email.trim();
        if email.is_empty() {
            return Err(LibraryError::InvalidField {
                field: "email",
                reason: "must not be blank",
            });
        }
        if !email.contains('@') {
            return Err(LibraryError::InvalidField {
                field: "email",
                reason: "must be a well-formed email address",
            });
        }
        check_name("first_name", &self.first_name)?;
        check_name("last_name", &self.last_name)
    }

    pub(crate) fn into_user(self) -> User {
        User {
            id: UserId::new(),
            email: normalize_email(&self.email),
            first_name: self.first_name,
            last_name: self.last_name,
            role: self.role,
            is_deleted: false,
        }
    }
}

/// Self-service profile edit. `None` leaves a field as is; email and role
/// are not editable here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPatch {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl UserPatch {
    pub(crate) fn validate(&self) -> Result<(), LibraryError> {
        if let Some(first_name) = &self.first_name {
            check_name("first_name", first_name)?;
        }
        if let Some(last_name) = &self.last_name {
            check_name("last_name", last_name)?;
        }
        Ok(())
    }

    pub(crate) fn apply(self, user: &mut User) {
        if let Some(first_name) = self.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            user.last_name = last_name;
        }
    }
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn check_name(field: &'static str, value: &str) -> Result<(), LibraryError> {
    if value.trim().is_empty() {
        return Err(LibraryError::InvalidField {
            field,
            reason: "must not be blank",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_normalized_on_registration() {
        let user = NewUser::new(" Reader@Library.COM ", "Ada", "Reader", Role::Customer).into_user();
        assert_eq!(user.email, "reader@library.com");
    }

    #[test]
    fn malformed_email_is_rejected() {
        let result = NewUser::new("reader", "Ada", "Reader", Role::Customer).validate();
        assert!(matches!(
            result,
            Err(LibraryError::InvalidField { field: "email", .. })
        ));
    }

    #[test]
    fn role_defaults_to_customer_when_omitted() {
        let user: NewUser = serde_json::from_str(
            r#"{"email":"a@b.c","first_name":"A","last_name":"B"}"#,
        )
        .unwrap();
        assert_eq!(user.role, Role::Customer);
    }

    #[test]
    fn blank_names_are_rejected() {
        let result = NewUser::new("a@b.c", " ", "Reader", Role::Customer).validate();
        assert_eq!(
            result,
            Err(LibraryError::InvalidField {
                field: "first_name",
                reason: "must not be blank"
            })
        );

        let patch = UserPatch {
            last_name: Some(String::new()),
            ..UserPatch::default()
        };
        assert!(matches!(
            patch.validate(),
            Err(LibraryError::InvalidField { field: "last_name", .. })
        ));
    }

    #[test]
    fn patch_overwrites_only_present_names() {
        let mut user = NewUser::new("a@b.c", "Ada", "Reader", Role::Customer).into_user();
        let patch = UserPatch {
            first_name: Some("Grace".to_string()),
            ..UserPatch::default()
        };
        patch.validate().unwrap();
        patch.apply(&mut user);
        assert_eq!(user.first_name, "Grace");
        assert_eq!(user.last_name, "Reader");
        assert_eq!(user.email, "a@b.c");
    }
}
