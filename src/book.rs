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

//! Catalog book records.

use crate::LibraryError;
use crate::base::BookId;
use serde::{Deserialize, Serialize};

const MAX_TITLE_CHARS: usize = 100;
const MAX_AUTHOR_CHARS: usize = 50;
const MAX_CATEGORY_CHARS: usize = 50;

/// A catalog book.
///
/// `is_borrowed` is owned by the availability gate; catalog edits never touch it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub category: String,
    pub is_borrowed: bool,
    pub is_deleted: bool,
}

/// Input for adding a book to the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub category: String,
}

impl NewBook {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            category: category.into(),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), LibraryError> {
        check_field("title", &self.title, MAX_TITLE_CHARS)?;
        check_field("author", &self.author, MAX_AUTHOR_CHARS)?;
        check_field("category", &self.category, MAX_CATEGORY_CHARS)
    }

    pub(crate) fn into_book(self) -> Book {
        Book {
            id: BookId::new(),
            title: self.title,
            author: self.author,
            category: self.category,
            is_borrowed: false,
            is_deleted: false,
        }
    }
}

/// Partial update of a book's descriptive fields. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl BookPatch {
    pub(crate) fn validate(&self) -> Result<(), LibraryError> {
        if let Some(title) = &self.title {
            check_field("title", title, MAX_TITLE_CHARS)?;
        }
        if let Some(author) = &self.author {
            check_field("author", author, MAX_AUTHOR_CHARS)?;
        }
        if let Some(category) = &self.category {
            check_field("category", category, MAX_CATEGORY_CHARS)?;
        }
        Ok(())
    }

    pub(crate) fn apply(self, book: &mut Book) {
        if let Some(title) = self.title {
            book.title = title;
        }
        if let Some(author) = self.author {
            book.author = author;
        }
        if let Some(category) = self.category {
            book.category = category;
        }
    }
}

fn check_field(field: &'static str, value: &str, max_chars: usize) -> Result<(), LibraryError> {
    if value.trim().is_empty() {
        return Err(LibraryError::InvalidField {
            field,
            reason: "must not be blank",
        });
    }
    if value.chars().count() > max_chars {
        return Err(LibraryError::InvalidField {
            field,
            reason: "is too long",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_book_starts_available() {
        let book = NewBook::new("Dune", "F. Herbert", "Sci-Fi").into_book();
        assert!(!book.is_borrowed);
        assert!(!book.is_deleted);
    }

    #[test]
    fn blank_title_is_rejected() {
        let result = NewBook::new("  ", "F. Herbert", "Sci-Fi").validate();
        assert_eq!(
            result,
            Err(LibraryError::InvalidField {
                field: "title",
                reason: "must not be blank"
            })
        );
    }

    #[test]
    fn long_author_is_rejected() {
        let result = NewBook::new("Dune", "x".repeat(51), "Sci-Fi").validate();
        assert_eq!(
            result,
            Err(LibraryError::InvalidField {
                field: "author",
                reason: "is too long"
            })
        );
    }

    #[test]
    fn patch_overwrites_only_present_fields() {
        let mut book = NewBook::new("Dune", "F. Herbert", "Sci-Fi").into_book();
        let patch = BookPatch {
            category: Some("Classic".to_string()),
            ..BookPatch::default()
        };
        patch.validate().unwrap();
        patch.apply(&mut book);
        assert_eq!(book.title, "Dune");
        assert_eq!(book.category, "Classic");
    }
}
