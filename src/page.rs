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

//! Offset pagination.

use serde::{Deserialize, Serialize};

/// Zero-based page request. A `size` of zero means "use the default".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    #[serde(default)]
    pub page: usize,
    #[serde(default)]
    pub size: usize,
}

impl PageRequest {
    pub fn new(page: usize, size: usize) -> Self {
        Self { page, size }
    }

    /// Resolves `size` against the configured default and upper bound.
    pub(crate) fn clamp(self, default_size: usize, max_size: usize) -> Self {
        let size = match self.size {
            0 => default_size,
            n => n.min(max_size),
        };
        Self {
            page: self.page,
            size: size.max(1),
        }
    }

    pub(crate) fn offset(&self) -> usize {
        self.page.saturating_mul(self.size)
    }
}

/// One page of results plus the total number of matching items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub size: usize,
    pub total: usize,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total: self.total,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_size_uses_default() {
        assert_eq!(PageRequest::new(2, 0).clamp(20, 100), PageRequest::new(2, 20));
    }

    #[test]
    fn oversized_request_is_capped() {
        assert_eq!(PageRequest::new(0, 5000).clamp(20, 100).size, 100);
    }

    #[test]
    fn offset_saturates() {
        assert_eq!(PageRequest::new(usize::MAX, 10).offset(), usize::MAX);
    }
}
