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

//! Engine and server configuration.

use std::net::SocketAddr;

/// What soft-deleting an open loan does to its book.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeletePolicy {
    /// Mark the book available again, keeping `is_borrowed` in step with
    /// open loans.
    #[default]
    ReleaseBook,
    /// Leave the book borrowed. Nothing in the crate clears it afterwards:
    /// the book can no longer be borrowed, and withdrawing it is refused
    /// with `AlreadyLoaned`.
    RetainBorrow,
}

/// Configuration for the loan engine and catalog.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Page size used when a request asks for size zero.
    pub default_page_size: usize,
    /// Upper bound on any requested page size.
    pub max_page_size: usize,
    pub delete_policy: DeletePolicy,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 100,
            delete_policy: DeletePolicy::default(),
        }
    }

    /// Sets the default page size (minimum 1).
    pub fn with_default_page_size(mut self, size: usize) -> Self {
        self.default_page_size = size.max(1);
        self
    }

    /// Sets the maximum page size (minimum 1).
    pub fn with_max_page_size(mut self, size: usize) -> Self {
        self.max_page_size = size.max(1);
        self
    }

    pub fn with_delete_policy(mut self, policy: DeletePolicy) -> Self {
        self.delete_policy = policy;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration for the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to.
    pub bind_addr: SocketAddr,
}

impl ServerConfig {
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self { bind_addr }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(SocketAddr::from(([127, 0, 0, 1], 3000)))
    }
}
