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

use clap::Parser;
use library_loans_rs::http::{self, AppState};
use library_loans_rs::{
    Catalog, DeletePolicy, EngineConfig, LoanEngine, ServerConfig, Store, logging, seed,
};
use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use tracing::{error, info};

/// Library Loans - Serve the loan lifecycle API
///
/// Starts an HTTP server over an in-memory store, optionally seeded from CSV
/// files or with the demo catalog.
#[derive(Parser, Debug)]
#[command(name = "library-loans-rs")]
#[command(about = "A library loan service with role-gated borrowing and returns", long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:3000")]
    bind: SocketAddr,

    /// CSV file of books to import
    ///
    /// Expected format: title,author,category
    #[arg(long, value_name = "FILE")]
    books: Option<PathBuf>,

    /// CSV file of users to import
    ///
    /// Expected format: email,first_name,last_name,role
    #[arg(long, value_name = "FILE")]
    users: Option<PathBuf>,

    /// Seed the demo catalog and a manager account when the store is empty
    #[arg(long)]
    demo_data: bool,

    /// Log filter, overridden by RUST_LOG
    #[arg(long, default_value = "info")]
    log: String,

    /// Page size used when a request does not give one
    #[arg(long, default_value_t = 20)]
    page_size: usize,

    /// Largest page size a request may ask for
    #[arg(long, default_value_t = 100)]
    max_page_size: usize,

    /// Keep the book borrowed when an open loan is deleted
    #[arg(long)]
    retain_borrow_on_delete: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    logging::init(&args.log);

    let state = match build_state(&args) {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "startup failed");
            process::exit(1);
        }
    };

    if let Err(e) = http::serve(&ServerConfig::new(args.bind), state).await {
        error!(error = %e, "server failed");
        process::exit(1);
    }
}

fn engine_config(args: &Args) -> EngineConfig {
    let policy = if args.retain_borrow_on_delete {
        DeletePolicy::RetainBorrow
    } else {
        DeletePolicy::ReleaseBook
    };

    EngineConfig::new()
        .with_default_page_size(args.page_size)
        .with_max_page_size(args.max_page_size)
        .with_delete_policy(policy)
}

/// Builds the store, runs the requested imports, and wires up the engine.
fn build_state(args: &Args) -> Result<AppState, Box<dyn Error>> {
    let config = engine_config(args);
    let store = Arc::new(Store::new());
    let catalog = Catalog::new(Arc::clone(&store), config.clone());

    if let Some(path) = &args.books {
        let added = seed::import_books(&catalog, open(path)?)?;
        info!(added, file = %path.display(), "books imported");
    }
    if let Some(path) = &args.users {
        let users = seed::import_users(&catalog, open(path)?)?;
        info!(added = users.len(), file = %path.display(), "users imported");
    }
    if args.demo_data {
        if let Some(manager) = seed::load_demo_data(&catalog, &store) {
            info!(user_id = %manager.id, email = %manager.email, "demo manager created");
        }
    }

    let engine = LoanEngine::with_config(store, config);
    Ok(AppState::new(engine, catalog))
}

fn open(path: &Path) -> Result<BufReader<File>, Box<dyn Error>> {
    let file = File::open(path)
        .map_err(|e| format!("error opening file '{}': {}", path.display(), e))?;
    Ok(BufReader::new(file))
}
