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

//! Benchmarks for the loan engine.
//!
//! Run with: cargo bench
//!
//! Benchmarks include:
//! - Single-threaded borrow/return cycles
//! - Listing loans as a manager and as a customer
//! - Parallel borrowing across many books
//! - Contention on a single book

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use library_loans_rs::{
    BookId, Catalog, EngineConfig, LoanEngine, NewBook, PageRequest, Requester, Store, UserId,
};
use rayon::prelude::*;
use std::sync::Arc;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup(books: usize) -> (LoanEngine, Vec<BookId>) {
    let store = Arc::new(Store::new());
    let catalog = Catalog::new(Arc::clone(&store), EngineConfig::default());
    let ids = (0..books)
        .map(|n| {
            catalog
                .add_book(NewBook::new(format!("Book {n}"), "Author", "Fiction"))
                .unwrap()
                .id
        })
        .collect();
    (LoanEngine::new(store), ids)
}

// =============================================================================
// Single-Threaded Benchmarks
// =============================================================================

fn bench_borrow_return(c: &mut Criterion) {
    let (engine, books) = setup(1);
    let customer = Requester::customer(UserId::new());

    c.bench_function("borrow_return_cycle", |b| {
        b.iter(|| {
            let loan = engine.create_loan(books[0], &customer).unwrap();
            black_box(engine.return_loan(loan.id).unwrap());
        })
    });
}

fn bench_borrow_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("borrow_throughput");

    for count in [100, 1_000, 10_000].iter() {
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            b.iter_with_setup(
                || setup(count),
                |(engine, books)| {
                    let customer = Requester::customer(UserId::new());
                    for book in &books {
                        engine.create_loan(*book, &customer).unwrap();
                    }
                    black_box(&engine);
                },
            )
        });
    }
    group.finish();
}

fn bench_find_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_all");

    for count in [100, 1_000, 10_000].iter() {
        let (engine, books) = setup(*count);
        let customers: Vec<_> = (0..10).map(|_| Requester::customer(UserId::new())).collect();
        for (i, book) in books.iter().enumerate() {
            engine.create_loan(*book, &customers[i % customers.len()]).unwrap();
        }
        let manager = Requester::manager(UserId::new());

        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::new("manager", count), count, |b, _| {
            b.iter(|| black_box(engine.find_all(&manager, PageRequest::new(0, 20))))
        });
        group.bench_with_input(BenchmarkId::new("customer", count), count, |b, _| {
            b.iter(|| black_box(engine.find_all(&customers[0], PageRequest::new(0, 20))))
        });
    }
    group.finish();
}

// =============================================================================
// Multi-Threaded Benchmarks
// =============================================================================

fn bench_parallel_borrow_distinct_books(c: &mut Criterion) {
    let mut group = c.benchmark_group("parallel_borrow_distinct_books");

    for count in [1_000, 10_000].iter() {
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            b.iter_with_setup(
                || setup(count),
                |(engine, books)| {
                    books.par_iter().for_each(|book| {
                        let customer = Requester::customer(UserId::new());
                        let loan = engine.create_loan(*book, &customer).unwrap();
                        engine.return_loan(loan.id).unwrap();
                    });
                    black_box(&engine);
                },
            )
        });
    }
    group.finish();
}

fn bench_contended_book(c: &mut Criterion) {
    let mut group = c.benchmark_group("contended_book");

    for attempts in [100, 1_000].iter() {
        group.throughput(Throughput::Elements(*attempts as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(attempts),
            attempts,
            |b, &attempts| {
                b.iter_with_setup(
                    || setup(1),
                    |(engine, books)| {
                        (0..attempts).into_par_iter().for_each(|_| {
                            let customer = Requester::customer(UserId::new());
                            let _ = engine.create_loan(books[0], &customer);
                        });
                        black_box(&engine);
                    },
                )
            },
        );
    }
    group.finish();
}

criterion_group!(
    single_threaded,
    bench_borrow_return,
    bench_borrow_throughput,
    bench_find_all,
);

criterion_group!(
    multi_threaded,
    bench_parallel_borrow_distinct_books,
    bench_contended_book,
);

criterion_main!(single_threaded, multi_threaded);
