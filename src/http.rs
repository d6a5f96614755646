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

//! REST API over the loan engine and catalog.
//!
//! ## Endpoints
//!
//! - `GET /health` - Liveness check
//! - `POST /auth/register` - Register a customer
//! - `GET /loans` - List visible loans (`?page=&size=`)
//! - `GET /loans/{id}` - Get a loan
//! - `POST /loans` - Borrow a book (customers)
//! - `PUT /loans/{id}/return` - Return a loan (customers)
//! - `PUT /loans/{id}` - Patch a loan (managers)
//! - `DELETE /loans/{id}` - Soft-delete a loan (managers)
//! - `GET /books`, `GET /books/{id}` - Browse the catalog
//! - `POST /books`, `PUT /books/{id}`, `DELETE /books/{id}` - Edit the catalog (managers)
//! - `GET /users/me`, `PATCH /users/me` - Own profile
//! - `PUT /users/{id}/role`, `DELETE /users/{id}` - User administration (managers)
//!
//! Every route except health and registration needs an `X-User-Id` header
//! naming a registered user. Authentication proper happens in front of this
//! service.
//!
//! ## Example Usage
//!
//! ```bash
//! # Borrow
//! curl -X POST http://localhost:3000/loans \
//!   -H "Content-Type: application/json" \
//!   -H "X-User-Id: 6f1c..." \
//!   -d '{"book_id": "0b7e..."}'
//!
//! # Return
//! curl -X PUT http://localhost:3000/loans/9a2d.../return -H "X-User-Id: 6f1c..."
//! ```

use crate::base::{BookId, LoanId, Requester, Role, UserId};
use crate::book::{Book, BookPatch, NewBook};
use crate::catalog::Catalog;
use crate::config::ServerConfig;
use crate::engine::LoanEngine;
use crate::loan::{LoanPatch, LoanView};
use crate::page::{Page, PageRequest};
use crate::user::{NewUser, User, UserPatch};
use crate::{ErrorKind, LibraryError};
use axum::{
    Json, Router,
    extract::{FromRequest, FromRequestParts, Path, Query, Request, State},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Header carrying the authenticated user's id.
pub const USER_ID_HEADER: &str = "x-user-id";

const CUSTOMER_ONLY: &[Role] = &[Role::Customer];
const MANAGER_ONLY: &[Role] = &[Role::Manager];

// === Request/Response DTOs ===

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLoanRequest {
    pub book_id: BookId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleUpdateRequest {
    pub role: Role,
}

/// Self-service registration. Always yields a customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationRequest {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Response body for errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

// === Application State ===

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<LoanEngine>,
    pub catalog: Arc<Catalog>,
}

impl AppState {
    pub fn new(engine: LoanEngine, catalog: Catalog) -> Self {
        Self {
            engine: Arc::new(engine),
            catalog: Arc::new(catalog),
        }
    }
}

// === Error Handling ===

/// Wrapper for converting failures into HTTP responses.
#[derive(Debug)]
pub enum AppError {
    Library(LibraryError),
    /// Missing, malformed, or unknown `X-User-Id`.
    Unauthenticated,
    /// Path, query, or body that does not parse into the handler's input.
    Malformed {
        status: StatusCode,
        code: &'static str,
        message: String,
    },
}

impl AppError {
    fn invalid_input(message: String) -> Self {
        AppError::Malformed {
            status: StatusCode::BAD_REQUEST,
            code: "INVALID_FIELD",
            message,
        }
    }
}

impl From<LibraryError> for AppError {
    fn from(err: LibraryError) -> Self {
        AppError::Library(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, error) = match self {
            AppError::Library(err) => {
                let status = match err.kind() {
                    ErrorKind::NotFound => StatusCode::NOT_FOUND,
                    ErrorKind::RuleViolation => StatusCode::BAD_REQUEST,
                    ErrorKind::Authorization => StatusCode::FORBIDDEN,
                };
                (status, library_code(&err), err.to_string())
            }
            AppError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHENTICATED",
                "authentication required".to_string(),
            ),
            AppError::Malformed {
                status,
                code,
                message,
            } => (status, code, message),
        };

        (
            status,
            Json(ErrorResponse {
                error,
                code: code.to_string(),
            }),
        )
            .into_response()
    }
}

fn library_code(err: &LibraryError) -> &'static str {
    match err {
        LibraryError::BookNotFound(_) => "BOOK_NOT_FOUND",
        LibraryError::LoanNotFound(_) => "LOAN_NOT_FOUND",
        LibraryError::UserNotFound(_) => "USER_NOT_FOUND",
        LibraryError::AlreadyLoaned => "ALREADY_LOANED",
        LibraryError::AlreadyReturned => "ALREADY_RETURNED",
        LibraryError::Unauthorized => "UNAUTHORIZED_VIEW",
        LibraryError::Forbidden => "FORBIDDEN",
        LibraryError::InvalidField { .. } => "INVALID_FIELD",
        LibraryError::InvalidLoanDates => "INVALID_LOAN_DATES",
        LibraryError::DuplicateEmail => "DUPLICATE_EMAIL",
    }
}

// === Extractors ===
//
// Thin wrappers over axum's `Path`, `Json` and `Query` whose rejections
// render as `ErrorResponse` bodies.

/// Entity ids accepted as a path segment.
pub trait PathId: DeserializeOwned + Send {
    /// Code reported when the segment cannot name any entity of this kind.
    const NOT_FOUND_CODE: &'static str;
}

impl PathId for BookId {
    const NOT_FOUND_CODE: &'static str = "BOOK_NOT_FOUND";
}

impl PathId for LoanId {
    const NOT_FOUND_CODE: &'static str = "LOAN_NOT_FOUND";
}

impl PathId for UserId {
    const NOT_FOUND_CODE: &'static str = "USER_NOT_FOUND";
}

/// Single entity id from the path. A malformed id names nothing, so it is
/// reported as that entity's 404.
#[derive(Debug)]
pub struct IdPath<T>(pub T);

impl<S, T> FromRequestParts<S> for IdPath<T>
where
    T: PathId,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(id)) => Ok(Self(id)),
            Err(rejection) => Err(AppError::Malformed {
                status: StatusCode::NOT_FOUND,
                code: T::NOT_FOUND_CODE,
                message: rejection.body_text(),
            }),
        }
    }
}

/// JSON request body.
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(AppError::invalid_input(rejection.body_text())),
        }
    }
}

/// Query string parameters.
#[derive(Debug)]
pub struct ApiQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(Self(value)),
            Err(rejection) => Err(AppError::invalid_input(rejection.body_text())),
        }
    }
}

// === Requester Resolution ===

/// The registered user behind the current request.
#[derive(Debug, Clone)]
pub struct AuthorizedUser {
    pub requester: Requester,
    pub user: User,
}

impl FromRequestParts<AppState> for AuthorizedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user_id: UserId = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse().ok())
            .ok_or(AppError::Unauthenticated)?;

        let user = state
            .catalog
            .find_user(user_id)
            .map_err(|_| AppError::Unauthenticated)?;

        Ok(Self {
            requester: Requester::new(user.id, user.role),
            user,
        })
    }
}

// === Handlers ===

/// GET /health
async fn health() -> &'static str {
    "The application is running."
}

/// POST /auth/register
async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegistrationRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let user = state.catalog.register_user(NewUser::new(
        request.email,
        request.first_name,
        request.last_name,
        Role::Customer,
    ))?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /loans
async fn list_loans(
    State(state): State<AppState>,
    auth: AuthorizedUser,
    ApiQuery(page): ApiQuery<PageRequest>,
) -> Json<Page<LoanView>> {
    Json(state.engine.find_all(&auth.requester, page))
}

/// GET /loans/{id}
async fn get_loan(
    State(state): State<AppState>,
    auth: AuthorizedUser,
    IdPath(id): IdPath<LoanId>,
) -> Result<Json<LoanView>, AppError> {
    Ok(Json(state.engine.find_by_id(id, &auth.requester)?))
}

/// POST /loans
async fn create_loan(
    State(state): State<AppState>,
    auth: AuthorizedUser,
    ApiJson(request): ApiJson<CreateLoanRequest>,
) -> Result<(StatusCode, Json<LoanView>), AppError> {
    auth.requester.require(CUSTOMER_ONLY)?;
    let loan = state.engine.create_loan(request.book_id, &auth.requester)?;
    Ok((StatusCode::CREATED, Json(loan)))
}

/// PUT /loans/{id}/return
async fn return_loan(
    State(state): State<AppState>,
    auth: AuthorizedUser,
    IdPath(id): IdPath<LoanId>,
) -> Result<Json<LoanView>, AppError> {
    auth.requester.require(CUSTOMER_ONLY)?;
    Ok(Json(state.engine.return_loan(id)?))
}

/// PUT /loans/{id}
async fn update_loan(
    State(state): State<AppState>,
    auth: AuthorizedUser,
    IdPath(id): IdPath<LoanId>,
    ApiJson(patch): ApiJson<LoanPatch>,
) -> Result<Json<LoanView>, AppError> {
    auth.requester.require(MANAGER_ONLY)?;
    Ok(Json(state.engine.update_by_id(id, patch)?))
}

/// DELETE /loans/{id}
async fn delete_loan(
    State(state): State<AppState>,
    auth: AuthorizedUser,
    IdPath(id): IdPath<LoanId>,
) -> Result<Json<MessageResponse>, AppError> {
    auth.requester.require(MANAGER_ONLY)?;
    state.engine.delete_by_id(id)?;
    Ok(Json(MessageResponse {
        message: format!("Loan (ID: {id}) successfully deleted."),
    }))
}

/// GET /books
async fn list_books(
    State(state): State<AppState>,
    _auth: AuthorizedUser,
    ApiQuery(page): ApiQuery<PageRequest>,
) -> Json<Page<Book>> {
    Json(state.catalog.list_books(page))
}

/// GET /books/{id}
async fn get_book(
    State(state): State<AppState>,
    _auth: AuthorizedUser,
    IdPath(id): IdPath<BookId>,
) -> Result<Json<Book>, AppError> {
    Ok(Json(state.catalog.find_book(id)?))
}

/// POST /books
async fn create_book(
    State(state): State<AppState>,
    auth: AuthorizedUser,
    ApiJson(request): ApiJson<NewBook>,
) -> Result<(StatusCode, Json<Book>), AppError> {
    auth.requester.require(MANAGER_ONLY)?;
    Ok((StatusCode::CREATED, Json(state.catalog.add_book(request)?)))
}

/// PUT /books/{id}
async fn update_book(
    State(state): State<AppState>,
    auth: AuthorizedUser,
    IdPath(id): IdPath<BookId>,
    ApiJson(patch): ApiJson<BookPatch>,
) -> Result<Json<Book>, AppError> {
    auth.requester.require(MANAGER_ONLY)?;
    Ok(Json(state.catalog.update_book(id, patch)?))
}

/// DELETE /books/{id}
async fn delete_book(
    State(state): State<AppState>,
    auth: AuthorizedUser,
    IdPath(id): IdPath<BookId>,
) -> Result<StatusCode, AppError> {
    auth.requester.require(MANAGER_ONLY)?;
    state.catalog.delete_book(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /users/me
async fn profile(auth: AuthorizedUser) -> Json<User> {
    Json(auth.user)
}

/// PATCH /users/me
async fn update_profile(
    State(state): State<AppState>,
    auth: AuthorizedUser,
    ApiJson(patch): ApiJson<UserPatch>,
) -> Result<Json<User>, AppError> {
    Ok(Json(state.catalog.update_profile(auth.user.id, patch)?))
}

/// PUT /users/{id}/role
async fn set_role(
    State(state): State<AppState>,
    auth: AuthorizedUser,
    IdPath(id): IdPath<UserId>,
    ApiJson(request): ApiJson<RoleUpdateRequest>,
) -> Result<Json<User>, AppError> {
    auth.requester.require(MANAGER_ONLY)?;
    Ok(Json(state.catalog.set_role(id, request.role)?))
}

/// DELETE /users/{id}
async fn delete_user(
    State(state): State<AppState>,
    auth: AuthorizedUser,
    IdPath(id): IdPath<UserId>,
) -> Result<Json<MessageResponse>, AppError> {
    auth.requester.require(MANAGER_ONLY)?;
    state.catalog.delete_user(id)?;
    Ok(Json(MessageResponse {
        message: format!("User (ID: {id}) successfully deleted."),
    }))
}

// === Router ===

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(register))
        .route("/loans", get(list_loans).post(create_loan))
        .route("/loans/{id}", get(get_loan).put(update_loan).delete(delete_loan))
        .route("/loans/{id}/return", put(return_loan))
        .route("/books", get(list_books).post(create_book))
        .route("/books/{id}", get(get_book).put(update_book).delete(delete_book))
        .route("/users/me", get(profile).patch(update_profile))
        .route("/users/{id}/role", put(set_role))
        .route("/users/{id}", axum::routing::delete(delete_user))
        .with_state(state)
}

/// Binds `config.bind_addr` and serves until Ctrl-C.
pub async fn serve(config: &ServerConfig, state: AppState) -> std::io::Result<()> {
    let listener = TcpListener::bind(config.bind_addr).await?;
    info!(addr = %listener.local_addr()?, "library API listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await
}
