//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repositories here are stateless handles whose operations take the
//! request-scoped [`DbContext`] explicitly. Inside
//! [`DbContext::transaction`] every operation joins the open transaction;
//! outside one each operation checks out its own pooled connection.
//!
//! # Architecture
//!
//! - **Thin adapters**: repositories translate between Diesel rows and
//!   domain types. Validation lives in the domain and the services.
//! - **Internal models**: Diesel row structs (`models.rs`) and schema
//!   definitions (`schema.rs`) never leave this module.
//! - **Async-safe pooling**: connections come from a `bb8` pool through
//!   `diesel-async`.
//! - **Classified errors**: every store failure leaves as a domain
//!   [`crate::domain::Error`]; anything unrecognised becomes Internal.
//!
//! # Example
//!
//! ```ignore
//! use catalog_core::outbound::persistence::{DbContext, DbPool, DieselMovieRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/catalog")).await?;
//! let mut ctx = DbContext::new(pool);
//! let movie = DieselMovieRepository::new().get_by_id(&mut ctx, id).await?;
//! ```

mod average_rating;
mod batch;
mod context;
mod diesel_genre_repository;
mod diesel_listing_queries;
mod diesel_movie_repository;
mod diesel_review_repository;
mod diesel_star_repository;
mod diesel_user_repository;
mod error_mapping;
mod link_writers;
mod migrations;
mod models;
mod optimistic;
mod pool;
mod schema;
mod transaction;

pub use batch::{PageWindow, execute_batch, into_page};
pub use context::{DbConnection, DbContext};
pub use diesel_genre_repository::DieselGenreRepository;
pub use diesel_listing_queries::DieselListingQueries;
pub use diesel_movie_repository::DieselMovieRepository;
pub use diesel_review_repository::DieselReviewRepository;
pub use diesel_star_repository::DieselStarRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MIGRATIONS, run_pending_migrations};
pub use optimistic::{RowPresence, UpdateResult, disambiguate_update_failure};
pub use pool::{DbPool, OwnedConnection, PoolConfig, PoolError};
pub use transaction::{TransactionControl, finish};
