//! Domain primitives and catalog aggregates.
//!
//! Purpose: define strongly typed catalog entities, input validation, the
//! error taxonomy, and the store-independent consistency algorithms
//! (association reconciliation and request coalescing). Nothing in this
//! module touches the database.
//!
//! Public surface:
//! - Error / ErrorCode: the error taxonomy every operation reports.
//! - Movie, Review, Genre, Star, User and their input payloads.
//! - MovieGenreLink / MovieStarLink: association values with keys.
//! - reconcile_links / LinkWriter: minimal-write association sync.
//! - RequestCoalescer: in-flight duplicate read suppression.
//! - MovieQuery / ReviewQuery / StarQuery / GenreQuery: listing ports.

pub mod coalescing;
pub mod error;
pub mod genre;
pub mod ids;
pub mod links;
pub mod movie;
pub mod ports;
pub mod reconcile;
pub mod review;
pub mod star;
pub mod user;
mod validation;

pub use self::coalescing::{RequestCoalescer, RequestSignature};
pub use self::error::{Error, ErrorCode};
pub use self::genre::{Genre, GenreName};
pub use self::ids::{GenreId, MovieId, ReviewId, StarId, UserId};
pub use self::links::{MovieGenreLink, MovieStarLink, cast_links, genre_links};
pub use self::movie::{CastEntry, Movie, MovieCredit, MovieDetails, MovieFilter, MovieUpdate, NewMovie};
pub use self::ports::{GenreQuery, MovieQuery, ReviewQuery, StarQuery};
pub use self::reconcile::{LinkChanges, LinkWriter, ReconcileSummary, diff_links, reconcile_links};
pub use self::review::{NewReview, Rating, Review, ReviewFilter, ReviewUpdate};
pub use self::star::{Star, StarDraft};
pub use self::user::{NewUser, Role, User};

/// Result alias used across the crate.
///
/// # Examples
/// ```
/// use catalog_core::domain::{CatalogResult, Error};
///
/// fn lookup() -> CatalogResult<()> {
///     Err(Error::not_found("genre", "id", 3))
/// }
/// assert!(lookup().is_err());
/// ```
pub type CatalogResult<T> = Result<T, Error>;
