//! Genre commands and queries.

use tracing::info;

use crate::domain::{Error, Genre, GenreId, GenreName, GenreQuery, RequestCoalescer, RequestSignature};
use crate::outbound::persistence::{DbContext, DbPool, DieselGenreRepository, DieselListingQueries};

/// Genre service.
#[derive(Debug, Clone)]
pub struct GenreService<Q = DieselListingQueries> {
    query: Q,
    genres: DieselGenreRepository,
    listings: RequestCoalescer<Vec<Genre>>,
}

impl GenreService {
    /// Create a service listing through `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self::with_query(DieselListingQueries::new(pool))
    }
}

impl<Q: GenreQuery> GenreService<Q> {
    /// Create a service listing through `query`.
    pub fn with_query(query: Q) -> Self {
        Self {
            query,
            genres: DieselGenreRepository::new(),
            listings: RequestCoalescer::new(),
        }
    }

    /// Create a genre.
    ///
    /// # Errors
    ///
    /// Returns BadRequest for an invalid name and AlreadyExists when a live
    /// genre already uses it.
    pub async fn create(&self, ctx: &mut DbContext, name: &str) -> Result<Genre, Error> {
        let name = GenreName::parse(name)?;
        let genre = self.genres.create(ctx, &name).await?;
        info!(genre_id = %genre.id, name = %genre.name, "genre created");
        Ok(genre)
    }

    /// Fetch a genre.
    ///
    /// # Errors
    ///
    /// Returns NotFound when the genre is missing or deleted.
    pub async fn get(&self, ctx: &mut DbContext, id: GenreId) -> Result<Genre, Error> {
        self.genres.get_by_id(ctx, id).await
    }

    /// Every live genre.
    ///
    /// # Errors
    ///
    /// Returns Internal for store failures.
    pub async fn list(&self) -> Result<Vec<Genre>, Error> {
        let signature = RequestSignature::new("GET", "/api/genres");
        self.listings
            .run(&signature, || self.query.list_genres())
            .await
    }

    /// Rename a genre.
    ///
    /// # Errors
    ///
    /// Returns BadRequest for an invalid name, NotFound when the genre is
    /// missing, and AlreadyExists when another live genre uses the name.
    pub async fn update(&self, ctx: &mut DbContext, id: GenreId, name: &str) -> Result<Genre, Error> {
        let name = GenreName::parse(name)?;
        let genre = self.genres.update(ctx, id, &name).await?;
        info!(genre_id = %id, name = %genre.name, "genre renamed");
        Ok(genre)
    }

    /// Soft-delete a genre.
    ///
    /// # Errors
    ///
    /// Returns NotFound when the genre is missing or already deleted.
    pub async fn delete(&self, ctx: &mut DbContext, id: GenreId) -> Result<(), Error> {
        self.genres.delete(ctx, id).await?;
        info!(genre_id = %id, "genre deleted");
        Ok(())
    }
}
