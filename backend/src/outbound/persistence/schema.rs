//! Diesel table definitions for the catalog schema.
//!
//! These definitions must match the migrations under `backend/migrations`.
//! `movies.search_vector` is a generated column used only through literal
//! SQL in full-text filters, so it is not declared here.

diesel::table! {
    /// Registered accounts.
    users (id) {
        /// Primary key.
        id -> Int4,
        /// Login name, unique among live users.
        username -> Varchar,
        /// Contact address, unique among live users.
        email -> Varchar,
        /// Opaque password hash.
        pass_hash -> Text,
        /// One of `user`, `editor`, `admin`.
        role -> Varchar,
        /// Free-form profile text.
        bio -> Nullable<Text>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Soft-delete marker.
        deleted_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Genre vocabulary.
    genres (id) {
        /// Primary key.
        id -> Int4,
        /// Display name, unique among live genres.
        name -> Varchar,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Soft-delete marker.
        deleted_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// People credited on movies.
    stars (id) {
        id -> Int4,
        first_name -> Varchar,
        middle_name -> Nullable<Varchar>,
        last_name -> Varchar,
        birth_date -> Date,
        birth_place -> Nullable<Varchar>,
        death_date -> Nullable<Date>,
        bio -> Nullable<Text>,
        created_at -> Timestamptz,
        deleted_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Versioned movie records.
    movies (id) {
        /// Primary key.
        id -> Int4,
        /// Display title.
        title -> Varchar,
        /// Long-form description.
        description -> Text,
        /// Release date.
        release_date -> Date,
        /// Mean rating of live reviews, maintained on every review write.
        avg_rating -> Nullable<Float8>,
        /// Optimistic-concurrency token, incremented on each scalar update.
        version -> Int4,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Soft-delete marker.
        deleted_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Ordered movie to genre links.
    movie_genres (movie_id, genre_id) {
        movie_id -> Int4,
        genre_id -> Int4,
        order_no -> Int4,
    }
}

diesel::table! {
    /// Ordered, role-qualified movie credits.
    movie_stars (movie_id, star_id, role) {
        movie_id -> Int4,
        star_id -> Int4,
        role -> Varchar,
        details -> Nullable<Text>,
        order_no -> Int4,
    }
}

diesel::table! {
    /// One review per live (movie, user) pair.
    reviews (id) {
        /// Primary key.
        id -> Int4,
        /// Reviewed movie.
        movie_id -> Int4,
        /// Author.
        user_id -> Int4,
        /// Score in 1..=10.
        rating -> Int4,
        /// Headline.
        title -> Varchar,
        /// Body text.
        content -> Text,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Soft-delete marker.
        deleted_at -> Nullable<Timestamptz>,
    }
}

diesel::joinable!(movie_genres -> movies (movie_id));
diesel::joinable!(movie_genres -> genres (genre_id));
diesel::joinable!(movie_stars -> movies (movie_id));
diesel::joinable!(movie_stars -> stars (star_id));
diesel::joinable!(reviews -> movies (movie_id));
diesel::joinable!(reviews -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    genres,
    movie_genres,
    movie_stars,
    movies,
    reviews,
    stars,
    users,
);
