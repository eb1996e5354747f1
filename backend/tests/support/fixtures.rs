//! Builders and seeders for catalog entities.

use catalog_core::domain::{
    CastEntry, Genre, GenreId, GenreName, MovieId, NewMovie, NewReview, NewUser, Rating, Role,
    Star, StarDraft, User, UserId,
};
use catalog_core::outbound::persistence::{
    DbContext, DieselGenreRepository, DieselStarRepository, DieselUserRepository,
};
use chrono::NaiveDate;

/// Review body long enough to pass validation.
pub const REVIEW_BODY: &str = "A patient, carefully built story with a memorable ending.";

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid fixture date")
}

pub fn new_movie(title: &str, genres: Vec<GenreId>, cast: Vec<CastEntry>) -> NewMovie {
    NewMovie {
        title: title.to_owned(),
        release_date: date(1996, 2, 23),
        description: format!("{title} description"),
        genres,
        cast,
    }
}

pub fn new_review(movie_id: MovieId, user_id: UserId, rating: i32) -> NewReview {
    NewReview {
        movie_id,
        user_id,
        rating: Rating::new(rating).expect("valid fixture rating"),
        title: "Worth it".to_owned(),
        content: REVIEW_BODY.to_owned(),
    }
}

pub fn new_user(username: &str) -> NewUser {
    NewUser {
        username: username.to_owned(),
        email: format!("{username}@example.com"),
        password_hash: "$argon2id$v=19$fixture".to_owned(),
        role: Role::User,
    }
}

pub fn star_draft(first_name: &str, last_name: &str) -> StarDraft {
    StarDraft {
        first_name: first_name.to_owned(),
        middle_name: None,
        last_name: last_name.to_owned(),
        birth_date: date(1971, 3, 31),
        birth_place: Some("Glasgow".to_owned()),
        death_date: None,
        bio: None,
    }
}

pub async fn seed_genre(ctx: &mut DbContext, name: &str) -> Genre {
    let name = GenreName::parse(name).expect("valid fixture genre name");
    DieselGenreRepository::new()
        .create(ctx, &name)
        .await
        .expect("seed genre")
}

pub async fn seed_star(ctx: &mut DbContext, first_name: &str, last_name: &str) -> Star {
    DieselStarRepository::new()
        .create(ctx, &star_draft(first_name, last_name))
        .await
        .expect("seed star")
}

pub async fn seed_user(ctx: &mut DbContext, username: &str) -> User {
    DieselUserRepository::new()
        .create(ctx, &new_user(username))
        .await
        .expect("seed user")
}
