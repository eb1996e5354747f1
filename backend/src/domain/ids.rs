//! Typed integer identifiers for catalog entities.
//!
//! Store ids are `SERIAL` integers; wrapping them keeps a movie id from being
//! passed where a star id is expected.

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
            serde::Serialize, serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Wrap a raw store id.
            pub const fn new(raw: i32) -> Self {
                Self(raw)
            }

            /// Raw store id.
            pub const fn get(self) -> i32 {
                self.0
            }
        }

        impl From<i32> for $name {
            fn from(raw: i32) -> Self {
                Self(raw)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id! {
    /// Identifier of a movie row.
    MovieId
}
define_id! {
    /// Identifier of a genre row.
    GenreId
}
define_id! {
    /// Identifier of a star (cast or crew member) row.
    StarId
}
define_id! {
    /// Identifier of a review row.
    ReviewId
}
define_id! {
    /// Identifier of a user row.
    UserId
}
