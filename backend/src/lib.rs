//! Persistence-consistency core of the movie catalog and reviews service.
//!
//! - [`domain`]: entities, the error taxonomy, association reconciliation and
//!   request coalescing.
//! - [`outbound::persistence`]: PostgreSQL repositories, the unit of work,
//!   optimistic concurrency and aggregate maintenance.
//! - [`services`]: validation, paging policy and coalesced listings over the
//!   repositories.
//! - [`config`]: settings loaded via OrthoConfig.

pub mod config;
pub mod domain;
pub mod outbound;
pub mod services;
