//! Outbound adapters for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories, the unit of work and
//!   the store-side helpers they share, built on Diesel.
//!
//! Adapters translate between domain types and store representations. They
//! hold no business rules beyond the consistency protocol of each write.

pub mod persistence;
