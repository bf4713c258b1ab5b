//! Storage adapters for the authority ports.

#![forbid(unsafe_code)]

mod in_memory_authority_repository;
mod postgres_authority_repository;
mod table_names;

pub use in_memory_authority_repository::InMemoryAuthorityRepository;
pub use postgres_authority_repository::{PostgresAuthorityRepository, PostgresAuthorityTransaction};
pub use table_names::TableNames;
