//! Application services and storage ports for the authority.

#![forbid(unsafe_code)]

mod authority;
mod authority_ports;

pub use authority::Authority;
pub use authority_ports::{AuthorityRepository, AuthorityTransaction};
