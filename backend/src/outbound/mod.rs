//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! Following the hexagonal architecture pattern, each submodule provides
//! concrete implementations of domain port traits:
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **realtime**: hosted realtime database push channel
//! - **email**: transactional email provider
//! - **billing**: card payment provider
//! - **storage**: hosted file-upload provider
//!
//! Adapters are thin translators between domain types and wire formats.
//! They contain no business logic.

pub mod billing;
pub mod email;
pub mod persistence;
pub mod realtime;
pub mod storage;
