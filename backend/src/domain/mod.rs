//! Domain layer: entities, validation, services, and the ports they drive.
//!
//! Nothing in this module touches HTTP or the database directly; adapters
//! under `outbound` implement the ports and handlers under `inbound` call
//! the services.

pub mod activity;
pub mod assignment;
pub mod auth;
pub mod avatar;
pub mod billing;
pub mod case;
pub mod case_service;
mod error;
pub mod invite;
pub mod legal;
pub mod message;
pub mod messaging;
pub mod notification;
pub mod payment;
pub mod ports;
pub mod registration;
pub mod seed;
pub mod template;
pub mod user;

pub use error::{Error, ErrorCode};
