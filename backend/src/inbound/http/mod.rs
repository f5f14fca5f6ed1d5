//! HTTP inbound adapter exposing the REST API.

pub mod activity;
pub mod assignment;
pub mod auth;
pub mod avatar;
pub mod cases;
pub mod envelope;
pub mod error;
pub mod health;
pub mod invites;
pub mod legal;
pub mod messages;
pub mod notifications;
pub mod payments;
pub mod session;
pub mod state;
pub mod templates;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod webhooks;

pub use envelope::Envelope;
pub use error::ApiResult;
