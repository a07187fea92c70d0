// Phone verification service - API Core
//
// Issues short-lived verification sessions for phone numbers, delivers a
// one-time code by SMS and exchanges a correct code for a signed JWT.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
