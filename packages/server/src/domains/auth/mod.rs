//! Auth domain - phone verification sessions
//!
//! Responsibilities:
//! - Session id and one-time code generation
//! - Session persistence (Postgres or in-memory)
//! - Create / verify flow with compensation on failed dispatch
//! - JWT issuance and validation

pub mod actions;
pub mod code;
pub mod errors;
pub mod jwt;
pub mod models;
pub mod stores;
pub mod validation;

pub use errors::{AuthError, DispatchError, StoreError};
pub use jwt::{Claims, JwtService, TokenError};
pub use models::Session;
