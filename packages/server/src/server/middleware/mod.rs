// HTTP middleware
pub mod jwt_auth;
pub mod request_id;
pub mod timeout;

pub use jwt_auth::*;
pub use request_id::*;
pub use timeout::*;
