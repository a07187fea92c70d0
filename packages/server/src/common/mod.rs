// Common types shared across the application

pub mod response;

pub use response::*;
