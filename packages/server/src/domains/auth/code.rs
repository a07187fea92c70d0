//! Session identifier and one-time code generation.

use rand::rngs::OsRng;
use rand::{Rng, RngCore};

use crate::domains::auth::errors::AuthError;
use crate::domains::auth::validation::validate_code;

pub const CODE_MIN: i32 = 1000;
pub const CODE_MAX: i32 = 9999;

/// Code sent by dev/test deployments that run without a real SMS provider
pub const DEV_CODE: i32 = 3245;

const SESSION_ID_BYTES: usize = 32;

/// Generate a 64-character hex session identifier from 32 bytes of OS entropy.
pub fn generate_session_id() -> Result<String, AuthError> {
    let mut bytes = [0u8; SESSION_ID_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(AuthError::RandomSource)?;
    Ok(hex::encode(bytes))
}

/// How one-time codes are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CodeGenerator {
    /// Uniform over `[CODE_MIN, CODE_MAX]`
    #[default]
    Random,
    /// Always the same code (dev/test deployments)
    Fixed(i32),
}

impl CodeGenerator {
    pub fn fixed(code: i32) -> Result<Self, AuthError> {
        validate_code(code)?;
        Ok(Self::Fixed(code))
    }

    pub fn generate_code(&self) -> i32 {
        match self {
            Self::Random => rand::thread_rng().gen_range(CODE_MIN..=CODE_MAX),
            Self::Fixed(code) => *code,
        }
    }
}
