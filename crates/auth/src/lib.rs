//! `homies-auth`: identity boundary and organiser authorization.
//!
//! No HTTP or storage here: this crate validates
//! tokens into a [`Principal`] and answers "may this user edit this event?".

pub mod authorize;
pub mod claims;
pub mod jwt;
pub mod principal;

pub use authorize::{AuthzError, ensure_organiser};
pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use jwt::{Hs256JwtValidator, JwtError, JwtValidator};
pub use principal::Principal;
