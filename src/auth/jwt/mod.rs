//! Session tokens
//!
//! HS256 tokens whose subject is the user id; nothing else about the user
//! is embedded, so role changes take effect on the next request.

mod claims;
mod handler;

pub use claims::Claims;
pub use handler::JwtHandler;
