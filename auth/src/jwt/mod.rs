pub mod claims;
pub mod errors;
pub mod handler;

pub use claims::SessionClaims;
pub use claims::SessionSubject;
pub use claims::DEFAULT_ISSUER;
pub use errors::JwtError;
pub use handler::JwtHandler;
