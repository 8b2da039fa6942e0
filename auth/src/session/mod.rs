pub mod issuer;
pub mod settings;
pub mod validator;

pub use issuer::SessionIssuer;
pub use issuer::TokenPair;
pub use issuer::ACCESS_TOKEN_TTL_HOURS;
pub use issuer::REFRESH_TOKEN_TTL_HOURS;
pub use settings::SessionSettings;
pub use validator::SessionValidator;
pub use validator::TokenError;
