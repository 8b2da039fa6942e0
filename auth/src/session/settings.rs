use crate::jwt::claims::DEFAULT_ISSUER;

/// Signing material and issuer label for session tokens.
///
/// Passed in explicitly by the owning service; nothing in this crate reads
/// secrets from the environment.
#[derive(Clone)]
pub struct SessionSettings {
    pub access_secret: String,
    pub refresh_secret: String,
    pub issuer: String,
}

impl SessionSettings {
    pub fn new(access_secret: impl Into<String>, refresh_secret: impl Into<String>) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            issuer: DEFAULT_ISSUER.to_string(),
        }
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }
}

impl std::fmt::Debug for SessionSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSettings")
            .field("access_secret", &"<redacted>")
            .field("refresh_secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .finish()
    }
}
