use std::collections::HashSet;

use jsonwebtoken::decode;
use jsonwebtoken::decode_header;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::errors::JwtError;

/// JWT codec bound to a single HMAC secret.
///
/// Generic over the claims type. Always signs with HS256 and refuses to
/// decode anything whose header names a different algorithm, including
/// `none` and the other HMAC widths.
///
/// Decoding verifies structure and signature only. Temporal validity is
/// checked by [`SessionValidator`](crate::session::SessionValidator) against
/// an injected clock, so an expired token still decodes here.
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    validation: Validation,
}

impl JwtHandler {
    /// Create a new JWT handler with a secret key.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens (should be stored securely)
    ///
    /// # Returns
    /// JwtHandler instance configured with HS256 algorithm
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Access and refresh tokens must use distinct secrets
    pub fn new(secret: &[u8]) -> Self {
        let algorithm = Algorithm::HS256;

        let mut validation = Validation::new(algorithm);
        validation.validate_exp = false;
        validation.required_spec_claims = HashSet::from(["exp".to_string()]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm,
            validation,
        }
    }

    /// Encode claims into a JWT token.
    ///
    /// # Arguments
    /// * `claims` - Claims to encode (must implement Serialize)
    ///
    /// # Returns
    /// JWT token string
    ///
    /// # Errors
    /// * `EncodingFailed` - Key or algorithm misconfiguration, or claims not serializable
    pub fn encode<T: Serialize>(&self, claims: &T) -> Result<String, JwtError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Decode a JWT token and verify its signature.
    ///
    /// # Arguments
    /// * `token` - JWT token string to decode
    ///
    /// # Returns
    /// Decoded claims
    ///
    /// # Errors
    /// * `Malformed` - Not a three-part JWT or the header cannot be read
    /// * `UnexpectedAlgorithm` - Header names anything other than HS256
    /// * `InvalidSignature` - Signature does not match this handler's secret
    /// * `DecodingFailed` - Payload does not deserialize into `T`
    pub fn decode<T: DeserializeOwned>(&self, token: &str) -> Result<T, JwtError> {
        let header = decode_header(token).map_err(|e| JwtError::Malformed(e.to_string()))?;

        if header.alg != self.algorithm {
            return Err(JwtError::UnexpectedAlgorithm(format!("{:?}", header.alg)));
        }

        let token_data = decode::<T>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                ErrorKind::InvalidAlgorithm => {
                    JwtError::UnexpectedAlgorithm(format!("{:?}", header.alg))
                }
                ErrorKind::InvalidToken | ErrorKind::Base64(_) => {
                    JwtError::Malformed(e.to_string())
                }
                _ => JwtError::DecodingFailed(e.to_string()),
            }
        })?;

        Ok(token_data.claims)
    }
}
