use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::{error::Error as StdError, fmt};
use uuid::Uuid;

use crate::services::auth::identity::{CallerIdentity, Role};

// Errors returned by credential verification + strict claim validation.
#[derive(Debug)]
pub enum VerifyError {
    /// Token is past `exp` (beyond leeway). Distinguished so clients can
    /// attempt a refresh instead of a full re-authentication.
    Expired,
    /// Signature/format/issuer/audience failure from the JWT library.
    Jwt(jsonwebtoken::errors::Error),
    EmptyClaim(&'static str),
    InvalidSubject,
    /// `role` claim present but not one of the closed set.
    UnknownRole(String),
    /// Verifier-side infrastructure failure. The guard fails closed on this.
    Internal(String),
}

impl fmt::Display for VerifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expired => write!(f, "access token expired"),
            Self::Jwt(e) => write!(f, "jwt verification failed: {}", e),
            Self::EmptyClaim(name) => write!(f, "empty '{}' claim", name),
            Self::InvalidSubject => write!(f, "invalid 'sub' (expected UUID)"),
            Self::UnknownRole(role) => write!(f, "unknown role '{}'", role),
            Self::Internal(msg) => write!(f, "verifier failure: {}", msg),
        }
    }
}

impl StdError for VerifyError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Jwt(e) => Some(e),
            _ => None,
        }
    }
}

impl From<jsonwebtoken::errors::Error> for VerifyError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        // Expiry is the one failure clients are allowed to react to
        // differently, keep it distinguishable from everything else.
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => Self::Expired,
            _ => Self::Jwt(e),
        }
    }
}

/// Credential verification seam.
///
/// The access guard only depends on this trait: production injects
/// [`JwtVerifier`], tests inject stubs. Verification is synchronous; key
/// material is local, so there is no network round-trip.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, credential: &str) -> Result<CallerIdentity, VerifyError>;
}

fn aud_is_present_and_valid(aud: &serde_json::Value) -> bool {
    match aud {
        // Typical: aud is a string
        serde_json::Value::String(s) => !s.trim().is_empty(),
        // Also valid: aud is an array of strings
        serde_json::Value::Array(arr) => arr.iter().any(|v| match v {
            serde_json::Value::String(s) => !s.trim().is_empty(),
            _ => false,
        }),
        // Missing claim ends up as Null due to #[serde(default)]
        _ => false,
    }
}

/// Access token (JWT) claims.
///
/// NOTE:
/// - `aud` in JWT can be either string or array; jsonwebtoken validates it via
///   `Validation::set_audience`.
/// - `role` and `email` are optional: service-to-service tokens carry neither.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessTokenClaims {
    pub iss: String,
    // Keep as Value to accept both string and array. Validation handles audience checks.
    #[serde(default)]
    pub aud: serde_json::Value,

    pub sub: String,
    pub exp: u64,

    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// EdDSA (Ed25519) access-token verifier.
///
/// - Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl fmt::Debug for JwtVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        f.debug_struct("JwtVerifier")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtVerifier {
    /// Build from an Ed25519 public key in PKCS#8 PEM format.
    pub fn from_ed_pem(
        public_key_pem: &str,
        issuer: &str,
        audience: &str,
        leeway_seconds: u64,
    ) -> Result<Self, VerifyError> {
        let decoding_key = DecodingKey::from_ed_pem(public_key_pem.as_bytes())
            .map_err(|e| VerifyError::Internal(format!("invalid ed25519 public key pem: {}", e)))?;

        let mut validation = Validation::new(Algorithm::EdDSA);
        validation.set_issuer(&[issuer]);
        validation.set_audience(&[audience]);
        validation.leeway = leeway_seconds;

        Ok(Self::new(decoding_key, validation))
    }

    /// Build from an already-prepared key + validation. Used by tests with an
    /// HMAC key; production goes through [`Self::from_ed_pem`].
    pub fn new(decoding_key: DecodingKey, validation: Validation) -> Self {
        Self {
            decoding_key,
            validation,
        }
    }

    // Decode + signature/iss/aud/exp checks via jsonwebtoken.
    fn decode(&self, credential: &str) -> Result<AccessTokenClaims, VerifyError> {
        let data = jsonwebtoken::decode::<AccessTokenClaims>(
            credential,
            &self.decoding_key,
            &self.validation,
        )?;
        Ok(data.claims)
    }

    /// Strict claim validation on top of what `jsonwebtoken::Validation`
    /// already guarantees (signature, `exp`, `iss`, `aud`):
    /// required claims must be present *and not empty*, `sub` must be a UUID,
    /// and a present `role` must be one of the closed set.
    fn resolve_identity(claims: AccessTokenClaims) -> Result<CallerIdentity, VerifyError> {
        if claims.iss.trim().is_empty() {
            return Err(VerifyError::EmptyClaim("iss"));
        }
        if claims.sub.trim().is_empty() {
            return Err(VerifyError::EmptyClaim("sub"));
        }
        // `exp` is `u64` so serde guarantees presence, but we still defend
        // against a meaningless value.
        if claims.exp == 0 {
            return Err(VerifyError::EmptyClaim("exp"));
        }
        if !aud_is_present_and_valid(&claims.aud) {
            return Err(VerifyError::EmptyClaim("aud"));
        }

        // Project convention: subject is a UUID
        let subject = Uuid::parse_str(&claims.sub).map_err(|_| VerifyError::InvalidSubject)?;

        // An absent role is a valid (role-less) identity; an out-of-set role
        // means the token cannot have come from our issuer.
        let role = match claims.role {
            Some(raw) => Some(Role::parse(&raw).ok_or(VerifyError::UnknownRole(raw))?),
            None => None,
        };

        Ok(CallerIdentity {
            subject,
            role,
            email: claims.email.filter(|e| !e.trim().is_empty()),
        })
    }
}

impl CredentialVerifier for JwtVerifier {
    fn verify(&self, credential: &str) -> Result<CallerIdentity, VerifyError> {
        let claims = self.decode(credential)?;
        Self::resolve_identity(claims)
    }
}
