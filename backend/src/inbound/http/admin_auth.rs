//! Static bearer-token gate for administrative endpoints.
//!
//! The configured token is kept only as a SHA-256 digest. Requests present
//! `Authorization: Bearer <token>`; digests are compared so the comparison
//! cost does not depend on how many leading bytes match. The authenticated
//! principal is exposed to handlers as an [`AuditActor`].

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::{Ready, ready};
use serde_json::json;
use sha2::{Digest, Sha256};
use tracing::warn;
use zeroize::Zeroizing;

use crate::domain::{AuditActor, Error};
use crate::inbound::http::state::HttpState;

const BEARER_PREFIX: &str = "Bearer ";

/// Digest of the configured admin token, or nothing when admin access is off.
#[derive(Clone, Default)]
pub struct AdminGate {
    digest: Option<[u8; 32]>,
}

impl AdminGate {
    /// Gate accepting `token`. Blank tokens disable admin access.
    pub fn new(token: Option<&str>) -> Self {
        let digest = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| Sha256::digest(t.as_bytes()).into());
        Self { digest }
    }

    /// Gate rejecting every request.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Whether an admin token is configured.
    pub fn is_enabled(&self) -> bool {
        self.digest.is_some()
    }

    /// Check a presented token.
    ///
    /// # Errors
    /// Returns `forbidden` when admin access is disabled and `unauthorized`
    /// when the token is wrong.
    pub fn verify(&self, presented: &str) -> Result<AuditActor, Error> {
        let Some(expected) = self.digest else {
            return Err(Error::forbidden("admin access is not configured")
                .with_details(json!({"code": "admin_disabled"})));
        };
        let candidate: [u8; 32] = Sha256::digest(presented.as_bytes()).into();
        let diff = expected
            .iter()
            .zip(candidate.iter())
            .fold(0_u8, |acc, (a, b)| acc | (a ^ b));
        if diff == 0 {
            Ok(AuditActor::from_admin_token(presented))
        } else {
            Err(invalid_token())
        }
    }
}

fn invalid_token() -> Error {
    Error::unauthorized("admin token required").with_details(json!({"code": "invalid_token"}))
}

fn bearer_token(req: &HttpRequest) -> Option<Zeroizing<String>> {
    let header = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix(BEARER_PREFIX)?.trim();
    (!token.is_empty()).then(|| Zeroizing::new(token.to_owned()))
}

/// Extractor proving the request carries the admin token.
#[derive(Debug, Clone)]
pub struct AdminSession {
    actor: AuditActor,
}

impl AdminSession {
    /// Principal recorded in audit entries.
    pub fn actor(&self) -> &AuditActor {
        &self.actor
    }
}

impl FromRequest for AdminSession {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(state) = req.app_data::<web::Data<HttpState>>() else {
            return ready(Err(Error::internal("HTTP state not configured")));
        };
        let result = match bearer_token(req) {
            Some(token) => state.admin.verify(&token),
            None if !state.admin.is_enabled() => state.admin.verify(""),
            None => Err(invalid_token()),
        }
        .map(|actor| Self { actor });
        if let Err(err) = &result {
            warn!(path = req.path(), code = ?err.code(), "admin request rejected");
        }
        ready(result)
    }
}
