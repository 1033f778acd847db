//! Token decoding and normalization.
//!
//! Users may hand the CLI either a signed token that already names its host
//! in a `url` claim, or a short-lived exchange code. [`normalize`] turns
//! either one into an [`AuthRecord`] bound to a host, calling the token
//! exchange endpoint at most once.

use crate::api::CloudClient;
use crate::error::{CloudError, Result};
use crate::types::{AuthRecord, Claims};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Exchange calls allowed before a token must decode on its own.
const MAX_EXCHANGES: usize = 1;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("expected three dot-separated segments")]
    Segments,

    #[error("header is not a base64url JSON object")]
    Header,

    #[error("signature is not base64url")]
    Signature,

    #[error("payload is not valid base64url: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("payload is not a JSON object")]
    NotAnObject,

    #[error("payload has no url claim")]
    MissingUrl,
}

/// Decode the payload segment of a JWT without verifying its signature.
///
/// The signature belongs to the control plane; the CLI only needs the claims
/// to know which host a token is for. The header must still be a base64url
/// JSON object and the signature, if present, base64url text.
pub fn decode_claims(token: &str) -> std::result::Result<Claims, DecodeError> {
    let mut segments = token.trim().split('.');
    let (header, payload, signature) =
        match (segments.next(), segments.next(), segments.next(), segments.next()) {
            (Some(header), Some(payload), Some(signature), None) if !payload.is_empty() => {
                (header, payload, signature)
            }
            _ => return Err(DecodeError::Segments),
        };

    let header = URL_SAFE_NO_PAD
        .decode(header.trim_end_matches('='))
        .map_err(|_| DecodeError::Header)?;
    match serde_json::from_slice::<Value>(&header) {
        Ok(Value::Object(_)) => {}
        _ => return Err(DecodeError::Header),
    }
    if !signature.trim_end_matches('=').chars().all(is_base64url) {
        return Err(DecodeError::Signature);
    }

    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))?;
    let value: Value = serde_json::from_slice(&bytes)?;

    let object = value.as_object().ok_or(DecodeError::NotAnObject)?;
    match object.get("url") {
        Some(Value::String(url)) if !url.is_empty() => {}
        _ => return Err(DecodeError::MissingUrl),
    }

    Ok(serde_json::from_value(value)?)
}

fn is_base64url(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// An [`AuthRecord`] together with the host its `url` claim names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedToken {
    pub url: String,
    pub record: AuthRecord,
}

/// Turn an opaque string into a host-bound token.
///
/// A decodable token is returned as-is. Anything else is treated as an
/// exchange code and sent to the token endpoint once; the returned token
/// must then decode, otherwise the credential is malformed.
pub async fn normalize(client: &CloudClient, opaque: &str) -> Result<NormalizedToken> {
    let mut candidate = opaque.trim().to_string();
    let mut exchanges = 0;

    loop {
        match decode_claims(&candidate) {
            Ok(claims) => {
                return Ok(NormalizedToken {
                    url: claims.url,
                    record: AuthRecord::new(candidate),
                });
            }
            Err(err) if exchanges < MAX_EXCHANGES => {
                debug!(reason = %err, "token does not decode, exchanging");
                candidate = client.exchange_token(&candidate).await?;
                exchanges += 1;
            }
            Err(err) => {
                return Err(CloudError::MalformedCredential(format!(
                    "exchanged token could not be decoded: {err}"
                )));
            }
        }
    }
}
