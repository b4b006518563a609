//! Reference lookups against the external API.
//!
//! [`resolve`] builds `<base_url>/api/<kind>/<identifier>` and hands it to a
//! [`ReferenceApi`]. [`HttpReferenceApi`] is the production implementation;
//! tests substitute their own.

use std::time::Duration;

use serde_json::Value;

use refsync_core::FieldKind;

use crate::config::DEFAULT_HTTP_TIMEOUT;
use crate::error::ResolveError;

/// The canonical name and id the API reports for an identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiReference {
    pub name: String,
    pub id: String,
}

impl ApiReference {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }

    /// Extract `name` and `id` from a decoded body.
    ///
    /// Anything without both fields means the reference is gone. Numeric ids
    /// are accepted and rendered as strings.
    pub fn from_payload(payload: &Value) -> Option<Self> {
        let name = payload.get("name").and_then(Value::as_str)?;
        let id = match payload.get("id")? {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        Some(Self::new(name, id))
    }
}

/// Blocking GET capability returning a reference or nothing.
///
/// `Ok(None)` means the service has no such reference. Transport and status
/// failures are errors, never `None`.
pub trait ReferenceApi {
    fn fetch(&self, url: &str) -> Result<Option<ApiReference>, ResolveError>;
}

impl<T: ReferenceApi + ?Sized> ReferenceApi for &T {
    fn fetch(&self, url: &str) -> Result<Option<ApiReference>, ResolveError> {
        (**self).fetch(url)
    }
}

/// `<base_url>/api/<kind>/<identifier>`
pub fn reference_url(base_url: &str, identifier: &str, kind: FieldKind) -> String {
    format!("{base_url}/api/{}/{identifier}", kind.as_str())
}

/// Look up the current name for `identifier`.
///
/// An empty identifier is rejected before any request is made.
pub fn resolve(
    api: &impl ReferenceApi,
    base_url: &str,
    identifier: &str,
    kind: FieldKind,
) -> Result<Option<ApiReference>, ResolveError> {
    if identifier.is_empty() {
        return Err(ResolveError::InvalidInput(
            "Invalid UUID provided.".to_string(),
        ));
    }
    let url = reference_url(base_url, identifier, kind);
    tracing::debug!("resolving {kind} {identifier} via {url}");
    api.fetch(&url)
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

/// [`ReferenceApi`] over a blocking `ureq` agent.
///
/// Status mapping:
/// - `2xx` with an empty body, `204` and `404` → reference gone (`Ok(None)`)
/// - other `2xx` → decoded JSON, see [`ApiReference::from_payload`]
/// - any other status → [`ResolveError::Status`]
#[derive(Clone)]
pub struct HttpReferenceApi {
    agent: ureq::Agent,
}

impl Default for HttpReferenceApi {
    fn default() -> Self {
        Self::new(DEFAULT_HTTP_TIMEOUT)
    }
}

impl HttpReferenceApi {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(concat!("refsync/", env!("CARGO_PKG_VERSION")))
            .build();
        Self { agent }
    }

    pub fn with_agent(agent: ureq::Agent) -> Self {
        Self { agent }
    }
}

impl ReferenceApi for HttpReferenceApi {
    fn fetch(&self, url: &str) -> Result<Option<ApiReference>, ResolveError> {
        let response = match self.agent.get(url).set("Accept", "application/json").call() {
            Ok(response) => response,
            Err(ureq::Error::Status(404, _)) => return Ok(None),
            Err(ureq::Error::Status(code, _)) => {
                return Err(ResolveError::Status {
                    url: url.to_string(),
                    code,
                })
            }
            Err(ureq::Error::Transport(transport)) => {
                return Err(ResolveError::Transport {
                    url: url.to_string(),
                    message: transport.to_string(),
                })
            }
        };

        if response.status() == 204 {
            return Ok(None);
        }
        let body = response.into_string().map_err(|e| ResolveError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        decode_body(url, &body)
    }
}

fn decode_body(url: &str, body: &str) -> Result<Option<ApiReference>, ResolveError> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    let payload: Value = serde_json::from_str(body).map_err(|e| ResolveError::Decode {
        url: url.to_string(),
        message: e.to_string(),
    })?;
    Ok(ApiReference::from_payload(&payload))
}
