// ── Endpoint directory ──
//
// The core never reads config files. Whoever hosts the editing session
// supplies an `EndpointDirectory`: the lookup from a controller's api_id
// to its API root and bearer token. `passweave-config` provides the
// disk-backed implementation; tests use an in-memory map.

use std::collections::HashMap;

use secrecy::SecretString;
use url::Url;

/// Lookup seam for named management endpoints.
///
/// A `None` from either accessor means "misconfigured": the propagation
/// engine degrades and the submission batch fails that group up front.
pub trait EndpointDirectory {
    /// API root URL for the given controller api id.
    fn api_url(&self, api_id: &str) -> Option<Url>;

    /// Bearer token for the given controller api id.
    fn token(&self, api_id: &str) -> Option<SecretString>;
}

/// One named management endpoint.
#[derive(Debug, Clone)]
pub struct ApiEndpoint {
    pub id: String,
    pub name: String,
    pub api_url: Option<Url>,
    pub token: Option<SecretString>,
}

/// In-memory directory over a set of [`ApiEndpoint`]s.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    endpoints: HashMap<String, ApiEndpoint>,
}

impl StaticDirectory {
    pub fn new(endpoints: impl IntoIterator<Item = ApiEndpoint>) -> Self {
        Self {
            endpoints: endpoints.into_iter().map(|e| (e.id.clone(), e)).collect(),
        }
    }

    pub fn get(&self, api_id: &str) -> Option<&ApiEndpoint> {
        self.endpoints.get(api_id)
    }
}

impl EndpointDirectory for StaticDirectory {
    fn api_url(&self, api_id: &str) -> Option<Url> {
        self.endpoints.get(api_id).and_then(|e| e.api_url.clone())
    }

    fn token(&self, api_id: &str) -> Option<SecretString> {
        self.endpoints.get(api_id).and_then(|e| e.token.clone())
    }
}
