use actix_web::HttpRequest;
use log::debug;
use uuid::Uuid;

pub const USER_ID_HEADER: &str = "X-User-Id";
pub const USER_NAME_HEADER: &str = "X-User-Name";

/// Who is behind a connection, resolved before it reaches the hub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: String,
    pub name: String,
    pub authenticated: bool,
}

impl Identity {
    pub fn anonymous() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: "anonymous".to_string(),
            authenticated: false,
        }
    }
}

pub trait IdentityProvider: Send + Sync {
    fn identify(&self, req: &HttpRequest) -> Identity;
}

/// Every connection is a guest.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnonymousIdentity;

impl IdentityProvider for AnonymousIdentity {
    fn identify(&self, _req: &HttpRequest) -> Identity {
        Identity::anonymous()
    }
}

/// Trusts user headers set by an authenticating reverse proxy.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeaderIdentity;

impl IdentityProvider for HeaderIdentity {
    fn identify(&self, req: &HttpRequest) -> Identity {
        let header = |name: &str| {
            req.headers()
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        match header(USER_ID_HEADER) {
            Some(id) => {
                let name = header(USER_NAME_HEADER).unwrap_or_else(|| id.clone());
                debug!("Identified user {} from headers", id);
                Identity {
                    id,
                    name,
                    authenticated: true,
                }
            }
            None => Identity::anonymous(),
        }
    }
}
