use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::state::AppState;

/// Identity facts for the current request, resolved from the external
/// identity provider (an auth reverse proxy that forwards the login name in
/// a configured header).
///
/// Absence of a session is a normal state, not a failure: anonymous visitors
/// get `is_logged_in = false` and still receive valid login/logout URLs, so
/// extraction is infallible. The header is read exactly once per request.
#[derive(Debug, Clone)]
pub struct RequestIdentity {
    pub is_logged_in: bool,
    pub is_admin: bool,
    pub user_name: String,
    pub login_url: String,
    pub logout_url: String,
}

impl RequestIdentity {
    /// The key used to record this visitor's download history: the login
    /// name when authenticated, otherwise the caller's network address.
    pub fn tracking_key(&self, client_ip: &str) -> String {
        if self.is_logged_in {
            self.user_name.clone()
        } else {
            client_ip.to_string()
        }
    }

    /// The owner recorded on newly created applications.
    pub fn owner(&self) -> Option<String> {
        self.is_logged_in.then(|| self.user_name.clone())
    }
}

impl FromRequestParts<AppState> for RequestIdentity {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let identity = &state.config.identity;

        let user_name = parts
            .headers
            .get(&identity.user_header)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let (is_logged_in, is_admin, user_name) = match user_name {
            Some(name) => {
                let is_admin = identity.admin_users.iter().any(|u| u == &name);
                (true, is_admin, name)
            }
            None => (false, false, String::new()),
        };

        Ok(RequestIdentity {
            is_logged_in,
            is_admin,
            user_name,
            login_url: identity.login_url.clone(),
            logout_url: identity.logout_url.clone(),
        })
    }
}
