//! Typed template contexts.
//!
//! Every page enumerates exactly the fields its template recognizes; there
//! is no dynamic parameter bag.

use crate::extractors::identity::RequestIdentity;
use crate::models::app::AppListEntry;

/// Fields passed to every page.
#[derive(Debug, Clone)]
pub struct CommonParams {
    pub is_logged_in: bool,
    pub is_admin: bool,
    pub user_name: String,
    pub login_url: String,
    pub logout_url: String,
}

impl From<RequestIdentity> for CommonParams {
    fn from(identity: RequestIdentity) -> Self {
        Self {
            is_logged_in: identity.is_logged_in,
            is_admin: identity.is_admin,
            user_name: identity.user_name,
            login_url: identity.login_url,
            logout_url: identity.logout_url,
        }
    }
}

/// Context for the landing page listing all hosted applications.
pub struct IndexPage {
    pub common: CommonParams,
    pub apps: Vec<AppListEntry>,
}

/// Context for a single application's detail page.
pub struct AppPage {
    pub common: CommonParams,
    pub app_id: String,
    pub description: String,
    pub download_count: i64,
    pub size: Option<String>,
    pub owner: Option<String>,
}

/// Context for the upload form, also reused (prefilled) by the edit page.
pub struct UploadPage {
    pub common: CommonParams,
    /// Where the form posts to: `/upload-internal` for new uploads,
    /// `/edit/{id}` for edits.
    pub upload_url: String,
    /// Present when editing an existing application.
    pub app_id: Option<String>,
    pub description: String,
    pub storage_ref: String,
    pub size: String,
}

/// Context for the static upload confirmation page.
pub struct UploadSuccessfulPage {
    pub common: CommonParams,
}
