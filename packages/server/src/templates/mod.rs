//! Server-side page rendering.
//!
//! The registry is constructed explicitly at startup and carried in
//! `AppState`; handlers hand it a typed page context and get back a full
//! HTML document. All interpolated values are escaped.

use axum::http::StatusCode;

use crate::models::pages::{AppPage, CommonParams, IndexPage, UploadPage, UploadSuccessfulPage};

/// Escape a value for interpolation into HTML text or attribute content.
fn esc(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Page template registry.
pub struct Templates {
    site_name: String,
}

impl Templates {
    pub fn new() -> Self {
        Self {
            site_name: "FileHosting".to_string(),
        }
    }

    /// Shared document shell: header with login state, then page body.
    fn layout(&self, title: &str, common: &CommonParams, body: &str) -> String {
        let auth_nav = if common.is_logged_in {
            let admin_badge = if common.is_admin {
                " <span class=\"badge\">admin</span>"
            } else {
                ""
            };
            format!(
                "<span>Signed in as {}{}</span> <a href=\"{}\">Sign out</a>",
                esc(&common.user_name),
                admin_badge,
                esc(&common.logout_url),
            )
        } else {
            format!("<a href=\"{}\">Sign in</a>", esc(&common.login_url))
        };

        format!(
            "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"/><title>{title} - {site}</title></head>\n\
             <body>\n<header><a href=\"/\">{site}</a> | <a href=\"/upload\">Upload</a> | {auth_nav}</header>\n\
             <main>\n{body}</main>\n</body>\n</html>\n",
            title = esc(title),
            site = esc(&self.site_name),
        )
    }

    pub fn render_index(&self, page: &IndexPage) -> String {
        let mut body = String::from("<h1>Hosted applications</h1>\n");

        if page.apps.is_empty() {
            body.push_str("<p>Nothing is hosted yet.</p>\n");
        } else {
            body.push_str(
                "<table>\n<tr><th>Name</th><th>Version</th><th>Downloads</th><th>Size</th><th></th></tr>\n",
            );
            for app in &page.apps {
                body.push_str(&format!(
                    "<tr><td><a href=\"/apps/{id}\">{id}</a></td><td>{version}</td>\
                     <td>{count}</td><td>{size}</td>\
                     <td><a href=\"/download/{id}\">Download</a></td></tr>\n",
                    id = esc(&app.name),
                    version = esc(app.version.as_deref().unwrap_or("-")),
                    count = app.download_count,
                    size = esc(app.size.as_deref().unwrap_or("-")),
                ));
            }
            body.push_str("</table>\n");
        }

        self.layout("Applications", &page.common, &body)
    }

    pub fn render_app(&self, page: &AppPage) -> String {
        let mut body = format!("<h1>{}</h1>\n", esc(&page.app_id));
        body.push_str(&format!(
            "<p>{}</p>\n<ul>\n<li>Downloads: {}</li>\n",
            esc(&page.description),
            page.download_count,
        ));
        if let Some(size) = &page.size {
            body.push_str(&format!("<li>Size: {}</li>\n", esc(size)));
        }
        if let Some(owner) = &page.owner {
            body.push_str(&format!("<li>Uploaded by: {}</li>\n", esc(owner)));
        }
        body.push_str(&format!(
            "</ul>\n<p><a href=\"/download/{id}\">Download</a>",
            id = esc(&page.app_id),
        ));
        if page.common.is_admin {
            body.push_str(&format!(
                " | <a href=\"/edit/{id}\">Edit</a>",
                id = esc(&page.app_id),
            ));
        }
        body.push_str("</p>\n");

        self.layout(&page.app_id, &page.common, &body)
    }

    pub fn render_upload(&self, page: &UploadPage) -> String {
        let (title, id_field) = match &page.app_id {
            Some(id) => (
                "Edit application",
                format!("<p>Application id: <strong>{}</strong></p>\n", esc(id)),
            ),
            None => (
                "Upload an application",
                "<p><label>Application id <input name=\"appid\" required/></label></p>\n"
                    .to_string(),
            ),
        };

        let body = format!(
            "<h1>{title}</h1>\n\
             <form method=\"post\" action=\"{action}\" enctype=\"multipart/form-data\">\n\
             {id_field}\
             <p><label>Description <textarea name=\"description\" required>{description}</textarea></label></p>\n\
             <p><label>Size <input name=\"size\" value=\"{size}\"/></label></p>\n\
             <p><label>File <input type=\"file\" name=\"file\"/></label></p>\n\
             <p><label>Or external URL <input name=\"storage_url\" value=\"{storage_ref}\"/></label></p>\n\
             <p><button type=\"submit\">Submit</button></p>\n\
             </form>\n",
            action = esc(&page.upload_url),
            description = esc(&page.description),
            size = esc(&page.size),
            storage_ref = esc(&page.storage_ref),
        );

        self.layout(title, &page.common, &body)
    }

    pub fn render_upload_successful(&self, page: &UploadSuccessfulPage) -> String {
        let body = "<h1>Upload successful</h1>\n\
             <p>Your application is now hosted. <a href=\"/\">Back to the listing</a>.</p>\n";
        self.layout("Upload successful", &page.common, body)
    }
}

impl Default for Templates {
    fn default() -> Self {
        Self::new()
    }
}

/// Minimal standalone error page, usable without any request state.
pub fn render_error_page(status: StatusCode, code: &str, message: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"/><title>{status}</title></head>\n\
         <body>\n<h1>{status}</h1>\n<p>{code}: {message}</p>\n\
         <p><a href=\"/\">Back to the listing</a></p>\n</body>\n</html>\n",
        status = status.as_u16(),
        code = esc(code),
        message = esc(message),
    )
}
