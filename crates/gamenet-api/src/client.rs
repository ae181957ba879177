// Management server HTTP client
//
// Wraps `reqwest::Client` with URL construction, JSON decoding, and form
// submission. Endpoint groups (auth, clients, vhd) are implemented as
// inherent methods in separate files to keep this module focused on
// transport mechanics.

use reqwest::StatusCode;
use reqwest::header::LOCATION;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

const LOGIN_PATH: &str = "/login";
const BODY_PREVIEW: usize = 200;

/// Raw HTTP client for the management server.
///
/// Authentication is a session cookie obtained from the login form.
/// Redirects are surfaced to the caller: a redirect to the login page
/// means the session is gone, any other redirect after a form post means
/// the server accepted it.
pub struct ConsoleClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ConsoleClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// If the config doesn't already include a cookie jar, one is created
    /// automatically (session auth requires cookies).
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let config = if transport.cookie_jar.is_some() {
            transport.clone()
        } else {
            transport.clone().with_cookie_jar()
        };
        let http = config.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client around a pre-built `reqwest::Client`.
    ///
    /// The caller is responsible for its cookie and redirect policy.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The underlying HTTP client (for auth flows that need direct access).
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a full URL for a server path such as `/api/clients/status`.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Url::parse(&format!("{base}/{path}")).map_err(Error::InvalidUrl)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and decode a JSON body.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;
        let body = read_success(resp).await?;

        serde_json::from_str(&body).map_err(|e| {
            let preview = preview(&body);
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body,
            }
        })
    }

    /// Send a GET request and return the body text of a page.
    pub(crate) async fn get_text(&self, url: Url) -> Result<String, Error> {
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;
        read_success(resp).await
    }

    /// Submit a url-encoded form.
    ///
    /// Success is any 2xx, or a redirect that does not point back at the
    /// login page.
    pub(crate) async fn post_form(
        &self,
        url: Url,
        form: &(impl Serialize + Sync),
    ) -> Result<(), Error> {
        debug!("POST {}", url);

        let resp = self
            .http
            .post(url)
            .form(form)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if status.is_redirection() {
            if redirects_to_login(&resp) {
                return Err(Error::SessionExpired);
            }
            return Ok(());
        }
        if status == StatusCode::UNAUTHORIZED {
            return Err(Error::SessionExpired);
        }
        if status.is_success() {
            return Ok(());
        }

        let body = resp.text().await.unwrap_or_default();
        Err(Error::Rejected {
            status: status.as_u16(),
            message: preview(&body).to_owned(),
        })
    }

    /// Submit an action endpoint that takes no form fields.
    pub(crate) async fn post_action(&self, url: Url) -> Result<(), Error> {
        self.post_form(url, &EmptyForm {}).await
    }
}

#[derive(Serialize)]
struct EmptyForm {}

/// Check the status line and return the body text.
async fn read_success(resp: reqwest::Response) -> Result<String, Error> {
    let status = resp.status();

    if status == StatusCode::UNAUTHORIZED
        || (status.is_redirection() && redirects_to_login(&resp))
    {
        return Err(Error::SessionExpired);
    }

    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(Error::Status {
            status: status.as_u16(),
            message: preview(&body).to_owned(),
        });
    }

    resp.text().await.map_err(Error::Transport)
}

/// Whether a redirect response sends the browser to the login form.
pub(crate) fn redirects_to_login(resp: &reqwest::Response) -> bool {
    resp.headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(is_login_location)
}

fn is_login_location(location: &str) -> bool {
    let path = Url::parse(location)
        .map(|u| u.path().to_owned())
        .unwrap_or_else(|_| location.split('?').next().unwrap_or(location).to_owned());
    path.trim_end_matches('/') == LOGIN_PATH
}

pub(crate) fn preview(body: &str) -> &str {
    let mut end = body.len().min(BODY_PREVIEW);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn login_location_matches_relative_and_absolute() {
        assert!(is_login_location("/login"));
        assert!(is_login_location("/login?next=%2Fclients"));
        assert!(is_login_location("http://10.0.0.1:5000/login"));
        assert!(!is_login_location("/clients"));
        assert!(!is_login_location("/"));
    }

    #[test]
    fn url_joins_without_double_slash() {
        let client = ConsoleClient::with_client(
            reqwest::Client::new(),
            Url::parse("http://10.0.0.1:5000/").unwrap(),
        );
        let url = client.url("/api/clients/status").unwrap();
        assert_eq!(url.as_str(), "http://10.0.0.1:5000/api/clients/status");
    }

    #[test]
    fn preview_respects_char_boundaries() {
        let body = "é".repeat(150);
        let p = preview(&body);
        assert!(p.len() <= BODY_PREVIEW);
        assert!(body.starts_with(p));
    }
}
