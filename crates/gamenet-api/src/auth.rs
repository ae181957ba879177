// Session authentication
//
// The server uses a form login that sets a session cookie and redirects
// to the dashboard. A failed login re-renders the login page with a 200,
// so success is recognised by the redirect, not the status code.

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::debug;

use crate::client::{ConsoleClient, preview, redirects_to_login};
use crate::error::Error;

#[derive(Serialize)]
struct LoginForm<'a> {
    username: &'a str,
    password: &'a str,
}

impl ConsoleClient {
    /// Authenticate with username/password.
    ///
    /// `POST /login` with form fields `username` and `password`. On
    /// success the session cookie lands in the client's cookie jar and is
    /// sent with every subsequent request.
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<(), Error> {
        let url = self.url("/login")?;

        debug!("logging in at {}", url);

        let form = LoginForm {
            username,
            password: password.expose_secret(),
        };

        let resp = self
            .http()
            .post(url)
            .form(&form)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if status.is_redirection() && !redirects_to_login(&resp) {
            debug!("login successful");
            return Ok(());
        }

        if status.is_success() || status.is_redirection() {
            return Err(Error::Authentication {
                message: "invalid username or password".into(),
            });
        }

        let body = resp.text().await.unwrap_or_default();
        Err(Error::Authentication {
            message: format!("login failed (HTTP {status}): {}", preview(&body)),
        })
    }

    /// End the current session.
    ///
    /// `GET /logout`
    pub async fn logout(&self) -> Result<(), Error> {
        let url = self.url("/logout")?;

        debug!("logging out at {}", url);

        let _resp = self
            .http()
            .get(url)
            .send()
            .await
            .map_err(Error::Transport)?;

        debug!("logout complete");
        Ok(())
    }
}
