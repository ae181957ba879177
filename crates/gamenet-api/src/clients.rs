// Diskless client endpoints
//
// Status and stats are JSON; create/edit/reboot/delete are form posts
// answered with redirects.

use tracing::debug;

use crate::client::ConsoleClient;
use crate::error::Error;
use crate::models::{ClientForm, ClientStatusRecord, RecordId, StatsPayload};

impl ConsoleClient {
    /// Status of every registered client.
    ///
    /// `GET /api/clients/status`
    pub async fn list_client_status(&self) -> Result<Vec<ClientStatusRecord>, Error> {
        let url = self.url("/api/clients/status")?;
        self.get_json(url).await
    }

    /// Most recent performance sample for one client.
    ///
    /// `GET /api/clients/stats/{id}`. A non-2xx answer is an error; a 2xx
    /// answer may still carry an `{error}` body.
    pub async fn client_stats(&self, id: &RecordId) -> Result<StatsPayload, Error> {
        let url = self.url(&format!("/api/clients/stats/{id}"))?;
        self.get_json(url).await
    }

    /// Ask the server to reboot a client.
    ///
    /// `POST /clients/reboot/{id}`
    pub async fn reboot_client(&self, id: &RecordId) -> Result<(), Error> {
        let url = self.url(&format!("/clients/reboot/{id}"))?;
        debug!(%id, "rebooting client");
        self.post_action(url).await
    }

    /// Remove a client registration.
    ///
    /// `POST /clients/delete/{id}`
    pub async fn delete_client(&self, id: &RecordId) -> Result<(), Error> {
        let url = self.url(&format!("/clients/delete/{id}"))?;
        debug!(%id, "deleting client");
        self.post_action(url).await
    }

    /// Register a new client.
    ///
    /// `POST /clients/add`
    pub async fn add_client(&self, form: &ClientForm) -> Result<(), Error> {
        let url = self.url("/clients/add")?;
        debug!(name = %form.name, mac = %form.mac_address, "adding client");
        self.post_form(url, form).await
    }

    /// Update an existing client.
    ///
    /// `POST /clients/edit/{id}`
    pub async fn edit_client(&self, id: &RecordId, form: &ClientForm) -> Result<(), Error> {
        let url = self.url(&format!("/clients/edit/{id}"))?;
        debug!(%id, "editing client");
        self.post_form(url, form).await
    }
}
