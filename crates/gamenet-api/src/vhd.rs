// VHD image endpoints
//
// There is no JSON listing for images: the `/vhd` page embeds each
// record as data attributes, which `markup` extracts. Mutations are form
// posts answered with redirects.

use tracing::debug;

use crate::client::ConsoleClient;
use crate::error::Error;
use crate::markup::extract_vhd_attributes;
use crate::models::{CloneForm, RecordId, VhdAttributes, VhdEditForm, VhdForm};

impl ConsoleClient {
    /// Raw HTML of the VHD management page.
    ///
    /// `GET /vhd`
    pub async fn vhd_page(&self) -> Result<String, Error> {
        let url = self.url("/vhd")?;
        self.get_text(url).await
    }

    /// Every image listed on the VHD page, with its embedded attributes.
    pub async fn list_vhds(&self) -> Result<Vec<VhdAttributes>, Error> {
        let html = self.vhd_page().await?;
        let vhds = extract_vhd_attributes(&html);
        if vhds.is_empty() && !html.contains('<') {
            return Err(Error::Markup("VHD page returned no markup".into()));
        }
        debug!(count = vhds.len(), "parsed VHD page");
        Ok(vhds)
    }

    /// Create a new image.
    ///
    /// `POST /vhd/add`
    pub async fn add_vhd(&self, form: &VhdForm) -> Result<(), Error> {
        let url = self.url("/vhd/add")?;
        debug!(name = %form.name, size_gb = form.size_gb, "adding VHD");
        self.post_form(url, form).await
    }

    /// Update image metadata.
    ///
    /// `POST /vhd/edit/{id}`
    pub async fn edit_vhd(&self, id: &RecordId, form: &VhdEditForm) -> Result<(), Error> {
        let url = self.url(&format!("/vhd/edit/{id}"))?;
        debug!(%id, "editing VHD");
        self.post_form(url, form).await
    }

    /// Delete an image.
    ///
    /// `POST /vhd/delete/{id}`
    pub async fn delete_vhd(&self, id: &RecordId) -> Result<(), Error> {
        let url = self.url(&format!("/vhd/delete/{id}"))?;
        debug!(%id, "deleting VHD");
        self.post_action(url).await
    }

    /// Clone an image under a new name.
    ///
    /// `POST /vhd/clone/{id}` with `new_name`
    pub async fn clone_vhd(&self, id: &RecordId, new_name: &str) -> Result<(), Error> {
        let url = self.url(&format!("/vhd/clone/{id}"))?;
        debug!(%id, new_name, "cloning VHD");
        let form = CloneForm {
            new_name: new_name.to_owned(),
        };
        self.post_form(url, &form).await
    }
}
