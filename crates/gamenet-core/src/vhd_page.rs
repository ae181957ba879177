// ── VHD page controller ──
//
// The VHD list comes from the page markup, so every attribute a detail
// view needs is already loaded; opening a detail never hits the server.
// Locked images cannot be deleted: the delete control is disabled and a
// delete request for one is refused before anything is sent.

use tracing::{info, warn};

use crate::command::Command;
use crate::console::Console;
use crate::error::CoreError;
use crate::filter::Searchable;
use crate::model::{VhdId, VhdImage, timestamp_display};
use crate::notice::{Confirmation, PendingAction};
use crate::validate::{self, VhdEditInput, VhdInput};

pub const LOCKED_DELETE_REASON: &str = "Cannot delete locked VHD";

/// Visual tone of a yes/no badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeTone {
    Positive,
    Warning,
    Neutral,
}

/// A yes/no flag as shown in the detail view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub label: &'static str,
    pub tone: BadgeTone,
}

impl Badge {
    fn flag(on: bool, on_tone: BadgeTone) -> Self {
        if on {
            Self {
                label: "Yes",
                tone: on_tone,
            }
        } else {
            Self {
                label: "No",
                tone: BadgeTone::Neutral,
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteControl {
    Enabled,
    Disabled { reason: &'static str },
}

/// Everything the detail view renders, already formatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VhdDetail {
    pub id: VhdId,
    pub title: String,
    pub description: String,
    pub size: String,
    pub windows_version: String,
    pub file_path: String,
    pub template: Badge,
    pub locked: Badge,
    pub created: String,
    pub modified: String,
    pub delete: DeleteControl,
}

impl From<&VhdImage> for VhdDetail {
    fn from(vhd: &VhdImage) -> Self {
        Self {
            id: vhd.id.clone(),
            title: vhd.name.clone(),
            description: vhd.description_display().to_owned(),
            size: vhd.size_display(),
            windows_version: vhd.windows_display().to_owned(),
            file_path: vhd.file_path.clone().unwrap_or_default(),
            template: Badge::flag(vhd.is_template, BadgeTone::Positive),
            locked: Badge::flag(vhd.is_locked, BadgeTone::Warning),
            created: timestamp_display(vhd.created_at.as_ref()),
            modified: timestamp_display(vhd.modified_at.as_ref()),
            delete: if vhd.is_locked {
                DeleteControl::Disabled {
                    reason: LOCKED_DELETE_REASON,
                }
            } else {
                DeleteControl::Enabled
            },
        }
    }
}

/// An open clone dialog, prefilled with a suggested name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneDialog {
    pub source: VhdId,
    pub source_name: String,
    pub suggested_name: String,
}

/// VHD page state.
#[derive(Debug, Clone, Default)]
pub struct VhdPage {
    images: Vec<VhdImage>,
    query: String,
}

impl VhdPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&mut self, images: Vec<VhdImage>) {
        self.images = images;
    }

    pub fn images(&self) -> &[VhdImage] {
        &self.images
    }

    pub fn image(&self, id: &VhdId) -> Option<&VhdImage> {
        self.images.iter().find(|v| &v.id == id)
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into().to_lowercase();
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn visible_rows(&self) -> Vec<&VhdImage> {
        self.images
            .iter()
            .filter(|v| v.matches(&self.query))
            .collect()
    }

    /// Detail view for a loaded image, or `None` if the id is unknown.
    pub fn detail(&self, id: &VhdId) -> Option<VhdDetail> {
        self.image(id).map(VhdDetail::from)
    }

    pub fn clone_dialog(&self, id: &VhdId) -> Option<CloneDialog> {
        let vhd = self.image(id)?;
        Some(CloneDialog {
            source: vhd.id.clone(),
            source_name: vhd.name.clone(),
            suggested_name: format!("Clone of {}", vhd.name),
        })
    }

    /// Prompt for a delete. Locked images get no prompt.
    pub fn request_delete(&self, id: &VhdId) -> Option<Confirmation> {
        let vhd = self.image(id)?;
        if vhd.is_locked {
            return None;
        }
        Some(Confirmation {
            message: delete_prompt(&vhd.name),
            action: PendingAction::DeleteVhd { id: id.clone() },
        })
    }

    /// Delete an image and fetch the list for a reload.
    ///
    /// A locked image is refused with [`CoreError::VhdLocked`] and no
    /// request is sent. The server answers a refused delete (an image
    /// still assigned to clients) with the same redirect as a successful
    /// one, so an image still listed afterwards is reported as rejected.
    pub async fn delete<C: Console>(console: &C, vhd: &VhdImage) -> Result<Vec<VhdImage>, CoreError> {
        if vhd.is_locked {
            warn!(id = %vhd.id, "refusing to delete locked VHD");
            return Err(CoreError::VhdLocked {
                name: vhd.name.clone(),
            });
        }
        console
            .execute(Command::DeleteVhd { id: vhd.id.clone() })
            .await?;
        let images = console.fetch_vhds().await?;
        if images.iter().any(|image| image.id == vhd.id) {
            warn!(id = %vhd.id, "VHD still listed after delete");
            return Err(CoreError::Rejected {
                message: format!(
                    "VHD \"{}\" is still present; it may be assigned to clients",
                    vhd.name
                ),
            });
        }
        info!(id = %vhd.id, "VHD deleted");
        Ok(images)
    }

    pub async fn create<C: Console>(console: &C, input: &VhdInput) -> Result<Vec<VhdImage>, CoreError> {
        let form = validate::vhd_form(input)?;
        console.execute(Command::AddVhd(form)).await?;
        console.fetch_vhds().await
    }

    pub async fn edit<C: Console>(
        console: &C,
        id: &VhdId,
        input: &VhdEditInput,
    ) -> Result<Vec<VhdImage>, CoreError> {
        let form = validate::vhd_edit_form(input)?;
        console
            .execute(Command::EditVhd {
                id: id.clone(),
                form,
            })
            .await?;
        console.fetch_vhds().await
    }

    /// Submit a clone dialog. The name is trimmed and must be non-empty.
    pub async fn clone_vhd<C: Console>(
        console: &C,
        id: &VhdId,
        new_name: &str,
    ) -> Result<Vec<VhdImage>, CoreError> {
        let new_name = validate::clone_name(new_name)?;
        console
            .execute(Command::CloneVhd {
                id: id.clone(),
                new_name,
            })
            .await?;
        console.fetch_vhds().await
    }
}

pub fn delete_prompt(name: &str) -> String {
    format!("Are you sure you want to delete VHD \"{name}\"? This action cannot be undone.")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::testing::{FakeConsole, vhd};
    use crate::validate::FormField;

    fn page() -> VhdPage {
        let mut gold = vhd("1", "Win10 Gold", true);
        gold.is_template = true;
        gold.created_at = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(10, 30, 0);
        let mut scratch = vhd("2", "Scratch", false);
        scratch.windows_version = Some("Windows 11".into());
        scratch.description = Some("testing image".into());

        let mut page = VhdPage::new();
        page.load(vec![gold, scratch]);
        page
    }

    #[test]
    fn search_covers_description_and_windows_version() {
        let mut page = page();
        page.set_query("WINDOWS 11");
        let names: Vec<&str> = page.visible_rows().iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["Scratch"]);

        page.set_query("testing");
        assert_eq!(page.visible_rows().len(), 1);

        page.set_query("");
        assert_eq!(page.visible_rows().len(), 2);
    }

    #[test]
    fn locked_detail_disables_delete() {
        let page = page();
        let detail = page.detail(&VhdId::from("1")).unwrap();
        assert_eq!(detail.title, "Win10 Gold");
        assert_eq!(detail.description, "No description");
        assert_eq!(detail.size, "50.0 GB");
        assert_eq!(detail.template.label, "Yes");
        assert_eq!(detail.locked.tone, BadgeTone::Warning);
        assert_eq!(detail.created, "2024-01-15 10:30:00");
        assert_eq!(detail.modified, "Unknown");
        assert_eq!(
            detail.delete,
            DeleteControl::Disabled {
                reason: LOCKED_DELETE_REASON
            }
        );
    }

    #[test]
    fn unlocked_detail_enables_delete() {
        let page = page();
        let detail = page.detail(&VhdId::from("2")).unwrap();
        assert_eq!(detail.delete, DeleteControl::Enabled);
        assert_eq!(detail.locked.label, "No");
        assert_eq!(detail.windows_version, "Windows 11");
    }

    #[test]
    fn clone_dialog_suggests_name() {
        let dialog = page().clone_dialog(&VhdId::from("1")).unwrap();
        assert_eq!(dialog.suggested_name, "Clone of Win10 Gold");
    }

    #[test]
    fn no_delete_prompt_for_locked_image() {
        let page = page();
        assert!(page.request_delete(&VhdId::from("1")).is_none());
        let prompt = page.request_delete(&VhdId::from("2")).unwrap();
        assert_eq!(
            prompt.message,
            "Are you sure you want to delete VHD \"Scratch\"? This action cannot be undone."
        );
    }

    #[tokio::test]
    async fn locked_delete_sends_nothing() {
        let console = FakeConsole::default();
        let page = page();
        let locked = page.image(&VhdId::from("1")).unwrap();

        let result = VhdPage::delete(&console, locked).await;
        assert!(
            matches!(result, Err(CoreError::VhdLocked { ref name }) if name == "Win10 Gold"),
            "expected VhdLocked, got {result:?}"
        );
        assert!(console.executed().is_empty());
    }

    #[tokio::test]
    async fn delete_reloads_list() {
        let console = FakeConsole::default();
        console.set_vhds(vec![vhd("1", "Win10 Gold", true)]);
        let page = page();

        let fresh = VhdPage::delete(&console, page.image(&VhdId::from("2")).unwrap())
            .await
            .unwrap();
        assert_eq!(fresh.len(), 1);
        assert!(matches!(
            console.executed().as_slice(),
            [Command::DeleteVhd { id }] if id.as_str() == "2"
        ));
    }

    #[test]
    fn missing_size_renders_unknown() {
        let mut page = page();
        let mut bare = vhd("3", "Bare", false);
        bare.size = String::new();
        page.load(vec![bare]);
        let detail = page.detail(&VhdId::from("3")).unwrap();
        assert_eq!(detail.size, "Unknown");
    }

    #[tokio::test]
    async fn delete_left_in_place_is_rejected() {
        let console = FakeConsole::default();
        console.set_vhds(vec![vhd("1", "Win10 Gold", true), vhd("2", "Scratch", false)]);
        let page = page();

        let result = VhdPage::delete(&console, page.image(&VhdId::from("2")).unwrap()).await;
        assert!(
            matches!(result, Err(CoreError::Rejected { ref message }) if message.contains("Scratch")),
            "expected Rejected, got {result:?}"
        );
        assert_eq!(console.executed().len(), 1);
    }

    #[tokio::test]
    async fn blank_clone_name_is_rejected() {
        let console = FakeConsole::default();
        let err = VhdPage::clone_vhd(&console, &VhdId::from("1"), "   ")
            .await
            .unwrap_err();
        assert!(
            matches!(err, CoreError::Validation(ref v) if v.field == FormField::CloneName),
            "{err:?}"
        );
        assert!(console.executed().is_empty());
    }

    #[tokio::test]
    async fn clone_trims_name() {
        let console = FakeConsole::default();
        VhdPage::clone_vhd(&console, &VhdId::from("1"), "  Win10 Copy ")
            .await
            .unwrap();
        assert!(matches!(
            console.executed().as_slice(),
            [Command::CloneVhd { new_name, .. }] if new_name == "Win10 Copy"
        ));
    }

    #[tokio::test]
    async fn zero_size_blocks_create() {
        let console = FakeConsole::default();
        let err = VhdPage::create(
            &console,
            &VhdInput {
                name: "New".into(),
                size_gb: "0".into(),
                ..VhdInput::default()
            },
        )
        .await
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Please enter a valid VHD size (greater than 0)"
        );
        assert!(console.executed().is_empty());
    }
}
