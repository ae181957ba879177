// ── Form validation ──
//
// Create/edit forms are checked before anything is sent. The first failing
// field is reported so the UI can move focus there; no request is issued.

use gamenet_api::models::{BootMode, ClientForm, VhdEditForm, VhdForm};
use strum::{Display, EnumString};
use thiserror::Error;

use crate::mac;

/// Form inputs the console validates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum FormField {
    ClientName,
    MacAddress,
    VhdName,
    VhdSize,
    CloneName,
}

/// A rejected form, naming the field to focus.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub field: FormField,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: FormField, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

// ── Client forms ────────────────────────────────────────────────────

/// Raw client form input as typed by the user.
#[derive(Debug, Clone, Default)]
pub struct ClientInput {
    pub name: String,
    pub mac_address: String,
    pub vhd_id: Option<String>,
    pub is_persistent: bool,
    pub boot_mode: BootMode,
    pub post_boot_script: Option<String>,
}

/// Check a client create/edit form and build its wire body.
///
/// The MAC address is run through the input mask first, the way a form
/// field would have masked it while typing.
pub fn client_form(input: &ClientInput) -> Result<ClientForm, ValidationError> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(ValidationError::new(
            FormField::ClientName,
            "Client name and MAC address are required",
        ));
    }

    let mac = mac::validate(&mac::format_input(&input.mac_address))?;

    Ok(ClientForm {
        name: name.to_owned(),
        mac_address: mac.to_string(),
        vhd_id: input
            .vhd_id
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_owned),
        is_persistent: input.is_persistent,
        boot_mode: input.boot_mode,
        post_boot_script: input.post_boot_script.clone(),
    })
}

// ── VHD forms ───────────────────────────────────────────────────────

/// Raw VHD create form input. `size_gb` is the unparsed text field.
#[derive(Debug, Clone)]
pub struct VhdInput {
    pub name: String,
    pub description: String,
    pub size_gb: String,
    pub windows_version: String,
    pub is_template: bool,
}

impl Default for VhdInput {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            size_gb: "50".into(),
            windows_version: String::new(),
            is_template: false,
        }
    }
}

/// Check a VHD create form: name first, then size.
pub fn vhd_form(input: &VhdInput) -> Result<VhdForm, ValidationError> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(ValidationError::new(
            FormField::VhdName,
            "Please enter a VHD name",
        ));
    }

    let size_gb = input
        .size_gb
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|s| s.is_finite() && *s > 0.0)
        .ok_or_else(|| {
            ValidationError::new(
                FormField::VhdSize,
                "Please enter a valid VHD size (greater than 0)",
            )
        })?;

    Ok(VhdForm {
        name: name.to_owned(),
        description: input.description.clone(),
        size_gb,
        windows_version: input.windows_version.clone(),
        is_template: input.is_template,
    })
}

/// Raw VHD edit form input.
#[derive(Debug, Clone, Default)]
pub struct VhdEditInput {
    pub name: String,
    pub description: String,
    pub windows_version: String,
    pub is_template: bool,
    pub is_locked: bool,
}

/// Check a VHD edit form.
pub fn vhd_edit_form(input: &VhdEditInput) -> Result<VhdEditForm, ValidationError> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(ValidationError::new(
            FormField::VhdName,
            "VHD name cannot be empty",
        ));
    }

    Ok(VhdEditForm {
        name: name.to_owned(),
        description: input.description.clone(),
        windows_version: input.windows_version.clone(),
        is_template: input.is_template,
        is_locked: input.is_locked,
    })
}

/// Check the name typed into a clone dialog.
pub fn clone_name(name: &str) -> Result<String, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::new(
            FormField::CloneName,
            "Please enter a VHD name",
        ));
    }
    Ok(name.to_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn client_form_masks_mac() {
        let form = client_form(&ClientInput {
            name: " PC-01 ".into(),
            mac_address: "aa-bb-cc-dd-ee-ff".into(),
            vhd_id: Some(" ".into()),
            ..ClientInput::default()
        })
        .unwrap();
        assert_eq!(form.name, "PC-01");
        assert_eq!(form.mac_address, "AA:BB:CC:DD:EE:FF");
        assert_eq!(form.vhd_id, None);
    }

    #[test]
    fn client_form_rejects_short_mac() {
        let err = client_form(&ClientInput {
            name: "PC-01".into(),
            mac_address: "AA:BB:CC:DD:EE".into(),
            ..ClientInput::default()
        })
        .unwrap_err();
        assert_eq!(err.field, FormField::MacAddress);
        assert_eq!(err.message, mac::INVALID_MAC_MESSAGE);
    }

    #[test]
    fn vhd_name_checked_before_size() {
        let err = vhd_form(&VhdInput {
            name: "   ".into(),
            size_gb: "-4".into(),
            ..VhdInput::default()
        })
        .unwrap_err();
        assert_eq!(err.field, FormField::VhdName);
        assert_eq!(err.message, "Please enter a VHD name");
    }

    #[test]
    fn vhd_size_must_be_positive_number() {
        for size in ["0", "-1", "abc", "", "NaN"] {
            let err = vhd_form(&VhdInput {
                name: "Win10".into(),
                size_gb: size.into(),
                ..VhdInput::default()
            })
            .unwrap_err();
            assert_eq!(err.field, FormField::VhdSize, "size {size:?}");
            assert_eq!(err.message, "Please enter a valid VHD size (greater than 0)");
        }
    }

    #[test]
    fn vhd_defaults_to_fifty_gigabytes() {
        let form = vhd_form(&VhdInput {
            name: "Win10".into(),
            ..VhdInput::default()
        })
        .unwrap();
        assert!((form.size_gb - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn edit_form_requires_name() {
        let err = vhd_edit_form(&VhdEditInput::default()).unwrap_err();
        assert_eq!(err.message, "VHD name cannot be empty");
    }
}
