//! VHD image command handlers.

use tabled::Tabled;

use gamenet_core::vhd_page::{Badge, LOCKED_DELETE_REASON};
use gamenet_core::{
    Console, Controller, DeleteControl, Notice, VhdDetail, VhdEditInput, VhdId, VhdImage,
    VhdInput, VhdPage,
};

use crate::cli::{GlobalOpts, VhdArgs, VhdCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct VhdRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Windows")]
    windows: String,
    #[tabled(rename = "Template")]
    template: &'static str,
    #[tabled(rename = "Locked")]
    locked: &'static str,
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "Yes" } else { "No" }
}

impl From<&VhdImage> for VhdRow {
    fn from(v: &VhdImage) -> Self {
        Self {
            id: v.id.to_string(),
            name: v.name.clone(),
            size: v.size_display(),
            windows: v.windows_display().to_owned(),
            template: yes_no(v.is_template),
            locked: yes_no(v.is_locked),
        }
    }
}

fn badge(b: &Badge) -> &'static str {
    b.label
}

fn detail(v: &VhdImage) -> String {
    let d = VhdDetail::from(v);
    let mut lines = vec![
        format!("ID:           {}", d.id),
        format!("Name:         {}", d.title),
        format!("Description:  {}", d.description),
        format!("Size:         {}", d.size),
        format!("Windows:      {}", d.windows_version),
        format!("File:         {}", d.file_path),
        format!("Template:     {}", badge(&d.template)),
        format!("Locked:       {}", badge(&d.locked)),
        format!("Created:      {}", d.created),
        format!("Modified:     {}", d.modified),
    ];
    if let DeleteControl::Disabled { reason } = d.delete {
        lines.push(String::new());
        lines.push(reason.to_owned());
    }
    lines.join("\n")
}

fn not_found(identifier: &str) -> CliError {
    CliError::NotFound {
        resource_type: "VHD".into(),
        identifier: identifier.to_owned(),
        list_command: "vhd list".into(),
    }
}

async fn load_page(controller: &Controller) -> Result<VhdPage, CliError> {
    let mut page = VhdPage::new();
    page.load(controller.fetch_vhds().await?);
    Ok(page)
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub async fn handle(
    controller: &Controller,
    args: VhdArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        VhdCommand::List(list) => {
            let mut page = load_page(controller).await?;
            if let Some(query) = list.filter {
                page.set_query(query);
            }
            let rows = page.visible_rows();
            let out = output::render_list(
                &global.output,
                &rows,
                |v| VhdRow::from(*v),
                |v| v.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        VhdCommand::Get { vhd } => {
            let page = load_page(controller).await?;
            let image = page.image(&VhdId::new(&vhd)).ok_or_else(|| not_found(&vhd))?;
            let out = output::render_single(&global.output, image, detail, |v| v.id.to_string())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        VhdCommand::Add {
            name,
            size,
            description,
            windows,
            template,
        } => {
            let input = VhdInput {
                name,
                description,
                size_gb: size,
                windows_version: windows,
                is_template: template,
            };
            VhdPage::create(controller, &input).await?;
            output::print_notice(
                &Notice::success(format!("VHD \"{}\" created", input.name.trim())),
                &global.color,
                global.quiet,
            );
            Ok(())
        }

        VhdCommand::Edit {
            vhd,
            name,
            description,
            windows,
            template,
            locked,
        } => {
            let id = VhdId::new(&vhd);
            let page = load_page(controller).await?;
            let current = page.image(&id).ok_or_else(|| not_found(&vhd))?;
            let input = VhdEditInput {
                name: name.unwrap_or_else(|| current.name.clone()),
                description: description
                    .or_else(|| current.description.clone())
                    .unwrap_or_default(),
                windows_version: windows
                    .or_else(|| current.windows_version.clone())
                    .unwrap_or_default(),
                is_template: template.unwrap_or(current.is_template),
                is_locked: locked.unwrap_or(current.is_locked),
            };
            VhdPage::edit(controller, &id, &input).await?;
            output::print_notice(
                &Notice::success(format!("VHD \"{}\" updated", input.name.trim())),
                &global.color,
                global.quiet,
            );
            Ok(())
        }

        VhdCommand::Delete { vhd } => {
            let id = VhdId::new(&vhd);
            let page = load_page(controller).await?;
            let image = page.image(&id).ok_or_else(|| not_found(&vhd))?;
            let Some(confirmation) = page.request_delete(&id) else {
                return Err(CliError::Refused {
                    message: format!("{LOCKED_DELETE_REASON} \"{}\"", image.name),
                });
            };
            if !util::ask(&confirmation, global.yes)? {
                return Ok(());
            }
            VhdPage::delete(controller, image).await?;
            output::print_notice(&Notice::success("VHD deleted"), &global.color, global.quiet);
            Ok(())
        }

        VhdCommand::Clone { vhd, name } => {
            let id = VhdId::new(&vhd);
            let page = load_page(controller).await?;
            let dialog = page.clone_dialog(&id).ok_or_else(|| not_found(&vhd))?;
            let new_name = name.unwrap_or(dialog.suggested_name);
            VhdPage::clone_vhd(controller, &dialog.source, &new_name).await?;
            output::print_notice(
                &Notice::success(format!(
                    "Cloned \"{}\" as \"{}\"",
                    dialog.source_name,
                    new_name.trim()
                )),
                &global.color,
                global.quiet,
            );
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(locked: bool) -> VhdImage {
        VhdImage {
            id: VhdId::new("3"),
            name: "Win10-Esports".into(),
            description: None,
            size: "80.0".into(),
            file_path: Some("D:\\vhd\\esports.vhdx".into()),
            windows_version: None,
            is_template: true,
            is_locked: locked,
            created_at: None,
            modified_at: None,
        }
    }

    #[test]
    fn detail_uses_placeholders() {
        let text = detail(&image(false));
        assert!(text.contains("No description"));
        assert!(text.contains("Windows:      Unknown"));
        assert!(text.contains("Created:      Unknown"));
        assert!(text.contains("Size:         80.0 GB"));
        assert!(!text.contains(LOCKED_DELETE_REASON));
    }

    #[test]
    fn locked_detail_explains_disabled_delete() {
        assert!(detail(&image(true)).contains(LOCKED_DELETE_REASON));
    }

    #[test]
    fn row_shows_flags() {
        let row = VhdRow::from(&image(true));
        assert_eq!(row.template, "Yes");
        assert_eq!(row.locked, "Yes");
    }
}
