//! Config subcommand handlers.

use dialoguer::{Input, Select};
use tabled::Tabled;

use gamenet_config::{self as cfg, Config, Profile};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::active_profile_name;
use crate::error::CliError;
use crate::output;

const REDACTED: &str = "********";

fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Prompt(e.to_string())
}

fn profile_list(config: &Config) -> String {
    let mut names: Vec<&str> = config.profiles.keys().map(String::as_str).collect();
    names.sort_unstable();
    if names.is_empty() {
        "(none)".into()
    } else {
        names.join(", ")
    }
}

#[derive(Tabled)]
struct ProfileRow {
    #[tabled(rename = "")]
    marker: &'static str,
    #[tabled(rename = "Profile")]
    name: String,
    #[tabled(rename = "Server")]
    server: String,
    #[tabled(rename = "Username")]
    username: String,
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(),

        ConfigCommand::Show => {
            let mut config = cfg::load_config_or_default();
            for profile in config.profiles.values_mut() {
                if profile.password.is_some() {
                    profile.password = Some(REDACTED.into());
                }
            }
            let out = output::render_single(
                &global.output,
                &config,
                |c| toml::to_string_pretty(c).unwrap_or_else(|e| format!("{e}")),
                |_| cfg::config_path().display().to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&cfg::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Profiles => {
            let config = cfg::load_config_or_default();
            let active = active_profile_name(global, &config);
            let mut names: Vec<&String> = config.profiles.keys().collect();
            names.sort_unstable();
            let rows: Vec<ProfileRow> = names
                .into_iter()
                .map(|name| {
                    let p = &config.profiles[name];
                    ProfileRow {
                        marker: if *name == active { "*" } else { "" },
                        name: name.clone(),
                        server: p.server.clone(),
                        username: p.username.clone().unwrap_or_else(|| "-".into()),
                    }
                })
                .collect();
            let out = match global.output {
                crate::cli::OutputFormat::Table => output::render_table(&rows),
                _ => rows
                    .iter()
                    .map(|r| r.name.clone())
                    .collect::<Vec<_>>()
                    .join("\n"),
            };
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Use { name } => {
            let mut config = cfg::load_config_or_default();
            if !config.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    available: profile_list(&config),
                    name,
                });
            }
            config.default_profile = Some(name.clone());
            cfg::save_config(&config)?;
            if !global.quiet {
                eprintln!("✓ Default profile set to '{name}'");
            }
            Ok(())
        }

        ConfigCommand::SetPassword { profile } => {
            let config = cfg::load_config_or_default();
            let name = profile.unwrap_or_else(|| active_profile_name(global, &config));
            let password = rpassword::prompt_password(format!("Password for '{name}': "))
                .map_err(prompt_err)?;
            if password.is_empty() {
                return Err(CliError::Validation {
                    field: "password".into(),
                    reason: "password cannot be empty".into(),
                });
            }
            cfg::store_password(&name, &password)?;
            if !global.quiet {
                eprintln!("✓ Password stored in system keyring for '{name}'");
            }
            Ok(())
        }
    }
}

// ── Init: interactive wizard ────────────────────────────────────────

fn init() -> Result<(), CliError> {
    let config_path = cfg::config_path();
    eprintln!("GameNet console configuration");
    eprintln!("   Config path: {}\n", config_path.display());

    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default("default".into())
        .interact_text()
        .map_err(prompt_err)?;

    let server: String = Input::new()
        .with_prompt("Server URL")
        .default("http://localhost:5000".into())
        .validate_with(|s: &String| cfg::parse_server_url(s).map(|_| ()).map_err(|e| e.to_string()))
        .interact_text()
        .map_err(prompt_err)?;

    let username: String = Input::new()
        .with_prompt("Username (leave empty for no login)")
        .allow_empty(true)
        .interact_text()
        .map_err(prompt_err)?;

    let mut password = None;
    if !username.is_empty() {
        let pass = rpassword::prompt_password("Password: ").map_err(prompt_err)?;
        if pass.is_empty() {
            return Err(CliError::Validation {
                field: "password".into(),
                reason: "password cannot be empty".into(),
            });
        }

        let store_choices = &[
            "Store password in system keyring (recommended)",
            "Save to config file (plaintext)",
        ];
        let store_selection = Select::new()
            .with_prompt("Where to store the password?")
            .items(store_choices)
            .default(0)
            .interact()
            .map_err(prompt_err)?;

        if store_selection == 0 {
            cfg::store_password(&profile_name, &pass)?;
            eprintln!("   ✓ Password stored in system keyring");
        } else {
            password = Some(pass);
        }
    }

    let profile = Profile {
        server,
        username: (!username.is_empty()).then_some(username),
        password,
        ..Profile::default()
    };

    let mut config = cfg::load_config_or_default();
    config.profiles.insert(profile_name.clone(), profile);
    config.default_profile = Some(profile_name.clone());
    cfg::save_config(&config)?;

    eprintln!("\n✓ Configuration written to {}", config_path.display());
    eprintln!("  Active profile: {profile_name}");
    eprintln!("\n  Test it: gamenet dashboard");
    Ok(())
}
