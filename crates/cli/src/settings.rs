//! Config resolution and `reitmap config`.

use std::path::{Path, PathBuf};

use clap::Subcommand;

use reitmap_recon::ReconConfig;

use crate::CliError;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Check a config file without running anything
    #[command(after_help = "\
Examples:
  reitmap config validate reitmap.toml
  REITMAP_CONFIG=reitmap.toml reitmap config validate")]
    Validate {
        /// Config file to check (defaults to the resolved config)
        path: Option<PathBuf>,
    },

    /// Print the effective configuration
    Show,
}

/// Where the effective config came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    BuiltIn,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::BuiltIn => write!(f, "built-in defaults"),
        }
    }
}

/// `<config dir>/reitmap/config.toml`, when a config dir exists on this platform.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("reitmap").join("config.toml"))
}

/// Load a config file, parse it and validate it.
pub fn load_file(path: &Path) -> Result<ReconConfig, CliError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| CliError::config(format!("cannot read config {}: {e}", path.display())))?;
    ReconConfig::from_toml(&content).map_err(|e| {
        CliError::config(format!("{}: {e}", path.display()))
            .with_hint(format!("check it with: reitmap config validate {}", path.display()))
    })
}

/// Effective config: explicit path (flag or REITMAP_CONFIG), then the user
/// config file if present, then built-in defaults.
pub fn resolve(explicit: Option<&Path>) -> Result<(ReconConfig, ConfigSource), CliError> {
    if let Some(path) = explicit {
        return Ok((load_file(path)?, ConfigSource::File(path.to_path_buf())));
    }
    if let Some(path) = user_config_path().filter(|p| p.is_file()) {
        log::info!("using config {}", path.display());
        return Ok((load_file(&path)?, ConfigSource::File(path)));
    }
    Ok((ReconConfig::default(), ConfigSource::BuiltIn))
}

pub fn cmd_config(explicit: Option<&Path>, cmd: ConfigCommands) -> Result<(), CliError> {
    match cmd {
        ConfigCommands::Validate { path } => cmd_config_validate(path.as_deref().or(explicit)),
        ConfigCommands::Show => cmd_config_show(explicit),
    }
}

fn cmd_config_validate(path: Option<&Path>) -> Result<(), CliError> {
    let (config, source) = resolve(path)?;
    let c = &config.categories;
    eprintln!(
        "valid: {} ({} categories + '{}', {} feeder codes, {} prefixes)",
        source,
        c.order.len(),
        c.default,
        c.feeders.len(),
        c.prefixes.len(),
    );
    Ok(())
}

fn cmd_config_show(explicit: Option<&Path>) -> Result<(), CliError> {
    let (config, source) = resolve(explicit)?;
    print!("{}", render_config(&config, &source));
    Ok(())
}

fn render_config(config: &ReconConfig, source: &ConfigSource) -> String {
    let ins = &config.columns.inspection;
    let rei = &config.columns.reiterated;
    let cats = &config.categories;
    let order: Vec<&str> = cats.display_order().collect();

    let mut out = String::new();
    out.push_str(&format!("source:               {source}\n"));
    out.push_str(&format!(
        "inspection columns:   device={} installation={} work_order={}\n",
        ins.device, ins.installation, ins.work_order
    ));
    out.push_str(&format!("reiterated columns:   element={} feeder={}\n", rei.element, rei.feeder));
    out.push_str(&format!("reject zero coords:   {}\n", config.geo.reject_zero));
    out.push_str(&format!("document name:        {}\n", config.output.document_name));
    out.push_str(&format!("category order:       {}\n", order.join(", ")));
    out.push_str(&format!("feeder codes:         {}\n", cats.feeders.len()));
    out.push_str(&format!("feeder prefixes:      {}\n", cats.prefixes.len()));
    out
}
