use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

#[derive(Parser, Debug)]
#[command(name = "ocitag")]
#[command(about = "Tag every MySQL DB system in an OCI tenancy with its own OCID")]
#[command(version)]
pub struct Cli {
    /// Defined-tag namespace (prompted for when not given)
    #[arg(short, long, env = "OCITAG_NAMESPACE")]
    pub namespace: Option<String>,

    /// Tag key to set (prompted for when not given)
    #[arg(short, long, env = "OCITAG_TAG_NAME")]
    pub tag_name: Option<String>,

    /// OCI config file (defaults to ~/.oci/config)
    #[arg(long, env = "OCI_CLI_CONFIG_FILE")]
    pub config_file: Option<PathBuf>,

    /// Profile in the OCI config file
    #[arg(short, long, env = "OCI_CLI_PROFILE", default_value = "DEFAULT")]
    pub profile: String,

    /// Region (overrides the profile's region)
    #[arg(long)]
    pub region: Option<String>,

    /// Output format
    #[arg(short, long)]
    pub format: Option<OutputFormat>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, env = "OCITAG_LOG", default_value = "warn")]
    pub log_level: String,

    /// Identity service base URL override
    #[arg(long, hide = true)]
    pub identity_endpoint: Option<String>,

    /// MySQL service base URL override
    #[arg(long, hide = true)]
    pub mysql_endpoint: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}
