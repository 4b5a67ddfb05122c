use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/*-------------------------------------------------------------------------------------------------
  Command Line Interface (CLI) Arguments
-------------------------------------------------------------------------------------------------*/

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Update a web app's IP restrictions from the Azure IP ranges (service tags).",
    long_about = None
)]
pub struct Args {
    /// Target site name
    #[arg(
        short = 'n',
        long = "sitename",
        required_unless_present = "show_all_ip_ranges"
    )]
    pub site_name: Option<String>,

    /// Service tag used for filtering the IP ranges (e.g. AzureCloud.eastasia)
    #[arg(
        short = 't',
        long = "servicetag",
        required_unless_present = "show_all_ip_ranges"
    )]
    pub service_tag: Option<String>,

    /// Handle the --servicetag value as a regular expression
    #[arg(short = 'r', long = "regexp")]
    pub regexp: bool,

    /// Update the SCM site's restrictions instead of the main site's
    #[arg(short = 's', long)]
    pub scm: bool,

    /// Target slot name of the site
    #[arg(short = 'S', long = "slotname")]
    pub slot_name: Option<String>,

    /// Client id of the service principal
    #[arg(long, env = "AZURE_CLIENT_ID")]
    pub client_id: Option<String>,

    /// Secret of the service principal
    #[arg(long, env = "AZURE_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Tenant id of the service principal (or of the interactive login)
    #[arg(long, env = "AZURE_TENANT_ID")]
    pub tenant_id: Option<String>,

    /// Priority of the first generated restriction
    #[arg(long, requires = "priority_gap", value_parser = priority_parser())]
    pub priority_start: Option<i64>,

    /// Priority step between generated restrictions
    #[arg(long, requires = "priority_start", value_parser = priority_parser())]
    pub priority_gap: Option<i64>,

    /// Show all IP ranges of the Azure data centers and exit without updating anything
    #[arg(long)]
    pub show_all_ip_ranges: bool,

    /// Download page linking to the service tag JSON document
    #[arg(long, env = "WEBAPP_IP_RESTRICTION_CATALOG_URL")]
    pub catalog_url: Option<String>,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value_t = OutputFormat::Json)]
    pub output: OutputFormat,

    /// Save all IP ranges to a CSV file (with --show-all-ip-ranges)
    #[arg(long = "csv", requires = "show_all_ip_ranges")]
    pub csv_file: Option<PathBuf>,

    /// Logging verbosity
    #[command(flatten)]
    pub verbose: clap_verbosity_flag::Verbosity,
}

// Restriction priorities are 32-bit integers.
fn priority_parser() -> clap::builder::RangedI64ValueParser<i64> {
    clap::value_parser!(i64).range(i64::from(i32::MIN)..=i64::from(i32::MAX))
}

/*--------------------------------------------------------------------------------------
  Output Format
--------------------------------------------------------------------------------------*/

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON document
    Json,

    /// Table of names and address prefixes
    Table,
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
