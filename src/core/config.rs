use log::{info, warn};
use std::env;

/*-------------------------------------------------------------------------------------------------
  Configuration
-------------------------------------------------------------------------------------------------*/

/// Prefix of the environment variables read by the crate.
pub const ENV_PREFIX: &str = "WEBAPP_IP_RESTRICTION_";

/// Download page for the "Azure IP Ranges and Service Tags - Public Cloud" document.
pub const DEFAULT_CATALOG_URL: &str =
    "https://www.microsoft.com/en-us/download/confirmation.aspx?id=56519";

/*--------------------------------------------------------------------------------------
  Azure Resource Manager
--------------------------------------------------------------------------------------*/

pub const MANAGEMENT_ENDPOINT: &str = "https://management.azure.com";
pub const MANAGEMENT_RESOURCE: &str = "https://management.azure.com/";
pub const MANAGEMENT_SCOPE: &str = "https://management.azure.com/.default";

pub const WEB_API_VERSION: &str = "2022-03-01";
pub const SUBSCRIPTIONS_API_VERSION: &str = "2020-01-01";

/*--------------------------------------------------------------------------------------
  Microsoft Identity Platform
--------------------------------------------------------------------------------------*/

pub const AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

/// Tenant used by the interactive login when none is given.
pub const DEFAULT_INTERACTIVE_TENANT: &str = "organizations";

/// Public client id of the Azure CLI, used for the device code login.
pub const INTERACTIVE_CLIENT_ID: &str = "04b07795-8ddb-461a-bbee-02f9e1bf7b46";

pub const MSI_API_VERSION: &str = "2017-09-01";

/*-------------------------------------------------------------------------------------------------
  Helper Functions
-------------------------------------------------------------------------------------------------*/

/// Get and parse an environment variable value or return a default value.
pub fn get_env_var<T: std::str::FromStr>(env_var: &str, default: T) -> T {
    env::var(env_var)
        .ok()
        .and_then(|value| {
            value
                .parse::<T>()
                .inspect(|_| info!("Using {}: {}", env_var, value))
                .inspect_err(|_| warn!("Invalid {}: {}", env_var, value))
                .ok()
        })
        .unwrap_or(default)
}

/// Get an environment variable holding a non-empty value.
pub fn get_optional_env_var(env_var: &str) -> Option<String> {
    env::var(env_var)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Name of one of the crate's own environment variables.
pub fn env_var_name(suffix: &str) -> String {
    format!("{ENV_PREFIX}{suffix}")
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
