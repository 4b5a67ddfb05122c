/*-------------------------------------------------------------------------------------------------
  Errors and Results
-------------------------------------------------------------------------------------------------*/

use thiserror::Error as ThisError;

/// Errors that can occur while synchronizing a site's IP restrictions. Every error is terminal
/// for the run; nothing in the crate retries or recovers locally.
#[derive(Debug, ThisError)]
pub enum Error {
    /// The catalog download page did not contain an HTTPS link to a JSON document.
    #[error("couldn't get the service tag JSON url from `{page_url}`")]
    CatalogLinkNotFound { page_url: String },

    /// No authentication strategy produced a usable credential.
    #[error("authentication failed: {0}")]
    AuthenticationFailure(String),

    /// None of the candidate subscriptions contains a site with the requested name.
    #[error(
        "couldn't find such a site `{site_name}` in subscription(s) {}",
        .subscription_ids.join(",")
    )]
    SiteNotFound {
        site_name: String,
        subscription_ids: Vec<String>,
    },

    /// The configuration write was rejected; the site was not changed.
    #[error("failed to update the configuration of `{site}`: {source}")]
    ConfigurationWriteFailure {
        site: String,
        #[source]
        source: Box<Error>,
    },

    /// The configuration write succeeded, but reading it back failed.
    #[error("the configuration of `{site}` was updated, but reading it back failed: {source}")]
    ConfigurationReadFailure {
        site: String,
        #[source]
        source: Box<Error>,
    },

    /// The management API answered with a non-success status.
    #[error("management API returned {status}: {message}")]
    ManagementApi { status: u16, message: String },

    #[error("invalid resource id: {0}")]
    InvalidResourceId(String),

    #[error("invalid service tag pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
