//! Keep an Azure Web App's IP restrictions in sync with the published Azure IP ranges.
//!
//! The crate downloads the current "Azure IP Ranges and Service Tags" catalog, selects the
//! service tags to allow, finds the web app across the candidate subscriptions, and replaces
//! the app's main or SCM access-control list with one entry per address prefix.
//!
//! ```no_run
//! use webapp_ip_restriction::*;
//!
//! # async fn demo() -> Result<()> {
//! let strategy = AuthStrategy::managed_identity_from_env()?;
//! let subscription_ids = vec!["19330910-cc1d-4514-9cdb-0979fc1d3486".to_string()];
//! let authenticator = Authenticator::new();
//!
//! let (service_tags, session) = pipeline::fetch_and_authenticate(
//!     &CatalogClient::new(),
//!     resolve_fixed_session(&authenticator, &strategy, subscription_ids),
//! )
//! .await?;
//!
//! let request = UpdateRequestBuilder::new("deno")
//!     .service_tags(TagFilter::exact("AzureCloud.eastasia").apply(&service_tags))
//!     .subscription_ids(session.subscription_ids.clone())
//!     .build()?;
//!
//! let configuration = pipeline::apply(&request, &ArmClient::new(session.credential)).await?;
//! # Ok(())
//! # }
//! ```

/*-------------------------------------------------------------------------------------------------
  Modules
-------------------------------------------------------------------------------------------------*/

mod core;

/*-------------------------------------------------------------------------------------------------
  Library Interface
-------------------------------------------------------------------------------------------------*/

pub use crate::core::client::{
    extract_download_link, get_service_tags, CatalogClient, CatalogClientBuilder, CatalogSource,
};
pub use crate::core::config;
pub use crate::core::credential::{AuthStrategy, Authenticator, Credential};
pub use crate::core::errors::{Error, Result};
pub use crate::core::filter::TagFilter;
pub use crate::core::json::JsonServiceTags;
pub use crate::core::locator::locate;
pub use crate::core::management::{
    ArmClient, IpSecurityRestriction, Site, SiteConfiguration, SiteManagement,
};
pub use crate::core::pipeline;
pub use crate::core::request::{UpdateRequest, UpdateRequestBuilder};
pub use crate::core::restrictions::{transform, Priority, RestrictionTarget};
pub use crate::core::service_tag::{ServiceTag, ServiceTagProperties};
pub use crate::core::subscriptions::{
    resolve_fixed_session, resolve_session, select_subscriptions, Session, Subscription,
    SubscriptionChoice, SubscriptionChooser,
};
pub use crate::core::updater::update;
