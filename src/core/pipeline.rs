use crate::core::client::CatalogSource;
use crate::core::errors::Result;
use crate::core::locator::locate;
use crate::core::management::{SiteConfiguration, SiteManagement};
use crate::core::request::UpdateRequest;
use crate::core::restrictions::transform;
use crate::core::service_tag::ServiceTag;
use crate::core::subscriptions::Session;
use crate::core::updater::update;
use log::{debug, info};
use std::future::Future;

/*-------------------------------------------------------------------------------------------------
  Pipeline
-------------------------------------------------------------------------------------------------*/

/// Run the catalog fetch and the credential resolution concurrently and wait for both. The
/// first failure ends the join and the other branch is dropped.
pub async fn fetch_and_authenticate<A>(
    catalog: &dyn CatalogSource,
    session: A,
) -> Result<(Vec<ServiceTag>, Session)>
where
    A: Future<Output = Result<Session>>,
{
    let (service_tags, session) = tokio::try_join!(catalog.service_tags(), session)?;
    debug!(
        "Fetched {} service tags; {} candidate subscription(s)",
        service_tags.len(),
        session.subscription_ids.len()
    );
    Ok((service_tags, session))
}

/// Locate the request's site, transform its service tags, and write them to the targeted list.
pub async fn apply(
    request: &UpdateRequest,
    management: &dyn SiteManagement,
) -> Result<SiteConfiguration> {
    let site = locate(management, request.subscription_ids(), request.site_name()).await?;

    let entries = transform(request.service_tags(), request.priority())?;
    info!(
        "{} service tag(s) expand to {} restriction(s)",
        request.service_tags().len(),
        entries.len()
    );

    update(
        management,
        &site,
        request.slot_name(),
        entries,
        request.target(),
    )
    .await
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
