use crate::cli;
use log::warn;
use webapp_ip_restriction::{
    AuthStrategy, CatalogClient, CatalogClientBuilder, Priority, RestrictionTarget, Result,
    ServiceTag, TagFilter, UpdateRequest, UpdateRequestBuilder,
};

/*-------------------------------------------------------------------------------------------------
  Core functions
-------------------------------------------------------------------------------------------------*/

/*--------------------------------------------------------------------------------------
  Build the service tag filter from CLI arguments
--------------------------------------------------------------------------------------*/

pub fn build_filter(args: &cli::Args) -> Result<Option<TagFilter>> {
    args.service_tag
        .as_deref()
        .map(|value| TagFilter::from_value(value, args.regexp))
        .transpose()
}

/*--------------------------------------------------------------------------------------
  Build the catalog client from CLI arguments
--------------------------------------------------------------------------------------*/

pub fn build_catalog_client(args: &cli::Args) -> CatalogClient {
    let mut builder = CatalogClientBuilder::new();
    if let Some(url) = &args.catalog_url {
        builder.url(url);
    }
    builder.build()
}

/*--------------------------------------------------------------------------------------
  Select the authentication strategy from CLI arguments
--------------------------------------------------------------------------------------*/

pub fn build_strategy(args: &cli::Args) -> AuthStrategy {
    let strategy = AuthStrategy::from_inputs(
        args.client_id.clone(),
        args.client_secret.clone(),
        args.tenant_id.clone(),
    );
    if strategy.is_interactive() && args.client_id.is_some() {
        warn!("Incomplete service principal credentials; falling back to the interactive login");
    }
    strategy
}

/*--------------------------------------------------------------------------------------
  Build the priority policy from CLI arguments
--------------------------------------------------------------------------------------*/

pub fn build_priority(args: &cli::Args) -> Option<Priority> {
    match (args.priority_start, args.priority_gap) {
        (Some(start), Some(gap)) => Some(Priority { start, gap }),
        _ => None,
    }
}

/*--------------------------------------------------------------------------------------
  Build the update request from CLI arguments
--------------------------------------------------------------------------------------*/

pub fn build_request(
    args: &cli::Args,
    service_tags: Vec<ServiceTag>,
    subscription_ids: Vec<String>,
) -> Result<UpdateRequest> {
    UpdateRequestBuilder::new(args.site_name.as_deref().unwrap_or_default())
        .slot_name(args.slot_name.clone())
        .priority(build_priority(args))
        .target(RestrictionTarget::from_scm_flag(args.scm))
        .service_tags(service_tags)
        .subscription_ids(subscription_ids)
        .build()
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
