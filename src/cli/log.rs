use crate::cli;
use log::{info, warn};
use webapp_ip_restriction::{AuthStrategy, ServiceTag, SiteConfiguration, UpdateRequest};

/*-------------------------------------------------------------------------------------------------
  Logging Functions
-------------------------------------------------------------------------------------------------*/

/*--------------------------------------------------------------------------------------
  Settings
--------------------------------------------------------------------------------------*/

pub fn settings(args: &cli::Args, strategy: &AuthStrategy) {
    if let Some(site_name) = &args.site_name {
        info!("Site name: {site_name}");
    }
    if let Some(slot_name) = &args.slot_name {
        info!("Slot name: {slot_name}");
    }
    if let Some(service_tag) = &args.service_tag {
        let kind = if args.regexp { "pattern" } else { "id" };
        info!("Service tag {kind}: {service_tag}");
    }
    info!("Update the SCM site: {}", args.scm);

    match strategy {
        AuthStrategy::ServicePrincipal {
            client_id,
            tenant_id,
            ..
        } => {
            info!("Client id: {client_id}");
            info!("Client secret: {}", mask(args.client_secret.as_deref()));
            info!("Tenant id: {tenant_id}");
        }
        _ => info!("Authentication: {}", strategy.label()),
    }
}

/// Hide everything but the first two characters of a secret.
pub fn mask(secret: Option<&str>) -> String {
    match secret {
        Some(secret) if secret.chars().count() > 2 => {
            let visible: String = secret.chars().take(2).collect();
            format!("{visible}{}", "*".repeat(secret.chars().count() - 2))
        }
        Some(secret) => "*".repeat(secret.chars().count()),
        None => String::new(),
    }
}

/*--------------------------------------------------------------------------------------
  Filtered Service Tags
--------------------------------------------------------------------------------------*/

pub fn filtered_service_tags(service_tags: &[ServiceTag], request: &UpdateRequest) {
    let prefix_count: usize = service_tags
        .iter()
        .map(|service_tag| service_tag.address_prefixes().len())
        .sum();
    info!(
        "Allowing {prefix_count} address prefix(es) from {} service tag(s) on the {} of `{}`",
        service_tags.len(),
        request.target(),
        request.site_name()
    );

    if service_tags.is_empty() {
        warn!("No service tag matched; the targeted list will be emptied");
    }
}

/*--------------------------------------------------------------------------------------
  Resulting Configuration
--------------------------------------------------------------------------------------*/

pub fn configuration(configuration: &SiteConfiguration) {
    let count = |list: &Option<Vec<_>>| list.as_ref().map(Vec::len).unwrap_or_default();
    info!(
        "The site now has {} main and {} SCM restriction(s)",
        count(&configuration.ip_security_restrictions),
        count(&configuration.scm_ip_security_restrictions)
    );
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask(Some("s3cr3t")), "s3****");
        assert_eq!(mask(Some("ab")), "**");
        assert_eq!(mask(None), "");
    }
}
