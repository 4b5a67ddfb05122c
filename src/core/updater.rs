use crate::core::errors::{Error, Result};
use crate::core::management::{IpSecurityRestriction, Site, SiteConfiguration, SiteManagement};
use crate::core::restrictions::RestrictionTarget;
use log::info;

/*-------------------------------------------------------------------------------------------------
  Configuration Updater
-------------------------------------------------------------------------------------------------*/

/// Replace the targeted access-control list of the site (or slot), then read back the
/// resulting configuration.
///
/// The write and the read are separate calls. When the write succeeds and the read fails the
/// update has taken effect, and the error is [Error::ConfigurationReadFailure] so the caller
/// can tell it apart from a rejected write ([Error::ConfigurationWriteFailure]).
pub async fn update(
    management: &dyn SiteManagement,
    site: &Site,
    slot: Option<&str>,
    entries: Vec<IpSecurityRestriction>,
    target: RestrictionTarget,
) -> Result<SiteConfiguration> {
    let site_label = match slot {
        Some(slot) => format!("{}/{slot}", site.name),
        None => site.name.clone(),
    };

    let entry_count = entries.len();
    let configuration = match target {
        RestrictionTarget::Main => SiteConfiguration {
            ip_security_restrictions: Some(entries),
            ..SiteConfiguration::default()
        },
        RestrictionTarget::Scm => SiteConfiguration {
            scm_ip_security_restrictions: Some(entries),
            ..SiteConfiguration::default()
        },
    };

    info!("Writing {entry_count} restriction(s) to the {target} of `{site_label}`");
    management
        .update_configuration(site, slot, &configuration)
        .await
        .map_err(|error| Error::ConfigurationWriteFailure {
            site: site_label.clone(),
            source: Box::new(error),
        })?;

    management
        .get_configuration(site, slot)
        .await
        .map_err(|error| Error::ConfigurationReadFailure {
            site: site_label,
            source: Box::new(error),
        })
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
