use crate::core::errors::{Error, Result};
use crate::core::management::{Site, SiteManagement};
use futures::future::try_join_all;
use log::{debug, info};

/*-------------------------------------------------------------------------------------------------
  Site Locator
-------------------------------------------------------------------------------------------------*/

/// Find the site named `site_name` (case-insensitive) in the candidate subscriptions.
///
/// The subscriptions are listed concurrently. The first subscription, in `subscription_ids`
/// order, containing a match wins, and within it the first matching site.
pub async fn locate(
    management: &dyn SiteManagement,
    subscription_ids: &[String],
    site_name: &str,
) -> Result<Site> {
    debug!(
        "Looking for site `{site_name}` in {} subscription(s)",
        subscription_ids.len()
    );
    let listings = try_join_all(
        subscription_ids
            .iter()
            .map(|subscription_id| management.list_sites(subscription_id)),
    )
    .await?;

    let site_name_lowercase = site_name.to_lowercase();
    let site = listings
        .into_iter()
        .flatten()
        .find(|site| site.name.to_lowercase() == site_name_lowercase)
        .ok_or_else(|| Error::SiteNotFound {
            site_name: site_name.to_string(),
            subscription_ids: subscription_ids.to_vec(),
        })?;

    info!(
        "Found site `{}` in resource group `{}` of subscription {}",
        site.name, site.resource_group, site.subscription_id
    );
    Ok(site)
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::management::tests::{test_site, FakeSiteManagement};

    fn ids(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    #[test_log::test(tokio::test)]
    async fn test_site_found_in_second_subscription() {
        let management = FakeSiteManagement::with_sites(&[
            ("sub-a", "other"),
            ("sub-b", "deno"),
            ("sub-b", "node"),
        ]);

        let site = locate(&management, &ids(&["sub-a", "sub-b"]), "deno")
            .await
            .unwrap();

        assert_eq!(site.name, "deno");
        assert_eq!(site.subscription_id, "sub-b");
        assert_eq!(management.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_site_name_is_case_insensitive() {
        let management = FakeSiteManagement::with_sites(&[("sub-a", "Deno")]);

        let site = locate(&management, &ids(&["sub-a"]), "DENO").await.unwrap();
        assert_eq!(site.name, "Deno");
    }

    #[tokio::test]
    async fn test_first_subscription_in_input_order_wins() {
        let management =
            FakeSiteManagement::with_sites(&[("sub-a", "deno"), ("sub-b", "deno")]);

        let site = locate(&management, &ids(&["sub-b", "sub-a"]), "deno")
            .await
            .unwrap();
        assert_eq!(site.subscription_id, "sub-b");
    }

    #[tokio::test]
    async fn test_first_matching_site_within_subscription_wins() {
        let mut management = FakeSiteManagement::default();
        management.sites.insert(
            "sub-a".to_string(),
            vec![
                test_site("sub-a", "first-rg", "deno"),
                test_site("sub-a", "second-rg", "DENO"),
            ],
        );

        let site = locate(&management, &ids(&["sub-a"]), "deno").await.unwrap();
        assert_eq!(site.resource_group, "first-rg");
    }

    #[tokio::test]
    async fn test_site_not_found_lists_every_subscription() {
        let management =
            FakeSiteManagement::with_sites(&[("sub-a", "other"), ("sub-b", "node")]);

        let error = locate(&management, &ids(&["sub-a", "sub-b"]), "deno")
            .await
            .unwrap_err();

        match error {
            Error::SiteNotFound {
                site_name,
                subscription_ids,
            } => {
                assert_eq!(site_name, "deno");
                assert_eq!(subscription_ids, ["sub-a", "sub-b"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
