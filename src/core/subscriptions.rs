use crate::core::credential::{AuthStrategy, Authenticator, Credential};
use crate::core::errors::{Error, Result};
use crate::core::management::ArmClient;
use async_trait::async_trait;
use log::{debug, info};
use serde::{Deserialize, Serialize};

/*-------------------------------------------------------------------------------------------------
  Subscription
-------------------------------------------------------------------------------------------------*/

/// An Azure subscription linked to the authenticated identity.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub subscription_id: String,

    #[serde(default)]
    pub display_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
}

impl std::fmt::Display for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.display_name, self.subscription_id)
    }
}

/*-------------------------------------------------------------------------------------------------
  Subscription Selection
-------------------------------------------------------------------------------------------------*/

/// The answer to "which subscription should be searched for the site?".
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SubscriptionChoice {
    All,
    One(String),
}

/// Asks someone to pick among several linked subscriptions. Implementations may wait
/// indefinitely for the answer.
#[async_trait]
pub trait SubscriptionChooser: Send + Sync {
    async fn choose(&self, subscriptions: &[Subscription]) -> Result<SubscriptionChoice>;
}

/// Candidate subscription ids: the only linked subscription, or the chooser's answer when
/// there are several.
pub async fn select_subscriptions(
    linked: &[Subscription],
    chooser: &dyn SubscriptionChooser,
) -> Result<Vec<String>> {
    match linked {
        [] => Err(Error::AuthenticationFailure(
            "no subscriptions are linked to the signed-in identity".to_string(),
        )),
        [only] => {
            debug!("Using the only linked subscription {only}");
            Ok(vec![only.subscription_id.clone()])
        }
        _ => match chooser.choose(linked).await? {
            SubscriptionChoice::All => Ok(linked
                .iter()
                .map(|subscription| subscription.subscription_id.clone())
                .collect()),
            SubscriptionChoice::One(subscription_id) => Ok(vec![subscription_id]),
        },
    }
}

/*-------------------------------------------------------------------------------------------------
  Session
-------------------------------------------------------------------------------------------------*/

/// An authenticated identity and the subscriptions to search for the site.
#[derive(Clone, Debug)]
pub struct Session {
    pub credential: Credential,
    pub subscription_ids: Vec<String>,
}

/// Authenticate, list the linked subscriptions, and settle on the candidate subscriptions.
pub async fn resolve_session(
    authenticator: &Authenticator,
    strategy: &AuthStrategy,
    chooser: &dyn SubscriptionChooser,
) -> Result<Session> {
    let credential = authenticator.authenticate(strategy).await?;
    let linked = ArmClient::new(credential.clone())
        .list_subscriptions()
        .await?;
    let subscription_ids = select_subscriptions(&linked, chooser).await?;
    info!("Candidate subscription(s): {}", subscription_ids.join(","));

    Ok(Session {
        credential,
        subscription_ids,
    })
}

/// Authenticate for a fixed set of subscriptions, skipping the subscription listing.
pub async fn resolve_fixed_session(
    authenticator: &Authenticator,
    strategy: &AuthStrategy,
    subscription_ids: Vec<String>,
) -> Result<Session> {
    if subscription_ids.is_empty() {
        return Err(Error::Configuration(
            "at least one subscription id is required".to_string(),
        ));
    }
    let credential = authenticator.authenticate(strategy).await?;
    Ok(Session {
        credential,
        subscription_ids,
    })
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingChooser {
        answer: SubscriptionChoice,
        prompts: AtomicUsize,
    }

    impl CountingChooser {
        fn new(answer: SubscriptionChoice) -> Self {
            Self {
                answer,
                prompts: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SubscriptionChooser for CountingChooser {
        async fn choose(&self, _subscriptions: &[Subscription]) -> Result<SubscriptionChoice> {
            self.prompts.fetch_add(1, Ordering::SeqCst);
            Ok(self.answer.clone())
        }
    }

    fn subscription(id: &str, name: &str) -> Subscription {
        Subscription {
            subscription_id: id.to_string(),
            display_name: name.to_string(),
            state: Some("Enabled".to_string()),
            tenant_id: None,
        }
    }

    #[tokio::test]
    async fn test_single_subscription_is_used_without_prompt() {
        let chooser = CountingChooser::new(SubscriptionChoice::All);
        let linked = [subscription("sub-a", "Production")];

        let selected = select_subscriptions(&linked, &chooser).await.unwrap();

        assert_eq!(selected, ["sub-a"]);
        assert_eq!(chooser.prompts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_several_subscriptions_prompt_once() {
        let chooser = CountingChooser::new(SubscriptionChoice::One("sub-b".to_string()));
        let linked = [
            subscription("sub-a", "Production"),
            subscription("sub-b", "Staging"),
        ];

        let selected = select_subscriptions(&linked, &chooser).await.unwrap();

        assert_eq!(selected, ["sub-b"]);
        assert_eq!(chooser.prompts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_all_subscriptions_keeps_listing_order() {
        let chooser = CountingChooser::new(SubscriptionChoice::All);
        let linked = [
            subscription("sub-a", "Production"),
            subscription("sub-b", "Staging"),
            subscription("sub-c", "Sandbox"),
        ];

        let selected = select_subscriptions(&linked, &chooser).await.unwrap();
        assert_eq!(selected, ["sub-a", "sub-b", "sub-c"]);
    }

    #[tokio::test]
    async fn test_no_linked_subscription_fails_authentication() {
        let chooser = CountingChooser::new(SubscriptionChoice::All);

        let result = select_subscriptions(&[], &chooser).await;
        assert!(matches!(result, Err(Error::AuthenticationFailure(_))));
    }

    #[tokio::test]
    async fn test_fixed_session_requires_subscriptions() {
        let strategy = AuthStrategy::ManagedIdentity {
            endpoint: "http://127.0.0.1:41741/MSI/token/".to_string(),
            secret: "secret".to_string(),
        };

        let result = resolve_fixed_session(&Authenticator::new(), &strategy, Vec::new()).await;
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_subscription_from_listing() {
        let subscription: Subscription = serde_json::from_str(
            r#"{
              "id": "/subscriptions/19330910-cc1d-4514-9cdb-0979fc1d3486",
              "subscriptionId": "19330910-cc1d-4514-9cdb-0979fc1d3486",
              "tenantId": "72f988bf-86f1-41af-91ab-2d7cd011db47",
              "displayName": "Visual Studio Enterprise",
              "state": "Enabled"
            }"#,
        )
        .unwrap();

        assert_eq!(
            subscription.to_string(),
            "Visual Studio Enterprise (19330910-cc1d-4514-9cdb-0979fc1d3486)"
        );
    }
}
