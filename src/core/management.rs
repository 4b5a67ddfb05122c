use crate::core::config;
use crate::core::credential::Credential;
use crate::core::errors::{Error, Result};
use crate::core::subscriptions::Subscription;
use async_trait::async_trait;
use lazy_static::lazy_static;
use log::{debug, info, trace};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/*-------------------------------------------------------------------------------------------------
  Site
-------------------------------------------------------------------------------------------------*/

/// A web app located in one of the candidate subscriptions.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Site {
    /// Fully qualified resource id.
    pub id: String,
    pub name: String,
    pub location: Option<String>,

    /// Resource group owning the site, taken from the resource id.
    pub resource_group: String,

    /// Subscription owning the site, taken from the resource id.
    pub subscription_id: String,
}

lazy_static! {
    static ref RESOURCE_ID: Regex =
        Regex::new(r"(?i)^/subscriptions/([^/]+)/resourceGroups/([^/]+)/").unwrap();
}

impl Site {
    /// Build a [Site] from its resource id, deriving the owning subscription and resource group.
    pub fn from_resource_id(id: &str, name: &str, location: Option<String>) -> Result<Self> {
        let captures = RESOURCE_ID
            .captures(id)
            .ok_or_else(|| Error::InvalidResourceId(id.to_string()))?;

        Ok(Self {
            id: id.to_string(),
            name: name.to_string(),
            location,
            resource_group: captures[2].to_string(),
            subscription_id: captures[1].to_string(),
        })
    }
}

/*-------------------------------------------------------------------------------------------------
  Site Configuration
-------------------------------------------------------------------------------------------------*/

/// One entry of a site's inbound access-control list.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IpSecurityRestriction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Fields the service returns that are not modelled above.
    #[serde(flatten)]
    pub other: serde_json::Map<String, serde_json::Value>,
}

/// The access-control part of a site's `config/web` resource.
///
/// Fields left as `None` are not serialized, so a configuration with a single list set can be
/// sent as a partial update that leaves the other list untouched.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteConfiguration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_security_restrictions: Option<Vec<IpSecurityRestriction>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub scm_ip_security_restrictions: Option<Vec<IpSecurityRestriction>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub scm_ip_security_restrictions_use_main: Option<bool>,
}

/*-------------------------------------------------------------------------------------------------
  Site Management
-------------------------------------------------------------------------------------------------*/

/// Operations on the hosting platform's site management API.
#[async_trait]
pub trait SiteManagement: Send + Sync {
    /// All sites of a subscription.
    async fn list_sites(&self, subscription_id: &str) -> Result<Vec<Site>>;

    /// Read the site's (or slot's) configuration.
    async fn get_configuration(&self, site: &Site, slot: Option<&str>)
        -> Result<SiteConfiguration>;

    /// Write the fields set in `configuration`; unset fields keep their server-side value.
    async fn update_configuration(
        &self,
        site: &Site,
        slot: Option<&str>,
        configuration: &SiteConfiguration,
    ) -> Result<()>;
}

/*-------------------------------------------------------------------------------------------------
  Azure Resource Manager Client
-------------------------------------------------------------------------------------------------*/

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceList<T> {
    #[serde(default = "Vec::new")]
    value: Vec<T>,
    #[serde(default)]
    next_link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SiteResource {
    id: String,
    name: String,
    #[serde(default)]
    location: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ConfigResource {
    #[serde(default)]
    properties: SiteConfiguration,
}

#[derive(Debug, Serialize)]
struct ConfigPatch<'c> {
    properties: &'c SiteConfiguration,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// [SiteManagement] implementation on the Azure Resource Manager REST API.
#[derive(Debug, Clone)]
pub struct ArmClient {
    http: reqwest::Client,
    endpoint: String,
    credential: Credential,
}

impl ArmClient {
    pub fn new(credential: Credential) -> Self {
        Self::with_endpoint(credential, config::MANAGEMENT_ENDPOINT)
    }

    pub fn with_endpoint(credential: Credential, endpoint: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            credential,
        }
    }

    /// Subscriptions the credential's identity can access.
    pub async fn list_subscriptions(&self) -> Result<Vec<Subscription>> {
        let url = format!(
            "{}/subscriptions?api-version={}",
            self.endpoint,
            config::SUBSCRIPTIONS_API_VERSION
        );
        let subscriptions: Vec<Subscription> = self.get_all(url).await?;
        info!("Found {} linked subscription(s)", subscriptions.len());
        Ok(subscriptions)
    }

    /*-------------------------------------------------------------------------
      Private Methods
    -------------------------------------------------------------------------*/

    fn config_url(&self, site: &Site, slot: Option<&str>) -> String {
        let slot_path = slot
            .map(|slot| format!("/slots/{slot}"))
            .unwrap_or_default();
        format!(
            "{}/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Web/sites/{}{}/config/web?api-version={}",
            self.endpoint,
            site.subscription_id,
            site.resource_group,
            site.name,
            slot_path,
            config::WEB_API_VERSION
        )
    }

    /// GET every page of a resource list, following `nextLink`.
    async fn get_all<T: DeserializeOwned>(&self, url: String) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut next = Some(url);
        while let Some(url) = next {
            let page: ResourceList<T> = self.get(&url).await?;
            items.extend(page.value);
            next = page.next_link;
        }
        Ok(items)
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!("GET {url}");
        let response = self
            .http
            .get(url)
            .bearer_auth(self.credential.bearer_token())
            .send()
            .await?;
        let body = checked_body(response).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl SiteManagement for ArmClient {
    async fn list_sites(&self, subscription_id: &str) -> Result<Vec<Site>> {
        let url = format!(
            "{}/subscriptions/{subscription_id}/providers/Microsoft.Web/sites?api-version={}",
            self.endpoint,
            config::WEB_API_VERSION
        );
        let resources: Vec<SiteResource> = self.get_all(url).await?;
        debug!(
            "Subscription {subscription_id} has {} site(s)",
            resources.len()
        );
        resources
            .into_iter()
            .map(|resource| Site::from_resource_id(&resource.id, &resource.name, resource.location))
            .collect()
    }

    async fn get_configuration(
        &self,
        site: &Site,
        slot: Option<&str>,
    ) -> Result<SiteConfiguration> {
        let resource: ConfigResource = self.get(&self.config_url(site, slot)).await?;
        Ok(resource.properties)
    }

    async fn update_configuration(
        &self,
        site: &Site,
        slot: Option<&str>,
        configuration: &SiteConfiguration,
    ) -> Result<()> {
        let url = self.config_url(site, slot);
        debug!("PATCH {url}");
        let patch = ConfigPatch {
            properties: configuration,
        };
        trace!("{}", serde_json::to_string(&patch)?);

        let response = self
            .http
            .patch(&url)
            .bearer_auth(self.credential.bearer_token())
            .json(&patch)
            .send()
            .await?;
        checked_body(response).await?;
        Ok(())
    }
}

/*-------------------------------------------------------------------------------------------------
  Helper Functions
-------------------------------------------------------------------------------------------------*/

/// Response body of a successful call, or the service's error message.
async fn checked_body(response: reqwest::Response) -> Result<String> {
    let status = response.status();
    let body = response.text().await?;
    if status.is_success() {
        Ok(body)
    } else {
        Err(Error::ManagementApi {
            status: status.as_u16(),
            message: error_message(&body),
        })
    }
}

fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(ErrorResponse {
            error: ErrorDetail { code, message },
        }) => match (code, message) {
            (Some(code), Some(message)) => format!("{code}: {message}"),
            (None, Some(message)) => message,
            (Some(code), None) => code,
            (None, None) => body.to_string(),
        },
        Err(_) => body.to_string(),
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
