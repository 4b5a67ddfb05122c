use crate::core::config;
use crate::core::errors::{Error, Result};
use log::{debug, info, warn};
use serde::Deserialize;
use std::fmt;
use std::future::Future;
use std::time::Duration;

/*-------------------------------------------------------------------------------------------------
  Credential
-------------------------------------------------------------------------------------------------*/

/// Bearer token for the Azure Resource Manager API, valid for one run.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    access_token: String,
}

impl Credential {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
        }
    }

    pub fn bearer_token(&self) -> &str {
        &self.access_token
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/*-------------------------------------------------------------------------------------------------
  Authentication Strategy
-------------------------------------------------------------------------------------------------*/

/// How the run obtains its [Credential].
#[derive(Clone, PartialEq, Eq)]
pub enum AuthStrategy {
    /// App Service managed identity, through the local MSI endpoint.
    ManagedIdentity { endpoint: String, secret: String },

    /// Service principal with a client secret.
    ServicePrincipal {
        client_id: String,
        client_secret: String,
        tenant_id: String,
    },

    /// Device code login completed by a human in a browser.
    Interactive { tenant_id: Option<String> },
}

impl AuthStrategy {
    /// Service principal when all three values are given, interactive login otherwise.
    pub fn from_inputs(
        client_id: Option<String>,
        client_secret: Option<String>,
        tenant_id: Option<String>,
    ) -> Self {
        match (client_id, client_secret, tenant_id) {
            (Some(client_id), Some(client_secret), Some(tenant_id)) => {
                AuthStrategy::ServicePrincipal {
                    client_id,
                    client_secret,
                    tenant_id,
                }
            }
            (_, _, tenant_id) => AuthStrategy::Interactive { tenant_id },
        }
    }

    /// Managed identity from the `MSI_ENDPOINT` and `MSI_SECRET` environment variables.
    pub fn managed_identity_from_env() -> Result<Self> {
        let endpoint = config::get_optional_env_var("MSI_ENDPOINT");
        let secret = config::get_optional_env_var("MSI_SECRET");
        match (endpoint, secret) {
            (Some(endpoint), Some(secret)) => {
                Ok(AuthStrategy::ManagedIdentity { endpoint, secret })
            }
            _ => Err(Error::AuthenticationFailure(
                "managed identity requires MSI_ENDPOINT and MSI_SECRET".to_string(),
            )),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AuthStrategy::ManagedIdentity { .. } => "managed identity",
            AuthStrategy::ServicePrincipal { .. } => "service principal",
            AuthStrategy::Interactive { .. } => "interactive login",
        }
    }

    pub fn is_interactive(&self) -> bool {
        matches!(self, AuthStrategy::Interactive { .. })
    }
}

impl fmt::Debug for AuthStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthStrategy::ManagedIdentity { endpoint, .. } => f
                .debug_struct("ManagedIdentity")
                .field("endpoint", endpoint)
                .field("secret", &"<redacted>")
                .finish(),
            AuthStrategy::ServicePrincipal {
                client_id,
                tenant_id,
                ..
            } => f
                .debug_struct("ServicePrincipal")
                .field("client_id", client_id)
                .field("client_secret", &"<redacted>")
                .field("tenant_id", tenant_id)
                .finish(),
            AuthStrategy::Interactive { tenant_id } => f
                .debug_struct("Interactive")
                .field("tenant_id", tenant_id)
                .finish(),
        }
    }
}

/*-------------------------------------------------------------------------------------------------
  Token Endpoint Responses
-------------------------------------------------------------------------------------------------*/

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DeviceCodeResponse {
    device_code: String,
    message: String,
    expires_in: u64,
    #[serde(default = "default_poll_interval")]
    interval: u64,
}

fn default_poll_interval() -> u64 {
    5
}

/// What to do after a device code token request failed.
#[derive(Debug, PartialEq, Eq)]
enum PollOutcome {
    Pending,
    SlowDown,
    Failed(String),
}

fn poll_outcome(error: &TokenErrorResponse) -> PollOutcome {
    match error.error.as_str() {
        "authorization_pending" => PollOutcome::Pending,
        "slow_down" => PollOutcome::SlowDown,
        _ => PollOutcome::Failed(
            error
                .error_description
                .clone()
                .unwrap_or_else(|| error.error.clone()),
        ),
    }
}

/// One answer of the token endpoint while a device code login is pending.
#[derive(Debug)]
enum PollResponse {
    Token(TokenResponse),
    Error(TokenErrorResponse),
}

/// Poll every `interval` until the token arrives, the login fails, or `expires_in` elapses.
/// `slow_down` answers stretch the interval by five seconds.
async fn poll_device_code<F, Fut>(
    mut interval: Duration,
    expires_in: Duration,
    mut poll: F,
) -> Result<TokenResponse>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<PollResponse>>,
{
    let deadline = tokio::time::Instant::now() + expires_in;

    loop {
        tokio::time::sleep(interval).await;
        if tokio::time::Instant::now() > deadline {
            return Err(Error::AuthenticationFailure(
                "the device code expired before the login completed".to_string(),
            ));
        }

        let error = match poll().await? {
            PollResponse::Token(token) => return Ok(token),
            PollResponse::Error(error) => error,
        };
        match poll_outcome(&error) {
            PollOutcome::Pending => debug!("Waiting for the interactive login"),
            PollOutcome::SlowDown => {
                interval += Duration::from_secs(5);
                debug!("Slow down; polling every {} seconds", interval.as_secs());
            }
            PollOutcome::Failed(message) => return Err(Error::AuthenticationFailure(message)),
        }
    }
}

/*-------------------------------------------------------------------------------------------------
  Authenticator
-------------------------------------------------------------------------------------------------*/

/// Acquires Azure Resource Manager tokens for an [AuthStrategy].
#[derive(Debug, Clone)]
pub struct Authenticator {
    http: reqwest::Client,
    authority_host: String,
}

impl Default for Authenticator {
    fn default() -> Self {
        Self {
            http: reqwest::Client::new(),
            authority_host: config::AUTHORITY_HOST.to_string(),
        }
    }
}

impl Authenticator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire a credential; every failure is reported as [Error::AuthenticationFailure].
    pub async fn authenticate(&self, strategy: &AuthStrategy) -> Result<Credential> {
        info!("Authenticate with {}", strategy.label());
        let token = match strategy {
            AuthStrategy::ManagedIdentity { endpoint, secret } => {
                self.managed_identity_token(endpoint, secret).await
            }
            AuthStrategy::ServicePrincipal {
                client_id,
                client_secret,
                tenant_id,
            } => {
                self.client_secret_token(client_id, client_secret, tenant_id)
                    .await
            }
            AuthStrategy::Interactive { tenant_id } => {
                let tenant_id = tenant_id
                    .as_deref()
                    .unwrap_or(config::DEFAULT_INTERACTIVE_TENANT);
                self.device_code_token(tenant_id).await
            }
        };

        token
            .map(|token| Credential::new(token.access_token))
            .map_err(|error| match error {
                Error::AuthenticationFailure(_) => error,
                other => Error::AuthenticationFailure(other.to_string()),
            })
    }

    /*-------------------------------------------------------------------------
      Private Methods
    -------------------------------------------------------------------------*/

    async fn managed_identity_token(&self, endpoint: &str, secret: &str) -> Result<TokenResponse> {
        debug!("Request managed identity token from {endpoint}");
        let response = self
            .http
            .get(endpoint)
            .query(&[
                ("resource", config::MANAGEMENT_RESOURCE),
                ("api-version", config::MSI_API_VERSION),
            ])
            .header("Secret", secret)
            .send()
            .await?;
        token_from_response(response).await
    }

    async fn client_secret_token(
        &self,
        client_id: &str,
        client_secret: &str,
        tenant_id: &str,
    ) -> Result<TokenResponse> {
        debug!("Request service principal token for client {client_id} in tenant {tenant_id}");
        let response = self
            .http
            .post(self.token_url(tenant_id))
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", client_id),
                ("client_secret", client_secret),
                ("scope", config::MANAGEMENT_SCOPE),
            ])
            .send()
            .await?;
        token_from_response(response).await
    }

    async fn device_code_token(&self, tenant_id: &str) -> Result<TokenResponse> {
        let response = self
            .http
            .post(format!(
                "{}/{tenant_id}/oauth2/v2.0/devicecode",
                self.authority_host
            ))
            .form(&[
                ("client_id", config::INTERACTIVE_CLIENT_ID),
                ("scope", config::MANAGEMENT_SCOPE),
            ])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(token_error(response).await);
        }
        let device_code: DeviceCodeResponse = response.json().await?;

        // The user completes the login in a browser.
        eprintln!("{}", device_code.message);

        poll_device_code(
            Duration::from_secs(device_code.interval),
            Duration::from_secs(device_code.expires_in),
            || self.device_code_poll(tenant_id, &device_code.device_code),
        )
        .await
    }

    async fn device_code_poll(&self, tenant_id: &str, device_code: &str) -> Result<PollResponse> {
        let response = self
            .http
            .post(self.token_url(tenant_id))
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:device_code"),
                ("client_id", config::INTERACTIVE_CLIENT_ID),
                ("device_code", device_code),
            ])
            .send()
            .await?;

        if response.status().is_success() {
            Ok(PollResponse::Token(response.json().await?))
        } else {
            Ok(PollResponse::Error(response.json().await?))
        }
    }

    fn token_url(&self, tenant_id: &str) -> String {
        format!("{}/{tenant_id}/oauth2/v2.0/token", self.authority_host)
    }
}

/*-------------------------------------------------------------------------------------------------
  Helper Functions
-------------------------------------------------------------------------------------------------*/

async fn token_from_response(response: reqwest::Response) -> Result<TokenResponse> {
    if response.status().is_success() {
        Ok(response.json().await?)
    } else {
        Err(token_error(response).await)
    }
}

async fn token_error(response: reqwest::Response) -> Error {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    warn!("Token request failed with {status}");

    let message = serde_json::from_str::<TokenErrorResponse>(&body)
        .map(|error| error.error_description.unwrap_or(error.error))
        .unwrap_or(body);
    Error::AuthenticationFailure(format!("{status}: {message}"))
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
