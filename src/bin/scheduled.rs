use chrono::Utc;
use log::{error, info};
use std::process::ExitCode;
use webapp_ip_restriction::config::{env_var_name, get_env_var, get_optional_env_var};
use webapp_ip_restriction::{
    pipeline, resolve_fixed_session, ArmClient, AuthStrategy, Authenticator, CatalogClient, Error,
    RestrictionTarget, Result, TagFilter, UpdateRequestBuilder,
};

/*-------------------------------------------------------------------------------------------------
  Scheduled Run Configuration
-------------------------------------------------------------------------------------------------*/

/// Fixed configuration of the scheduled run, read from `WEBAPP_IP_RESTRICTION_*` variables.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ScheduledConfig {
    site_name: String,
    service_tag: String,
    subscription_ids: Vec<String>,
    slot_name: Option<String>,
    scm: bool,
}

impl ScheduledConfig {
    fn from_env() -> Result<Self> {
        Self::from_lookup(|suffix| get_optional_env_var(&env_var_name(suffix)))
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |suffix: &str| {
            lookup(suffix).ok_or_else(|| {
                Error::Configuration(format!("{} is not set", env_var_name(suffix)))
            })
        };

        let site_name = required("SITE_NAME")?;
        let service_tag = required("SERVICE_TAG")?;
        let subscription_ids = parse_subscription_ids(&required("SUBSCRIPTION_IDS")?);
        if subscription_ids.is_empty() {
            return Err(Error::Configuration(format!(
                "{} lists no subscription ids",
                env_var_name("SUBSCRIPTION_IDS")
            )));
        }

        let scm = match lookup("SCM") {
            Some(value) => value.parse().map_err(|_| {
                Error::Configuration(format!(
                    "{} must be `true` or `false`, not `{value}`",
                    env_var_name("SCM")
                ))
            })?,
            None => false,
        };

        Ok(Self {
            site_name,
            service_tag,
            subscription_ids,
            slot_name: lookup("SLOT_NAME"),
            scm,
        })
    }
}

fn parse_subscription_ids(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

/*-------------------------------------------------------------------------------------------------
  Main Function
-------------------------------------------------------------------------------------------------*/

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let verbosity: usize = get_env_var(&env_var_name("LOG_LEVEL"), 2);
    if let Err(error) = stderrlog::new()
        .modules([module_path!(), "webapp_ip_restriction"])
        .verbosity(verbosity)
        .timestamp(stderrlog::Timestamp::Second)
        .init()
    {
        eprintln!("Failed to initialize logging: {error}");
    }

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!("Scheduled update failed: {error}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let config = ScheduledConfig::from_env()?;
    let strategy = AuthStrategy::managed_identity_from_env()?;
    let filter = TagFilter::exact(&config.service_tag);
    info!(
        "Scheduled update of `{}` from service tag {}",
        config.site_name, config.service_tag
    );

    let authenticator = Authenticator::new();
    let (service_tags, session) = pipeline::fetch_and_authenticate(
        &CatalogClient::new(),
        resolve_fixed_session(&authenticator, &strategy, config.subscription_ids.clone()),
    )
    .await?;

    let request = UpdateRequestBuilder::new(&config.site_name)
        .slot_name(config.slot_name.clone())
        .target(RestrictionTarget::from_scm_flag(config.scm))
        .service_tags(filter.apply(&service_tags))
        .subscription_ids(session.subscription_ids)
        .build()?;

    let configuration = pipeline::apply(&request, &ArmClient::new(session.credential)).await?;

    info!(
        "Updated `{}` at {}: {}",
        config.site_name,
        Utc::now().to_rfc3339(),
        serde_json::to_string(&configuration)?
    );
    Ok(())
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
