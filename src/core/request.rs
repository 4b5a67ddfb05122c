use crate::core::errors::{Error, Result};
use crate::core::restrictions::{Priority, RestrictionTarget};
use crate::core::service_tag::ServiceTag;

/*-------------------------------------------------------------------------------------------------
  Update Request Builder
-------------------------------------------------------------------------------------------------*/

/// Builder used to construct an [UpdateRequest] once every input of the run is known.
///
/// ```
/// use webapp_ip_restriction::{RestrictionTarget, UpdateRequestBuilder};
///
/// let request = UpdateRequestBuilder::new("deno")
///     .slot_name(Some("staging".to_string()))
///     .target(RestrictionTarget::Scm)
///     .subscription_ids(vec!["19330910-cc1d-4514-9cdb-0979fc1d3486".to_string()])
///     .build()
///     .unwrap();
///
/// assert_eq!(request.slot_name(), Some("staging"));
/// ```
#[derive(Debug, Clone)]
pub struct UpdateRequestBuilder {
    site_name: String,
    slot_name: Option<String>,
    priority: Option<Priority>,
    target: RestrictionTarget,
    service_tags: Vec<ServiceTag>,
    subscription_ids: Vec<String>,
}

impl UpdateRequestBuilder {
    pub fn new(site_name: &str) -> Self {
        Self {
            site_name: site_name.to_string(),
            slot_name: None,
            priority: None,
            target: RestrictionTarget::Main,
            service_tags: Vec::new(),
            subscription_ids: Vec::new(),
        }
    }

    /*-------------------------------------------------------------------------
      Setters
    -------------------------------------------------------------------------*/

    pub fn slot_name(mut self, slot_name: Option<String>) -> Self {
        self.slot_name = slot_name;
        self
    }

    pub fn priority(mut self, priority: Option<Priority>) -> Self {
        self.priority = priority;
        self
    }

    /// Which access-control list the service tags replace.
    pub fn target(mut self, target: RestrictionTarget) -> Self {
        self.target = target;
        self
    }

    /// The filtered service tags to allow.
    pub fn service_tags(mut self, service_tags: Vec<ServiceTag>) -> Self {
        self.service_tags = service_tags;
        self
    }

    /// The subscriptions searched for the site.
    pub fn subscription_ids(mut self, subscription_ids: Vec<String>) -> Self {
        self.subscription_ids = subscription_ids;
        self
    }

    /*-------------------------------------------------------------------------
      Build Method
    -------------------------------------------------------------------------*/

    pub fn build(self) -> Result<UpdateRequest> {
        if self.site_name.trim().is_empty() {
            return Err(Error::Configuration("a site name is required".to_string()));
        }
        if self.subscription_ids.is_empty() {
            return Err(Error::Configuration(
                "at least one subscription id is required".to_string(),
            ));
        }

        Ok(UpdateRequest {
            site_name: self.site_name,
            slot_name: self.slot_name.filter(|slot| !slot.trim().is_empty()),
            priority: self.priority,
            target: self.target,
            service_tags: self.service_tags,
            subscription_ids: self.subscription_ids,
        })
    }
}

/*-------------------------------------------------------------------------------------------------
  Update Request
-------------------------------------------------------------------------------------------------*/

/// Everything one run needs to update a site. Immutable once built.
#[derive(Debug, Clone)]
pub struct UpdateRequest {
    site_name: String,
    slot_name: Option<String>,
    priority: Option<Priority>,
    target: RestrictionTarget,
    service_tags: Vec<ServiceTag>,
    subscription_ids: Vec<String>,
}

impl UpdateRequest {
    pub fn site_name(&self) -> &str {
        &self.site_name
    }

    pub fn slot_name(&self) -> Option<&str> {
        self.slot_name.as_deref()
    }

    pub fn priority(&self) -> Option<Priority> {
        self.priority
    }

    pub fn target(&self) -> RestrictionTarget {
        self.target
    }

    pub fn service_tags(&self) -> &[ServiceTag] {
        &self.service_tags
    }

    pub fn subscription_ids(&self) -> &[String] {
        &self.subscription_ids
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
