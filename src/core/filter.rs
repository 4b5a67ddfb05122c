use crate::core::errors::Result;
use crate::core::service_tag::ServiceTag;
use log::debug;
use regex::Regex;

/*-------------------------------------------------------------------------------------------------
  Tag Filter
-------------------------------------------------------------------------------------------------*/

/// Selects service tags by their id. Exactly one matching mode is active per filter.
#[derive(Clone, Debug)]
pub enum TagFilter {
    /// Include the service tag whose id equals the value.
    Exact(String),

    /// Include the service tags whose id contains a match for the regular expression.
    Pattern(Regex),
}

/*--------------------------------------------------------------------------------------
  Tag Filter Implementation
--------------------------------------------------------------------------------------*/

impl TagFilter {
    pub fn exact(id: &str) -> Self {
        TagFilter::Exact(id.to_string())
    }

    /// Build a pattern filter; fails when `pattern` is not a valid regular expression.
    pub fn pattern(pattern: &str) -> Result<Self> {
        Ok(TagFilter::Pattern(Regex::new(pattern)?))
    }

    /// Build an exact or a pattern filter from the command line value.
    pub fn from_value(value: &str, is_pattern: bool) -> Result<Self> {
        if is_pattern {
            TagFilter::pattern(value)
        } else {
            Ok(TagFilter::exact(value))
        }
    }

    pub fn matches(&self, service_tag: &ServiceTag) -> bool {
        match self {
            TagFilter::Exact(id) => service_tag.id == *id,
            TagFilter::Pattern(pattern) => pattern.is_match(&service_tag.id),
        }
    }

    /// Service tags matching the filter, in catalog order.
    pub fn apply(&self, service_tags: &[ServiceTag]) -> Vec<ServiceTag> {
        let matching: Vec<ServiceTag> = service_tags
            .iter()
            .filter(|service_tag| self.matches(service_tag))
            .cloned()
            .collect();
        debug!(
            "{} of {} service tags match {}",
            matching.len(),
            service_tags.len(),
            self
        );
        matching
    }
}

impl std::fmt::Display for TagFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TagFilter::Exact(id) => write!(f, "`{id}`"),
            TagFilter::Pattern(pattern) => write!(f, "/{}/", pattern.as_str()),
        }
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::json::{self, tests::TEST_CATALOG_JSON};
    use test_log::test;

    fn ids(service_tags: &[ServiceTag]) -> Vec<&str> {
        service_tags.iter().map(|tag| tag.id.as_str()).collect()
    }

    #[test]
    fn test_exact_filter() {
        let catalog = json::parse(TEST_CATALOG_JSON).unwrap().values;

        let matching = TagFilter::exact("AzureCloud.eastasia").apply(&catalog);
        assert_eq!(ids(&matching), ["AzureCloud.eastasia"]);
    }

    #[test]
    fn test_equivalent_pattern_selects_the_same_tags() {
        let catalog = json::parse(TEST_CATALOG_JSON).unwrap().values;

        let exact = TagFilter::exact("AzureCloud.eastasia").apply(&catalog);
        let pattern = TagFilter::pattern(r"^AzureCloud\.eastasia$")
            .unwrap()
            .apply(&catalog);
        assert_eq!(exact, pattern);
    }

    #[test]
    fn test_pattern_is_unanchored() {
        let catalog = json::parse(TEST_CATALOG_JSON).unwrap().values;

        let matching = TagFilter::pattern("eastasia").unwrap().apply(&catalog);
        assert_eq!(ids(&matching), ["AzureCloud.eastasia", "AzureCloud.eastasia2"]);
    }

    #[test]
    fn test_exact_filter_without_match() {
        let catalog = json::parse(TEST_CATALOG_JSON).unwrap().values;
        assert!(TagFilter::exact("azurecloud.eastasia").apply(&catalog).is_empty());
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(TagFilter::pattern("AzureCloud.(eastasia").is_err());
        assert!(TagFilter::from_value("AzureCloud.(eastasia", false).is_ok());
    }
}
