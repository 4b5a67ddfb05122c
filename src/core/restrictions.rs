use crate::core::errors::{Error, Result};
use crate::core::management::IpSecurityRestriction;
use crate::core::service_tag::ServiceTag;
use serde::{Deserialize, Serialize};

/*-------------------------------------------------------------------------------------------------
  Priority Policy
-------------------------------------------------------------------------------------------------*/

/// Priorities assigned to the generated entries: `start`, `start + gap`, `start + 2 * gap`, ...
///
/// The management API stores priorities as 32-bit integers.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Priority {
    pub start: i64,
    pub gap: i64,
}

impl Priority {
    /// Priority of the entry at `index`, or `None` when it leaves the 32-bit range.
    pub fn nth(&self, index: usize) -> Option<i64> {
        let index = i64::try_from(index).ok()?;
        let priority = self.gap.checked_mul(index)?.checked_add(self.start)?;
        i32::try_from(priority).ok().map(i64::from)
    }
}

/*-------------------------------------------------------------------------------------------------
  Restriction Target
-------------------------------------------------------------------------------------------------*/

/// Which of the site's access-control lists a run replaces.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum RestrictionTarget {
    /// The list guarding the site itself.
    #[default]
    Main,

    /// The list guarding the SCM (deployment and management) endpoint.
    Scm,
}

impl RestrictionTarget {
    pub fn from_scm_flag(scm: bool) -> Self {
        if scm {
            RestrictionTarget::Scm
        } else {
            RestrictionTarget::Main
        }
    }
}

impl std::fmt::Display for RestrictionTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RestrictionTarget::Main => write!(f, "main site"),
            RestrictionTarget::Scm => write!(f, "SCM site"),
        }
    }
}

/*-------------------------------------------------------------------------------------------------
  Transform
-------------------------------------------------------------------------------------------------*/

/// One access-control entry per address prefix, named after its service tag, in service tag
/// order and then prefix order. Duplicated prefixes are kept.
///
/// Fails with [Error::Configuration] when a priority would leave the 32-bit range.
pub fn transform(
    service_tags: &[ServiceTag],
    priority: Option<Priority>,
) -> Result<Vec<IpSecurityRestriction>> {
    service_tags
        .iter()
        .flat_map(|service_tag| {
            service_tag
                .address_prefixes()
                .iter()
                .map(move |prefix| (service_tag.name.as_str(), prefix.as_str()))
        })
        .enumerate()
        .map(|(index, (name, prefix))| {
            let priority = priority
                .map(|priority| {
                    priority.nth(index).ok_or_else(|| {
                        Error::Configuration(format!(
                            "priority of restriction #{} is out of range (start {}, gap {})",
                            index + 1,
                            priority.start,
                            priority.gap
                        ))
                    })
                })
                .transpose()?;

            Ok(IpSecurityRestriction {
                name: Some(name.to_string()),
                ip_address: Some(prefix.to_string()),
                priority,
                ..IpSecurityRestriction::default()
            })
        })
        .collect()
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::json::{self, tests::TEST_CATALOG_JSON};
    use crate::core::service_tag::tests::test_service_tag;

    #[test]
    fn test_one_entry_per_prefix_in_input_order() {
        let catalog = json::parse(TEST_CATALOG_JSON).unwrap().values;
        let prefix_count: usize = catalog.iter().map(|tag| tag.address_prefixes().len()).sum();

        let entries = transform(&catalog, None).unwrap();
        assert_eq!(entries.len(), prefix_count);

        let expected: Vec<(String, String)> = catalog
            .iter()
            .flat_map(|tag| {
                tag.address_prefixes()
                    .iter()
                    .map(|prefix| (tag.name.clone(), prefix.clone()))
            })
            .collect();
        let actual: Vec<(String, String)> = entries
            .into_iter()
            .map(|entry| (entry.name.unwrap(), entry.ip_address.unwrap()))
            .collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_duplicate_prefixes_are_kept() {
        let tags = [
            test_service_tag("AzureCloud", &["13.70.0.0/18"]),
            test_service_tag("AzureCloud.eastasia", &["13.70.0.0/18", "13.70.0.0/18"]),
        ];

        let entries = transform(&tags, None).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].name.as_deref(), Some("AzureCloud"));
        assert_eq!(entries[2].name.as_deref(), Some("AzureCloud.eastasia"));
        assert!(entries.iter().all(|entry| entry.priority.is_none()));
    }

    #[test]
    fn test_empty_input() {
        assert!(transform(&[], None).unwrap().is_empty());
        assert!(transform(&[test_service_tag("Empty", &[])], None)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_priority_policy() {
        let tags = [
            test_service_tag("A", &["10.0.0.0/8", "10.1.0.0/16"]),
            test_service_tag("B", &["192.168.0.0/16"]),
        ];

        let entries = transform(&tags, Some(Priority { start: 100, gap: 10 })).unwrap();
        let priorities: Vec<Option<i64>> = entries.iter().map(|entry| entry.priority).collect();
        assert_eq!(priorities, [Some(100), Some(110), Some(120)]);
    }

    #[test]
    fn test_priority_overflow_is_rejected() {
        let tags = [test_service_tag("A", &["10.0.0.0/8", "10.1.0.0/16"])];

        let result = transform(&tags, Some(Priority { start: i64::MAX - 5, gap: 10 }));
        assert!(matches!(result, Err(Error::Configuration(_))));

        let result = transform(&tags, Some(Priority { start: 0, gap: i64::MAX }));
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_priority_beyond_32_bits_is_rejected() {
        let tags = [test_service_tag("A", &["10.0.0.0/8", "10.1.0.0/16"])];

        let last_fitting = Priority { start: i32::MAX as i64 - 10, gap: 10 };
        let entries = transform(&tags, Some(last_fitting)).unwrap();
        assert_eq!(entries[1].priority, Some(i32::MAX as i64));

        let past_the_end = Priority { start: i32::MAX as i64 - 9, gap: 10 };
        assert!(matches!(
            transform(&tags, Some(past_the_end)),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_negative_gap_counts_down() {
        let priority = Priority { start: 300, gap: -100 };
        assert_eq!(priority.nth(2), Some(100));
        assert_eq!(priority.nth(4), Some(-100));
    }

    #[test]
    fn test_restriction_target_from_scm_flag() {
        assert_eq!(RestrictionTarget::from_scm_flag(false), RestrictionTarget::Main);
        assert_eq!(RestrictionTarget::from_scm_flag(true), RestrictionTarget::Scm);
    }
}
