use serde::{Deserialize, Serialize};

/*-------------------------------------------------------------------------------------------------
  Service Tag
-------------------------------------------------------------------------------------------------*/

/// A named group of Azure IP address prefixes ("service tag"), e.g. `AzureCloud.eastasia`.
/// Service tags are identified by their [ServiceTag::id].
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ServiceTag {
    /// Display name of the service tag.
    pub name: String,

    /// Service tag identifier.
    pub id: String,

    pub properties: ServiceTagProperties,
}

/*--------------------------------------------------------------------------------------
  Service Tag Properties
--------------------------------------------------------------------------------------*/

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceTagProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_number: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_id: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_service: Option<String>,

    /// IPv4 and IPv6 prefixes in CIDR notation, in published order.
    #[serde(default)]
    pub address_prefixes: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_features: Option<Vec<String>>,
}

impl ServiceTag {
    pub fn address_prefixes(&self) -> &[String] {
        &self.properties.address_prefixes
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /*----------------------------------------------------------------------------------
      Test Helper Functions
    ----------------------------------------------------------------------------------*/

    pub(crate) fn test_service_tag(id: &str, prefixes: &[&str]) -> ServiceTag {
        ServiceTag {
            name: id.to_string(),
            id: id.to_string(),
            properties: ServiceTagProperties {
                change_number: Some(1),
                region: Some("eastasia".to_string()),
                platform: Some("Azure".to_string()),
                address_prefixes: prefixes.iter().map(|prefix| prefix.to_string()).collect(),
                ..ServiceTagProperties::default()
            },
        }
    }

    #[test]
    fn test_service_tag_from_catalog_entry() {
        let json = r#"{
          "name": "AzureCloud.eastasia",
          "id": "AzureCloud.eastasia",
          "properties": {
            "changeNumber": 42,
            "region": "eastasia",
            "regionId": 6,
            "platform": "Azure",
            "systemService": "",
            "addressPrefixes": ["13.70.0.0/18", "2603:1040::/47"],
            "networkFeatures": ["API", "NSG"]
          }
        }"#;

        let tag: ServiceTag = serde_json::from_str(json).unwrap();
        assert_eq!(tag.id, "AzureCloud.eastasia");
        assert_eq!(tag.properties.region_id, Some(6));
        assert_eq!(tag.address_prefixes(), ["13.70.0.0/18", "2603:1040::/47"]);
    }

    #[test]
    fn test_service_tag_serializes_catalog_field_names() {
        let tag = test_service_tag("AzureCloud.eastasia", &["13.70.0.0/18"]);
        let value = serde_json::to_value(&tag).unwrap();

        assert_eq!(value["properties"]["addressPrefixes"][0], "13.70.0.0/18");
        assert_eq!(value["properties"]["changeNumber"], 1);
        assert!(value["properties"].get("systemService").is_none());
    }
}
