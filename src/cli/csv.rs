use std::path::Path;
use webapp_ip_restriction::{Result, ServiceTag};

/*-------------------------------------------------------------------------------------------------
  Save Service Tags to CSV File
-------------------------------------------------------------------------------------------------*/

/// One record per address prefix.
pub fn save(service_tags: &[ServiceTag], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;

    // Write header
    writer.serialize(["Service Tag", "Name", "Region", "Address Prefix"])?;

    // Write prefix records
    for service_tag in service_tags {
        for prefix in service_tag.address_prefixes() {
            let record = (
                &service_tag.id,
                &service_tag.name,
                service_tag.properties.region.as_deref().unwrap_or_default(),
                prefix,
            );
            writer.serialize(record)?;
        }
    }

    writer.flush()?;

    Ok(())
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
