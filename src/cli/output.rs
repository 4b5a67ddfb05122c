use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::{NOTHING, UTF8_FULL};
use comfy_table::*;
use serde_json::json;
use webapp_ip_restriction::{IpSecurityRestriction, Result, ServiceTag, SiteConfiguration};

/*-------------------------------------------------------------------------------------------------
  Output Functions
-------------------------------------------------------------------------------------------------*/

fn header(titles: &[&str]) -> Vec<Cell> {
    titles
        .iter()
        .map(|title| {
            Cell::new(title)
                .add_attribute(Attribute::Bold)
                .fg(Color::Green)
        })
        .collect()
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/*--------------------------------------------------------------------------------------
  Catalog JSON
--------------------------------------------------------------------------------------*/

pub fn catalog_json(service_tags: &[ServiceTag]) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(service_tags)?);
    Ok(())
}

/*--------------------------------------------------------------------------------------
  Catalog Table
--------------------------------------------------------------------------------------*/

pub fn catalog_table(service_tags: &[ServiceTag]) {
    let mut table = new_table();
    table.set_header(header(&["Address Prefix", "Service Tag", "Region", "System Service"]));

    for service_tag in service_tags {
        for prefix in service_tag.address_prefixes() {
            table.add_row(vec![
                Cell::new(prefix).add_attribute(Attribute::Bold),
                Cell::new(&service_tag.id),
                Cell::new(service_tag.properties.region.as_deref().unwrap_or_default()),
                Cell::new(
                    service_tag
                        .properties
                        .system_service
                        .as_deref()
                        .unwrap_or_default(),
                ),
            ]);
        }
    }

    // Right-align the Address Prefix column
    if let Some(column) = table.column_mut(0) {
        column.set_cell_alignment(CellAlignment::Right);
    }

    println!("{table}");

    // Print catalog summary
    let prefix_count: usize = service_tags
        .iter()
        .map(|service_tag| service_tag.address_prefixes().len())
        .sum();

    let mut summary_table = Table::new();
    summary_table
        .load_preset(NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic);
    summary_table.add_row(vec![Cell::new(prefix_count), Cell::new("Address Prefixes")]);
    summary_table.add_row(vec![Cell::new(service_tags.len()), Cell::new("Service Tags")]);

    if let Some(column) = summary_table.column_mut(0) {
        column.set_cell_alignment(CellAlignment::Right);
    }

    println!("{summary_table}");
}

/*--------------------------------------------------------------------------------------
  Configuration JSON
--------------------------------------------------------------------------------------*/

/// The result document: both access-control lists and the SCM "use main" flag.
pub fn configuration_document(configuration: &SiteConfiguration) -> serde_json::Value {
    json!({
        "ipSecurityRestrictions": configuration.ip_security_restrictions,
        "scmIpSecurityRestrictions": configuration.scm_ip_security_restrictions,
        "scmIpSecurityRestrictionsUseMain": configuration.scm_ip_security_restrictions_use_main,
    })
}

pub fn configuration_json(configuration: &SiteConfiguration) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(&configuration_document(configuration))?
    );
    Ok(())
}

/*--------------------------------------------------------------------------------------
  Configuration Table
--------------------------------------------------------------------------------------*/

pub fn configuration_table(configuration: &SiteConfiguration) {
    let mut table = new_table();
    table.set_header(header(&["List", "Priority", "Name", "IP Address", "Action"]));

    let lists: [(&str, &Option<Vec<IpSecurityRestriction>>); 2] = [
        ("main", &configuration.ip_security_restrictions),
        ("scm", &configuration.scm_ip_security_restrictions),
    ];
    for (list, restrictions) in lists {
        for restriction in restrictions.iter().flatten() {
            table.add_row(vec![
                Cell::new(list),
                Cell::new(
                    restriction
                        .priority
                        .map(|priority| priority.to_string())
                        .unwrap_or_default(),
                ),
                Cell::new(restriction.name.as_deref().unwrap_or_default()),
                Cell::new(restriction.ip_address.as_deref().unwrap_or_default())
                    .add_attribute(Attribute::Bold),
                Cell::new(restriction.action.as_deref().unwrap_or_default()),
            ]);
        }
    }

    println!("{table}");

    if let Some(use_main) = configuration.scm_ip_security_restrictions_use_main {
        println!("SCM site uses the main site's restrictions: {use_main}");
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
