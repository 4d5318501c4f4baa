use std::collections::HashMap;

use super::client::InventoryClient;
use super::error::ApiError;
use crate::models::Site;

/// Load all sites from the inventory.
/// Returns a vector of sites and a hashmap for quick lookup by resource id.
pub async fn load_sites(
    inventory: &InventoryClient,
) -> Result<(Vec<Site>, HashMap<String, Site>), ApiError> {
    let params = vec![("pageSize".to_string(), "1000".to_string())];
    let payload = inventory.call("GET", "/v1/sites", None, Some(params)).await?;
    let mut sites = Vec::new();
    let mut map = HashMap::new();

    if let Some(arr) = payload.get("sites").and_then(|d| d.as_array()) {
        for s in arr {
            if let Some(obj) = s.as_object() {
                let resource_id = obj
                    .get("resourceId")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string();
                let name = obj
                    .get("name")
                    .and_then(|v| v.as_str())
                    .unwrap_or(&resource_id)
                    .to_string();
                let region = obj
                    .get("region")
                    .and_then(|v| v.as_object())
                    .and_then(|r| r.get("name"))
                    .and_then(|v| v.as_str())
                    .map(|s| s.to_string());

                let site = Site { resource_id: resource_id.clone(), name, region };
                sites.push(site.clone());
                map.insert(resource_id, site);
            }
        }
    }
    Ok((sites, map))
}
