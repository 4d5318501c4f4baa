use super::client::InventoryClient;
use super::error::ApiError;
use crate::models::OsProfile;

/// Load the OS profile catalog from the inventory.
pub async fn load_os_profiles(inventory: &InventoryClient) -> Result<Vec<OsProfile>, ApiError> {
    let params = vec![("pageSize".to_string(), "1000".to_string())];
    let payload = inventory.call("GET", "/v1/os-profiles", None, Some(params)).await?;
    let mut out = vec![];

    if let Some(arr) = payload.get("osProfiles").and_then(|d| d.as_array()) {
        for item in arr {
            if let Some(obj) = item.as_object() {
                let security_feature =
                    obj.get("securityFeature").and_then(|v| v.as_str()).unwrap_or("");
                out.push(OsProfile {
                    id: obj.get("resourceId").and_then(|v| v.as_str()).unwrap_or("").to_string(),
                    name: obj.get("name").and_then(|v| v.as_str()).unwrap_or("").to_string(),
                    profile_name: obj
                        .get("profileName")
                        .and_then(|v| v.as_str())
                        .unwrap_or("")
                        .to_string(),
                    architecture: obj
                        .get("architecture")
                        .and_then(|v| v.as_str())
                        .map(|s| s.to_string()),
                    security_capable: security_feature == "SECURE_BOOT_AND_FULL_DISK_ENCRYPTION",
                });
            }
        }
    }
    Ok(out)
}
