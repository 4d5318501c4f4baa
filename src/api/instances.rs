use serde::Serialize;

use super::client::InventoryClient;
use super::error::ApiError;
use crate::models::SecurityFeature;

/// Body of `POST /v1/instances`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInstanceRequest {
    pub security_feature: SecurityFeature,
    pub os_id: String,
    pub kind: String,
    pub host_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_account_id: Option<String>,
}

impl CreateInstanceRequest {
    pub fn metal(
        host_id: impl Into<String>,
        name: impl Into<String>,
        os_id: impl Into<String>,
        security_feature: SecurityFeature,
        local_account_id: Option<String>,
    ) -> Self {
        CreateInstanceRequest {
            security_feature,
            os_id: os_id.into(),
            kind: "METAL".into(),
            host_id: host_id.into(),
            name: name.into(),
            local_account_id,
        }
    }
}

/// Create the runtime instance backing a host. Returns the instance
/// resource id.
pub async fn create_instance(
    inventory: &InventoryClient,
    req: &CreateInstanceRequest,
) -> Result<String, ApiError> {
    let body = serde_json::to_value(req).map_err(|e| ApiError::Parse(e.to_string()))?;
    let payload = inventory.call("POST", "/v1/instances", Some(body), None).await?;
    payload
        .get("resourceId")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| ApiError::Parse("instance response missing resourceId".into()))
}
