use serde::Serialize;

use super::client::InventoryClient;
use super::error::ApiError;
use crate::models::{HostView, MetadataPair};
use crate::utils::{format_host_state, format_status_indicator};

/// Body of `POST /v1/hosts/register`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterHostRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    pub auto_onboard: bool,
}

/// Body of `PATCH /v1/hosts/{id}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchHostRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_id: Option<String>,
    pub metadata: Vec<MetadataPair>,
}

pub struct PaginatedHosts {
    pub hosts: Vec<HostView>,
    pub total_count: usize,
}

/// Register a host in the inventory. Returns the durable resource id
/// assigned by the backend.
pub async fn register_host(
    inventory: &InventoryClient,
    req: &RegisterHostRequest,
) -> Result<String, ApiError> {
    let body = serde_json::to_value(req).map_err(|e| ApiError::Parse(e.to_string()))?;
    let payload = inventory.call("POST", "/v1/hosts/register", Some(body), None).await?;
    payload
        .get("resourceId")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| ApiError::Parse("register response missing resourceId".into()))
}

/// Update name, site assignment and labels on a registered host.
pub async fn patch_host(
    inventory: &InventoryClient,
    host_id: &str,
    req: &PatchHostRequest,
) -> Result<(), ApiError> {
    let endpoint = format!("/v1/hosts/{}", host_id);
    let body = serde_json::to_value(req).map_err(|e| ApiError::Parse(e.to_string()))?;
    inventory.call("PATCH", &endpoint, Some(body), None).await?;
    Ok(())
}

/// Load one page of hosts matching `filter` (a combined facet query built by
/// `services::host_filter`; `None` means no filter).
pub async fn list_hosts(
    inventory: &InventoryClient,
    filter: Option<&str>,
    offset: usize,
    page_size: usize,
) -> Result<PaginatedHosts, ApiError> {
    let mut params = vec![
        ("offset".to_string(), offset.to_string()),
        ("pageSize".to_string(), page_size.to_string()),
    ];
    if let Some(f) = filter {
        params.push(("filter".to_string(), f.to_string()));
    }
    let payload = inventory.call("GET", "/v1/hosts", None, Some(params)).await?;

    let mut hosts = Vec::new();
    if let Some(arr) = payload.get("hosts").and_then(|d| d.as_array()) {
        for item in arr {
            if let Some(obj) = item.as_object() {
                let resource_id =
                    obj.get("resourceId").and_then(|v| v.as_str()).unwrap_or("").to_string();
                let mut host = HostView::new_with_defaults(resource_id);
                if let Some(name) = obj.get("name").and_then(|v| v.as_str()) {
                    if !name.is_empty() {
                        host.name = name.to_string();
                    }
                }
                host.current_state =
                    obj.get("currentState").and_then(|v| v.as_str()).unwrap_or("").to_string();
                host.state_display = format_host_state(&host.current_state);
                host.status_display = obj
                    .get("hostStatusIndicator")
                    .and_then(|v| v.as_str())
                    .map(format_status_indicator)
                    .unwrap_or_else(|| "—".into());
                host.serial_number =
                    obj.get("serialNumber").and_then(|v| v.as_str()).map(|s| s.to_string());
                host.uuid = obj.get("uuid").and_then(|v| v.as_str()).map(|s| s.to_string());
                if let Some(site) = obj.get("site").and_then(|v| v.as_object()) {
                    host.site_name =
                        site.get("name").and_then(|v| v.as_str()).unwrap_or("—").to_string();
                }
                if let Some(instance) = obj.get("instance").and_then(|v| v.as_object()) {
                    host.has_instance = true;
                    host.os_name = instance
                        .get("desiredOs")
                        .and_then(|v| v.as_object())
                        .and_then(|os| os.get("name"))
                        .and_then(|v| v.as_str())
                        .unwrap_or("—")
                        .to_string();
                }
                hosts.push(host);
            }
        }
    }

    let total_count = payload
        .get("totalElements")
        .and_then(|v| v.as_u64())
        .map(|n| n as usize)
        .unwrap_or(hosts.len());

    Ok(PaginatedHosts { hosts, total_count })
}
