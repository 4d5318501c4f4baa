// Atomic API modules
pub mod client;
pub mod error;
pub mod hosts;
pub mod instances;
pub mod operating_systems;
pub mod sites;

// Re-export commonly used items
pub use client::{api_call, InventoryClient};
pub use error::ApiError;
pub use hosts::{list_hosts, patch_host, register_host, PaginatedHosts, PatchHostRequest, RegisterHostRequest};
pub use instances::{create_instance, CreateInstanceRequest};
pub use operating_systems::load_os_profiles;
pub use sites::load_sites;

/// The three write operations the provisioning orchestrator drives, kept
/// behind a trait so batch runs can be exercised against a fake service.
#[allow(async_fn_in_trait)]
pub trait InventoryApi {
    async fn register_host(&self, req: &RegisterHostRequest) -> Result<String, ApiError>;
    async fn patch_host(&self, host_id: &str, req: &PatchHostRequest) -> Result<(), ApiError>;
    async fn create_instance(&self, req: &CreateInstanceRequest) -> Result<String, ApiError>;
}

impl InventoryApi for InventoryClient {
    async fn register_host(&self, req: &RegisterHostRequest) -> Result<String, ApiError> {
        hosts::register_host(self, req).await
    }

    async fn patch_host(&self, host_id: &str, req: &PatchHostRequest) -> Result<(), ApiError> {
        hosts::patch_host(self, host_id, req).await
    }

    async fn create_instance(&self, req: &CreateInstanceRequest) -> Result<String, ApiError> {
        instances::create_instance(self, req).await
    }
}
