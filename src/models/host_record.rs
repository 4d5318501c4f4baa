use serde::{Deserialize, Serialize};

/// One host being onboarded/configured in the current wizard session.
///
/// `key` is the session-local identifier: until the backend issues a durable
/// inventory id the key is the host's proposed name. `durable_id` is written
/// exactly once, by a successful register call, and never cleared.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostRecord {
    pub key: String,
    pub name: String,
    pub durable_id: Option<String>,
    pub serial_number: Option<String>,
    pub uuid: Option<String>,
    pub site_id: Option<String>,
    pub site_name: Option<String>,
    pub instance: Option<InstanceSpec>,
    /// Present when the host already has an OS installed prior to this
    /// session; instance creation is skipped for such hosts.
    pub original_os: Option<String>,
    pub metadata: Vec<MetadataPair>,
    pub error: Option<String>,
}

impl HostRecord {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        HostRecord {
            key: name.clone(),
            name,
            durable_id: None,
            serial_number: None,
            uuid: None,
            site_id: None,
            site_name: None,
            instance: None,
            original_os: None,
            metadata: Vec::new(),
            error: None,
        }
    }

    pub fn is_registered(&self) -> bool {
        self.durable_id.is_some()
    }

    /// Name the runtime instance created for this host will carry.
    pub fn instance_name(&self) -> String {
        format!("{}-instance", self.name)
    }
}

/// Desired runtime instance configuration for a host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceSpec {
    pub os_id: String,
    pub security_feature: Option<SecurityFeature>,
    pub local_account_id: Option<String>,
}

impl InstanceSpec {
    /// Both the OS and the security posture must be chosen before the
    /// host-details step can be left.
    pub fn is_complete(&self) -> bool {
        !self.os_id.trim().is_empty() && self.security_feature.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SecurityFeature {
    #[serde(rename = "NONE")]
    None,
    #[serde(rename = "SECURE_BOOT_AND_FULL_DISK_ENCRYPTION")]
    SecureBootAndFullDiskEncryption,
}

impl SecurityFeature {
    pub fn as_str(&self) -> &'static str {
        match self {
            SecurityFeature::None => "NONE",
            SecurityFeature::SecureBootAndFullDiskEncryption => {
                "SECURE_BOOT_AND_FULL_DISK_ENCRYPTION"
            }
        }
    }

    pub fn from_enabled(enabled: bool) -> Self {
        if enabled {
            SecurityFeature::SecureBootAndFullDiskEncryption
        } else {
            SecurityFeature::None
        }
    }
}

/// One key/value label attached to a host, carried in the patch call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataPair {
    pub key: String,
    pub value: String,
}

impl MetadataPair {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        MetadataPair { key: key.into(), value: value.into() }
    }
}
