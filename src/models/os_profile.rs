use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct OsProfile {
    pub id: String,
    pub name: String,
    pub profile_name: String,
    pub architecture: Option<String>,
    #[serde(default)]
    pub security_capable: bool,
}
