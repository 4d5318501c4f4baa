use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Site {
    pub resource_id: String,
    pub name: String,
    pub region: Option<String>,
}
