use std::env;
use std::path::Path;

// Default configuration constants
pub const DEFAULT_INVENTORY_API_URL: &str = "";
pub const DEFAULT_INVENTORY_API_TOKEN: &str = "";
pub const DEFAULT_PAGE_SIZE: usize = 20;

pub fn load_env_file(env_file: Option<&str>) {
    if let Some(path) = env_file {
        dotenvy::from_path(Path::new(path)).ok();
    } else {
        dotenvy::dotenv().ok();
    }
}

pub fn get_inventory_api_url() -> String {
    sanitize_base_url(
        &env::var("INVENTORY_API_URL").unwrap_or_else(|_| DEFAULT_INVENTORY_API_URL.to_string()),
    )
}

pub fn get_inventory_api_token() -> String {
    env::var("INVENTORY_API_TOKEN").unwrap_or_else(|_| DEFAULT_INVENTORY_API_TOKEN.to_string())
}

pub fn sanitize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        "http://localhost:8080".to_string()
    } else {
        trimmed.to_string()
    }
}
