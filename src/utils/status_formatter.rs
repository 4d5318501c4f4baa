pub fn format_host_state(state: &str) -> String {
    match state {
        "HOST_STATE_REGISTERED" => "Registered".to_string(),
        "HOST_STATE_ONBOARDED" => "Onboarded".to_string(),
        "HOST_STATE_UNTRUSTED" => "Deauthorized".to_string(),
        "HOST_STATE_DELETING" => "Deleting".to_string(),
        "HOST_STATE_UNSPECIFIED" => "Unknown".to_string(),
        other => other.to_string(),
    }
}

pub fn format_status_indicator(indicator: &str) -> String {
    match indicator {
        "STATUS_INDICATION_IDLE" => "Ready".to_string(),
        "STATUS_INDICATION_IN_PROGRESS" => "In Progress".to_string(),
        "STATUS_INDICATION_ERROR" => "Error".to_string(),
        "STATUS_INDICATION_UNSPECIFIED" => "Unknown".to_string(),
        other => other.to_string(),
    }
}
