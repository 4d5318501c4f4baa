#[derive(Clone, Debug)]
pub struct HostView {
    pub resource_id: String,
    pub name: String,
    pub current_state: String,
    pub state_display: String,
    pub status_display: String,
    pub site_name: String,
    pub os_name: String,
    pub serial_number: Option<String>,
    pub uuid: Option<String>,
    pub has_instance: bool,
}

impl HostView {
    /// Creates a new HostView with default values for the given resource ID.
    pub fn new_with_defaults(resource_id: String) -> Self {
        Self {
            resource_id,
            name: "(no name)".into(),
            current_state: "".into(),
            state_display: "".into(),
            status_display: "".into(),
            site_name: "—".into(),
            os_name: "—".into(),
            serial_number: None,
            uuid: None,
            has_instance: false,
        }
    }
}
