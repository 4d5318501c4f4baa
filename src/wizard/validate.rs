use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use super::session::WizardStep;
use super::store::HostRecordStore;

// 1-20 chars, alphanumeric plus separators, must start and end alphanumeric.
static HOST_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9]([A-Za-z0-9\-_. ]{0,18}[A-Za-z0-9])?$").expect("host name pattern")
});

pub fn is_valid_host_name(name: &str) -> bool {
    HOST_NAME_RE.is_match(name)
}

/// Decide whether forward navigation is permitted from `step` given the
/// hosts currently being configured. Pure; an empty store blocks every step
/// since there is nothing to configure.
pub fn validate_step(step: WizardStep, hosts: &HostRecordStore, labels_invalid: bool) -> bool {
    if hosts.is_empty() {
        return false;
    }
    match step {
        WizardStep::SelectSite => {
            hosts.iter().all(|h| h.site_id.as_deref().is_some_and(|s| !s.trim().is_empty()))
        }
        WizardStep::EnterHostDetails => {
            let mut seen = HashSet::new();
            hosts.iter().all(|h| {
                seen.insert(h.name.as_str())
                    && is_valid_host_name(&h.name)
                    && h.instance.as_ref().is_some_and(|i| i.is_complete())
            })
        }
        WizardStep::AddHostLabels => !labels_invalid,
        WizardStep::EnableLocalAccess | WizardStep::CompleteSetup => true,
    }
}
