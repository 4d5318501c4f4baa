use crate::models::{HostRecord, InstanceSpec, MetadataPair, SecurityFeature};

use super::store::HostRecordStore;
use super::validate::validate_step;

/// The fixed, linear sequence of wizard steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WizardStep {
    SelectSite,
    EnterHostDetails,
    AddHostLabels,
    EnableLocalAccess,
    CompleteSetup,
}

impl WizardStep {
    pub const ALL: [WizardStep; 5] = [
        WizardStep::SelectSite,
        WizardStep::EnterHostDetails,
        WizardStep::AddHostLabels,
        WizardStep::EnableLocalAccess,
        WizardStep::CompleteSetup,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            WizardStep::SelectSite => "Select Site",
            WizardStep::EnterHostDetails => "Enter Host Details",
            WizardStep::AddHostLabels => "Add Host Labels",
            WizardStep::EnableLocalAccess => "Enable Local Access",
            WizardStep::CompleteSetup => "Complete Setup",
        }
    }

    pub fn ordinal(&self) -> usize {
        WizardStep::ALL.iter().position(|s| s == self).unwrap_or(0)
    }

    pub fn next(&self) -> Option<WizardStep> {
        WizardStep::ALL.get(self.ordinal() + 1).copied()
    }

    pub fn prev(&self) -> Option<WizardStep> {
        self.ordinal().checked_sub(1).and_then(|i| WizardStep::ALL.get(i)).copied()
    }
}

/// What the presentation layer renders: either the dedicated no-host state
/// (return path only, no wizard) or the active step with its gating flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardView {
    NoHostSelected,
    Active { step: WizardStep, can_advance: bool, can_retreat: bool },
}

/// One configuration session: the host records plus the wizard form state.
/// Handed by reference to each step; every mutation re-runs the step
/// validator so the gating flags are never stale.
#[derive(Debug, Clone)]
pub struct WizardSession {
    hosts: HostRecordStore,
    current_step: WizardStep,
    can_advance: bool,
    can_retreat: bool,
    global_os_value: Option<String>,
    global_security_enabled: Option<bool>,
    auto_onboard: bool,
    auto_provision: bool,
    label_error: Option<String>,
}

impl WizardSession {
    pub fn new(auto_onboard: bool, auto_provision: bool) -> Self {
        WizardSession {
            hosts: HostRecordStore::new(),
            current_step: WizardStep::SelectSite,
            can_advance: false,
            can_retreat: false,
            global_os_value: None,
            global_security_enabled: None,
            auto_onboard,
            auto_provision,
            label_error: None,
        }
    }

    pub fn hosts(&self) -> &HostRecordStore {
        &self.hosts
    }

    /// Raw mutable access for the orchestrator (durable ids, error fields).
    /// Form-level edits should go through the typed mutators below so the
    /// gating flags stay current.
    pub fn hosts_mut(&mut self) -> &mut HostRecordStore {
        &mut self.hosts
    }

    pub fn current_step(&self) -> WizardStep {
        self.current_step
    }

    pub fn can_advance(&self) -> bool {
        self.can_advance
    }

    pub fn can_retreat(&self) -> bool {
        self.can_retreat
    }

    pub fn auto_onboard(&self) -> bool {
        self.auto_onboard
    }

    pub fn auto_provision(&self) -> bool {
        self.auto_provision
    }

    pub fn global_os_value(&self) -> Option<&str> {
        self.global_os_value.as_deref()
    }

    pub fn global_security_enabled(&self) -> Option<bool> {
        self.global_security_enabled
    }

    pub fn view(&self) -> WizardView {
        if self.hosts.is_empty() {
            WizardView::NoHostSelected
        } else {
            WizardView::Active {
                step: self.current_step,
                can_advance: self.can_advance,
                can_retreat: self.can_retreat,
            }
        }
    }

    pub fn add_host(&mut self, host: HostRecord) {
        self.hosts.insert(host);
        self.recompute_globals();
        self.refresh();
    }

    pub fn remove_host(&mut self, key: &str) -> Option<HostRecord> {
        let removed = self.hosts.remove(key);
        self.recompute_globals();
        self.refresh();
        removed
    }

    /// Outstanding metadata-validation error reported by the label editor;
    /// blocks the Add Host Labels step while present.
    pub fn set_label_error(&mut self, error: Option<String>) {
        self.label_error = error;
        self.refresh();
    }

    pub fn set_host_site(&mut self, key: &str, site_id: &str, site_name: &str) {
        if let Some(host) = self.hosts.get_mut(key) {
            host.site_id = Some(site_id.to_string());
            host.site_name = Some(site_name.to_string());
        }
        self.refresh();
    }

    /// Apply one OS choice to every host at once.
    pub fn set_global_os(&mut self, os_id: &str) {
        for host in self.hosts.iter_mut() {
            instance_entry(host).os_id = os_id.to_string();
        }
        self.global_os_value = Some(os_id.to_string());
        self.refresh();
    }

    /// Apply one security posture to every host at once.
    pub fn set_global_security(&mut self, enabled: bool) {
        for host in self.hosts.iter_mut() {
            instance_entry(host).security_feature = Some(SecurityFeature::from_enabled(enabled));
        }
        self.global_security_enabled = Some(enabled);
        self.refresh();
    }

    /// Per-host override; the global value diverges to unset unless every
    /// host still agrees afterwards.
    pub fn set_host_os(&mut self, key: &str, os_id: &str) {
        if let Some(host) = self.hosts.get_mut(key) {
            instance_entry(host).os_id = os_id.to_string();
        }
        self.recompute_globals();
        self.refresh();
    }

    pub fn set_host_security(&mut self, key: &str, enabled: bool) {
        if let Some(host) = self.hosts.get_mut(key) {
            instance_entry(host).security_feature = Some(SecurityFeature::from_enabled(enabled));
        }
        self.recompute_globals();
        self.refresh();
    }

    pub fn set_host_local_account(&mut self, key: &str, local_account_id: Option<String>) {
        if let Some(host) = self.hosts.get_mut(key) {
            instance_entry(host).local_account_id = local_account_id;
        }
        self.refresh();
    }

    /// Labels entered on the Add Host Labels step apply to the whole batch.
    pub fn set_metadata_for_all(&mut self, metadata: Vec<MetadataPair>) {
        for host in self.hosts.iter_mut() {
            host.metadata = metadata.clone();
        }
        self.refresh();
    }

    pub fn advance(&mut self) -> bool {
        if !self.can_advance {
            return false;
        }
        match self.current_step.next() {
            Some(next) => {
                self.current_step = next;
                self.refresh();
                true
            }
            None => false,
        }
    }

    pub fn retreat(&mut self) -> bool {
        match self.current_step.prev() {
            Some(prev) => {
                self.current_step = prev;
                self.refresh();
                true
            }
            None => false,
        }
    }

    /// Discard the session: hosts, step position, globals. Called on cancel,
    /// on successful completion and on navigating away.
    pub fn reset(&mut self) {
        self.hosts.clear();
        self.current_step = WizardStep::SelectSite;
        self.global_os_value = None;
        self.global_security_enabled = None;
        self.label_error = None;
        self.refresh();
    }

    /// Re-run the step validator; called after every mutation.
    pub fn refresh(&mut self) {
        self.can_advance =
            validate_step(self.current_step, &self.hosts, self.label_error.is_some());
        self.can_retreat = !self.hosts.is_empty() && self.current_step.prev().is_some();
    }

    fn recompute_globals(&mut self) {
        self.global_os_value = common_value(&self.hosts, |i| {
            if i.os_id.is_empty() { None } else { Some(i.os_id.clone()) }
        });
        self.global_security_enabled = common_value(&self.hosts, |i| {
            i.security_feature.map(|f| f == SecurityFeature::SecureBootAndFullDiskEncryption)
        });
    }
}

impl Default for WizardSession {
    fn default() -> Self {
        WizardSession::new(false, false)
    }
}

fn instance_entry(host: &mut HostRecord) -> &mut InstanceSpec {
    host.instance.get_or_insert_with(|| InstanceSpec {
        os_id: String::new(),
        security_feature: None,
        local_account_id: None,
    })
}

/// The shared value across all hosts, or None as soon as any host disagrees
/// or has no value.
fn common_value<T: PartialEq>(
    hosts: &HostRecordStore,
    pick: impl Fn(&InstanceSpec) -> Option<T>,
) -> Option<T> {
    let mut common: Option<T> = None;
    for host in hosts.iter() {
        let value = host.instance.as_ref().and_then(&pick)?;
        match &common {
            None => common = Some(value),
            Some(existing) if *existing == value => {}
            Some(_) => return None,
        }
    }
    common
}
