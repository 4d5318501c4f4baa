use fleet::models::{HostRecord, InstanceSpec, SecurityFeature};
use fleet::wizard::{
    is_valid_host_name, validate_step, HostRecordStore, WizardSession, WizardStep, WizardView,
};

fn host(name: &str) -> HostRecord {
    HostRecord::new(name)
}

fn configured_host(name: &str) -> HostRecord {
    let mut h = HostRecord::new(name);
    h.site_id = Some("site-1".into());
    h.site_name = Some("Lab".into());
    h.instance = Some(InstanceSpec {
        os_id: "os-1".into(),
        security_feature: Some(SecurityFeature::None),
        local_account_id: None,
    });
    h
}

#[test]
fn test_empty_store_blocks_every_step() {
    let store = HostRecordStore::new();
    for step in WizardStep::ALL {
        assert!(!validate_step(step, &store, false), "step {:?} should block", step);
    }
}

#[test]
fn test_select_site_requires_site_on_every_host() {
    let mut store = HostRecordStore::new();
    store.insert(configured_host("h1"));
    store.insert(host("h2"));
    assert!(!validate_step(WizardStep::SelectSite, &store, false));

    if let Some(h2) = store.get_mut("h2") {
        h2.site_id = Some("site-2".into());
    }
    assert!(validate_step(WizardStep::SelectSite, &store, false));
}

#[test]
fn test_host_details_complete_instance_advances() {
    // Host with name, site and a complete instance spec passes the details step.
    let mut store = HostRecordStore::new();
    store.insert(configured_host("h1"));
    assert!(validate_step(WizardStep::EnterHostDetails, &store, false));
}

#[test]
fn test_host_details_missing_instance_blocks() {
    let mut store = HostRecordStore::new();
    let mut h = host("h1");
    h.site_id = Some("s1".into());
    store.insert(h);
    assert!(!validate_step(WizardStep::EnterHostDetails, &store, false));
}

#[test]
fn test_host_details_missing_security_feature_blocks() {
    let mut store = HostRecordStore::new();
    let mut h = configured_host("h1");
    if let Some(spec) = h.instance.as_mut() {
        spec.security_feature = None;
    }
    store.insert(h);
    assert!(!validate_step(WizardStep::EnterHostDetails, &store, false));
}

#[test]
fn test_duplicate_names_block_details_step() {
    let mut store = HostRecordStore::new();
    let mut first = configured_host("h1");
    first.key = "k1".into();
    let mut second = configured_host("h1");
    second.key = "k2".into();
    store.insert(first);
    store.insert(second);
    // Both hosts are otherwise fully valid; the duplicate name alone blocks.
    assert!(!validate_step(WizardStep::EnterHostDetails, &store, false));
}

#[test]
fn test_invalid_host_name_blocks_details_step() {
    let mut store = HostRecordStore::new();
    let mut h = configured_host("-badname");
    h.key = "k1".into();
    store.insert(h);
    assert!(!validate_step(WizardStep::EnterHostDetails, &store, false));
}

#[test]
fn test_host_name_pattern() {
    assert!(is_valid_host_name("edge-node-01"));
    assert!(is_valid_host_name("a"));
    assert!(is_valid_host_name("rack 4.unit_2"));
    assert!(!is_valid_host_name(""));
    assert!(!is_valid_host_name("-leading"));
    assert!(!is_valid_host_name("trailing-"));
    assert!(!is_valid_host_name("way-too-long-host-name-over-twenty"));
    assert!(!is_valid_host_name("bad!char"));
}

#[test]
fn test_label_error_blocks_labels_step() {
    let mut store = HostRecordStore::new();
    store.insert(configured_host("h1"));
    assert!(validate_step(WizardStep::AddHostLabels, &store, false));
    assert!(!validate_step(WizardStep::AddHostLabels, &store, true));
}

#[test]
fn test_terminal_steps_always_advance_with_hosts() {
    let mut store = HostRecordStore::new();
    store.insert(host("h1"));
    assert!(validate_step(WizardStep::EnableLocalAccess, &store, false));
    assert!(validate_step(WizardStep::CompleteSetup, &store, false));
}

#[test]
fn test_session_view_without_hosts() {
    let session = WizardSession::new(false, true);
    assert_eq!(session.view(), WizardView::NoHostSelected);
    assert!(!session.can_advance());
    assert!(!session.can_retreat());
}

#[test]
fn test_session_walk_and_retreat() {
    let mut session = WizardSession::new(false, true);
    session.add_host(configured_host("h1"));

    assert_eq!(session.current_step(), WizardStep::SelectSite);
    assert!(session.can_advance());
    assert!(!session.can_retreat());
    assert!(!session.retreat());

    assert!(session.advance());
    assert_eq!(session.current_step(), WizardStep::EnterHostDetails);
    assert!(session.can_retreat());

    assert!(session.advance());
    assert!(session.advance());
    assert!(session.advance());
    assert_eq!(session.current_step(), WizardStep::CompleteSetup);
    // Last step: nowhere further to go.
    assert!(!session.advance());

    assert!(session.retreat());
    assert_eq!(session.current_step(), WizardStep::EnableLocalAccess);
}

#[test]
fn test_advance_is_refused_while_blocked() {
    let mut session = WizardSession::new(false, true);
    session.add_host(host("h1"));
    assert!(!session.can_advance());
    assert!(!session.advance());
    assert_eq!(session.current_step(), WizardStep::SelectSite);
}

#[test]
fn test_label_error_gates_session_labels_step() {
    let mut session = WizardSession::new(false, true);
    session.add_host(configured_host("h1"));
    session.advance();
    session.advance();
    assert_eq!(session.current_step(), WizardStep::AddHostLabels);
    assert!(session.can_advance());

    session.set_label_error(Some("duplicate label key".into()));
    assert!(!session.can_advance());
    session.set_label_error(None);
    assert!(session.can_advance());
}

#[test]
fn test_global_os_applies_to_all_hosts() {
    let mut session = WizardSession::new(false, true);
    session.add_host(host("h1"));
    session.add_host(host("h2"));
    session.set_global_os("os-9");
    session.set_global_security(true);

    assert_eq!(session.global_os_value(), Some("os-9"));
    assert_eq!(session.global_security_enabled(), Some(true));
    for h in session.hosts().iter() {
        let spec = h.instance.as_ref().unwrap();
        assert_eq!(spec.os_id, "os-9");
        assert_eq!(
            spec.security_feature,
            Some(SecurityFeature::SecureBootAndFullDiskEncryption)
        );
    }
}

#[test]
fn test_per_host_edit_diverges_global_value() {
    let mut session = WizardSession::new(false, true);
    session.add_host(host("h1"));
    session.add_host(host("h2"));
    session.set_global_os("os-9");
    assert_eq!(session.global_os_value(), Some("os-9"));

    session.set_host_os("h2", "os-3");
    assert_eq!(session.global_os_value(), None);

    // Agreeing again restores the shared value.
    session.set_host_os("h1", "os-3");
    assert_eq!(session.global_os_value(), Some("os-3"));
}

#[test]
fn test_reset_discards_hosts_and_position() {
    let mut session = WizardSession::new(true, true);
    session.add_host(configured_host("h1"));
    session.advance();
    session.reset();

    assert_eq!(session.view(), WizardView::NoHostSelected);
    assert_eq!(session.current_step(), WizardStep::SelectSite);
    assert!(session.hosts().is_empty());
    // Intake options survive a reset.
    assert!(session.auto_onboard());
}

#[test]
fn test_durable_id_is_written_once() {
    let mut store = HostRecordStore::new();
    store.insert(host("h1"));
    store.set_durable_id("h1", "host-42");
    store.set_durable_id("h1", "host-99");
    assert_eq!(store.get("h1").unwrap().durable_id.as_deref(), Some("host-42"));
}

#[test]
fn test_store_replaces_record_with_same_key() {
    let mut store = HostRecordStore::new();
    store.insert(host("h1"));
    store.insert(configured_host("h1"));
    assert_eq!(store.len(), 1);
    assert!(store.get("h1").unwrap().instance.is_some());
}
