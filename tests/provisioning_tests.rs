use std::collections::HashMap;
use std::sync::Mutex;

use fleet::api::{
    ApiError, CreateInstanceRequest, InventoryApi, PatchHostRequest, RegisterHostRequest,
};
use fleet::models::{HostRecord, InstanceSpec, SecurityFeature};
use fleet::services::{
    register_only, HostOutcome, ProvisionError, ProvisionPhase, ProvisionRun, RunNotice,
};
use fleet::wizard::{WizardSession, WizardView};

/// In-memory inventory double that counts calls per host and fails on demand.
#[derive(Default)]
struct FakeInventory {
    register_calls: Mutex<HashMap<String, usize>>,
    patch_calls: Mutex<HashMap<String, usize>>,
    instance_calls: Mutex<HashMap<String, usize>>,
    fail_register: Mutex<HashMap<String, String>>,
    fail_patch: Mutex<HashMap<String, String>>,
    fail_instance: Mutex<HashMap<String, String>>,
    next_id: Mutex<usize>,
}

impl FakeInventory {
    fn new() -> Self {
        FakeInventory::default()
    }

    fn fail_register_with(&self, name: &str, message: &str) {
        self.fail_register.lock().unwrap().insert(name.into(), message.into());
    }

    fn fail_patch_with(&self, name: &str, message: &str) {
        self.fail_patch.lock().unwrap().insert(name.into(), message.into());
    }

    fn fail_instance_with(&self, host_name: &str, message: &str) {
        self.fail_instance.lock().unwrap().insert(host_name.into(), message.into());
    }

    fn clear_failures(&self) {
        self.fail_register.lock().unwrap().clear();
        self.fail_patch.lock().unwrap().clear();
        self.fail_instance.lock().unwrap().clear();
    }

    fn register_count(&self, name: &str) -> usize {
        *self.register_calls.lock().unwrap().get(name).unwrap_or(&0)
    }

    fn patch_count(&self, name: &str) -> usize {
        *self.patch_calls.lock().unwrap().get(name).unwrap_or(&0)
    }

    fn instance_count(&self, host_name: &str) -> usize {
        *self.instance_calls.lock().unwrap().get(host_name).unwrap_or(&0)
    }

    fn total_patch_calls(&self) -> usize {
        self.patch_calls.lock().unwrap().values().sum()
    }

    fn total_instance_calls(&self) -> usize {
        self.instance_calls.lock().unwrap().values().sum()
    }
}

fn conflict(message: &str) -> ApiError {
    ApiError::Api { status: 409, message: message.to_string() }
}

impl InventoryApi for FakeInventory {
    async fn register_host(&self, req: &RegisterHostRequest) -> Result<String, ApiError> {
        *self.register_calls.lock().unwrap().entry(req.name.clone()).or_insert(0) += 1;
        if let Some(msg) = self.fail_register.lock().unwrap().get(&req.name) {
            return Err(conflict(msg));
        }
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        Ok(format!("host-{}", next))
    }

    async fn patch_host(&self, _host_id: &str, req: &PatchHostRequest) -> Result<(), ApiError> {
        *self.patch_calls.lock().unwrap().entry(req.name.clone()).or_insert(0) += 1;
        if let Some(msg) = self.fail_patch.lock().unwrap().get(&req.name) {
            return Err(conflict(msg));
        }
        Ok(())
    }

    async fn create_instance(&self, req: &CreateInstanceRequest) -> Result<String, ApiError> {
        // Instance names carry a "-instance" suffix; count by host name.
        let host_name = req.name.trim_end_matches("-instance").to_string();
        *self.instance_calls.lock().unwrap().entry(host_name.clone()).or_insert(0) += 1;
        if let Some(msg) = self.fail_instance.lock().unwrap().get(&host_name) {
            return Err(conflict(msg));
        }
        Ok(format!("inst-{}", host_name))
    }
}

fn configured_host(name: &str) -> HostRecord {
    let mut h = HostRecord::new(name);
    h.serial_number = Some(format!("SN-{}", name));
    h.site_id = Some("site-1".into());
    h.site_name = Some("Lab".into());
    h.instance = Some(InstanceSpec {
        os_id: "os-1".into(),
        security_feature: Some(SecurityFeature::None),
        local_account_id: None,
    });
    h
}

fn session_with(hosts: &[&str]) -> WizardSession {
    let mut session = WizardSession::new(false, true);
    for name in hosts {
        session.add_host(configured_host(name));
    }
    session
}

#[tokio::test]
async fn test_full_batch_succeeds_and_resets_session() {
    let api = FakeInventory::new();
    let mut session = session_with(&["h1", "h2"]);

    let mut run = ProvisionRun::new();
    let notice = run.run(&api, &mut session).await.unwrap();

    assert_eq!(notice, RunNotice::AllSucceeded { count: 2 });
    assert_eq!(run.phase(), ProvisionPhase::Idle);
    for name in ["h1", "h2"] {
        assert_eq!(api.register_count(name), 1);
        assert_eq!(api.patch_count(name), 1);
        assert_eq!(api.instance_count(name), 1);
        assert_eq!(run.results().get(name), Some(&HostOutcome::Succeeded));
    }
    // Full success hands control back to the host list with a clean session.
    assert_eq!(session.view(), WizardView::NoHostSelected);
}

#[tokio::test]
async fn test_register_failure_is_isolated_and_stops_that_hosts_chain() {
    let api = FakeInventory::new();
    api.fail_register_with("h1", "quota exceeded");
    let mut session = session_with(&["h1"]);

    let mut run = ProvisionRun::new();
    let notice = run.run(&api, &mut session).await.unwrap();

    assert_eq!(notice, RunNotice::PartialFailure { failed: vec!["h1".into()] });
    assert_eq!(run.phase(), ProvisionPhase::Idle);
    assert_eq!(
        run.results().get("h1"),
        Some(&HostOutcome::Failed("quota exceeded".into()))
    );
    // The failed host never reaches the later phases.
    assert_eq!(api.patch_count("h1"), 0);
    assert_eq!(api.instance_count("h1"), 0);
    // Input is kept for a corrected re-run, with the error on the record.
    let h1 = session.hosts().get("h1").unwrap();
    assert_eq!(h1.error.as_deref(), Some("quota exceeded"));
    assert!(h1.durable_id.is_none());
}

#[tokio::test]
async fn test_one_failing_host_does_not_abort_the_batch() {
    let api = FakeInventory::new();
    api.fail_register_with("h1", "quota exceeded");
    let mut session = session_with(&["h1", "h2"]);

    let mut run = ProvisionRun::new();
    let notice = run.run(&api, &mut session).await.unwrap();

    assert_eq!(notice, RunNotice::PartialFailure { failed: vec!["h1".into()] });
    // h2 ran its full chain regardless of h1.
    assert_eq!(api.register_count("h2"), 1);
    assert_eq!(api.patch_count("h2"), 1);
    assert_eq!(api.instance_count("h2"), 1);
    assert_eq!(run.results().get("h2"), Some(&HostOutcome::Succeeded));
    // Partial failure keeps the session for a retry.
    assert!(!session.hosts().is_empty());
}

#[tokio::test]
async fn test_retry_skips_hosts_that_already_succeeded() {
    let api = FakeInventory::new();
    api.fail_instance_with("h2", "no capacity on site");
    let mut session = session_with(&["h1", "h2"]);

    let mut run = ProvisionRun::new();
    let notice = run.run(&api, &mut session).await.unwrap();
    assert_eq!(notice, RunNotice::PartialFailure { failed: vec!["h2".into()] });

    api.clear_failures();
    let notice = run.run(&api, &mut session).await.unwrap();
    assert_eq!(notice, RunNotice::AllSucceeded { count: 2 });

    // h1 succeeded on pass 1 and was not re-submitted anywhere.
    assert_eq!(api.register_count("h1"), 1);
    assert_eq!(api.patch_count("h1"), 1);
    assert_eq!(api.instance_count("h1"), 1);
    // h2 kept its durable id, so only patch and instance were retried.
    assert_eq!(api.register_count("h2"), 1);
    assert_eq!(api.patch_count("h2"), 2);
    assert_eq!(api.instance_count("h2"), 2);
}

#[tokio::test]
async fn test_patch_failure_skips_instantiation_for_that_host() {
    let api = FakeInventory::new();
    api.fail_patch_with("h1", "site not found");
    let mut session = session_with(&["h1"]);

    let mut run = ProvisionRun::new();
    let notice = run.run(&api, &mut session).await.unwrap();

    assert_eq!(notice, RunNotice::PartialFailure { failed: vec!["h1".into()] });
    assert_eq!(
        run.results().get("h1"),
        Some(&HostOutcome::Failed("site not found".into()))
    );
    assert_eq!(api.instance_count("h1"), 0);
    // Registration stuck: the durable id survives for the retry.
    assert!(session.hosts().get("h1").unwrap().durable_id.is_some());
}

#[tokio::test]
async fn test_existing_os_skips_instance_creation() {
    let api = FakeInventory::new();
    let mut session = WizardSession::new(false, true);
    let mut h = configured_host("h1");
    h.original_os = Some("os-preinstalled".into());
    session.add_host(h);

    let mut run = ProvisionRun::new();
    let notice = run.run(&api, &mut session).await.unwrap();

    assert_eq!(notice, RunNotice::AllSucceeded { count: 1 });
    assert_eq!(api.register_count("h1"), 1);
    assert_eq!(api.patch_count("h1"), 1);
    assert_eq!(api.total_instance_calls(), 0);
}

#[tokio::test]
async fn test_already_registered_hosts_enter_at_updating() {
    let api = FakeInventory::new();
    let mut session = WizardSession::new(false, false);
    let mut h = configured_host("h1");
    h.durable_id = Some("host-77".into());
    session.add_host(h);

    let mut run = ProvisionRun::new();
    let notice = run.run(&api, &mut session).await.unwrap();

    assert_eq!(notice, RunNotice::AllSucceeded { count: 1 });
    assert_eq!(api.register_count("h1"), 0);
    assert_eq!(api.patch_count("h1"), 1);
    assert_eq!(api.instance_count("h1"), 1);
}

#[tokio::test]
async fn test_run_with_no_hosts_is_a_caller_error() {
    let api = FakeInventory::new();
    let mut session = WizardSession::new(false, true);
    let mut run = ProvisionRun::new();
    assert!(matches!(
        run.run(&api, &mut session).await,
        Err(ProvisionError::NoHosts)
    ));
    assert_eq!(run.phase(), ProvisionPhase::Idle);
    assert_eq!(api.total_patch_calls(), 0);
}

#[tokio::test]
async fn test_register_only_is_single_shot_with_per_host_isolation() {
    let api = FakeInventory::new();
    api.fail_register_with("h2", "serial number already in use");
    let mut session = WizardSession::new(true, false);
    session.add_host(configured_host("h1"));
    session.add_host(configured_host("h2"));

    let results = register_only(&api, &mut session).await.unwrap();

    assert_eq!(results.get("h1"), Some(&HostOutcome::Succeeded));
    assert_eq!(
        results.get("h2"),
        Some(&HostOutcome::Failed("serial number already in use".into()))
    );
    // No phase chaining: nothing is patched or instantiated.
    assert_eq!(api.total_patch_calls(), 0);
    assert_eq!(api.total_instance_calls(), 0);
    assert!(session.hosts().get("h1").unwrap().durable_id.is_some());
    assert_eq!(
        session.hosts().get("h2").unwrap().error.as_deref(),
        Some("serial number already in use")
    );
}

#[tokio::test]
async fn test_register_only_skips_hosts_with_durable_ids() {
    let api = FakeInventory::new();
    let mut session = WizardSession::new(false, false);
    let mut h = configured_host("h1");
    h.durable_id = Some("host-5".into());
    session.add_host(h);
    session.add_host(configured_host("h2"));

    let results = register_only(&api, &mut session).await.unwrap();

    assert_eq!(api.register_count("h1"), 0);
    assert_eq!(api.register_count("h2"), 1);
    assert!(results.get("h1").is_none());
    assert_eq!(results.get("h2"), Some(&HostOutcome::Succeeded));
}
