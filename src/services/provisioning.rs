use std::collections::BTreeMap;
use std::future::Future;

use thiserror::Error;

use crate::api::{
    ApiError, CreateInstanceRequest, InventoryApi, PatchHostRequest, RegisterHostRequest,
};
use crate::models::SecurityFeature;
use crate::wizard::WizardSession;

/// Phases of one batch provisioning run.
///
/// ```text
/// Idle -> Registering -> Updating -> Instantiating -> Results -> (BackToHosts | Idle)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProvisionPhase {
    #[default]
    Idle,
    Registering,
    Updating,
    Instantiating,
    Results,
    BackToHosts,
}

/// Final outcome of one host in the run's result map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostOutcome {
    Succeeded,
    Failed(String),
}

/// The single aggregate notification that crosses the core/presentation
/// boundary once the batch has completed its pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunNotice {
    AllSucceeded { count: usize },
    PartialFailure { failed: Vec<String> },
}

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("no hosts selected")]
    NoHosts,
}

/// Batch orchestrator: registers, patches and instantiates every host in
/// the session, one remote call at a time, isolating failures per host.
///
/// The run is an explicit state machine; `step` performs exactly one phase
/// and returns the phase entered next, `run` is the loop that drives it to
/// a terminal phase. Re-invoking `run` after a partial failure retries only
/// the hosts that have not succeeded yet.
#[derive(Debug, Default)]
pub struct ProvisionRun {
    phase: ProvisionPhase,
    results: BTreeMap<String, HostOutcome>,
    notice: Option<RunNotice>,
}

impl ProvisionRun {
    pub fn new() -> Self {
        ProvisionRun::default()
    }

    pub fn phase(&self) -> ProvisionPhase {
        self.phase
    }

    pub fn results(&self) -> &BTreeMap<String, HostOutcome> {
        &self.results
    }

    pub fn notice(&self) -> Option<&RunNotice> {
        self.notice.as_ref()
    }

    /// Drive the state machine until it parks again: `BackToHosts` has reset
    /// the session after full success, or `Results` has returned to `Idle`
    /// so the user can correct input and re-run.
    pub async fn run<A: InventoryApi>(
        &mut self,
        api: &A,
        session: &mut WizardSession,
    ) -> Result<RunNotice, ProvisionError> {
        if session.hosts().is_empty() {
            return Err(ProvisionError::NoHosts);
        }
        loop {
            let prev = self.phase;
            let next = self.step(api, session).await;
            if next == ProvisionPhase::Idle
                && matches!(prev, ProvisionPhase::Results | ProvisionPhase::BackToHosts)
            {
                break;
            }
        }
        Ok(self.notice.clone().unwrap_or(RunNotice::AllSucceeded { count: 0 }))
    }

    /// Perform the current phase and move to the next one.
    pub async fn step<A: InventoryApi>(
        &mut self,
        api: &A,
        session: &mut WizardSession,
    ) -> ProvisionPhase {
        let next = match self.phase {
            ProvisionPhase::Idle => self.enter(session),
            ProvisionPhase::Registering => {
                self.register_all(api, session).await;
                ProvisionPhase::Updating
            }
            ProvisionPhase::Updating => {
                self.update_all(api, session).await;
                ProvisionPhase::Instantiating
            }
            ProvisionPhase::Instantiating => {
                self.instantiate_all(api, session).await;
                ProvisionPhase::Results
            }
            ProvisionPhase::Results => self.finish(),
            ProvisionPhase::BackToHosts => {
                session.reset();
                ProvisionPhase::Idle
            }
        };
        self.phase = next;
        next
    }

    fn enter(&mut self, session: &WizardSession) -> ProvisionPhase {
        // A fresh pass keeps prior successes (retry skips them) and drops
        // stale failures so those hosts are attempted again.
        self.results.retain(|_, o| matches!(o, HostOutcome::Succeeded));
        self.notice = None;
        let needs_register =
            session.hosts().iter().any(|h| h.durable_id.is_none() && !self.succeeded(&h.name));
        if needs_register {
            ProvisionPhase::Registering
        } else {
            ProvisionPhase::Updating
        }
    }

    async fn register_all<A: InventoryApi>(&mut self, api: &A, session: &mut WizardSession) {
        let auto_onboard = session.auto_onboard();
        for key in session.hosts().keys() {
            let Some(host) = session.hosts().get(&key) else { continue };
            if host.durable_id.is_some() || self.succeeded(&host.name) {
                continue;
            }
            let name = host.name.clone();
            let req = RegisterHostRequest {
                name: name.clone(),
                serial_number: host.serial_number.clone(),
                uuid: host.uuid.clone(),
                auto_onboard,
            };
            match self.attempt(&name, api.register_host(&req)).await {
                Some(durable_id) => session.hosts_mut().set_durable_id(&key, &durable_id),
                None => self.copy_error_to_host(&name, &key, session),
            }
        }
    }

    async fn update_all<A: InventoryApi>(&mut self, api: &A, session: &mut WizardSession) {
        for key in session.hosts().keys() {
            let Some(host) = session.hosts().get(&key) else { continue };
            let Some(durable_id) = host.durable_id.clone() else { continue };
            let name = host.name.clone();
            if self.settled(&name) {
                continue;
            }
            let req = PatchHostRequest {
                name: name.clone(),
                site_id: host.site_id.clone(),
                metadata: host.metadata.clone(),
            };
            if self.attempt(&name, api.patch_host(&durable_id, &req)).await.is_none() {
                self.copy_error_to_host(&name, &key, session);
            }
        }
    }

    async fn instantiate_all<A: InventoryApi>(&mut self, api: &A, session: &mut WizardSession) {
        for key in session.hosts().keys() {
            let Some(host) = session.hosts().get(&key) else { continue };
            let Some(durable_id) = host.durable_id.clone() else { continue };
            let name = host.name.clone();
            if self.settled(&name) {
                continue;
            }
            if host.original_os.is_some() {
                // An OS already exists on this host; its chain ended at the
                // patch, which did not fail, so the host is done.
                self.results.insert(name, HostOutcome::Succeeded);
                continue;
            }
            let Some(spec) = host.instance.clone() else {
                self.results
                    .insert(name.clone(), HostOutcome::Failed("no instance configuration".into()));
                self.copy_error_to_host(&name, &key, session);
                continue;
            };
            let req = CreateInstanceRequest::metal(
                durable_id.as_str(),
                host.instance_name(),
                spec.os_id.as_str(),
                spec.security_feature.unwrap_or(SecurityFeature::None),
                spec.local_account_id.clone(),
            );
            match self.attempt(&name, api.create_instance(&req)).await {
                Some(_instance_id) => {
                    self.results.insert(name, HostOutcome::Succeeded);
                }
                None => self.copy_error_to_host(&name, &key, session),
            }
        }
    }

    fn finish(&mut self) -> ProvisionPhase {
        let failed: Vec<String> = self
            .results
            .iter()
            .filter(|(_, o)| matches!(o, HostOutcome::Failed(_)))
            .map(|(n, _)| n.clone())
            .collect();
        if failed.is_empty() {
            self.notice = Some(RunNotice::AllSucceeded { count: self.results.len() });
            ProvisionPhase::BackToHosts
        } else {
            self.notice = Some(RunNotice::PartialFailure { failed });
            ProvisionPhase::Idle
        }
    }

    /// Await one remote operation for one host; a failure becomes a message
    /// in the result map and never escapes the batch.
    async fn attempt<T>(
        &mut self,
        name: &str,
        op: impl Future<Output = Result<T, ApiError>>,
    ) -> Option<T> {
        match op.await {
            Ok(value) => Some(value),
            Err(e) => {
                self.results.insert(name.to_string(), HostOutcome::Failed(e.to_string()));
                None
            }
        }
    }

    fn copy_error_to_host(&self, name: &str, key: &str, session: &mut WizardSession) {
        if let Some(HostOutcome::Failed(msg)) = self.results.get(name) {
            let msg = msg.clone();
            session.hosts_mut().set_error(key, &msg);
        }
    }

    fn succeeded(&self, name: &str) -> bool {
        matches!(self.results.get(name), Some(HostOutcome::Succeeded))
    }

    /// A host already settled this run, either way.
    fn settled(&self, name: &str) -> bool {
        self.results.contains_key(name)
    }
}

/// Single-shot registration for the non-auto-provision intake: hosts are
/// registered with the same per-host failure isolation but without the
/// phase chain; configuration happens later, from the host list.
pub async fn register_only<A: InventoryApi>(
    api: &A,
    session: &mut WizardSession,
) -> Result<BTreeMap<String, HostOutcome>, ProvisionError> {
    if session.hosts().is_empty() {
        return Err(ProvisionError::NoHosts);
    }
    let auto_onboard = session.auto_onboard();
    let mut results = BTreeMap::new();
    for key in session.hosts().keys() {
        let Some(host) = session.hosts().get(&key) else { continue };
        if host.durable_id.is_some() {
            continue;
        }
        let name = host.name.clone();
        let req = RegisterHostRequest {
            name: name.clone(),
            serial_number: host.serial_number.clone(),
            uuid: host.uuid.clone(),
            auto_onboard,
        };
        match api.register_host(&req).await {
            Ok(durable_id) => {
                session.hosts_mut().set_durable_id(&key, &durable_id);
                results.insert(name, HostOutcome::Succeeded);
            }
            Err(e) => {
                let msg = e.to_string();
                session.hosts_mut().set_error(&key, &msg);
                results.insert(name, HostOutcome::Failed(msg));
            }
        }
    }
    Ok(results)
}
