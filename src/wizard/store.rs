use crate::models::HostRecord;

/// Ordered collection of the hosts being configured in the current session,
/// keyed by each record's provisional `key`. Iteration order is insertion
/// order; the orchestrator relies on it when walking a batch.
#[derive(Debug, Clone, Default)]
pub struct HostRecordStore {
    hosts: Vec<HostRecord>,
}

impl HostRecordStore {
    pub fn new() -> Self {
        HostRecordStore { hosts: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    /// Insert a host, replacing any record that already carries the same key.
    pub fn insert(&mut self, host: HostRecord) {
        if let Some(existing) = self.hosts.iter_mut().find(|h| h.key == host.key) {
            *existing = host;
        } else {
            self.hosts.push(host);
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<HostRecord> {
        let idx = self.hosts.iter().position(|h| h.key == key)?;
        Some(self.hosts.remove(idx))
    }

    pub fn get(&self, key: &str) -> Option<&HostRecord> {
        self.hosts.iter().find(|h| h.key == key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut HostRecord> {
        self.hosts.iter_mut().find(|h| h.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &HostRecord> {
        self.hosts.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut HostRecord> {
        self.hosts.iter_mut()
    }

    /// Keys snapshot, in iteration order. Lets callers mutate records while
    /// walking the batch.
    pub fn keys(&self) -> Vec<String> {
        self.hosts.iter().map(|h| h.key.clone()).collect()
    }

    /// Record the backend-assigned identifier. A durable id is written once;
    /// later calls for the same host are ignored.
    pub fn set_durable_id(&mut self, key: &str, durable_id: &str) {
        if let Some(host) = self.get_mut(key) {
            if host.durable_id.is_none() {
                host.durable_id = Some(durable_id.to_string());
                host.error = None;
            }
        }
    }

    pub fn set_error(&mut self, key: &str, message: &str) {
        if let Some(host) = self.get_mut(key) {
            host.error = Some(message.to_string());
        }
    }

    pub fn clear(&mut self) {
        self.hosts.clear();
    }
}
