use std::collections::BTreeSet;

/// Fields the free-text search facet matches against, in output order.
const SEARCH_FIELDS: [&str; 5] = ["name", "serialNumber", "uuid", "note", "site.name"];

/// Indicator fields each status bucket expands over, in output order.
const STATUS_INDICATOR_FIELDS: [&str; 3] =
    ["hostStatusIndicator", "instanceStatusIndicator", "updateStatusIndicator"];

/// Lifecycle facet: each value maps to a canonical state expression; `All`
/// contributes no predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifeCycleFilter {
    #[default]
    All,
    Provisioned,
    Onboarded,
    Registered,
}

impl LifeCycleFilter {
    fn predicate(&self) -> Option<String> {
        match self {
            LifeCycleFilter::All => None,
            LifeCycleFilter::Provisioned => {
                Some("currentState=HOST_STATE_ONBOARDED AND has(instance)".into())
            }
            LifeCycleFilter::Onboarded => {
                Some("currentState=HOST_STATE_ONBOARDED AND NOT has(instance)".into())
            }
            LifeCycleFilter::Registered => Some(
                "(currentState=HOST_STATE_REGISTERED OR currentState=HOST_STATE_UNSPECIFIED)"
                    .into(),
            ),
        }
    }
}

/// Status buckets in canonical output order. Selected buckets are OR-joined
/// inside a single group regardless of selection order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StatusBucket {
    Ready,
    InProgress,
    Error,
    Unknown,
    Deauthorized,
}

impl StatusBucket {
    fn terms(&self) -> Vec<String> {
        let indication = match self {
            StatusBucket::Ready => "STATUS_INDICATION_IDLE",
            StatusBucket::InProgress => "STATUS_INDICATION_IN_PROGRESS",
            StatusBucket::Error => "STATUS_INDICATION_ERROR",
            StatusBucket::Unknown => "STATUS_INDICATION_UNSPECIFIED",
            StatusBucket::Deauthorized => {
                return vec!["currentState=HOST_STATE_UNTRUSTED".to_string()]
            }
        };
        STATUS_INDICATOR_FIELDS.iter().map(|f| format!("{}={}", f, indication)).collect()
    }
}

/// Workload-membership facet. Explicit tri-state: the unset case carries no
/// predicate at all, it is not a false.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkloadMembership {
    #[default]
    Any,
    Present,
    Absent,
}

impl WorkloadMembership {
    fn predicate(&self) -> Option<String> {
        match self {
            WorkloadMembership::Any => None,
            WorkloadMembership::Present => Some("has(instance.workloadMembers)".into()),
            WorkloadMembership::Absent => Some("NOT has(instance.workloadMembers)".into()),
        }
    }
}

/// Accumulates independently toggleable search facets and derives the one
/// combined query string handed to the host list request. Every setter
/// recomputes the combined query; clearing a facet removes exactly its own
/// contribution.
#[derive(Debug, Clone, Default)]
pub struct HostFilter {
    life_cycle: LifeCycleFilter,
    search_term: Option<String>,
    statuses: BTreeSet<StatusBucket>,
    os_profiles: Vec<String>,
    workload: WorkloadMembership,
    workload_member_id: Option<String>,
    site_id: Option<String>,
    combined: Option<String>,
}

impl HostFilter {
    pub fn new() -> Self {
        HostFilter::default()
    }

    /// The combined query, or None when every facet is unset (no filter).
    pub fn combined_query(&self) -> Option<&str> {
        self.combined.as_deref()
    }

    pub fn set_life_cycle(&mut self, state: LifeCycleFilter) -> Option<&str> {
        self.life_cycle = state;
        self.recompute()
    }

    pub fn set_search_term(&mut self, term: Option<String>) -> Option<&str> {
        self.search_term = term.map(|t| t.trim().to_string()).filter(|t| !t.is_empty());
        self.recompute()
    }

    pub fn set_statuses(&mut self, statuses: impl IntoIterator<Item = StatusBucket>) -> Option<&str> {
        self.statuses = statuses.into_iter().collect();
        self.recompute()
    }

    pub fn toggle_status(&mut self, bucket: StatusBucket, selected: bool) -> Option<&str> {
        if selected {
            self.statuses.insert(bucket);
        } else {
            self.statuses.remove(&bucket);
        }
        self.recompute()
    }

    pub fn set_os_profiles(&mut self, profiles: Vec<String>) -> Option<&str> {
        self.os_profiles = profiles.into_iter().filter(|p| !p.trim().is_empty()).collect();
        self.recompute()
    }

    pub fn set_workload(&mut self, membership: WorkloadMembership) -> Option<&str> {
        self.workload = membership;
        self.recompute()
    }

    pub fn set_workload_member_id(&mut self, id: Option<String>) -> Option<&str> {
        self.workload_member_id = id.filter(|s| !s.trim().is_empty());
        self.recompute()
    }

    pub fn set_site_id(&mut self, id: Option<String>) -> Option<&str> {
        self.site_id = id.filter(|s| !s.trim().is_empty());
        self.recompute()
    }

    fn recompute(&mut self) -> Option<&str> {
        let mut clauses: Vec<String> = Vec::new();
        if let Some(p) = self.life_cycle.predicate() {
            clauses.push(p);
        }
        if let Some(term) = self.search_term.as_deref() {
            let escaped = escape_term(term);
            let terms: Vec<String> =
                SEARCH_FIELDS.iter().map(|f| format!("{}=\"{}\"", f, escaped)).collect();
            clauses.push(format!("({})", terms.join(" OR ")));
        }
        if !self.statuses.is_empty() {
            let terms: Vec<String> = self.statuses.iter().flat_map(|b| b.terms()).collect();
            clauses.push(format!("({})", terms.join(" OR ")));
        }
        if !self.os_profiles.is_empty() {
            let terms: Vec<String> = self
                .os_profiles
                .iter()
                .map(|p| format!("instance.desiredOs.profileName=\"{}\"", escape_term(p)))
                .collect();
            clauses.push(format!("({})", terms.join(" OR ")));
        }
        if let Some(p) = self.workload.predicate() {
            clauses.push(p);
        }
        if let Some(id) = self.workload_member_id.as_deref() {
            clauses.push(format!("workloadMemberId=\"{}\"", escape_term(id)));
        }
        if let Some(id) = self.site_id.as_deref() {
            clauses.push(format!("site.resourceId=\"{}\"", escape_term(id)));
        }
        self.combined =
            if clauses.is_empty() { None } else { Some(clauses.join(" AND ")) };
        self.combined.as_deref()
    }
}

fn escape_term(term: &str) -> String {
    term.replace('\\', "\\\\").replace('"', "\\\"")
}
