pub mod host_filter;
pub mod provisioning;

pub use host_filter::{HostFilter, LifeCycleFilter, StatusBucket, WorkloadMembership};
pub use provisioning::{
    register_only, HostOutcome, ProvisionError, ProvisionPhase, ProvisionRun, RunNotice,
};
