pub mod session;
pub mod store;
pub mod validate;

pub use session::{WizardSession, WizardStep, WizardView};
pub use store::HostRecordStore;
pub use validate::{is_valid_host_name, validate_step};
