pub mod host_record;
pub mod host_view;
pub mod os_profile;
pub mod site;

pub use host_record::{HostRecord, InstanceSpec, MetadataPair, SecurityFeature};
pub use host_view::HostView;
pub use os_profile::OsProfile;
pub use site::Site;
