pub mod audit;
pub mod status;

pub use audit::{audit_file, audit_project, AuditOptions};
pub use status::resolve_feature;
