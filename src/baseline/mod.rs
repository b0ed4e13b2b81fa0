pub mod data;
pub mod resolver;

pub use data::{CompatDatabase, FeatureRecord};
pub use resolver::BaselineResolver;

use crate::core::{BaselineStatus, BaselineTier};

/// Plain-text reading of a resolved status, used by the `status` command.
pub fn interpretation(status: &BaselineStatus) -> &'static str {
    if status.discouraged {
        return "Discouraged - avoid in new code";
    }
    match status.baseline {
        BaselineTier::High => "Widely supported - safe to use",
        BaselineTier::Low => "Newly available - monitor adoption",
        BaselineTier::False => {
            if status.has_any_support() {
                "Limited support - use with caution"
            } else {
                "No support data - verify manually"
            }
        }
    }
}
