mod follow_up;
mod notification;

pub use follow_up::{
    ContactChannel, DashboardCounts, DashboardMetrics, FollowUp, FollowUpDashboard, FollowUpPatch,
    ProcessOutcome, SystemInfo,
};
pub use notification::{Notification, Priority, RelatedEntity};
