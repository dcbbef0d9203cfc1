//! Typed Nexo CRM API client crate used by the desk engine.

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod rate_limiter;

pub use client::{CrmClient, NotificationPage};
pub use config::CrmConfig;
pub use error::{CrmError, Result};
pub use models::{
    ContactChannel, DashboardCounts, DashboardMetrics, FollowUp, FollowUpDashboard, FollowUpPatch,
    Notification, Priority, ProcessOutcome, RelatedEntity, SystemInfo,
};
pub use rate_limiter::RateLimiter;
