//! Nexo desk engine: the notification inbox, the follow-up board and the
//! polling cadence behind the CRM desktop shell.

pub mod commands;
pub mod config;
pub mod display;
pub mod followups;
pub mod gateway;
pub mod notifications;
pub mod poller;
pub mod toast;
pub mod urgency;

pub use config::{ConfigManager, DeskConfig};
pub use display::{ActionTarget, KindDescriptor, NotificationKind};
pub use followups::{BoardState, FollowUpBoard, FollowUpDesk, FollowUpError, SweepOutcome};
pub use gateway::CrmGateway;
pub use notifications::{FailureKind, Inbox, LoadPhase, NotificationCenter};
pub use poller::Poller;
pub use toast::{ToastCenter, ToastEntry};
pub use urgency::{ScheduleUrgency, UrgencyLevel};
