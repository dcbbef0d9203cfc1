//! Service seam between the desk engine and the CRM backend.
//!
//! The engine talks to this trait only; production wires in [`CrmClient`],
//! tests substitute an in-memory mock.

use async_trait::async_trait;
use nexo_api::{
    CrmClient, FollowUpDashboard, FollowUpPatch, NotificationPage, ProcessOutcome, Result,
};

#[async_trait]
pub trait CrmGateway: Send + Sync {
    async fn fetch_notifications(&self) -> Result<NotificationPage>;

    async fn fetch_unread_count(&self) -> Result<u32>;

    async fn mark_notification_read(&self, id: u64) -> Result<()>;

    async fn mark_all_notifications_read(&self) -> Result<()>;

    /// Lightweight reachability probe; never fails, reports false instead.
    async fn test_connection(&self) -> bool;

    async fn update_follow_up(&self, prospect_id: &str, patch: &FollowUpPatch) -> Result<()>;

    async fn fetch_follow_up_dashboard(&self, advisor_id: Option<&str>)
        -> Result<FollowUpDashboard>;

    async fn process_due_follow_ups(&self) -> Result<ProcessOutcome>;
}

#[async_trait]
impl CrmGateway for CrmClient {
    async fn fetch_notifications(&self) -> Result<NotificationPage> {
        CrmClient::fetch_notifications(self).await
    }

    async fn fetch_unread_count(&self) -> Result<u32> {
        CrmClient::fetch_unread_count(self).await
    }

    async fn mark_notification_read(&self, id: u64) -> Result<()> {
        CrmClient::mark_notification_read(self, id).await
    }

    async fn mark_all_notifications_read(&self) -> Result<()> {
        CrmClient::mark_all_notifications_read(self).await
    }

    async fn test_connection(&self) -> bool {
        CrmClient::test_connection(self).await
    }

    async fn update_follow_up(&self, prospect_id: &str, patch: &FollowUpPatch) -> Result<()> {
        CrmClient::update_follow_up(self, prospect_id, patch).await
    }

    async fn fetch_follow_up_dashboard(
        &self,
        advisor_id: Option<&str>,
    ) -> Result<FollowUpDashboard> {
        CrmClient::fetch_follow_up_dashboard(self, advisor_id).await
    }

    async fn process_due_follow_ups(&self) -> Result<ProcessOutcome> {
        CrmClient::process_due_follow_ups(self).await
    }
}
