use crate::config::CrmConfig;
use crate::error::{CrmError, Result};
use crate::models::{FollowUpDashboard, FollowUpPatch, Notification, ProcessOutcome};
use crate::rate_limiter::RateLimiter;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, AUTHORIZATION, USER_AGENT};
use reqwest::{Client as HttpClient, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

#[derive(Clone)]
pub struct CrmClient {
    http: HttpClient,
    config: CrmConfig,
    limiter: RateLimiter,
}

impl CrmClient {
    pub fn new(config: CrmConfig) -> Result<Self> {
        let http = build_http_client(&config)?;
        let limiter = RateLimiter::new(config.cooldown);
        Ok(Self {
            http,
            config,
            limiter,
        })
    }

    pub fn config(&self) -> &CrmConfig {
        &self.config
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub async fn get<T>(&self, path: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.send_with_body(Method::GET, path, Option::<&Value>::None).await
    }

    pub async fn get_with_query<T>(
        &self,
        path: &str,
        query: Option<&[(&str, &str)]>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.limiter.hit().await;
        let mut request = self.http.get(self.url_for(path));
        if let Some(params) = query {
            request = request.query(params);
        }
        let response = request.send().await?;
        Self::parse_json(response).await
    }

    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_with_body(Method::PATCH, path, Some(body)).await
    }

    pub async fn send_with_body<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.limiter.hit().await;
        let url = self.url_for(path);
        let mut request = self.http.request(method, url);
        if let Some(payload) = body {
            request = request.json(payload);
        }
        let response = request.send().await?;
        Self::parse_json(response).await
    }

    fn url_for(&self, path: &str) -> String {
        let mut base = self.config.api_root();
        let trimmed = path.trim_start_matches('/');
        base.push_str(trimmed);
        base
    }

    async fn parse_json<T>(response: Response) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let status = response.status();
        if status.is_success() {
            response.json::<T>().await.map_err(CrmError::from)
        } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            Err(CrmError::AccessDenied(format!(
                "Access denied ({}) - {}",
                status, body
            )))
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(build_http_error(status, &body))
        }
    }

    pub async fn fetch_notifications(&self) -> Result<NotificationPage> {
        let envelope: ListEnvelope = self.get("notificaciones").await?;
        ensure_envelope(envelope.success, envelope.error)?;
        Ok(NotificationPage {
            items: envelope.data,
            total_unread: envelope.total_unread,
        })
    }

    pub async fn fetch_unread_count(&self) -> Result<u32> {
        let envelope: CountEnvelope = self.get("notificaciones/unread-count").await?;
        ensure_envelope(envelope.success, envelope.error)?;
        Ok(envelope.count)
    }

    pub async fn mark_notification_read(&self, id: u64) -> Result<()> {
        let path = format!("notificaciones/{}/read", id);
        let envelope: AckEnvelope = self
            .send_with_body(Method::POST, &path, Option::<&Value>::None)
            .await?;
        ensure_envelope(envelope.success, envelope.error)
    }

    pub async fn mark_all_notifications_read(&self) -> Result<()> {
        let envelope: AckEnvelope = self
            .send_with_body(Method::POST, "notificaciones/read-all", Option::<&Value>::None)
            .await?;
        ensure_envelope(envelope.success, envelope.error)
    }

    pub async fn test_connection(&self) -> bool {
        match self.get::<AckEnvelope>("health").await {
            Ok(envelope) => envelope.success,
            Err(err) => {
                debug!("connection probe failed: {}", err);
                false
            }
        }
    }

    pub async fn update_follow_up(&self, prospect_id: &str, patch: &FollowUpPatch) -> Result<()> {
        let path = format!("prospectos/{}/seguimiento", prospect_id);
        let envelope: AckEnvelope = self.patch(&path, patch).await?;
        ensure_envelope(envelope.success, envelope.error)
    }

    pub async fn fetch_follow_up_dashboard(
        &self,
        advisor_id: Option<&str>,
    ) -> Result<FollowUpDashboard> {
        let params = advisor_id.map(|id| [("asesor", id)]);
        let envelope: DashboardEnvelope = self
            .get_with_query("seguimientos/dashboard", params.as_ref().map(|p| p.as_slice()))
            .await?;
        ensure_envelope(envelope.success, envelope.error)?;
        Ok(envelope.data.unwrap_or_default())
    }

    pub async fn process_due_follow_ups(&self) -> Result<ProcessOutcome> {
        let envelope: ProcessEnvelope = self
            .send_with_body(
                Method::POST,
                "seguimientos/procesar-vencidos",
                Option::<&Value>::None,
            )
            .await?;
        ensure_envelope(envelope.success, envelope.error)?;
        Ok(ProcessOutcome {
            processed: envelope.processed,
            message: envelope.message,
        })
    }
}

fn build_http_client(config: &CrmConfig) -> Result<HttpClient> {
    let mut headers = HeaderMap::new();

    headers.insert(
        AUTHORIZATION,
        header_value(format!("Bearer {}", config.token))?,
    );

    if let Some(language) = &config.accept_language {
        headers.insert(ACCEPT_LANGUAGE, header_value(language.clone())?);
    }

    headers.insert(USER_AGENT, header_value(config.user_agent.clone())?);

    HttpClient::builder()
        .default_headers(headers)
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .build()
        .map_err(|err| CrmError::Other(err.to_string()))
}

fn header_value(value: String) -> Result<HeaderValue> {
    HeaderValue::from_str(&value).map_err(|err| CrmError::Other(err.to_string()))
}

fn build_http_error(status: StatusCode, body: &str) -> CrmError {
    let code = extract_error_code(body);
    CrmError::http(status, code, body.to_string())
}

fn extract_error_code(body: &str) -> Option<String> {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| value.get("code").and_then(|c| c.as_str()).map(|s| s.to_string()))
}

fn ensure_envelope(success: bool, error: Option<String>) -> Result<()> {
    if success {
        Ok(())
    } else {
        Err(CrmError::Business(
            error.unwrap_or_else(|| "Request rejected by server".to_string()),
        ))
    }
}

#[derive(Debug, Clone)]
pub struct NotificationPage {
    pub items: Vec<Notification>,
    pub total_unread: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListEnvelope {
    success: bool,
    #[serde(default)]
    data: Vec<Notification>,
    #[serde(default)]
    total_unread: u32,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CountEnvelope {
    success: bool,
    #[serde(default)]
    count: u32,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AckEnvelope {
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DashboardEnvelope {
    success: bool,
    #[serde(default)]
    data: Option<FollowUpDashboard>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProcessEnvelope {
    success: bool,
    #[serde(default)]
    processed: u32,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::CrmClient;
    use crate::config::CrmConfig;
    use crate::error::CrmError;
    use crate::models::FollowUpPatch;
    use chrono::{TimeZone, Utc};
    use mockito::{Matcher, Server, ServerGuard};
    use serde_json::json;
    use std::time::Duration;

    fn client_for(server: &ServerGuard) -> CrmClient {
        let config = CrmConfig::new("test-token")
            .with_base_url(server.url())
            .with_cooldown(Duration::ZERO);
        CrmClient::new(config).unwrap()
    }

    #[tokio::test]
    async fn fetch_notifications_unwraps_envelope_and_total() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/notificaciones")
            .match_header("authorization", "Bearer test-token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "success": true,
                    "data": [
                        {
                            "id": 1,
                            "title": "Seguimiento vencido",
                            "message": "Juan Pérez sin contacto",
                            "type": "seguimiento_vencido",
                            "priority": "critica",
                            "createdAt": "2026-08-20T14:30:00Z"
                        },
                        {
                            "id": 2,
                            "title": "Nueva venta",
                            "message": "Pedido confirmado",
                            "type": "venta",
                            "priority": "normal",
                            "read": true,
                            "createdAt": "2026-08-20T12:00:00Z"
                        }
                    ],
                    "totalUnread": 5
                }"#,
            )
            .create_async()
            .await;

        let page = client_for(&server).fetch_notifications().await.unwrap();

        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total_unread, 5);
        assert_eq!(page.items[0].id, 1);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn unauthorized_maps_to_access_denied() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/v1/notificaciones")
            .with_status(401)
            .with_body(r#"{"error":"token expirado"}"#)
            .create_async()
            .await;

        let err = client_for(&server).fetch_notifications().await.unwrap_err();

        assert!(err.is_access_denied());
        assert!(!err.is_network_class());
    }

    #[tokio::test]
    async fn envelope_failure_surfaces_business_error() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/v1/notificaciones/unread-count")
            .with_status(200)
            .with_body(r#"{"success":false,"error":"Sin permisos de notificaciones"}"#)
            .create_async()
            .await;

        let err = client_for(&server).fetch_unread_count().await.unwrap_err();

        match err {
            CrmError::Business(message) => assert!(message.contains("Sin permisos")),
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unread_count_reads_count_field() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/v1/notificaciones/unread-count")
            .with_status(200)
            .with_body(r#"{"success":true,"count":12}"#)
            .create_async()
            .await;

        let count = client_for(&server).fetch_unread_count().await.unwrap();
        assert_eq!(count, 12);
    }

    #[tokio::test]
    async fn mark_read_posts_to_the_notification_path() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/notificaciones/41/read")
            .with_status(200)
            .with_body(r#"{"success":true}"#)
            .create_async()
            .await;

        client_for(&server).mark_notification_read(41).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn complete_patch_sends_camel_case_completion_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("PATCH", "/v1/prospectos/P-77/seguimiento")
            .match_body(Matcher::Json(json!({
                "completed": true,
                "completedAt": "2026-08-20T18:00:00Z",
                "result": "Cerrado con venta"
            })))
            .with_status(200)
            .with_body(r#"{"success":true}"#)
            .create_async()
            .await;

        let at = Utc.with_ymd_and_hms(2026, 8, 20, 18, 0, 0).unwrap();
        let patch = FollowUpPatch::complete("Cerrado con venta", at);
        client_for(&server).update_follow_up("P-77", &patch).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn postpone_patch_sends_reschedule_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("PATCH", "/v1/prospectos/P-12/seguimiento")
            .match_body(Matcher::Json(json!({
                "newScheduledAt": "2026-08-25T10:00:00Z",
                "reason": "Cliente de viaje"
            })))
            .with_status(200)
            .with_body(r#"{"success":true}"#)
            .create_async()
            .await;

        let at = Utc.with_ymd_and_hms(2026, 8, 25, 10, 0, 0).unwrap();
        let patch = FollowUpPatch::postpone(at, "Cliente de viaje");
        client_for(&server).update_follow_up("P-12", &patch).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn dashboard_passes_advisor_query() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/seguimientos/dashboard")
            .match_query(Matcher::UrlEncoded("asesor".into(), "A-7".into()))
            .with_status(200)
            .with_body(r#"{"success":true,"data":{"upcoming":[],"overdue":[],"today":[]}}"#)
            .create_async()
            .await;

        let dashboard = client_for(&server)
            .fetch_follow_up_dashboard(Some("A-7"))
            .await
            .unwrap();

        assert!(dashboard.upcoming.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn process_sweep_with_nothing_due_is_informational() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/v1/seguimientos/procesar-vencidos")
            .with_status(200)
            .with_body(r#"{"success":true,"processed":0,"message":"No hay seguimientos vencidos"}"#)
            .create_async()
            .await;

        let outcome = client_for(&server).process_due_follow_ups().await.unwrap();

        assert!(outcome.is_noop());
        assert_eq!(outcome.message.as_deref(), Some("No hay seguimientos vencidos"));
    }

    #[tokio::test]
    async fn connection_probe_swallows_server_failure() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/v1/health")
            .with_status(500)
            .with_body("internal error")
            .create_async()
            .await;

        assert!(!client_for(&server).test_connection().await);
    }

    #[tokio::test]
    async fn connection_probe_reads_success_flag() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/v1/health")
            .with_status(200)
            .with_body(r#"{"success":true}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        assert!(client.test_connection().await);
        assert_eq!(client.rate_limiter().cooldown(), Duration::ZERO);
    }
}
