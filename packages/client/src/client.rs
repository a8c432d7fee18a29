use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use regressivos_config::ConsoleConfig;
use regressivos_core::{
    CycleCreateInput, CycleUpdateInput, ProgressSummary, RecordUpdateInput, ReleaseTestCycle,
    SquadModuleRecord, SquadsConfig,
};

use crate::api::{
    ApiError, ApiResponse, CycleDetail, ExtendRequest, HealthStatus, RecordDetail, ReleaseNotes,
    SlaCheck,
};
use crate::error::{ClientError, ClientResult};

const ADMIN_CYCLES: &str = "/api/admin/regressivos";
const ADMIN_SQUADS: &str = "/api/admin/squads-config";
const QUALITY_CYCLES: &str = "/api/quality/regressivos";
const QUALITY_RECORDS: &str = "/api/quality/squad-modulo";

/// Async client for every backend endpoint.
///
/// Mutations whose reply carries only a message are followed by a fetch of
/// the entity so callers always get the updated value back.
#[derive(Clone)]
pub struct RegressivosClient {
    http_client: Client,
    base_url: String,
}

impl RegressivosClient {
    pub fn new(config: &ConsoleConfig) -> ClientResult<Self> {
        config
            .validate()
            .map_err(|e| ClientError::config(e.to_string()))?;

        let http_client = Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| ClientError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Points the client at another server
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn json_headers(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
    }

    async fn execute(&self, request: RequestBuilder) -> ClientResult<Response> {
        let response = self
            .json_headers(request)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::NOT_FOUND => Err(ClientError::NotFound(error_text(response).await)),
            StatusCode::FORBIDDEN => Err(ClientError::StaleEdit(error_text(response).await)),
            status => {
                let message = error_text(response).await;
                warn!(status = status.as_u16(), %message, "Backend returned an error");
                Err(ClientError::http(status, message))
            }
        }
    }

    async fn envelope<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> ClientResult<ApiResponse<T>> {
        self.execute(request)
            .await?
            .json::<ApiResponse<T>>()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    async fn get_data<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        debug!(path, "GET");
        self.envelope(self.http_client.get(self.url(path)))
            .await?
            .into_result()
    }

    // ---- health ----

    /// `GET /health`. Not wrapped in the envelope.
    pub async fn health(&self) -> ClientResult<HealthStatus> {
        self.execute(self.http_client.get(self.url("/health")))
            .await?
            .json::<HealthStatus>()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    // ---- admin ----

    pub async fn list_cycles(&self) -> ClientResult<Vec<ReleaseTestCycle>> {
        self.get_data(ADMIN_CYCLES).await
    }

    pub async fn get_cycle(&self, cycle_id: &str) -> ClientResult<ReleaseTestCycle> {
        self.get_data(&format!("{}/{}", ADMIN_CYCLES, cycle_id)).await
    }

    pub async fn squads_config(&self) -> ClientResult<SquadsConfig> {
        self.get_data(ADMIN_SQUADS).await
    }

    /// Catalogue, or `None` when the backend has none configured yet (404).
    pub async fn squads_catalogue(&self) -> ClientResult<Option<SquadsConfig>> {
        match self.squads_config().await {
            Ok(config) => Ok(Some(config)),
            Err(e) if e.is_not_found() => {
                debug!("No squads catalogue configured");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn replace_squads_config(&self, config: &SquadsConfig) -> ClientResult<()> {
        debug!(squads = config.squads.len(), "Replacing squads catalogue");
        self.envelope::<serde_json::Value>(self.http_client.put(self.url(ADMIN_SQUADS)).json(config))
            .await?
            .into_optional()
            .map(|_| ())
    }

    pub async fn create_cycle(&self, input: &CycleCreateInput) -> ClientResult<ReleaseTestCycle> {
        debug!(release = %input.release, squads = input.selected_squads.len(), "Creating cycle");
        let created = self
            .envelope::<ReleaseTestCycle>(self.http_client.post(self.url(ADMIN_CYCLES)).json(input))
            .await?
            .into_result()?;
        if created.id.is_empty() {
            return Err(ClientError::InvalidResponse(
                "Created cycle has no regressivoId".to_string(),
            ));
        }
        Ok(created)
    }

    pub async fn update_cycle(
        &self,
        cycle_id: &str,
        input: &CycleUpdateInput,
    ) -> ClientResult<ReleaseTestCycle> {
        let path = format!("{}/{}", ADMIN_CYCLES, cycle_id);
        self.cycle_mutation(cycle_id, self.http_client.put(self.url(&path)).json(input))
            .await
    }

    pub async fn start_sla(&self, cycle_id: &str) -> ClientResult<ReleaseTestCycle> {
        let path = format!("{}/{}/iniciar-sla", ADMIN_CYCLES, cycle_id);
        self.cycle_mutation(cycle_id, self.http_client.post(self.url(&path)))
            .await
    }

    pub async fn stop_sla(&self, cycle_id: &str) -> ClientResult<ReleaseTestCycle> {
        let path = format!("{}/{}/parar-sla", ADMIN_CYCLES, cycle_id);
        self.cycle_mutation(cycle_id, self.http_client.post(self.url(&path)))
            .await
    }

    pub async fn extend_sla(&self, cycle_id: &str, hours: u32) -> ClientResult<ReleaseTestCycle> {
        let path = format!("{}/{}/incluir-tempo", ADMIN_CYCLES, cycle_id);
        let request = self
            .http_client
            .post(self.url(&path))
            .json(&ExtendRequest { horas: hours });
        self.cycle_mutation(cycle_id, request).await
    }

    pub async fn release_notes(&self, cycle_id: &str) -> ClientResult<ReleaseNotes> {
        let path = format!("{}/{}/release-notes", ADMIN_CYCLES, cycle_id);
        self.envelope(self.http_client.post(self.url(&path)))
            .await?
            .into_result()
    }

    pub async fn delete_cycle(&self, cycle_id: &str) -> ClientResult<()> {
        let path = format!("{}/{}", ADMIN_CYCLES, cycle_id);
        self.envelope::<serde_json::Value>(self.http_client.delete(self.url(&path)))
            .await?
            .into_optional()
            .map(|_| ())
    }

    async fn cycle_mutation(
        &self,
        cycle_id: &str,
        request: RequestBuilder,
    ) -> ClientResult<ReleaseTestCycle> {
        let reply = self.envelope::<ReleaseTestCycle>(request).await?;
        if let Some(message) = &reply.message {
            debug!(cycle_id, %message, "Cycle mutation accepted");
        }
        match reply.into_optional()? {
            Some(cycle) if !cycle.id.is_empty() => Ok(cycle),
            _ => self.get_cycle(cycle_id).await,
        }
    }

    // ---- quality ----

    /// Active cycles only
    pub async fn list_active_cycles(&self) -> ClientResult<Vec<ReleaseTestCycle>> {
        self.get_data(QUALITY_CYCLES).await
    }

    pub async fn cycle_detail(&self, cycle_id: &str) -> ClientResult<CycleDetail> {
        self.get_data(&format!("{}/{}", QUALITY_CYCLES, cycle_id)).await
    }

    pub async fn status_summary(&self, cycle_id: &str) -> ClientResult<ProgressSummary> {
        self.get_data(&format!("{}/{}/status-resumo", QUALITY_CYCLES, cycle_id))
            .await
    }

    pub async fn check_sla(&self, cycle_id: &str) -> ClientResult<SlaCheck> {
        self.get_data(&format!("{}/{}/verificar-sla", QUALITY_CYCLES, cycle_id))
            .await
    }

    pub async fn get_record(&self, record_id: &str) -> ClientResult<RecordDetail> {
        self.get_data(&format!("{}/{}", QUALITY_RECORDS, record_id)).await
    }

    /// Sends only the fields present in `input`. A 403 means the SLA expired
    /// in the meantime and surfaces as [`ClientError::StaleEdit`].
    pub async fn update_record(
        &self,
        record_id: &str,
        input: &RecordUpdateInput,
    ) -> ClientResult<SquadModuleRecord> {
        let path = format!("{}/{}", QUALITY_RECORDS, record_id);
        debug!(record_id, "Updating record");
        let reply = self
            .envelope::<SquadModuleRecord>(self.http_client.put(self.url(&path)).json(input))
            .await?;
        match reply.into_optional()? {
            Some(record) if !record.id.is_empty() => Ok(record),
            _ => Ok(self.get_record(record_id).await?.record),
        }
    }
}

/// Best-effort error text: the envelope's `error`, then `message`, then the raw
/// body, then the status reason.
async fn error_text(response: Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    if let Ok(api_error) = serde_json::from_str::<ApiError>(&body) {
        if let Some(text) = api_error.text() {
            return text;
        }
    }

    if body.trim().is_empty() {
        status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(|| status.to_string())
    } else {
        body
    }
}
