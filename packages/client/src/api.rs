//! Request and response models for the regressivos backend

use serde::{Deserialize, Serialize};

use regressivos_core::{ReleaseTestCycle, SquadModuleRecord};

use crate::error::{ClientError, ClientResult};

/// Standard response envelope: `{success, data?, error?, message?}`
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Check if the response indicates success
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Get the data, returning an error if the response was unsuccessful
    pub fn into_result(self) -> ClientResult<T> {
        match self.into_optional()? {
            Some(data) => Ok(data),
            None => Err(ClientError::InvalidResponse(
                "Response indicated success but contained no data".to_string(),
            )),
        }
    }

    /// Like [`ApiResponse::into_result`] but a message-only success is fine.
    pub fn into_optional(self) -> ClientResult<Option<T>> {
        if self.success {
            Ok(self.data)
        } else {
            Err(ClientError::InvalidResponse(
                self.error
                    .or(self.message)
                    .unwrap_or_else(|| "Unknown API error".to_string()),
            ))
        }
    }
}

/// Error body sent with non-2xx responses
#[derive(Debug, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiError {
    pub fn text(self) -> Option<String> {
        self.error.or(self.message)
    }
}

/// `/health`
#[derive(Debug, Clone, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub service: Option<String>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Quality view of one cycle with its records
#[derive(Debug, Clone, Deserialize)]
pub struct CycleDetail {
    #[serde(rename = "regressivo")]
    pub cycle: ReleaseTestCycle,
    #[serde(rename = "squads_modulos", default)]
    pub records: Vec<SquadModuleRecord>,
    #[serde(rename = "sla_vencido", default)]
    pub sla_expired: bool,
    #[serde(rename = "tempo_restante", default)]
    pub time_remaining: Option<String>,
}

/// Server-side SLA evaluation
#[derive(Debug, Clone, Deserialize)]
pub struct SlaCheck {
    #[serde(rename = "sla_vencido", default)]
    pub sla_expired: bool,
    #[serde(rename = "tempo_restante", default)]
    pub time_remaining: Option<String>,
    #[serde(rename = "sla_inicio", default)]
    pub sla_start: Option<String>,
    #[serde(rename = "sla_fim", default)]
    pub sla_end: Option<String>,
}

/// One record plus its cycle's expiry flag
#[derive(Debug, Clone, Deserialize)]
pub struct RecordDetail {
    #[serde(rename = "squad_modulo")]
    pub record: SquadModuleRecord,
    #[serde(rename = "sla_vencido", default)]
    pub sla_expired: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseNotes {
    pub release_notes: String,
    #[serde(default)]
    pub generated_at: Option<String>,
}

/// Body of `incluir-tempo`
#[derive(Debug, Serialize)]
pub struct ExtendRequest {
    pub horas: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_success() {
        let response: ApiResponse<Vec<ReleaseTestCycle>> =
            serde_json::from_value(json!({"success": true, "data": []})).unwrap();
        assert!(response.is_success());
        assert!(response.into_result().unwrap().is_empty());
    }

    /// Decodes through the same bound the client uses for every endpoint.
    fn decode<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> ApiResponse<T> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_envelope_payload_without_default() {
        let response: ApiResponse<HealthStatus> =
            decode(json!({"success": true, "data": {"status": "healthy"}}));
        assert!(response.into_result().unwrap().is_healthy());

        let response: ApiResponse<HealthStatus> = decode(json!({"success": true}));
        assert!(response.data.is_none());
        assert!(response.error.is_none());
        assert!(response.message.is_none());
    }

    #[test]
    fn test_envelope_message_only() {
        let response: ApiResponse<ReleaseTestCycle> = serde_json::from_value(json!({
            "success": true,
            "message": "SLA iniciado com sucesso"
        }))
        .unwrap();
        assert!(response.clone().into_optional().unwrap().is_none());
        assert!(matches!(
            response.into_result(),
            Err(ClientError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_envelope_failure_uses_error_text() {
        let response: ApiResponse<ReleaseTestCycle> = serde_json::from_value(json!({
            "success": false,
            "error": "Erro ao parar SLA"
        }))
        .unwrap();
        let err = response.into_result().unwrap_err();
        assert_eq!(err.to_string(), "Invalid response: Erro ao parar SLA");
    }

    #[test]
    fn test_cycle_detail_shape() {
        let detail: CycleDetail = serde_json::from_value(json!({
            "regressivo": {"regressivoId": "r1", "release": "5.12.0", "statusGeral": "ativo"},
            "squads_modulos": [
                {"squadModuloId": "m1", "regressivoId": "r1", "squad": "Pagamentos", "modulo": "Pix", "status": "concluído"}
            ],
            "sla_vencido": false,
            "tempo_restante": null
        }))
        .unwrap();

        assert_eq!(detail.cycle.id, "r1");
        assert_eq!(detail.records.len(), 1);
        assert!(!detail.sla_expired);
        assert!(detail.time_remaining.is_none());
    }
}
