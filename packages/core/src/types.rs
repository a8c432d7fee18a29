// ABOUTME: Domain types for release-test cycles and their squad/module records
// ABOUTME: Serde mappings follow the backend's camelCase Portuguese wire keys

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::sla::{parse_timestamp, SlaState};
use crate::status::TestStatus;

/// Reads `null` as the type's default. The backend emits nulls and empty
/// strings interchangeably for unset values.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    Android,
    #[serde(rename = "iOS")]
    Ios,
    #[default]
    #[serde(other)]
    Unknown,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Android => write!(f, "Android"),
            Platform::Ios => write!(f, "iOS"),
            Platform::Unknown => write!(f, "-"),
        }
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "android" => Ok(Platform::Android),
            "ios" => Ok(Platform::Ios),
            _ => Err(format!("Unknown platform: {} (expected Android or iOS)", s)),
        }
    }
}

/// Overall status of a cycle. Finalization is terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CycleStatus {
    #[default]
    #[serde(rename = "ativo")]
    Active,
    #[serde(rename = "finalizado")]
    Finalized,
    #[serde(other)]
    Unknown,
}

impl CycleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CycleStatus::Active => "ativo",
            CycleStatus::Finalized => "finalizado",
            CycleStatus::Unknown => "desconhecido",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, CycleStatus::Finalized)
    }

    /// Active may become finalized; nothing leaves finalized.
    pub fn can_transition_to(&self, next: CycleStatus) -> bool {
        match (self, next) {
            (a, b) if *a == b => true,
            (CycleStatus::Finalized, _) => false,
            (_, CycleStatus::Finalized) => true,
            (CycleStatus::Unknown, CycleStatus::Active) => true,
            _ => false,
        }
    }
}

impl fmt::Display for CycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReleaseKind {
    #[default]
    Normal,
    #[serde(rename = "Exclusiva")]
    Exclusive,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for ReleaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReleaseKind::Normal => write!(f, "Normal"),
            ReleaseKind::Exclusive => write!(f, "Exclusiva"),
            ReleaseKind::Unknown => write!(f, "-"),
        }
    }
}

impl std::str::FromStr for ReleaseKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "normal" => Ok(ReleaseKind::Normal),
            "exclusiva" | "exclusive" => Ok(ReleaseKind::Exclusive),
            _ => Err(format!("Unknown release kind: {} (expected Normal or Exclusiva)", s)),
        }
    }
}

/// A regression test cycle ("regressivo") for one mobile release.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReleaseTestCycle {
    #[serde(rename = "regressivoId", default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub release: String,
    #[serde(rename = "plataforma", default, deserialize_with = "null_as_default")]
    pub platform: Platform,
    #[serde(rename = "statusGeral", default, deserialize_with = "null_as_default")]
    pub status: CycleStatus,
    #[serde(rename = "liberadoEm", default, deserialize_with = "null_as_default")]
    pub released_at: String,
    #[serde(rename = "slaInicio", default, deserialize_with = "null_as_default")]
    pub sla_start_raw: String,
    #[serde(rename = "slaFim", default, deserialize_with = "null_as_default")]
    pub sla_end_raw: String,
    #[serde(rename = "versaoHomolog", default, deserialize_with = "null_as_default")]
    pub staging_version: String,
    #[serde(rename = "versaoFirebase", default, deserialize_with = "null_as_default")]
    pub firebase_version: String,
    #[serde(rename = "versaoAlpha", default, deserialize_with = "null_as_default")]
    pub alpha_version: String,
    #[serde(rename = "linkPlanoTestes", default, deserialize_with = "null_as_default")]
    pub test_plan_link: String,
    #[serde(rename = "tipoRelease", default, deserialize_with = "null_as_default")]
    pub release_kind: ReleaseKind,
    #[serde(rename = "qrCodeHomolog", default, deserialize_with = "null_as_default")]
    pub qr_code_staging: String,
    #[serde(rename = "qrCodeAlpha", default, deserialize_with = "null_as_default")]
    pub qr_code_alpha: String,
}

impl ReleaseTestCycle {
    pub fn sla_start(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.sla_start_raw)
    }

    pub fn sla_end(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.sla_end_raw)
    }

    pub fn released(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.released_at)
    }

    /// True once "start SLA" has stamped a start time.
    pub fn has_sla_started(&self) -> bool {
        !self.sla_start_raw.trim().is_empty()
    }

    pub fn is_finalized(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn sla_state(&self, now: DateTime<Utc>) -> SlaState {
        SlaState::evaluate(self.sla_end(), now)
    }

    pub fn test_plan(&self) -> Option<&str> {
        let link = self.test_plan_link.trim();
        (!link.is_empty()).then_some(link)
    }

    /// QR image for a build, as the backend's `data:` URL. `None` means "Sem QR".
    pub fn qr_code(&self, kind: QrKind) -> Option<&str> {
        let raw = match kind {
            QrKind::Staging => &self.qr_code_staging,
            QrKind::Alpha => &self.qr_code_alpha,
        };
        let raw = raw.trim();
        (!raw.is_empty()).then_some(raw)
    }
}

/// Which build a QR code points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QrKind {
    Staging,
    Alpha,
}

impl QrKind {
    pub const ALL: [QrKind; 2] = [QrKind::Staging, QrKind::Alpha];

    pub fn label(&self) -> &'static str {
        match self {
            QrKind::Staging => "Homolog",
            QrKind::Alpha => "Alpha",
        }
    }

    pub fn file_stem(&self) -> &'static str {
        match self {
            QrKind::Staging => "qr-homolog",
            QrKind::Alpha => "qr-alpha",
        }
    }
}

/// One squad's responsibility for one module within a cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SquadModuleRecord {
    #[serde(rename = "squadModuloId", default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(rename = "regressivoId", default, deserialize_with = "null_as_default")]
    pub cycle_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub squad: String,
    #[serde(rename = "modulo", default, deserialize_with = "null_as_default")]
    pub module: String,
    #[serde(rename = "detalheEntrega", default, deserialize_with = "null_as_default")]
    pub delivery_detail: String,
    #[serde(rename = "responsavel", default, deserialize_with = "null_as_default")]
    pub responsible: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: TestStatus,
    #[serde(rename = "reportarBug", default, deserialize_with = "null_as_default")]
    pub bug_report: String,
}

impl SquadModuleRecord {
    pub fn has_bug_report(&self) -> bool {
        !self.bug_report.trim().is_empty()
    }
}

/// One squad of the catalogue and the modules it owns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SquadEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub squad: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub modules: Vec<String>,
}

/// Read-only catalogue mapping squad names to module names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SquadsConfig {
    #[serde(default, deserialize_with = "null_as_default")]
    pub squads: Vec<SquadEntry>,
}

impl SquadsConfig {
    pub fn squad_names(&self) -> Vec<&str> {
        self.squads.iter().map(|s| s.squad.as_str()).collect()
    }

    pub fn find(&self, squad: &str) -> Option<&SquadEntry> {
        self.squads.iter().find(|s| s.squad == squad)
    }

    pub fn modules_of(&self, squad: &str) -> &[String] {
        self.find(squad).map(|s| s.modules.as_slice()).unwrap_or(&[])
    }

    pub fn contains(&self, squad: &str) -> bool {
        self.find(squad).is_some()
    }

    /// The (squad, module) pairs that creating a cycle with `selected` squads
    /// would produce. Blank module names are skipped.
    pub fn expand_selection(&self, selected: &[String]) -> Vec<(String, String)> {
        self.squads
            .iter()
            .filter(|entry| selected.iter().any(|s| s == &entry.squad))
            .flat_map(|entry| {
                entry
                    .modules
                    .iter()
                    .filter(|m| !m.trim().is_empty())
                    .map(move |m| (entry.squad.clone(), m.clone()))
            })
            .collect()
    }
}

/// Input for creating a cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CycleCreateInput {
    pub release: String,
    #[serde(rename = "plataforma")]
    pub platform: Platform,
    #[serde(rename = "versaoHomolog")]
    pub staging_version: String,
    #[serde(rename = "versaoFirebase")]
    pub firebase_version: String,
    #[serde(rename = "versaoAlpha")]
    pub alpha_version: String,
    #[serde(rename = "linkPlanoTestes")]
    pub test_plan_link: String,
    #[serde(rename = "tipoRelease")]
    pub release_kind: ReleaseKind,
    #[serde(rename = "squads_selecionadas")]
    pub selected_squads: Vec<String>,
}

/// Partial update of a cycle; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CycleUpdateInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release: Option<String>,
    #[serde(rename = "plataforma", skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
    #[serde(rename = "versaoHomolog", skip_serializing_if = "Option::is_none")]
    pub staging_version: Option<String>,
    #[serde(rename = "versaoFirebase", skip_serializing_if = "Option::is_none")]
    pub firebase_version: Option<String>,
    #[serde(rename = "versaoAlpha", skip_serializing_if = "Option::is_none")]
    pub alpha_version: Option<String>,
    #[serde(rename = "linkPlanoTestes", skip_serializing_if = "Option::is_none")]
    pub test_plan_link: Option<String>,
    #[serde(rename = "tipoRelease", skip_serializing_if = "Option::is_none")]
    pub release_kind: Option<ReleaseKind>,
}

impl CycleUpdateInput {
    pub fn is_empty(&self) -> bool {
        self == &CycleUpdateInput::default()
    }
}

/// Partial update of a squad/module record; only present fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordUpdateInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TestStatus>,
    #[serde(rename = "detalheEntrega", skip_serializing_if = "Option::is_none")]
    pub delivery_detail: Option<String>,
    #[serde(rename = "responsavel", skip_serializing_if = "Option::is_none")]
    pub responsible: Option<String>,
    #[serde(rename = "reportarBug", skip_serializing_if = "Option::is_none")]
    pub bug_report: Option<String>,
}

impl RecordUpdateInput {
    pub fn is_empty(&self) -> bool {
        self == &RecordUpdateInput::default()
    }

    /// Applies the present fields to a cached record.
    pub fn apply_to(&self, record: &mut SquadModuleRecord) {
        if let Some(status) = &self.status {
            record.status = status.clone();
        }
        if let Some(detail) = &self.delivery_detail {
            record.delivery_detail = detail.clone();
        }
        if let Some(responsible) = &self.responsible {
            record.responsible = responsible.clone();
        }
        if let Some(bug) = &self.bug_report {
            record.bug_report = bug.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_cycle_from_backend_json() {
        let cycle: ReleaseTestCycle = serde_json::from_value(json!({
            "regressivoId": "a1b2",
            "release": "5.12.0",
            "plataforma": "iOS",
            "statusGeral": "ativo",
            "slaInicio": "2024-05-10T10:00:00.000001",
            "slaFim": "2024-05-11T10:00:00.000001",
            "liberadoEm": "2024-05-09T18:30:00",
            "versaoHomolog": "5.12.0-rc1",
            "versaoFirebase": "5.12.0 (4411)",
            "versaoAlpha": "5.12.0-alpha",
            "linkPlanoTestes": "https://plan.example.com/5.12",
            "tipoRelease": "Exclusiva",
            "qrCodeHomolog": "data:image/png;base64,AAA",
            "qrCodeAlpha": ""
        }))
        .unwrap();

        assert_eq!(cycle.id, "a1b2");
        assert_eq!(cycle.platform, Platform::Ios);
        assert_eq!(cycle.status, CycleStatus::Active);
        assert_eq!(cycle.release_kind, ReleaseKind::Exclusive);
        assert!(cycle.has_sla_started());
        assert!(cycle.sla_end().is_some());
        assert_eq!(cycle.test_plan(), Some("https://plan.example.com/5.12"));
        assert_eq!(
            cycle.qr_code(QrKind::Staging),
            Some("data:image/png;base64,AAA")
        );
        assert_eq!(cycle.qr_code(QrKind::Alpha), None);
    }

    #[test]
    fn test_cycle_tolerates_missing_and_unknown_values() {
        let cycle: ReleaseTestCycle = serde_json::from_value(json!({
            "regressivoId": "x",
            "plataforma": "Windows Phone",
            "statusGeral": "arquivado",
            "tipoRelease": null,
            "slaInicio": "",
            "slaFim": null,
            "squads_selecionadas": ["Pagamentos"]
        }))
        .unwrap();

        assert_eq!(cycle.platform, Platform::Unknown);
        assert_eq!(cycle.status, CycleStatus::Unknown);
        assert_eq!(cycle.release_kind, ReleaseKind::Normal);
        assert!(!cycle.has_sla_started());
        assert_eq!(cycle.sla_end(), None);
        assert_eq!(cycle.test_plan(), None);
        assert_eq!(cycle.qr_code(QrKind::Staging), None);
    }

    #[test]
    fn test_blank_cycle_defaults() {
        let cycle = ReleaseTestCycle::default();
        assert_eq!(cycle.platform, Platform::Unknown);
        assert_eq!(cycle.status, CycleStatus::Active);
        assert_eq!(cycle.release_kind, ReleaseKind::Normal);
    }

    #[test]
    fn test_whitespace_qr_code_reads_as_missing() {
        let cycle = ReleaseTestCycle {
            qr_code_staging: "   ".to_string(),
            qr_code_alpha: " data:image/png;base64,QUJD ".to_string(),
            ..Default::default()
        };
        assert_eq!(cycle.qr_code(QrKind::Staging), None);
        assert_eq!(
            cycle.qr_code(QrKind::Alpha),
            Some("data:image/png;base64,QUJD")
        );
        assert_eq!(QrKind::Staging.label(), "Homolog");
        assert_eq!(QrKind::Alpha.file_stem(), "qr-alpha");
    }

    #[test]
    fn test_record_defaults_to_in_progress() {
        let record: SquadModuleRecord = serde_json::from_value(json!({
            "squadModuloId": "r1",
            "regressivoId": "a1b2",
            "squad": "Pagamentos",
            "modulo": "Pix 2.3"
        }))
        .unwrap();

        assert_eq!(record.status, TestStatus::InProgress);
        assert!(!record.has_bug_report());
    }

    #[test]
    fn test_whitespace_bug_text_is_not_a_report() {
        let record = SquadModuleRecord {
            bug_report: "  \n ".to_string(),
            ..Default::default()
        };
        assert!(!record.has_bug_report());
    }

    #[test]
    fn test_cycle_status_transitions() {
        assert!(CycleStatus::Active.can_transition_to(CycleStatus::Finalized));
        assert!(!CycleStatus::Finalized.can_transition_to(CycleStatus::Active));
        assert!(CycleStatus::Finalized.can_transition_to(CycleStatus::Finalized));
        assert!(CycleStatus::Finalized.is_terminal());
    }

    #[test]
    fn test_expand_selection_skips_blank_modules() {
        let config: SquadsConfig = serde_json::from_value(json!({
            "squads": [
                {"id": 1, "squad": "Pagamentos", "modules": ["Pix", "", "Boleto"]},
                {"id": 2, "squad": "Onboarding", "modules": ["Cadastro"]},
                {"id": 3, "squad": "Cartões", "modules": []}
            ]
        }))
        .unwrap();

        let pairs = config.expand_selection(&["Pagamentos".to_string(), "Cartões".to_string()]);
        assert_eq!(
            pairs,
            vec![
                ("Pagamentos".to_string(), "Pix".to_string()),
                ("Pagamentos".to_string(), "Boleto".to_string()),
            ]
        );
        assert_eq!(config.squad_names(), vec!["Pagamentos", "Onboarding", "Cartões"]);
        assert_eq!(config.modules_of("Onboarding"), &["Cadastro".to_string()]);
        assert!(config.modules_of("Inexistente").is_empty());
    }

    #[test]
    fn test_record_update_sends_only_present_fields() {
        let update = RecordUpdateInput {
            status: Some(TestStatus::DoneWithBugs),
            bug_report: Some("Crash ao abrir extrato".to_string()),
            ..Default::default()
        };

        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({"status": "concluido com bugs", "reportarBug": "Crash ao abrir extrato"})
        );
        assert!(RecordUpdateInput::default().is_empty());
    }

    #[test]
    fn test_record_update_apply() {
        let mut record = SquadModuleRecord {
            responsible: "Ana".to_string(),
            ..Default::default()
        };
        let update = RecordUpdateInput {
            status: Some(TestStatus::Blocked),
            ..Default::default()
        };
        update.apply_to(&mut record);

        assert_eq!(record.status, TestStatus::Blocked);
        assert_eq!(record.responsible, "Ana");
    }

    #[test]
    fn test_create_input_wire_shape() {
        let input = CycleCreateInput {
            release: "5.12.0".to_string(),
            platform: Platform::Android,
            selected_squads: vec!["Pagamentos".to_string()],
            ..Default::default()
        };
        let value = serde_json::to_value(&input).unwrap();

        assert_eq!(value["plataforma"], "Android");
        assert_eq!(value["tipoRelease"], "Normal");
        assert_eq!(value["squads_selecionadas"], json!(["Pagamentos"]));
    }
}
