// ABOUTME: Progress aggregation over squad/module records
// ABOUTME: Status counts, reported bugs and half-up completion percentage

use serde::{Deserialize, Deserializer, Serialize};

use crate::status::TestStatus;
use crate::types::SquadModuleRecord;

/// What the aggregator needs to know about a record.
pub trait TestOutcome {
    fn status(&self) -> &TestStatus;
    fn bug_text(&self) -> &str;
}

impl TestOutcome for SquadModuleRecord {
    fn status(&self) -> &TestStatus {
        &self.status
    }

    fn bug_text(&self) -> &str {
        &self.bug_report
    }
}

impl TestOutcome for (TestStatus, String) {
    fn status(&self) -> &TestStatus {
        &self.0
    }

    fn bug_text(&self) -> &str {
        &self.1
    }
}

/// Count per taxonomy status. All four keys are always present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    #[serde(rename = "em andamento", default)]
    pub in_progress: u32,
    #[serde(rename = "concluído", default)]
    pub done: u32,
    #[serde(rename = "bloqueado", default)]
    pub blocked: u32,
    #[serde(rename = "concluido com bugs", default)]
    pub done_with_bugs: u32,
}

impl StatusCounts {
    pub fn get(&self, status: &TestStatus) -> u32 {
        match status {
            TestStatus::InProgress => self.in_progress,
            TestStatus::Done => self.done,
            TestStatus::Blocked => self.blocked,
            TestStatus::DoneWithBugs => self.done_with_bugs,
            TestStatus::Other(_) => 0,
        }
    }

    fn bump(&mut self, status: &TestStatus) {
        match status {
            TestStatus::InProgress => self.in_progress += 1,
            TestStatus::Done => self.done += 1,
            TestStatus::Blocked => self.blocked += 1,
            TestStatus::DoneWithBugs => self.done_with_bugs += 1,
            TestStatus::Other(_) => {}
        }
    }

    pub fn concluded(&self) -> u32 {
        self.done + self.done_with_bugs
    }
}

/// Roll-up of a cycle's records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSummary {
    #[serde(rename = "total_itens", default)]
    pub total_items: u32,
    #[serde(default)]
    pub status_count: StatusCounts,
    #[serde(rename = "bugs_reportados", default)]
    pub bugs_reported: u32,
    #[serde(
        rename = "progresso_percentual",
        default,
        deserialize_with = "deserialize_percentage"
    )]
    pub percentage: u32,
}

impl ProgressSummary {
    /// Records that carry a status outside the taxonomy.
    pub fn unclassified(&self) -> u32 {
        let known = self.status_count.in_progress
            + self.status_count.done
            + self.status_count.blocked
            + self.status_count.done_with_bugs;
        self.total_items.saturating_sub(known)
    }
}

/// Aggregates records into a [`ProgressSummary`].
pub fn aggregate<T: TestOutcome>(records: &[T]) -> ProgressSummary {
    let mut status_count = StatusCounts::default();
    let mut bugs_reported = 0;

    for record in records {
        status_count.bump(record.status());
        if !record.bug_text().trim().is_empty() {
            bugs_reported += 1;
        }
    }

    let total_items = u32::try_from(records.len()).unwrap_or(u32::MAX);
    ProgressSummary {
        total_items,
        status_count,
        bugs_reported,
        percentage: completion_percentage(status_count.concluded(), total_items),
    }
}

/// `concluded / total * 100` rounded to the nearest integer, ties up.
/// Integer arithmetic so that exact halves never drift.
pub fn completion_percentage(concluded: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let concluded = u64::from(concluded.min(total));
    let total = u64::from(total);
    ((200 * concluded + total) / (2 * total)) as u32
}

/// Rounds a backend percentage (float, one decimal) half up into 0..=100.
pub fn normalize_percentage(value: f64) -> u32 {
    if !value.is_finite() {
        return 0;
    }
    (value + 0.5).floor().clamp(0.0, 100.0) as u32
}

fn deserialize_percentage<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?;
    Ok(value.map(normalize_percentage).unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    fn record(status: &str, bug: &str) -> (TestStatus, String) {
        (TestStatus::parse(status), bug.to_string())
    }

    #[test]
    fn test_empty_aggregation() {
        let summary = aggregate::<SquadModuleRecord>(&[]);
        assert_eq!(summary, ProgressSummary::default());
        assert_eq!(summary.percentage, 0);
    }

    #[test]
    fn test_half_done() {
        let records = vec![
            record("concluído", ""),
            record("concluído", ""),
            record("em andamento", ""),
            record("bloqueado", ""),
        ];
        let summary = aggregate(&records);

        assert_eq!(summary.total_items, 4);
        assert_eq!(summary.status_count.done, 2);
        assert_eq!(summary.status_count.in_progress, 1);
        assert_eq!(summary.status_count.blocked, 1);
        assert_eq!(summary.status_count.done_with_bugs, 0);
        assert_eq!(summary.bugs_reported, 0);
        assert_eq!(summary.percentage, 50);
    }

    #[test]
    fn test_done_with_bugs_counts_as_concluded() {
        let records = vec![
            record("concluido com bugs", "Tela branca no login"),
            record("bloqueado", ""),
            record("em andamento", ""),
        ];
        let summary = aggregate(&records);

        assert_eq!(summary.total_items, 3);
        assert_eq!(summary.bugs_reported, 1);
        assert_eq!(summary.percentage, 33);
    }

    #[test]
    fn test_unknown_status_counts_toward_total_only() {
        let records = vec![record("concluído", ""), record("pausado", "   ")];
        let summary = aggregate(&records);

        assert_eq!(summary.total_items, 2);
        assert_eq!(summary.status_count.concluded(), 1);
        assert_eq!(summary.unclassified(), 1);
        assert_eq!(summary.bugs_reported, 0);
        assert_eq!(summary.percentage, 50);
    }

    #[rstest]
    #[case(1, 2, 50)]
    #[case(1, 3, 33)]
    #[case(2, 3, 67)]
    #[case(1, 8, 13)]
    #[case(0, 5, 0)]
    #[case(5, 5, 100)]
    #[case(0, 0, 0)]
    #[case(u32::MAX, u32::MAX, 100)]
    fn test_completion_percentage(#[case] concluded: u32, #[case] total: u32, #[case] expected: u32) {
        assert_eq!(completion_percentage(concluded, total), expected);
    }

    #[rstest]
    #[case(12.5, 13)]
    #[case(33.3, 33)]
    #[case(66.7, 67)]
    #[case(50.0, 50)]
    #[case(-1.0, 0)]
    #[case(130.0, 100)]
    fn test_normalize_percentage(#[case] value: f64, #[case] expected: u32) {
        assert_eq!(normalize_percentage(value), expected);
    }

    #[test]
    fn test_backend_summary_deserializes() {
        let summary: ProgressSummary = serde_json::from_value(json!({
            "total_itens": 8,
            "status_count": {
                "concluído": 1,
                "em andamento": 7
            },
            "bugs_reportados": 0,
            "progresso_percentual": 12.5
        }))
        .unwrap();

        assert_eq!(summary.total_items, 8);
        assert_eq!(summary.status_count.get(&TestStatus::Done), 1);
        assert_eq!(summary.status_count.blocked, 0);
        assert_eq!(summary.percentage, 13);
    }

    #[test]
    fn test_integer_percentage_deserializes() {
        let summary: ProgressSummary =
            serde_json::from_value(json!({"total_itens": 0, "progresso_percentual": 0})).unwrap();
        assert_eq!(summary.percentage, 0);
    }
}
