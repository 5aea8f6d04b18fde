//! Request, response, and hard-metrics data model
//!
//! Wire names are camelCase to match the public JSON contract. Every
//! `HardMetrics` field defaults so that a partially-valid model reply
//! still deserializes instead of tripping the parse fallback.

use serde::{Deserialize, Serialize};

/// Incoming comparison request. Lives for the duration of one HTTP call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonRequest {
    pub report1: String,
    pub report2: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_prompt: Option<String>,
}

/// Full comparison output: narrative, structured metrics, recommendations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub comprehensive_analysis: String,
    pub hard_metrics: HardMetrics,
    pub optimization_recommendations: String,
}

/// Structured (non-narrative) portion of the comparison output
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HardMetrics {
    #[serde(default)]
    pub word_count: WordCount,
    #[serde(default)]
    pub module_comparison: Vec<ModuleEntry>,
    #[serde(default)]
    pub data_validation: Vec<DatapointCheck>,
    #[serde(default)]
    pub dimension_scores: DimensionScores,
}

/// Character counts per report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordCount {
    #[serde(default)]
    pub report1: u64,
    #[serde(default)]
    pub report2: u64,
}

/// Presence of one named field/source module in each report
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleEntry {
    pub module: String,
    #[serde(default)]
    pub report1: bool,
    #[serde(default)]
    pub report2: bool,
}

/// Consistency check of a single numeric datapoint across both reports
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatapointCheck {
    pub data_point: String,
    #[serde(default)]
    pub report1_value: DatapointValue,
    #[serde(default)]
    pub report2_value: DatapointValue,
    #[serde(default)]
    pub status: ValidationStatus,
    #[serde(default)]
    pub rationale: String,
}

/// A datapoint value as reported: free text or a bare number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DatapointValue {
    Number(f64),
    Text(String),
}

impl Default for DatapointValue {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

/// Verdict on a single datapoint. Unknown strings from the model
/// deserialize as `Uncertain` rather than failing the whole record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum ValidationStatus {
    Consistent,
    Inconsistent,
    #[default]
    Uncertain,
}

impl From<String> for ValidationStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "consistent" => Self::Consistent,
            "inconsistent" => Self::Inconsistent,
            _ => Self::Uncertain,
        }
    }
}

/// Five rubric dimensions (0-20 each per report) plus the 0-100 total
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionScores {
    #[serde(default)]
    pub field_selection: ScorePair,
    #[serde(default)]
    pub information_usage: ScorePair,
    #[serde(default)]
    pub logical_reasonableness: ScorePair,
    #[serde(default)]
    pub clarity_structure: ScorePair,
    #[serde(default)]
    pub language_quality: ScorePair,
    #[serde(default)]
    pub total_score: ScorePair,
}

/// One score per report
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScorePair {
    #[serde(default)]
    pub report1: f64,
    #[serde(default)]
    pub report2: f64,
}

impl HardMetrics {
    /// Structurally-valid substitute when the model's metrics reply cannot
    /// be parsed. Word counts are computed locally from the submitted
    /// texts; everything else stays empty/zero.
    pub fn fallback(report1: &str, report2: &str) -> Self {
        Self {
            word_count: WordCount {
                report1: report1.chars().count() as u64,
                report2: report2.chars().count() as u64,
            },
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_camel_case_wire() {
        let req: ComparisonRequest = serde_json::from_str(
            r#"{"report1":"a","report2":"b","customPrompt":"focus on finance"}"#,
        )
        .unwrap();
        assert_eq!(req.custom_prompt.as_deref(), Some("focus on finance"));
    }

    #[test]
    fn test_request_custom_prompt_optional() {
        let req: ComparisonRequest =
            serde_json::from_str(r#"{"report1":"a","report2":"b"}"#).unwrap();
        assert!(req.custom_prompt.is_none());
    }

    #[test]
    fn test_result_wire_names() {
        let result = ComparisonResult {
            comprehensive_analysis: "narrative".to_string(),
            hard_metrics: HardMetrics::default(),
            optimization_recommendations: "suggestions".to_string(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("comprehensiveAnalysis").is_some());
        assert!(json.get("hardMetrics").is_some());
        assert!(json.get("optimizationRecommendations").is_some());
    }

    #[test]
    fn test_hard_metrics_partial_json_parses() {
        // Missing sections fall back to defaults instead of erroring
        let metrics: HardMetrics =
            serde_json::from_str(r#"{"wordCount":{"report1":12,"report2":30}}"#).unwrap();
        assert_eq!(metrics.word_count.report1, 12);
        assert!(metrics.module_comparison.is_empty());
        assert_eq!(metrics.dimension_scores.total_score.report1, 0.0);
    }

    #[test]
    fn test_datapoint_value_untagged() {
        let check: DatapointCheck = serde_json::from_str(
            r#"{"dataPoint":"注册资本","report1Value":"100万元","report2Value":97,
                "status":"inconsistent","rationale":"values differ"}"#,
        )
        .unwrap();
        assert_eq!(
            check.report1_value,
            DatapointValue::Text("100万元".to_string())
        );
        assert_eq!(check.report2_value, DatapointValue::Number(97.0));
        assert_eq!(check.status, ValidationStatus::Inconsistent);
    }

    #[test]
    fn test_unknown_status_maps_to_uncertain() {
        let check: DatapointCheck = serde_json::from_str(
            r#"{"dataPoint":"成立年份","status":"maybe-ok"}"#,
        )
        .unwrap();
        assert_eq!(check.status, ValidationStatus::Uncertain);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ValidationStatus::Consistent).unwrap(),
            "\"consistent\""
        );
    }

    #[test]
    fn test_fallback_counts_characters() {
        let metrics = HardMetrics::fallback("四个字呀", "ab cd");
        assert_eq!(metrics.word_count.report1, 4);
        assert_eq!(metrics.word_count.report2, 5);
        assert!(metrics.data_validation.is_empty());
        assert_eq!(metrics.dimension_scores.field_selection.report2, 0.0);
    }
}
