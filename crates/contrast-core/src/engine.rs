//! Three-stage comparison pipeline: analysis, metrics extraction,
//! recommendations
//!
//! Stages run strictly in sequence; each stage's output feeds the next
//! stage's prompt. A gateway failure at any stage aborts the request with
//! no partial result. A *parse* failure at the metrics stage is absorbed
//! locally with a fallback record and never aborts.

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::backends::{CompletionOptions, ModelGateway};
use crate::extract::{MetricsOutcome, decode_metrics};
use crate::prompts;
use crate::types::{ComparisonRequest, ComparisonResult};

/// Low temperature for the strict-JSON extraction call, slightly higher
/// for narrative stages. Values carried from the original service.
const ANALYSIS_TEMPERATURE: f32 = 0.3;
const METRICS_TEMPERATURE: f32 = 0.1;
const RECOMMENDATIONS_TEMPERATURE: f32 = 0.4;

/// Sequences the three model calls and assembles the response
pub struct ComparisonEngine {
    gateway: ModelGateway,
    max_tokens: u32,
}

impl ComparisonEngine {
    pub fn new(gateway: ModelGateway, max_tokens: u32) -> Self {
        Self {
            gateway,
            max_tokens,
        }
    }

    pub fn gateway(&self) -> &ModelGateway {
        &self.gateway
    }

    /// Run the full pipeline for one request
    pub async fn compare(&self, request: &ComparisonRequest) -> Result<ComparisonResult> {
        info!(
            "Comparison started: report1={} chars, report2={} chars, custom_prompt={}",
            request.report1.chars().count(),
            request.report2.chars().count(),
            request.custom_prompt.is_some(),
        );

        // Stage 1: narrative comparative analysis. Opaque text, no parsing.
        let analysis = self
            .gateway
            .complete(
                &prompts::analysis_messages(request),
                &self.options(ANALYSIS_TEMPERATURE),
            )
            .await
            .context("analysis stage failed")?;
        debug!("Analysis stage complete ({} chars)", analysis.chars().count());

        // Stage 2: structured metrics. Transport errors still abort; only
        // unparsable replies are recovered.
        let raw_metrics = self
            .gateway
            .complete(
                &prompts::metrics_messages(request),
                &self.options(METRICS_TEMPERATURE),
            )
            .await
            .context("metrics stage failed")?;

        let hard_metrics = match decode_metrics(&raw_metrics, &request.report1, &request.report2) {
            MetricsOutcome::Parsed(metrics) => metrics,
            MetricsOutcome::Fallback(metrics) => {
                warn!("Using fallback hard metrics for this request");
                metrics
            }
        };

        // Stage 3: recommendations, with both earlier outputs as context.
        let metrics_json =
            serde_json::to_string(&hard_metrics).context("failed to serialize hard metrics")?;
        let recommendations = self
            .gateway
            .complete(
                &prompts::recommendation_messages(&analysis, &metrics_json),
                &self.options(RECOMMENDATIONS_TEMPERATURE),
            )
            .await
            .context("recommendations stage failed")?;

        info!("Comparison finished");
        Ok(ComparisonResult {
            comprehensive_analysis: analysis,
            hard_metrics,
            optimization_recommendations: recommendations,
        })
    }

    fn options(&self, temperature: f32) -> CompletionOptions {
        CompletionOptions {
            temperature,
            max_tokens: self.max_tokens,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use crate::backends::{ChatBackend, ChatMessage};
    use crate::types::{DatapointValue, ValidationStatus};

    /// Mock backend that replays scripted replies in order and records the
    /// user message of every call
    struct ScriptedBackend {
        replies: Mutex<VecDeque<Result<String>>>,
        seen: Arc<Mutex<Vec<String>>>,
    }

    impl ScriptedBackend {
        fn new(replies: Vec<Result<String>>) -> Self {
            Self {
                replies: Mutex::new(replies.into_iter().collect()),
                seen: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    #[async_trait]
    impl ChatBackend for ScriptedBackend {
        fn backend_name(&self) -> &str {
            "scripted"
        }
        fn model(&self) -> &str {
            "scripted-model"
        }
        async fn complete(
            &self,
            messages: &[ChatMessage],
            _options: &CompletionOptions,
        ) -> Result<String> {
            self.seen
                .lock()
                .unwrap()
                .push(messages.last().map(|m| m.content.clone()).unwrap_or_default());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(anyhow!("no scripted reply left")))
        }
    }

    fn engine(replies: Vec<Result<String>>) -> ComparisonEngine {
        let gateway = ModelGateway::new(vec![Box::new(ScriptedBackend::new(replies))]).unwrap();
        ComparisonEngine::new(gateway, 4096)
    }

    fn request() -> ComparisonRequest {
        ComparisonRequest {
            report1: "公司成立于2010年，注册资本100万元。".to_string(),
            report2: "公司成立于2010年，注册资本97万元。".to_string(),
            custom_prompt: None,
        }
    }

    const METRICS_REPLY: &str = r#"{
        "wordCount": {"report1": 18, "report2": 17},
        "moduleComparison": [
            {"module": "企业概况", "report1": true, "report2": true},
            {"module": "财务", "report1": true, "report2": false}
        ],
        "dataValidation": [
            {"dataPoint": "成立年份", "report1Value": "2010年", "report2Value": "2010年",
             "status": "consistent", "rationale": "两份报告一致"},
            {"dataPoint": "注册资本", "report1Value": "100万元", "report2Value": "97万元",
             "status": "inconsistent", "rationale": "金额相差3万元"}
        ],
        "dimensionScores": {
            "fieldSelection": {"report1": 18, "report2": 15},
            "informationUsage": {"report1": 16, "report2": 14},
            "logicalReasonableness": {"report1": 17, "report2": 16},
            "clarityStructure": {"report1": 18, "report2": 17},
            "languageQuality": {"report1": 18, "report2": 17},
            "totalScore": {"report1": 87, "report2": 79}
        }
    }"#;

    #[tokio::test]
    async fn test_full_pipeline() {
        let engine = engine(vec![
            Ok("报告1整体更优。".to_string()),
            Ok(METRICS_REPLY.to_string()),
            Ok("建议补充数据来源。".to_string()),
        ]);

        let result = engine.compare(&request()).await.unwrap();
        assert_eq!(result.comprehensive_analysis, "报告1整体更优。");
        assert_eq!(result.optimization_recommendations, "建议补充数据来源。");
        assert_eq!(result.hard_metrics.word_count.report1, 18);
        assert_eq!(result.hard_metrics.module_comparison.len(), 2);
        assert_eq!(result.hard_metrics.dimension_scores.total_score.report2, 79.0);
    }

    #[tokio::test]
    async fn test_registered_capital_mismatch_scenario() {
        let engine = engine(vec![
            Ok("注册资本存在出入。".to_string()),
            Ok(METRICS_REPLY.to_string()),
            Ok("核实注册资本数据。".to_string()),
        ]);

        let result = engine.compare(&request()).await.unwrap();
        let capital = result
            .hard_metrics
            .data_validation
            .iter()
            .find(|d| d.data_point == "注册资本")
            .expect("expected a 注册资本 entry");
        assert_eq!(capital.report1_value, DatapointValue::Text("100万元".into()));
        assert_eq!(capital.report2_value, DatapointValue::Text("97万元".into()));
        assert_ne!(capital.status, ValidationStatus::Consistent);
    }

    #[tokio::test]
    async fn test_unparsable_metrics_never_abort() {
        let engine = engine(vec![
            Ok("分析".to_string()),
            Ok("I could not produce JSON this time.".to_string()),
            Ok("建议".to_string()),
        ]);

        let result = engine.compare(&request()).await.unwrap();
        // Fallback record: locally-counted characters, everything else empty
        assert_eq!(
            result.hard_metrics.word_count.report1,
            request().report1.chars().count() as u64
        );
        assert!(result.hard_metrics.data_validation.is_empty());
        assert_eq!(result.hard_metrics.dimension_scores.total_score.report1, 0.0);
    }

    #[tokio::test]
    async fn test_analysis_failure_aborts() {
        let engine = engine(vec![Err(anyhow!("status 500: upstream down"))]);
        let err = engine.compare(&request()).await.unwrap_err();
        assert!(err.to_string().contains("analysis stage failed"));
    }

    #[tokio::test]
    async fn test_recommendations_failure_aborts() {
        let engine = engine(vec![
            Ok("分析".to_string()),
            Ok(METRICS_REPLY.to_string()),
            Err(anyhow!("status 503")),
        ]);
        let err = engine.compare(&request()).await.unwrap_err();
        assert!(err.to_string().contains("recommendations stage failed"));
    }

    #[tokio::test]
    async fn test_stage_outputs_flow_forward() {
        let backend = ScriptedBackend::new(vec![
            Ok("独特的分析标记XYZ".to_string()),
            Ok(METRICS_REPLY.to_string()),
            Ok("建议".to_string()),
        ]);
        let seen = Arc::clone(&backend.seen);
        let gateway = ModelGateway::new(vec![Box::new(backend)]).unwrap();
        let engine = ComparisonEngine::new(gateway, 4096);

        engine.compare(&request()).await.unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        // The third call's user message embeds the stage-1 narrative and
        // the serialized stage-2 metrics.
        assert!(seen[2].contains("独特的分析标记XYZ"));
        assert!(seen[2].contains("\"wordCount\""));
        assert!(seen[2].contains("注册资本"));
    }

    #[tokio::test]
    async fn test_failover_within_pipeline() {
        // Primary dies on every call, secondary answers: request succeeds.
        struct AlwaysFail;
        #[async_trait]
        impl ChatBackend for AlwaysFail {
            fn backend_name(&self) -> &str {
                "primary"
            }
            fn model(&self) -> &str {
                "down"
            }
            async fn complete(
                &self,
                _messages: &[ChatMessage],
                _options: &CompletionOptions,
            ) -> Result<String> {
                Err(anyhow!("status 500: internal error"))
            }
        }

        let secondary = ScriptedBackend::new(vec![
            Ok("分析".to_string()),
            Ok(METRICS_REPLY.to_string()),
            Ok("建议".to_string()),
        ]);
        let gateway =
            ModelGateway::new(vec![Box::new(AlwaysFail), Box::new(secondary)]).unwrap();
        let engine = ComparisonEngine::new(gateway, 4096);

        let result = engine.compare(&request()).await.unwrap();
        assert_eq!(result.comprehensive_analysis, "分析");
    }
}
