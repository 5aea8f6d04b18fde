//! Metrics decoding: strict JSON parse with a brace-scanning fallback
//!
//! Models asked for "JSON only" still wrap the object in prose or code
//! fences often enough that a second, extraction-based attempt pays for
//! itself. Decoding never errors: when both attempts fail the caller gets
//! a structurally-valid fallback record.

use tracing::warn;

use crate::types::HardMetrics;

/// Outcome of decoding a metrics reply
#[derive(Debug, Clone)]
pub enum MetricsOutcome {
    /// The reply parsed (directly or via brace-scan extraction)
    Parsed(HardMetrics),
    /// Neither attempt parsed; a locally-built substitute is returned
    Fallback(HardMetrics),
}

impl MetricsOutcome {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }

    pub fn into_metrics(self) -> HardMetrics {
        match self {
            Self::Parsed(m) | Self::Fallback(m) => m,
        }
    }
}

/// Decode the metrics-stage reply.
///
/// Strict parse first; on failure, extract the first top-level
/// brace-delimited substring and retry; if both fail, substitute
/// [`HardMetrics::fallback`] built from the submitted report texts.
pub fn decode_metrics(raw: &str, report1: &str, report2: &str) -> MetricsOutcome {
    if let Ok(metrics) = serde_json::from_str::<HardMetrics>(raw) {
        return MetricsOutcome::Parsed(metrics);
    }

    if let Some(candidate) = first_json_object(raw) {
        if let Ok(metrics) = serde_json::from_str::<HardMetrics>(candidate) {
            return MetricsOutcome::Parsed(metrics);
        }
    }

    warn!("Metrics reply was not parsable JSON, substituting fallback record");
    MetricsOutcome::Fallback(HardMetrics::fallback(report1, report2))
}

/// Find the first top-level `{...}` substring in `text`.
///
/// Tracks brace depth while skipping over string literals (and escaped
/// quotes inside them) so braces in values don't derail the scan.
fn first_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }

    None
}
