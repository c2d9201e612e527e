//! Normalization of native dataset records into the canonical shape.

use super::registry::ShapeFamily;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Canonical evaluation-question record.
///
/// Optional fields distinguish "not applicable to this source" (`None`)
/// from "applicable but textually empty" (`""`); downstream consumers
/// rely on that difference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalQuestion {
    /// Provenance tag; never empty after normalization.
    pub qn_source: String,
    /// Bias dimension under test, for sources that carry one.
    pub bias_qn_category: Option<String>,
    /// Source-native ordinal for the question.
    pub eval_qn_num: Option<String>,
    /// Positive/negative framing flag.
    pub question_polarity: Option<String>,
    /// Disambiguation condition.
    pub context_condition: Option<String>,
    /// Final question text; never null.
    pub qn: String,
}

/// Map a native record onto the canonical shape for the given family.
///
/// Pure function of (family, label, record): identical inputs always
/// produce identical output.
pub fn normalize(family: ShapeFamily, label: &str, native: &Value) -> EvalQuestion {
    match family {
        ShapeFamily::ContextQuestion => {
            let context = text_field(native, "context");
            let question = text_field(native, "question");
            EvalQuestion {
                qn_source: label.to_string(),
                bias_qn_category: opt_field(native, "category"),
                eval_qn_num: opt_field(native, "question_index"),
                question_polarity: opt_field(native, "question_polarity"),
                context_condition: opt_field(native, "context_condition"),
                qn: format!("{} {}", context, question).trim().to_string(),
            }
        }
        ShapeFamily::QuestionOnly => EvalQuestion {
            qn_source: label.to_string(),
            bias_qn_category: None,
            eval_qn_num: opt_field(native, "question_no"),
            question_polarity: None,
            context_condition: None,
            qn: text_field(native, "question").trim().to_string(),
        },
        // Relabeling only; the question text is carried over untouched.
        ShapeFamily::PreNormalized => EvalQuestion {
            qn_source: opt_field(native, "qn_source").unwrap_or_else(|| label.to_string()),
            bias_qn_category: opt_field(native, "category"),
            eval_qn_num: opt_field(native, "eval_qn_num")
                .or_else(|| opt_field(native, "question_index")),
            question_polarity: opt_field(native, "question_polarity"),
            context_condition: opt_field(native, "context_condition"),
            qn: text_field(native, "eval_question"),
        },
    }
}

/// Text field: missing, null or non-text values become the empty string.
fn text_field(native: &Value, key: &str) -> String {
    match native.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Optional classification field: missing and null stay absent, never "".
fn opt_field(native: &Value, key: &str) -> Option<String> {
    match native.get(key) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_context_question_concatenation() {
        let native = json!({
            "context": "Ctx.",
            "question": "Q?",
            "question_index": 3,
            "category": "gender_bias"
        });
        let record = normalize(ShapeFamily::ContextQuestion, "bbq", &native);
        assert_eq!(record.qn, "Ctx. Q?");
        assert_eq!(record.eval_qn_num.as_deref(), Some("3"));
        assert_eq!(record.bias_qn_category.as_deref(), Some("gender_bias"));
        assert_eq!(record.qn_source, "bbq");
    }

    #[test]
    fn test_context_question_missing_context_trims() {
        let native = json!({"question": "Q?"});
        let record = normalize(ShapeFamily::ContextQuestion, "bbq", &native);
        assert_eq!(record.qn, "Q?");
    }

    #[test]
    fn test_context_question_polarity_and_condition_copied() {
        let native = json!({
            "context": "Two people walked in.",
            "question": "Who was late?",
            "question_polarity": "neg",
            "context_condition": "ambig"
        });
        let record = normalize(ShapeFamily::ContextQuestion, "bbq", &native);
        assert_eq!(record.question_polarity.as_deref(), Some("neg"));
        assert_eq!(record.context_condition.as_deref(), Some("ambig"));
    }

    #[test]
    fn test_question_only_absent_marker_not_empty_string() {
        let native = json!({"question": "Q?", "question_no": 7});
        let record = normalize(ShapeFamily::QuestionOnly, "llm_generated_diverse", &native);
        assert_eq!(record.qn, "Q?");
        assert_eq!(record.eval_qn_num.as_deref(), Some("7"));
        assert!(record.bias_qn_category.is_none());
        assert!(record.question_polarity.is_none());
        assert!(record.context_condition.is_none());
    }

    #[test]
    fn test_pre_normalized_relabels_without_recomputation() {
        let native = json!({
            "eval_question": "  Who leads better?  ",
            "category": "gender_bias",
            "eval_qn_num": "12"
        });
        let record = normalize(ShapeFamily::PreNormalized, "beats_eval", &native);
        // No trimming on the pre-normalized path.
        assert_eq!(record.qn, "  Who leads better?  ");
        assert_eq!(record.bias_qn_category.as_deref(), Some("gender_bias"));
        assert_eq!(record.eval_qn_num.as_deref(), Some("12"));
        assert_eq!(record.qn_source, "beats_eval");
    }

    #[test]
    fn test_pre_normalized_native_source_wins() {
        let native = json!({"eval_question": "Q?", "qn_source": "upstream"});
        let record = normalize(ShapeFamily::PreNormalized, "beats_eval", &native);
        assert_eq!(record.qn_source, "upstream");
    }

    #[test]
    fn test_missing_fields_default_to_empty_qn() {
        let record = normalize(ShapeFamily::ContextQuestion, "bbq", &json!({}));
        assert_eq!(record.qn, "");
        assert!(record.bias_qn_category.is_none());
    }

    #[test]
    fn test_normalization_is_deterministic() {
        let native = json!({"context": "A.", "question": "B?", "question_index": 1});
        let first = normalize(ShapeFamily::ContextQuestion, "bbq", &native);
        let second = normalize(ShapeFamily::ContextQuestion, "bbq", &native);
        assert_eq!(first, second);
    }
}
