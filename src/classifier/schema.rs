//! Structured output schema for question classification.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// The twelve bias dimensions a question can be classified under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BiasCategory {
    #[serde(rename = "gender_bias")]
    Gender,
    #[serde(rename = "race_and_ethnicity_bias")]
    RaceEthnicity,
    #[serde(rename = "socioeconomic_bias")]
    Socioeconomic,
    #[serde(rename = "cultural_bias")]
    Cultural,
    #[serde(rename = "religion_bias")]
    Religion,
    #[serde(rename = "sexual_orientation_bias")]
    SexualOrientation,
    #[serde(rename = "disability_bias")]
    Disability,
    #[serde(rename = "age_bias")]
    Age,
    #[serde(rename = "geography_bias")]
    Geography,
    #[serde(rename = "political_bias")]
    Political,
    #[serde(rename = "stereotype_bias")]
    Stereotype,
    #[serde(rename = "automation_bias")]
    Automation,
}

impl BiasCategory {
    /// Wire labels, in schema order.
    pub fn labels() -> [&'static str; 12] {
        [
            "gender_bias",
            "race_and_ethnicity_bias",
            "socioeconomic_bias",
            "cultural_bias",
            "religion_bias",
            "sexual_orientation_bias",
            "disability_bias",
            "age_bias",
            "geography_bias",
            "political_bias",
            "stereotype_bias",
            "automation_bias",
        ]
    }
}

/// Validated classifier verdict for one evaluation question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionClassification {
    pub is_bias_eval: bool,
    pub is_categorized: bool,
    #[serde(default)]
    pub category: Option<BiasCategory>,
    #[serde(default)]
    pub explanation_if_categorized: Option<String>,
    #[serde(default)]
    pub explanation_if_not_bias_eval: Option<String>,
}

/// Strict JSON schema sent as the chat `response_format`.
pub fn response_format() -> Value {
    json!({
        "type": "json_schema",
        "json_schema": {
            "name": "eval_question_analysis",
            "strict": true,
            "schema": {
                "type": "object",
                "properties": {
                    "is_bias_eval": {
                        "type": "boolean",
                        "description": "Indicates whether the evaluation question tests for bias."
                    },
                    "is_categorized": {
                        "type": "boolean",
                        "description": "Indicates whether the evaluation question has been categorized."
                    },
                    "category": {
                        "type": ["string", "null"],
                        "description": "The category of the bias, if applicable.",
                        "enum": BiasCategory::labels()
                    },
                    "explanation_if_categorized": {
                        "type": ["string", "null"],
                        "description": "Explanation if the question is categorized."
                    },
                    "explanation_if_not_bias_eval": {
                        "type": ["string", "null"],
                        "description": "Explanation if the question is not categorized as bias evaluation."
                    }
                },
                "required": [
                    "is_bias_eval",
                    "is_categorized",
                    "category",
                    "explanation_if_categorized",
                    "explanation_if_not_bias_eval"
                ],
                "additionalProperties": false
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_wire_labels_round_trip() {
        for label in BiasCategory::labels() {
            let value = Value::String(label.to_string());
            let category: BiasCategory = serde_json::from_value(value).unwrap();
            assert_eq!(serde_json::to_value(category).unwrap(), json!(label));
        }
    }

    #[test]
    fn test_invalid_category_rejected() {
        let result: std::result::Result<BiasCategory, _> =
            serde_json::from_value(json!("height_bias"));
        assert!(result.is_err());
    }

    #[test]
    fn test_classification_with_null_category() {
        let raw = json!({
            "is_bias_eval": false,
            "is_categorized": false,
            "category": null,
            "explanation_if_categorized": null,
            "explanation_if_not_bias_eval": "Asks for general facts only."
        });
        let parsed: QuestionClassification = serde_json::from_value(raw).unwrap();
        assert!(!parsed.is_bias_eval);
        assert!(parsed.category.is_none());
        assert!(parsed.explanation_if_not_bias_eval.is_some());
    }

    #[test]
    fn test_response_format_carries_enum() {
        let format = response_format();
        assert_eq!(format["json_schema"]["strict"], json!(true));
        let labels = &format["json_schema"]["schema"]["properties"]["category"]["enum"];
        assert_eq!(labels.as_array().unwrap().len(), 12);
    }
}
