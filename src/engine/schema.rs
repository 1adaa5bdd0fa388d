//! The fixed response schema for structured turns, and boundary validation
//! against it.

use std::sync::OnceLock;

use serde_json::{json, Value};

use crate::error::AppError;
use crate::models::{BradStructuredResponse, DesignType, Phase, SmartReplyCategory};

/// Name the schema is registered under in `response_format`.
pub const RESPONSE_SCHEMA_NAME: &str = "brad_structured_response";

fn nullable_string() -> Value {
    json!({ "type": ["string", "null"] })
}

fn nullable_string_list() -> Value {
    json!({ "type": ["array", "null"], "items": { "type": "string" } })
}

fn unit_interval() -> Value {
    json!({ "type": "number", "minimum": 0, "maximum": 1 })
}

/// Strict JSON schema for [`BradStructuredResponse`]: every property required,
/// explicit nullability, no additional properties.
pub fn response_schema() -> Value {
    let mut design_types: Vec<Value> = DesignType::ALL.iter().map(|s| json!(s)).collect();
    design_types.push(Value::Null);

    json!({
        "type": "object",
        "additionalProperties": false,
        "required": [
            "response",
            "smartReplies",
            "conversationState",
            "designRequirements",
            "suggestedActions",
            "confidenceScore",
            "shouldTransitionToBuild"
        ],
        "properties": {
            "response": { "type": "string" },
            "smartReplies": {
                "type": "array",
                "items": {
                    "type": "object",
                    "additionalProperties": false,
                    "required": ["text", "category", "relevanceScore"],
                    "properties": {
                        "text": { "type": "string" },
                        "category": { "type": "string", "enum": SmartReplyCategory::ALL },
                        "relevanceScore": unit_interval()
                    }
                }
            },
            "conversationState": {
                "type": "object",
                "additionalProperties": false,
                "required": ["phase", "userIntent"],
                "properties": {
                    "phase": { "type": "string", "enum": Phase::ALL },
                    "userIntent": { "type": "string" }
                }
            },
            "designRequirements": {
                "type": "object",
                "additionalProperties": false,
                "required": [
                    "designType",
                    "subject",
                    "subjectName",
                    "purpose",
                    "preferredStyleAndInspiration",
                    "colorPreferences",
                    "functionalityNeeds",
                    "contentTypes"
                ],
                "properties": {
                    "designType": { "type": ["string", "null"], "enum": design_types },
                    "subject": nullable_string(),
                    "subjectName": nullable_string(),
                    "purpose": nullable_string(),
                    "preferredStyleAndInspiration": nullable_string(),
                    "colorPreferences": nullable_string_list(),
                    "functionalityNeeds": nullable_string_list(),
                    "contentTypes": nullable_string_list()
                }
            },
            "suggestedActions": { "type": "array", "items": { "type": "string" } },
            "confidenceScore": unit_interval(),
            "shouldTransitionToBuild": { "type": "boolean" }
        }
    })
}

fn validator() -> Result<&'static jsonschema::Validator, AppError> {
    static VALIDATOR: OnceLock<jsonschema::Validator> = OnceLock::new();
    if let Some(v) = VALIDATOR.get() {
        return Ok(v);
    }
    let compiled = jsonschema::validator_for(&response_schema())
        .map_err(|e| AppError::Internal(format!("Response schema failed to compile: {e}")))?;
    Ok(VALIDATOR.get_or_init(|| compiled))
}

/// Validate a raw structured turn against the schema, then decode it.
/// Any violation rejects the whole turn.
pub fn validate_structured_turn(value: Value) -> Result<BradStructuredResponse, AppError> {
    let validator = validator()?;
    let violations: Vec<String> = validator
        .iter_errors(&value)
        .take(5)
        .map(|e| format!("{} at '{}'", e, e.instance_path))
        .collect();
    if !violations.is_empty() {
        return Err(AppError::Schema(violations.join("; ")));
    }

    let turn: BradStructuredResponse =
        serde_json::from_value(value).map_err(|e| AppError::Schema(e.to_string()))?;
    Ok(turn.clamped())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_turn() -> Value {
        json!({
            "response": "Nice! A portfolio it is.",
            "smartReplies": [
                {"text": "Photography", "category": "direct-answer", "relevanceScore": 0.9},
                {"text": "Show me examples", "category": "alternative", "relevanceScore": 0.4}
            ],
            "conversationState": {"phase": "requirements", "userIntent": "Portfolio site"},
            "designRequirements": {
                "designType": "portfolio",
                "subject": null,
                "subjectName": null,
                "purpose": null,
                "preferredStyleAndInspiration": null,
                "colorPreferences": null,
                "functionalityNeeds": ["gallery"],
                "contentTypes": null
            },
            "suggestedActions": [],
            "confidenceScore": 0.7,
            "shouldTransitionToBuild": false
        })
    }

    #[test]
    fn test_valid_turn_passes() {
        let turn = validate_structured_turn(valid_turn()).unwrap();
        assert_eq!(turn.smart_replies.len(), 2);
        assert_eq!(
            turn.design_requirements.functionality_needs,
            Some(vec!["gallery".to_string()])
        );
    }

    #[test]
    fn test_out_of_enum_phase_is_rejected() {
        let mut value = valid_turn();
        value["conversationState"]["phase"] = json!("refinement");
        assert!(matches!(validate_structured_turn(value), Err(AppError::Schema(_))));
    }

    #[test]
    fn test_out_of_range_score_is_rejected() {
        let mut value = valid_turn();
        value["confidenceScore"] = json!(1.5);
        assert!(matches!(validate_structured_turn(value), Err(AppError::Schema(_))));
    }

    #[test]
    fn test_missing_nullable_field_is_rejected() {
        let mut value = valid_turn();
        value["designRequirements"]
            .as_object_mut()
            .unwrap()
            .remove("subjectName");
        assert!(matches!(validate_structured_turn(value), Err(AppError::Schema(_))));
    }

    #[test]
    fn test_extra_property_is_rejected() {
        let mut value = valid_turn();
        value["conversationState"]["designType"] = json!("portfolio");
        assert!(matches!(validate_structured_turn(value), Err(AppError::Schema(_))));
    }

    #[test]
    fn test_schema_lists_every_design_type() {
        let schema = response_schema();
        let variants = schema["properties"]["designRequirements"]["properties"]["designType"]["enum"]
            .as_array()
            .unwrap()
            .len();
        assert_eq!(variants, DesignType::ALL.len() + 1);
    }
}
