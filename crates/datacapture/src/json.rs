//! Loading questionnaires and responses from FHIR JSON.
//!
//! Only the fields that matter for validation are read; everything else in the
//! resource is ignored. Paths in errors use FHIRPath-like notation such as
//! `Questionnaire.item[1].item[0]`.

use std::str::FromStr;

use helios_fhir_values::{
    AnswerValue, Coding, Decimal, FhirDate, FhirDateTime, FhirTime, Quantity, ValueError,
};
use serde_json::{Map, Value};

use crate::error::{Result, ValidationError};
use crate::questionnaire::{Extension, Questionnaire, QuestionnaireItem, QuestionnaireItemType};
use crate::response::{QuestionnaireResponse, QuestionnaireResponseItem};

impl Questionnaire {
    /// Reads a `Questionnaire` resource.
    pub fn from_json(value: &Value) -> Result<Self> {
        let path = "Questionnaire";
        let obj = as_object(value, path)?;
        check_resource_type(obj, "Questionnaire", path)?;

        Ok(Questionnaire {
            url: optional_string(obj, "url", path)?,
            items: array(obj, "item", path)?
                .iter()
                .enumerate()
                .map(|(i, item)| parse_item(item, &format!("{}.item[{}]", path, i)))
                .collect::<Result<_>>()?,
        })
    }

    /// Parses a `Questionnaire` from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::from_json(&parse_str(json, "Questionnaire")?)
    }
}

impl QuestionnaireResponse {
    /// Reads a `QuestionnaireResponse` resource.
    ///
    /// Items nested under an answer are flattened into the children of the
    /// response item that holds the answer.
    pub fn from_json(value: &Value) -> Result<Self> {
        let path = "QuestionnaireResponse";
        let obj = as_object(value, path)?;
        check_resource_type(obj, "QuestionnaireResponse", path)?;

        Ok(QuestionnaireResponse {
            questionnaire: optional_string(obj, "questionnaire", path)?,
            items: array(obj, "item", path)?
                .iter()
                .enumerate()
                .map(|(i, item)| parse_response_item(item, &format!("{}.item[{}]", path, i)))
                .collect::<Result<_>>()?,
        })
    }

    /// Parses a `QuestionnaireResponse` from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::from_json(&parse_str(json, "QuestionnaireResponse")?)
    }
}

fn parse_str(json: &str, path: &str) -> Result<Value> {
    serde_json::from_str(json).map_err(|e| ValidationError::InvalidJson {
        path: path.to_string(),
        message: e.to_string(),
    })
}

fn parse_item(value: &Value, path: &str) -> Result<QuestionnaireItem> {
    let obj = as_object(value, path)?;

    let item_type = match optional_string(obj, "type", path)? {
        Some(code) => QuestionnaireItemType::from_str(&code)
            .map_err(|message| invalid(format!("{}.type", path), message))?,
        None => QuestionnaireItemType::default(),
    };

    let max_length = match obj.get("maxLength") {
        None | Some(Value::Null) => None,
        Some(v) => Some(
            v.as_i64()
                .ok_or_else(|| invalid(format!("{}.maxLength", path), "expected an integer"))?,
        ),
    };

    let extensions = array(obj, "extension", path)?
        .iter()
        .enumerate()
        .map(|(i, ext)| parse_extension(ext, &format!("{}.extension[{}]", path, i)))
        .collect::<Result<_>>()?;

    let items = array(obj, "item", path)?
        .iter()
        .enumerate()
        .map(|(i, child)| parse_item(child, &format!("{}.item[{}]", path, i)))
        .collect::<Result<_>>()?;

    Ok(QuestionnaireItem {
        link_id: required_string(obj, "linkId", path)?,
        text: optional_string(obj, "text", path)?,
        item_type,
        required: optional_bool(obj, "required", path)?,
        repeats: optional_bool(obj, "repeats", path)?,
        max_length,
        extensions,
        items,
    })
}

fn parse_extension(value: &Value, path: &str) -> Result<Extension> {
    let obj = as_object(value, path)?;
    let url = required_string(obj, "url", path)?;

    // Extensions this crate cannot type are kept without a value.
    let value = match typed_value(obj, path) {
        Ok(v) => v,
        Err(e) => {
            tracing::debug!(url = %url, "Extension value not understood: {}", e);
            None
        }
    };

    Ok(Extension { url, value })
}

fn parse_response_item(value: &Value, path: &str) -> Result<QuestionnaireResponseItem> {
    let obj = as_object(value, path)?;
    let mut item = QuestionnaireResponseItem::new(required_string(obj, "linkId", path)?);

    for (i, answer) in array(obj, "answer", path)?.iter().enumerate() {
        let answer_path = format!("{}.answer[{}]", path, i);
        let answer_obj = as_object(answer, &answer_path)?;

        if let Some(v) = typed_value(answer_obj, &answer_path)? {
            item.answers.push(v);
        }
        for (j, child) in array(answer_obj, "item", &answer_path)?.iter().enumerate() {
            item.items
                .push(parse_response_item(child, &format!("{}.item[{}]", answer_path, j))?);
        }
    }

    for (i, child) in array(obj, "item", path)?.iter().enumerate() {
        item.items
            .push(parse_response_item(child, &format!("{}.item[{}]", path, i))?);
    }

    Ok(item)
}

/// Reads the `value[x]` element of an answer or extension.
fn typed_value(obj: &Map<String, Value>, path: &str) -> Result<Option<AnswerValue>> {
    let Some((key, value)) = obj.iter().find(|(k, _)| k.starts_with("value")) else {
        return Ok(None);
    };
    let field_path = format!("{}.{}", path, key);

    let parsed = match key.as_str() {
        "valueBoolean" => AnswerValue::Boolean(
            value
                .as_bool()
                .ok_or_else(|| invalid(&field_path, "expected a boolean"))?,
        ),
        "valueInteger" => AnswerValue::Integer(
            value
                .as_i64()
                .ok_or_else(|| invalid(&field_path, "expected an integer"))?,
        ),
        "valueDecimal" => AnswerValue::Decimal(decimal(value, &field_path)?),
        "valueQuantity" => AnswerValue::Quantity(quantity(value, &field_path)?),
        "valueDate" => AnswerValue::Date(FhirDate::parse(string(value, &field_path)?)?),
        "valueDateTime" => {
            AnswerValue::DateTime(FhirDateTime::parse(string(value, &field_path)?)?)
        }
        "valueTime" => AnswerValue::Time(FhirTime::parse(string(value, &field_path)?)?),
        "valueString" => AnswerValue::String(string(value, &field_path)?.to_string()),
        "valueCoding" => AnswerValue::Coding(coding(value, &field_path)?),
        other => {
            return Err(invalid(
                &field_path,
                format!("unsupported value type '{}'", other),
            ));
        }
    };
    Ok(Some(parsed))
}

fn decimal(value: &Value, path: &str) -> Result<Decimal> {
    let Value::Number(n) = value else {
        return Err(invalid(path, "expected a number"));
    };
    // serde_json keeps the number's source text (`arbitrary_precision`).
    let text = n.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| ValidationError::Value(ValueError::InvalidDecimal { value: text }))
}

fn quantity(value: &Value, path: &str) -> Result<Quantity> {
    let obj = as_object(value, path)?;
    let magnitude = obj
        .get("value")
        .ok_or_else(|| ValidationError::MissingField {
            path: path.to_string(),
            field: "value".to_string(),
        })?;

    Ok(Quantity {
        value: decimal(magnitude, &format!("{}.value", path))?,
        unit: optional_string(obj, "unit", path)?,
        system: optional_string(obj, "system", path)?,
        code: optional_string(obj, "code", path)?,
    })
}

fn coding(value: &Value, path: &str) -> Result<Coding> {
    let obj = as_object(value, path)?;
    Ok(Coding {
        system: optional_string(obj, "system", path)?,
        code: optional_string(obj, "code", path)?,
        display: optional_string(obj, "display", path)?,
    })
}

fn check_resource_type(obj: &Map<String, Value>, expected: &str, path: &str) -> Result<()> {
    match obj.get("resourceType").and_then(Value::as_str) {
        Some(found) if found == expected => Ok(()),
        Some(found) => Err(invalid(
            format!("{}.resourceType", path),
            format!("expected '{}', found '{}'", expected, found),
        )),
        None => Err(ValidationError::MissingField {
            path: path.to_string(),
            field: "resourceType".to_string(),
        }),
    }
}

fn as_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| invalid(path, "expected an object"))
}

fn array<'a>(obj: &'a Map<String, Value>, field: &str, path: &str) -> Result<&'a [Value]> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(values)) => Ok(values.as_slice()),
        Some(_) => Err(invalid(format!("{}.{}", path, field), "expected an array")),
    }
}

fn string<'a>(value: &'a Value, path: &str) -> Result<&'a str> {
    value
        .as_str()
        .ok_or_else(|| invalid(path, "expected a string"))
}

fn optional_string(obj: &Map<String, Value>, field: &str, path: &str) -> Result<Option<String>> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => Ok(Some(string(v, &format!("{}.{}", path, field))?.to_string())),
    }
}

fn required_string(obj: &Map<String, Value>, field: &str, path: &str) -> Result<String> {
    optional_string(obj, field, path)?.ok_or_else(|| ValidationError::MissingField {
        path: path.to_string(),
        field: field.to_string(),
    })
}

fn optional_bool(obj: &Map<String, Value>, field: &str, path: &str) -> Result<bool> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(false),
        Some(v) => v
            .as_bool()
            .ok_or_else(|| invalid(format!("{}.{}", path, field), "expected a boolean")),
    }
}

fn invalid(path: impl Into<String>, message: impl Into<String>) -> ValidationError {
    ValidationError::InvalidJson {
        path: path.into(),
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::questionnaire::MIN_VALUE_EXTENSION_URL;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_questionnaire_items_and_extensions() {
        let q = Questionnaire::from_json(&json!({
            "resourceType": "Questionnaire",
            "url": "http://example.org/q/intake",
            "item": [{
                "linkId": "vitals",
                "type": "group",
                "item": [{
                    "linkId": "age",
                    "type": "integer",
                    "required": true,
                    "extension": [
                        {"url": MIN_VALUE_EXTENSION_URL, "valueInteger": 0},
                        {"url": "http://example.org/ext", "valueSignature": {}}
                    ]
                }]
            }]
        }))
        .unwrap();

        assert_eq!(q.url.as_deref(), Some("http://example.org/q/intake"));
        let age = q.find_item("age").unwrap();
        assert!(age.required);
        assert_eq!(age.item_type, QuestionnaireItemType::Integer);
        assert_eq!(
            age.extension_value(MIN_VALUE_EXTENSION_URL),
            Some(&AnswerValue::Integer(0))
        );
        assert!(age.extensions[1].value.is_none());
    }

    #[test]
    fn test_missing_link_id() {
        let err = Questionnaire::from_json(&json!({
            "resourceType": "Questionnaire",
            "item": [{"type": "string"}]
        }))
        .unwrap_err();

        assert_eq!(
            err,
            ValidationError::MissingField {
                path: "Questionnaire.item[0]".to_string(),
                field: "linkId".to_string(),
            }
        );
    }

    #[test]
    fn test_wrong_resource_type() {
        let err = QuestionnaireResponse::from_json(&json!({"resourceType": "Patient"})).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidJson { .. }));
    }

    #[test]
    fn test_response_answers_and_nested_items() {
        let r = QuestionnaireResponse::from_json(&json!({
            "resourceType": "QuestionnaireResponse",
            "item": [{
                "linkId": "smoker",
                "answer": [{
                    "valueBoolean": true,
                    "item": [{"linkId": "packs", "answer": [{"valueDecimal": 1.50}]}]
                }]
            }, {
                "linkId": "weight",
                "answer": [{"valueQuantity": {"value": 72.5, "unit": "kg", "system": "http://unitsofmeasure.org", "code": "kg"}}]
            }]
        }))
        .unwrap();

        assert_eq!(r.items[0].answers, vec![AnswerValue::Boolean(true)]);
        assert_eq!(r.items[0].items[0].link_id, "packs");
        assert_eq!(r.items[0].items[0].answers, vec![AnswerValue::Decimal(dec!(1.5))]);

        let AnswerValue::Quantity(q) = &r.items[1].answers[0] else {
            panic!("expected a quantity");
        };
        assert_eq!(q.value, dec!(72.5));
        assert_eq!(q.unit.as_deref(), Some("kg"));
    }

    #[test]
    fn test_decimal_answers_keep_source_text() {
        let r = QuestionnaireResponse::from_json_str(
            r#"{
                "resourceType": "QuestionnaireResponse",
                "item": [
                    {"linkId": "a", "answer": [{"valueDecimal": 0.10000000000000000001}]},
                    {"linkId": "b", "answer": [{"valueDecimal": 1.50}]},
                    {"linkId": "c", "answer": [{"valueQuantity": {"value": 2.000}}]}
                ]
            }"#,
        )
        .unwrap();

        let AnswerValue::Decimal(a) = &r.items[0].answers[0] else {
            panic!("expected a decimal");
        };
        assert_eq!(a.to_string(), "0.10000000000000000001");
        assert!(*a > dec!(0.1));

        let b = &r.items[1].answers[0];
        assert_eq!(b.primitive_text().as_deref(), Some("1.50"));

        let AnswerValue::Quantity(c) = &r.items[2].answers[0] else {
            panic!("expected a quantity");
        };
        assert_eq!(c.value.scale(), 3);
    }

    #[test]
    fn test_unsupported_answer_type() {
        let err = QuestionnaireResponse::from_json(&json!({
            "resourceType": "QuestionnaireResponse",
            "item": [{"linkId": "photo", "answer": [{"valueAttachment": {}}]}]
        }))
        .unwrap_err();

        assert_eq!(
            err,
            ValidationError::InvalidJson {
                path: "QuestionnaireResponse.item[0].answer[0].valueAttachment".to_string(),
                message: "unsupported value type 'valueAttachment'".to_string(),
            }
        );
    }

    #[test]
    fn test_invalid_date_answer() {
        let err = QuestionnaireResponse::from_json(&json!({
            "resourceType": "QuestionnaireResponse",
            "item": [{"linkId": "dob", "answer": [{"valueDate": "1990-13-01"}]}]
        }))
        .unwrap_err();
        assert!(matches!(err, ValidationError::Value(ValueError::InvalidTemporal { .. })));
    }

    #[test]
    fn test_from_json_str_reports_syntax_errors() {
        let err = Questionnaire::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidJson { .. }));
    }
}
