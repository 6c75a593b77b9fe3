//! Onboarding checklist payload and its validation rules.
//!
//! The checklist is the questionnaire a customer fills in during onboarding.
//! It is stored once per user; a second submission overwrites every field.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;

/// Accepted answers to "is a payment method already set up with Meta?".
pub const VALID_PAYMENT_OPTIONS: &[&str] = &["ja", "nein"];

/// Accepted payment methods when none is set up yet.
pub const VALID_PAYMENT_METHODS: &[&str] = &["kreditkarte", "paypal", "invoice", "sepa"];

/// Maximum number of target-group interests.
pub const MAX_INTERESTS: usize = 20;

/// Maximum length of any free-text checklist field.
pub const MAX_TEXT_LEN: usize = 5_000;

/// Full checklist body as submitted by the customer.
///
/// JSON sub-objects default to `{}` when omitted so the non-null database
/// columns always receive an object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistInput {
    pub payment_option: String,
    pub payment_method: Option<String>,
    #[serde(default)]
    pub tax_id: String,
    #[serde(default)]
    pub domain: String,
    pub target_audience: Option<String>,
    pub company_info: Option<String>,
    pub target_group_gender: Option<String>,
    pub target_group_age: Option<String>,
    pub target_group_location: Option<String>,
    #[serde(default)]
    pub target_group_interests: Vec<String>,
    pub unique_selling_point: Option<String>,
    pub market_size: Option<String>,
    #[serde(default = "empty_object")]
    pub web_design: Value,
    #[serde(default = "empty_object")]
    pub market_research: Value,
    #[serde(default = "empty_object")]
    pub legal_info: Value,
    #[serde(default = "empty_object")]
    pub ideal_customer_profile: Value,
    #[serde(default = "empty_object")]
    pub qualification_questions: Value,
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

impl ChecklistInput {
    /// Validate and normalize the payload in place.
    ///
    /// Trims text fields, turns blank optional strings into `None`, drops
    /// blank interests, and replaces `null` sub-objects with `{}`. A payment
    /// method is required when `paymentOption` is `nein`.
    pub fn normalize(&mut self) -> Result<(), CoreError> {
        self.payment_option = self.payment_option.trim().to_lowercase();
        self.tax_id = self.tax_id.trim().to_string();
        self.domain = self.domain.trim().to_string();

        one_of("paymentOption", &self.payment_option, VALID_PAYMENT_OPTIONS)?;
        check_length("taxId", &self.tax_id)?;
        check_length("domain", &self.domain)?;

        for (name, field) in [
            ("paymentMethod", &mut self.payment_method),
            ("targetAudience", &mut self.target_audience),
            ("companyInfo", &mut self.company_info),
            ("targetGroupGender", &mut self.target_group_gender),
            ("targetGroupAge", &mut self.target_group_age),
            ("targetGroupLocation", &mut self.target_group_location),
            ("uniqueSellingPoint", &mut self.unique_selling_point),
            ("marketSize", &mut self.market_size),
        ] {
            blank_to_none(field);
            if let Some(value) = field {
                check_length(name, value)?;
            }
        }

        if self.payment_option == "nein" {
            let method = self.payment_method.as_deref().unwrap_or("").to_lowercase();
            one_of("paymentMethod", &method, VALID_PAYMENT_METHODS)?;
            self.payment_method = Some(method);
        }

        self.target_group_interests = self
            .target_group_interests
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if self.target_group_interests.len() > MAX_INTERESTS {
            return Err(CoreError::Validation(format!(
                "targetGroupInterests must not exceed {MAX_INTERESTS} entries"
            )));
        }

        for (name, value) in [
            ("webDesign", &mut self.web_design),
            ("marketResearch", &mut self.market_research),
            ("legalInfo", &mut self.legal_info),
            ("idealCustomerProfile", &mut self.ideal_customer_profile),
            ("qualificationQuestions", &mut self.qualification_questions),
        ] {
            if value.is_null() {
                *value = empty_object();
            }
            if !value.is_object() {
                return Err(CoreError::Validation(format!(
                    "{name} must be a JSON object"
                )));
            }
        }

        Ok(())
    }
}

fn one_of(name: &str, value: &str, allowed: &[&str]) -> Result<(), CoreError> {
    if value.is_empty() {
        return Err(CoreError::Validation(format!("{name} is required")));
    }
    if !allowed.contains(&value) {
        return Err(CoreError::Validation(format!(
            "Invalid {name} '{value}'. Must be one of: {}",
            allowed.join(", ")
        )));
    }
    Ok(())
}

fn check_length(name: &str, value: &str) -> Result<(), CoreError> {
    if value.chars().count() > MAX_TEXT_LEN {
        return Err(CoreError::Validation(format!(
            "{name} must not exceed {MAX_TEXT_LEN} characters"
        )));
    }
    Ok(())
}

fn blank_to_none(field: &mut Option<String>) {
    match field.as_deref().map(str::trim) {
        Some("") => *field = None,
        Some(trimmed) => *field = Some(trimmed.to_string()),
        None => {}
    }
}

/// Remove `null`, empty-string, empty-array, and empty-object entries from a
/// serialized checklist so the admin tracking view only shows answered
/// questions.
pub fn strip_empty_fields(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !is_empty_value(v))
                .collect(),
        ),
        other => other,
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    fn valid() -> ChecklistInput {
        ChecklistInput {
            payment_option: "ja".into(),
            tax_id: "DE123456789".into(),
            domain: "example.de".into(),
            web_design: json!({"colors": "blau"}),
            market_research: empty_object(),
            legal_info: empty_object(),
            ideal_customer_profile: empty_object(),
            qualification_questions: empty_object(),
            ..Default::default()
        }
    }

    #[test]
    fn deserializes_camel_case_with_defaults() {
        let input: ChecklistInput = serde_json::from_value(json!({
            "paymentOption": "ja",
            "domain": "shop.de",
            "targetGroupInterests": ["Sport", "Reisen"]
        }))
        .unwrap();
        assert_eq!(input.target_group_interests.len(), 2);
        assert_eq!(input.tax_id, "");
        assert_eq!(input.legal_info, json!({}));
        assert_eq!(input.qualification_questions, json!({}));
    }

    #[test]
    fn valid_payload_normalizes() {
        let mut input = valid();
        input.payment_option = " Ja ".into();
        input.market_size = Some("   ".into());
        input.company_info = Some(" GmbH ".into());
        input.target_group_interests = vec!["".into(), " Fitness ".into()];
        input.normalize().unwrap();

        assert_eq!(input.payment_option, "ja");
        assert_eq!(input.market_size, None);
        assert_eq!(input.company_info.as_deref(), Some("GmbH"));
        assert_eq!(input.target_group_interests, vec!["Fitness".to_string()]);
    }

    #[test]
    fn missing_payment_option_is_rejected() {
        let mut input = valid();
        input.payment_option = "  ".into();
        assert_matches!(input.normalize(), Err(CoreError::Validation(msg)) if msg.contains("paymentOption"));
    }

    #[test]
    fn payment_method_required_without_existing_method() {
        let mut input = valid();
        input.payment_option = "nein".into();
        assert_matches!(input.normalize(), Err(CoreError::Validation(msg)) if msg.contains("paymentMethod"));

        let mut input = valid();
        input.payment_option = "nein".into();
        input.payment_method = Some("PayPal".into());
        input.normalize().unwrap();
        assert_eq!(input.payment_method.as_deref(), Some("paypal"));
    }

    #[test]
    fn unknown_payment_option_is_rejected() {
        let mut input = valid();
        input.payment_option = "barter".into();
        assert_matches!(input.normalize(), Err(CoreError::Validation(msg)) if msg.contains("paymentOption"));
    }

    #[test]
    fn non_object_sections_are_rejected() {
        let mut input = valid();
        input.legal_info = json!(["impressum"]);
        assert_matches!(input.normalize(), Err(CoreError::Validation(msg)) if msg.contains("legalInfo"));

        let mut input = valid();
        input.market_research = Value::Null;
        input.normalize().unwrap();
        assert_eq!(input.market_research, json!({}));
    }

    #[test]
    fn too_many_interests_are_rejected() {
        let mut input = valid();
        input.target_group_interests = (0..=MAX_INTERESTS).map(|i| format!("i{i}")).collect();
        assert_matches!(input.normalize(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn strip_empty_fields_keeps_answers() {
        let stripped = strip_empty_fields(json!({
            "domain": "shop.de",
            "marketSize": null,
            "companyInfo": "",
            "targetGroupInterests": [],
            "legalInfo": {},
            "progress": 0,
            "webDesign": {"logo": true}
        }));
        assert_eq!(
            stripped,
            json!({"domain": "shop.de", "progress": 0, "webDesign": {"logo": true}})
        );
    }
}
