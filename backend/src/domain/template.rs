//! Document templates with `{{placeholder}}` substitution.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::user::UserId;
use crate::domain::Error;

/// Reusable letter/document body managed by admins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentTemplate {
    #[schema(value_type = String)]
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub body: String,
    /// Placeholder names extracted from `body` on save.
    pub placeholders: Vec<String>,
    #[schema(value_type = String)]
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DocumentTemplate {
    /// Build a new template, extracting placeholders from the body.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        body: impl Into<String>,
        created_by: UserId,
    ) -> Result<Self, Error> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::invalid_request("template name must not be empty"));
        }
        let body = body.into();
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            description: description.into(),
            placeholders: extract_placeholders(&body),
            body,
            created_by,
            created_at: now,
            updated_at: now,
        })
    }

    /// Replace the body and re-extract placeholders.
    pub fn update_body(&mut self, body: impl Into<String>) {
        let body = body.into();
        self.placeholders = extract_placeholders(&body);
        self.body = body;
        self.updated_at = Utc::now();
    }

    /// Substitute placeholder values into the body.
    ///
    /// Every placeholder must be supplied; missing names are reported
    /// together so the caller can fix them in one round trip. Unknown
    /// extra values are ignored.
    pub fn render(&self, values: &BTreeMap<String, String>) -> Result<String, Error> {
        let missing: Vec<&str> = self
            .placeholders
            .iter()
            .filter(|name| !values.contains_key(name.as_str()))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            return Err(
                Error::invalid_request("missing values for template placeholders")
                    .with_details(json!({ "missing": missing })),
            );
        }
        let mut rendered = self.body.clone();
        for (name, value) in values {
            rendered = rendered.replace(&format!("{{{{{name}}}}}"), value);
        }
        Ok(rendered)
    }
}

/// Collect `{{name}}` tokens in order of first appearance, deduplicated.
fn extract_placeholders(body: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut rest = body;
    while let Some(start) = rest.find("{{") {
        let Some(after) = rest.get(start + 2..) else {
            break;
        };
        let Some(end) = after.find("}}") else {
            break;
        };
        let name = after.get(..end).unwrap_or_default().trim();
        if !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
            && !names.iter().any(|existing| existing == name)
        {
            names.push(name.to_owned());
        }
        rest = after.get(end + 2..).unwrap_or_default();
    }
    names
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;

    fn template(body: &str) -> DocumentTemplate {
        DocumentTemplate::new("Visa letter", "Standard letter", body, UserId::random())
            .expect("valid template")
    }

    #[test]
    fn extracts_placeholders_in_order_without_duplicates() {
        let template = template("Dear {{name}}, your case {{reference}} ({{name}}) is ready.");
        assert_eq!(template.placeholders, vec!["name", "reference"]);
    }

    #[test]
    fn ignores_malformed_tokens() {
        let template = template("Open {{ brace and {{bad name}} and {{good_one}}.");
        assert_eq!(template.placeholders, vec!["good_one"]);
    }

    #[test]
    fn render_substitutes_all_values() {
        let template = template("Dear {{name}}, case {{reference}}.");
        let values = BTreeMap::from([
            ("name".to_owned(), "Ada".to_owned()),
            ("reference".to_owned(), "VF-K7M2P9QX".to_owned()),
        ]);
        assert_eq!(
            template.render(&values).expect("rendered"),
            "Dear Ada, case VF-K7M2P9QX."
        );
    }

    #[test]
    fn render_reports_all_missing_placeholders() {
        let template = template("{{a}} {{b}} {{c}}");
        let values = BTreeMap::from([("b".to_owned(), "2".to_owned())]);
        let err = template.render(&values).expect_err("missing values");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        let details = err.details().expect("details");
        assert_eq!(details["missing"], serde_json::json!(["a", "c"]));
    }

    #[test]
    fn update_body_refreshes_placeholders() {
        let mut template = template("Hello {{name}}");
        template.update_body("Case {{reference}} closed");
        assert_eq!(template.placeholders, vec!["reference"]);
    }
}
