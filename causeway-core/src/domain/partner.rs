//! Partner location domain model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::fields;
use super::record::{DuplicateKey, ImportRow};

/// A partner location shown in the partner finder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Partner {
    pub id: Uuid,
    pub name: String,
    /// Contact/reference identifier from the source CRM
    pub external_ref: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub postal_code: Option<String>,
    pub website: Option<String>,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Partner {
    /// Create a new partner with required fields
    pub fn new(id: Uuid, name: String, external_ref: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            name,
            external_ref,
            email: None,
            phone: None,
            address: None,
            city: None,
            region: None,
            postal_code: None,
            website: None,
            category: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Map a raw row into a partner.
    ///
    /// Failing rules are collected in schema field order: name, reference,
    /// email (when present).
    pub fn from_row(row: &ImportRow) -> Result<Self, Vec<String>> {
        let mut errors = Vec::new();

        let name = row.get_any(&["name", "partner name"]);
        if name.is_none() {
            errors.push("missing required field: name".to_string());
        }

        let external_ref = row.get_any(&["reference", "contact id", "external id", "ref"]);
        if external_ref.is_none() {
            errors.push("missing required field: reference".to_string());
        }

        let email = match row.get_any(&["email", "email address"]) {
            Some(e) if fields::is_email(e) => Some(e.to_string()),
            Some(_) => {
                errors.push("invalid email".to_string());
                None
            }
            None => None,
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        let mut partner = Self::new(
            Uuid::new_v4(),
            name.unwrap_or_default().to_string(),
            external_ref.unwrap_or_default().to_string(),
        );
        partner.email = email;
        partner.phone = row.get_any(&["phone", "phone number"]).map(String::from);
        partner.address = row.get_any(&["address", "street address"]).map(String::from);
        partner.city = row.get("city").map(String::from);
        partner.region = row.get_any(&["region", "state", "province"]).map(String::from);
        partner.postal_code = row
            .get_any(&["postal code", "zip", "zip code"])
            .map(String::from);
        partner.website = row.get_any(&["website", "url"]).map(String::from);
        partner.category = row.get_any(&["category", "type"]).map(String::from);
        Ok(partner)
    }

    /// Natural key for duplicate detection: normalized external reference
    pub fn duplicate_key(&self) -> DuplicateKey {
        DuplicateKey::for_reference(&self.external_ref)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn row(headers: &[&str], values: &[&str]) -> ImportRow {
        ImportRow::new(
            1,
            Arc::new(headers.iter().map(|h| h.to_string()).collect()),
            values.iter().map(|v| v.to_string()).collect(),
        )
    }

    #[test]
    fn test_from_row_happy_path() {
        let partner = Partner::from_row(&row(
            &["Name", "Contact ID", "City", "State", "Category"],
            &["Food Bank North", "P-1001", "Springfield", "IL", "Food"],
        ))
        .unwrap();

        assert_eq!(partner.name, "Food Bank North");
        assert_eq!(partner.external_ref, "P-1001");
        assert_eq!(partner.city.as_deref(), Some("Springfield"));
        assert_eq!(partner.region.as_deref(), Some("IL"));
        assert_eq!(partner.category.as_deref(), Some("Food"));
    }

    #[test]
    fn test_from_row_requires_reference() {
        let errors = Partner::from_row(&row(
            &["Name", "City"],
            &["Food Bank North", "Springfield"],
        ))
        .unwrap_err();

        assert_eq!(errors, vec!["missing required field: reference".to_string()]);
    }

    #[test]
    fn test_from_row_rejects_bad_optional_email() {
        let errors = Partner::from_row(&row(
            &["Name", "Contact ID", "Email"],
            &["Food Bank North", "P-1001", "nope"],
        ))
        .unwrap_err();

        assert_eq!(errors, vec!["invalid email".to_string()]);
    }

    #[test]
    fn test_duplicate_key_ignores_reference_case() {
        let a = Partner::new(Uuid::new_v4(), "A".to_string(), "P-1001".to_string());
        let b = Partner::new(Uuid::new_v4(), "B".to_string(), "p-1001 ".to_string());
        assert_eq!(a.duplicate_key(), b.duplicate_key());
    }
}
