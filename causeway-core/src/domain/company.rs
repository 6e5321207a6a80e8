//! Company (corporate giving contact) domain model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::fields;
use super::record::{DuplicateKey, ImportRow};

/// A company record in the corporate giving book
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    /// Contact/reference identifier from the source CRM
    pub external_ref: String,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Company {
    /// Create a new company with required fields
    pub fn new(id: Uuid, name: String, external_ref: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            name,
            external_ref,
            contact_name: None,
            email: None,
            phone: None,
            website: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Map a raw row into a company.
    ///
    /// Failing rules are collected in schema field order: name, reference,
    /// email (when present).
    pub fn from_row(row: &ImportRow) -> Result<Self, Vec<String>> {
        let mut errors = Vec::new();

        let name = row.get_any(&["name", "company name"]);
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

        let mut company = Self::new(
            Uuid::new_v4(),
            name.unwrap_or_default().to_string(),
            external_ref.unwrap_or_default().to_string(),
        );
        company.contact_name = row.get_any(&["contact", "contact name"]).map(String::from);
        company.email = email;
        company.phone = row.get_any(&["phone", "phone number"]).map(String::from);
        company.website = row.get_any(&["website", "url"]).map(String::from);
        Ok(company)
    }

    /// Natural key for duplicate detection: normalized external reference
    pub fn duplicate_key(&self) -> DuplicateKey {
        DuplicateKey::for_reference(&self.external_ref)
    }
}
