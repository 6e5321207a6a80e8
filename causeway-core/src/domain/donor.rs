//! Donor domain model

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::fields;
use super::record::{DuplicateKey, Frequency, ImportRow};

/// A single donor giving record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Donor {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub amount: Decimal,
    pub frequency: Frequency,
    pub campaign: String,
    pub address: Option<String>,
    pub organization: Option<String>,
    pub coupon_code: Option<String>,
    /// Donation date; today when the source column is absent or unparseable
    pub donated_on: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Donor {
    /// Create a new donor with required fields
    pub fn new(
        id: Uuid,
        name: String,
        email: String,
        amount: Decimal,
        frequency: Frequency,
        campaign: String,
        donated_on: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            name,
            email,
            amount,
            frequency,
            campaign,
            address: None,
            organization: None,
            coupon_code: None,
            donated_on,
            created_at: now,
            updated_at: now,
        }
    }

    /// Map a raw row into a donor.
    ///
    /// Failing rules are collected in schema field order: name, email,
    /// amount, frequency, campaign.
    pub fn from_row(row: &ImportRow) -> Result<Self, Vec<String>> {
        let mut errors = Vec::new();

        let name = row.get_any(&["name", "donor name", "full name"]);
        if name.is_none() {
            errors.push("missing required field: name".to_string());
        }

        let email = match row.get_any(&["email", "email address"]) {
            Some(e) if fields::is_email(e) => Some(e.to_string()),
            Some(_) => {
                errors.push("invalid email".to_string());
                None
            }
            None => {
                errors.push("missing required field: email".to_string());
                None
            }
        };

        let amount = row
            .get_any(&["amount", "donation amount", "total"])
            .and_then(fields::parse_amount)
            .filter(|a| *a >= Decimal::ZERO);
        if amount.is_none() {
            errors.push("invalid amount".to_string());
        }

        let frequency = row
            .get_any(&["frequency", "donation frequency"])
            .and_then(Frequency::parse);
        if frequency.is_none() {
            errors.push("invalid frequency (expected one-time or monthly)".to_string());
        }

        let campaign = row.get_any(&["campaign", "campaign name"]);
        if campaign.is_none() {
            errors.push("missing required field: campaign".to_string());
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let donated_on = row
            .get_any(&["date", "donation date"])
            .and_then(fields::parse_date)
            .unwrap_or_else(fields::today);

        let mut donor = Self::new(
            Uuid::new_v4(),
            name.unwrap_or_default().to_string(),
            email.unwrap_or_default(),
            amount.unwrap_or_default(),
            frequency.unwrap_or(Frequency::OneTime),
            campaign.unwrap_or_default().to_string(),
            donated_on,
        );
        donor.address = row.get_any(&["address", "street address"]).map(String::from);
        donor.organization = row.get_any(&["organization", "org"]).map(String::from);
        donor.coupon_code = row
            .get_any(&["coupon code", "coupon", "promo code"])
            .map(String::from);
        Ok(donor)
    }

    /// Natural key for duplicate detection: (email, date)
    pub fn duplicate_key(&self) -> DuplicateKey {
        DuplicateKey::for_donor(&self.email, &self.donated_on)
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

    const HEADERS: &[&str] = &["Name", "Email", "Amount", "Frequency", "Campaign"];

    #[test]
    fn test_from_row_happy_path() {
        let donor = Donor::from_row(&row(
            HEADERS,
            &["John Doe", "john@example.com", "100", "one-time", "General"],
        ))
        .unwrap();

        assert_eq!(donor.name, "John Doe");
        assert_eq!(donor.email, "john@example.com");
        assert_eq!(donor.amount, Decimal::new(100, 0));
        assert_eq!(donor.frequency, Frequency::OneTime);
        assert_eq!(donor.campaign, "General");
        assert_eq!(donor.donated_on, Utc::now().date_naive());
    }

    #[test]
    fn test_from_row_collects_all_failures() {
        let errors = Donor::from_row(&row(
            HEADERS,
            &["Jane", "not-an-email", "50", "weekly", "General"],
        ))
        .unwrap_err();

        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("invalid email"));
        assert!(errors[1].contains("invalid frequency"));
    }

    #[test]
    fn test_from_row_missing_field_is_named() {
        let errors = Donor::from_row(&row(
            HEADERS,
            &["", "john@example.com", "100", "monthly", "General"],
        ))
        .unwrap_err();

        assert_eq!(errors, vec!["missing required field: name".to_string()]);
    }

    #[test]
    fn test_from_row_rejects_negative_amount() {
        let errors = Donor::from_row(&row(
            HEADERS,
            &["John", "john@example.com", "(10.00)", "monthly", "General"],
        ))
        .unwrap_err();

        assert_eq!(errors, vec!["invalid amount".to_string()]);
    }

    #[test]
    fn test_from_row_unparseable_date_defaults_to_today() {
        let headers = &["Name", "Email", "Amount", "Frequency", "Campaign", "Date"];
        let donor = Donor::from_row(&row(
            headers,
            &[
                "John",
                "john@example.com",
                "25",
                "monthly",
                "General",
                "last tuesday",
            ],
        ))
        .unwrap();

        assert_eq!(donor.donated_on, Utc::now().date_naive());
    }

    #[test]
    fn test_from_row_parses_iso_date() {
        let headers = &["Name", "Email", "Amount", "Frequency", "Campaign", "Date"];
        let donor = Donor::from_row(&row(
            headers,
            &[
                "John",
                "john@example.com",
                "25",
                "monthly",
                "General",
                "2025-03-01",
            ],
        ))
        .unwrap();

        assert_eq!(donor.donated_on, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
    }

    #[test]
    fn test_duplicate_key_uses_email_and_date() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let a = Donor::new(
            Uuid::new_v4(),
            "John".to_string(),
            "john@example.com".to_string(),
            Decimal::new(100, 0),
            Frequency::OneTime,
            "General".to_string(),
            date,
        );
        let b = Donor::new(
            Uuid::new_v4(),
            "Johnny".to_string(),
            "JOHN@EXAMPLE.COM".to_string(),
            Decimal::new(500, 0),
            Frequency::Monthly,
            "Other".to_string(),
            date,
        );
        assert_eq!(a.duplicate_key(), b.duplicate_key());
    }
}
