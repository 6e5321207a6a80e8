//! Shared import record types
//!
//! A parsed CSV row becomes an `ImportRow` (raw header/value pairs), then a
//! typed `ImportRecord` variant for the selected entity. Downstream code only
//! ever sees the closed variant type, never the raw map.

use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::fields;
use super::{Company, Donor, Partner};

/// Entity kind targeted by an import run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Donor,
    Partner,
    Company,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Donor => "donor",
            EntityKind::Partner => "partner",
            EntityKind::Company => "company",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "donor" | "donors" => Ok(EntityKind::Donor),
            "partner" | "partners" => Ok(EntityKind::Partner),
            "company" | "companies" => Ok(EntityKind::Company),
            other => Err(format!(
                "unknown entity '{}' (expected donor, partner, or company)",
                other
            )),
        }
    }
}

/// Donation cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Frequency {
    OneTime,
    Monthly,
}

impl Frequency {
    /// Case-insensitive parse of the canonical values
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "one-time" | "onetime" | "one time" => Some(Frequency::OneTime),
            "monthly" => Some(Frequency::Monthly),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::OneTime => "one-time",
            Frequency::Monthly => "monthly",
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Natural key used to detect repeat records, both against storage and
/// within one batch
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DuplicateKey(String);

impl DuplicateKey {
    /// Donor key: fingerprint of (email, date)
    pub fn for_donor(email: &str, date: &chrono::NaiveDate) -> Self {
        let input = format!(
            "{}|{}",
            email.trim().to_lowercase(),
            date.format("%Y-%m-%d")
        );
        Self(fields::fingerprint16(&input))
    }

    /// Partner/company key: normalized external reference
    pub fn for_reference(reference: &str) -> Self {
        Self(reference.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One raw data row: header/value pairs in file order
#[derive(Debug, Clone)]
pub struct ImportRow {
    line: usize,
    headers: Arc<Vec<String>>,
    values: Vec<String>,
}

impl ImportRow {
    pub fn new(line: usize, headers: Arc<Vec<String>>, values: Vec<String>) -> Self {
        Self {
            line,
            headers,
            values,
        }
    }

    /// 1-based data row number (header line excluded)
    pub fn line(&self) -> usize {
        self.line
    }

    /// Case-insensitive lookup by header name. Values are trimmed;
    /// empty cells read as absent.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .and_then(|i| self.values.get(i))
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// First present value among a list of header aliases
    pub fn get_any(&self, names: &[&str]) -> Option<&str> {
        names.iter().find_map(|n| self.get(n))
    }
}

/// A typed record produced from one `ImportRow`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "entity", rename_all = "lowercase")]
pub enum ImportRecord {
    Donor(Donor),
    Partner(Partner),
    Company(Company),
}

impl ImportRecord {
    /// Map a raw row into the record type for `kind`.
    ///
    /// On failure returns every failing rule for the row, in schema field
    /// order.
    pub fn from_row(kind: EntityKind, row: &ImportRow) -> Result<Self, Vec<String>> {
        match kind {
            EntityKind::Donor => Donor::from_row(row).map(ImportRecord::Donor),
            EntityKind::Partner => Partner::from_row(row).map(ImportRecord::Partner),
            EntityKind::Company => Company::from_row(row).map(ImportRecord::Company),
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            ImportRecord::Donor(_) => EntityKind::Donor,
            ImportRecord::Partner(_) => EntityKind::Partner,
            ImportRecord::Company(_) => EntityKind::Company,
        }
    }

    pub fn duplicate_key(&self) -> DuplicateKey {
        match self {
            ImportRecord::Donor(d) => d.duplicate_key(),
            ImportRecord::Partner(p) => p.duplicate_key(),
            ImportRecord::Company(c) => c.duplicate_key(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ImportRecord::Donor(d) => &d.name,
            ImportRecord::Partner(p) => &p.name,
            ImportRecord::Company(c) => &c.name,
        }
    }

    /// One-line human summary for previews
    pub fn summary(&self) -> String {
        match self {
            ImportRecord::Donor(d) => format!(
                "{} {} ({})",
                d.amount, d.frequency, d.campaign
            ),
            ImportRecord::Partner(p) => {
                let place = match (&p.city, &p.region) {
                    (Some(city), Some(region)) => format!("{}, {}", city, region),
                    (Some(city), None) => city.clone(),
                    (None, Some(region)) => region.clone(),
                    (None, None) => "-".to_string(),
                };
                match &p.category {
                    Some(cat) => format!("{} ({})", place, cat),
                    None => place,
                }
            }
            ImportRecord::Company(c) => c
                .contact_name
                .clone()
                .or_else(|| c.email.clone())
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(headers: &[&str], values: &[&str]) -> ImportRow {
        ImportRow::new(
            1,
            Arc::new(headers.iter().map(|h| h.to_string()).collect()),
            values.iter().map(|v| v.to_string()).collect(),
        )
    }

    #[test]
    fn test_row_lookup_is_case_insensitive() {
        let r = row(&["Name", "Email"], &["John", "john@example.com"]);
        assert_eq!(r.get("name"), Some("John"));
        assert_eq!(r.get("EMAIL"), Some("john@example.com"));
        assert_eq!(r.get("phone"), None);
    }

    #[test]
    fn test_row_trims_and_treats_blank_as_absent() {
        let r = row(&["Name", "Email"], &["  John  ", "   "]);
        assert_eq!(r.get("Name"), Some("John"));
        assert_eq!(r.get("Email"), None);
    }

    #[test]
    fn test_row_get_any_uses_first_present_alias() {
        let r = row(&["Contact ID", "Name"], &["ref-9", "Acme"]);
        assert_eq!(r.get_any(&["reference", "contact id"]), Some("ref-9"));
    }

    #[test]
    fn test_frequency_parse() {
        assert_eq!(Frequency::parse("one-time"), Some(Frequency::OneTime));
        assert_eq!(Frequency::parse("ONE-TIME"), Some(Frequency::OneTime));
        assert_eq!(Frequency::parse("Monthly"), Some(Frequency::Monthly));
        assert_eq!(Frequency::parse("weekly"), None);
    }

    #[test]
    fn test_entity_kind_from_str() {
        assert_eq!("donors".parse::<EntityKind>(), Ok(EntityKind::Donor));
        assert_eq!("Partner".parse::<EntityKind>(), Ok(EntityKind::Partner));
        assert!("widgets".parse::<EntityKind>().is_err());
    }

    #[test]
    fn test_reference_key_normalizes_case_and_whitespace() {
        let a = DuplicateKey::for_reference(" REF-001 ");
        let b = DuplicateKey::for_reference("ref-001");
        assert_eq!(a, b);
    }

    #[test]
    fn test_donor_key_varies_by_date() {
        let d1 = chrono::NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let d2 = chrono::NaiveDate::from_ymd_opt(2025, 1, 16).unwrap();
        let a = DuplicateKey::for_donor("John@Example.com", &d1);
        let b = DuplicateKey::for_donor("john@example.com", &d1);
        let c = DuplicateKey::for_donor("john@example.com", &d2);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
