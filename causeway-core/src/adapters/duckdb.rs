//! DuckDB store implementation

use std::path::Path;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use duckdb::{params, Connection};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::{
    Company, Donor, EntityKind, Frequency, ImportRecord, ImportRun, Partner,
};
use crate::ports::RecordStore;

/// Maximum number of retries when the database file is locked
const MAX_RETRIES: u32 = 5;

/// Initial retry delay in milliseconds (doubles each retry: 50, 100, 200, 400, 800ms)
const INITIAL_RETRY_DELAY_MS: u64 = 50;

/// Check if an error message indicates a file locking issue that should be retried
fn is_retryable_error(err_msg: &str) -> bool {
    let lower = err_msg.to_lowercase();
    // Windows error messages
    lower.contains("being used by another process")
        || lower.contains("cannot access the file")
        // Unix/macOS error messages
        || lower.contains("resource temporarily unavailable")
        || lower.contains("database is locked")
        || lower.contains("file is already open")
}

fn db_err(e: duckdb::Error) -> Error {
    Error::storage(e.to_string())
}

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS donors (
    donor_id VARCHAR PRIMARY KEY,
    name VARCHAR NOT NULL,
    email VARCHAR NOT NULL,
    amount DOUBLE NOT NULL,
    frequency VARCHAR NOT NULL,
    campaign VARCHAR NOT NULL,
    address VARCHAR,
    organization VARCHAR,
    coupon_code VARCHAR,
    donated_on DATE NOT NULL,
    created_at VARCHAR NOT NULL,
    updated_at VARCHAR NOT NULL
);
CREATE TABLE IF NOT EXISTS partners (
    partner_id VARCHAR PRIMARY KEY,
    name VARCHAR NOT NULL,
    external_ref VARCHAR NOT NULL,
    email VARCHAR,
    phone VARCHAR,
    address VARCHAR,
    city VARCHAR,
    region VARCHAR,
    postal_code VARCHAR,
    website VARCHAR,
    category VARCHAR,
    created_at VARCHAR NOT NULL,
    updated_at VARCHAR NOT NULL
);
CREATE TABLE IF NOT EXISTS companies (
    company_id VARCHAR PRIMARY KEY,
    name VARCHAR NOT NULL,
    external_ref VARCHAR NOT NULL,
    contact_name VARCHAR,
    email VARCHAR,
    phone VARCHAR,
    website VARCHAR,
    created_at VARCHAR NOT NULL,
    updated_at VARCHAR NOT NULL
);
CREATE TABLE IF NOT EXISTS import_runs (
    run_id VARCHAR PRIMARY KEY,
    batch_id VARCHAR NOT NULL,
    entity VARCHAR NOT NULL,
    source VARCHAR NOT NULL,
    accepted BIGINT NOT NULL,
    duplicates BIGINT NOT NULL,
    failed BIGINT NOT NULL,
    started_at VARCHAR NOT NULL,
    finished_at VARCHAR NOT NULL
);
";

/// DuckDB store implementation
pub struct DuckDbStore {
    conn: Mutex<Connection>,
}

impl DuckDbStore {
    /// Open (or create) the database file.
    ///
    /// Includes retry logic with exponential backoff for file locking
    /// errors, which can occur when multiple operations try to access the
    /// database simultaneously.
    pub fn new(db_path: &Path) -> Result<Self> {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            match Self::try_open_connection(db_path) {
                Ok(conn) => {
                    return Ok(Self {
                        conn: Mutex::new(conn),
                    });
                }
                Err(e) => {
                    let err_msg = e.to_string();
                    if is_retryable_error(&err_msg) && attempt < MAX_RETRIES - 1 {
                        let delay =
                            Duration::from_millis(INITIAL_RETRY_DELAY_MS * 2u64.pow(attempt));
                        eprintln!(
                            "[causeway] Database busy, retrying in {}ms (attempt {}/{}): {}",
                            delay.as_millis(),
                            attempt + 1,
                            MAX_RETRIES,
                            err_msg
                        );
                        thread::sleep(delay);
                        last_error = Some(e);
                        continue;
                    }
                    return Err(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            Error::storage(format!("failed to open database after {} retries", MAX_RETRIES))
        }))
    }

    fn try_open_connection(db_path: &Path) -> Result<Connection> {
        // Disable extension autoloading to avoid macOS code signing issues
        // with cached extensions
        let config = duckdb::Config::default()
            .enable_autoload_extension(false)
            .map_err(db_err)?;
        Connection::open_with_flags(db_path, config).map_err(db_err)
    }

    fn get_donors(&self) -> Result<Vec<ImportRecord>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT donor_id, name, email, amount, frequency, campaign,
                        address, organization, coupon_code, donated_on::VARCHAR,
                        created_at, updated_at
                 FROM donors",
            )
            .map_err(db_err)?;

        let donors = stmt
            .query_map([], |row| Ok(row_to_donor(row)))
            .map_err(db_err)?
            .filter_map(|r| r.ok())
            .map(ImportRecord::Donor)
            .collect();

        Ok(donors)
    }

    fn get_partners(&self) -> Result<Vec<ImportRecord>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT partner_id, name, external_ref, email, phone, address,
                        city, region, postal_code, website, category,
                        created_at, updated_at
                 FROM partners",
            )
            .map_err(db_err)?;

        let partners = stmt
            .query_map([], |row| Ok(row_to_partner(row)))
            .map_err(db_err)?
            .filter_map(|r| r.ok())
            .map(ImportRecord::Partner)
            .collect();

        Ok(partners)
    }

    fn get_companies(&self) -> Result<Vec<ImportRecord>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT company_id, name, external_ref, contact_name, email,
                        phone, website, created_at, updated_at
                 FROM companies",
            )
            .map_err(db_err)?;

        let companies = stmt
            .query_map([], |row| Ok(row_to_company(row)))
            .map_err(db_err)?
            .filter_map(|r| r.ok())
            .map(ImportRecord::Company)
            .collect();

        Ok(companies)
    }

    fn insert_donor(&self, donor: &Donor) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO donors (donor_id, name, email, amount, frequency, campaign,
                                 address, organization, coupon_code, donated_on,
                                 created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                donor.id.to_string(),
                donor.name,
                donor.email,
                donor.amount.to_string().parse::<f64>().unwrap_or(0.0),
                donor.frequency.as_str(),
                donor.campaign,
                donor.address,
                donor.organization,
                donor.coupon_code,
                donor.donated_on.to_string(),
                donor.created_at.to_rfc3339(),
                donor.updated_at.to_rfc3339(),
            ],
        )
        .map_err(db_err)?;
        Ok(())
    }

    fn insert_partner(&self, partner: &Partner) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO partners (partner_id, name, external_ref, email, phone,
                                   address, city, region, postal_code, website,
                                   category, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                partner.id.to_string(),
                partner.name,
                partner.external_ref,
                partner.email,
                partner.phone,
                partner.address,
                partner.city,
                partner.region,
                partner.postal_code,
                partner.website,
                partner.category,
                partner.created_at.to_rfc3339(),
                partner.updated_at.to_rfc3339(),
            ],
        )
        .map_err(db_err)?;
        Ok(())
    }

    fn insert_company(&self, company: &Company) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO companies (company_id, name, external_ref, contact_name,
                                    email, phone, website, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                company.id.to_string(),
                company.name,
                company.external_ref,
                company.contact_name,
                company.email,
                company.phone,
                company.website,
                company.created_at.to_rfc3339(),
                company.updated_at.to_rfc3339(),
            ],
        )
        .map_err(db_err)?;
        Ok(())
    }
}

impl RecordStore for DuckDbStore {
    fn ensure_schema(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(SCHEMA_SQL).map_err(db_err)?;
        Ok(())
    }

    fn records(&self, kind: EntityKind) -> Result<Vec<ImportRecord>> {
        match kind {
            EntityKind::Donor => self.get_donors(),
            EntityKind::Partner => self.get_partners(),
            EntityKind::Company => self.get_companies(),
        }
    }

    fn insert(&self, record: &ImportRecord) -> Result<()> {
        match record {
            ImportRecord::Donor(d) => self.insert_donor(d),
            ImportRecord::Partner(p) => self.insert_partner(p),
            ImportRecord::Company(c) => self.insert_company(c),
        }
    }

    fn count(&self, kind: EntityKind) -> Result<i64> {
        let table = match kind {
            EntityKind::Donor => "donors",
            EntityKind::Partner => "partners",
            EntityKind::Company => "companies",
        };
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                row.get(0)
            })
            .map_err(db_err)?;
        Ok(count)
    }

    fn add_run(&self, run: &ImportRun) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO import_runs (run_id, batch_id, entity, source, accepted,
                                      duplicates, failed, started_at, finished_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                run.id.to_string(),
                run.batch_id,
                run.entity.as_str(),
                run.source,
                run.accepted,
                run.duplicates,
                run.failed,
                run.started_at.to_rfc3339(),
                run.finished_at.to_rfc3339(),
            ],
        )
        .map_err(db_err)?;
        Ok(())
    }

    fn runs(&self, limit: usize) -> Result<Vec<ImportRun>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT run_id, batch_id, entity, source, accepted, duplicates,
                        failed, started_at, finished_at
                 FROM import_runs
                 ORDER BY finished_at DESC
                 LIMIT ?",
            )
            .map_err(db_err)?;

        let runs = stmt
            .query_map([limit as i64], |row| Ok(row_to_run(row)))
            .map_err(db_err)?
            .filter_map(|r| r.ok())
            .collect();

        Ok(runs)
    }
}

fn row_to_donor(row: &duckdb::Row) -> Donor {
    // Column indices from SELECT:
    // 0: donor_id, 1: name, 2: email, 3: amount, 4: frequency, 5: campaign,
    // 6: address, 7: organization, 8: coupon_code, 9: donated_on,
    // 10: created_at, 11: updated_at
    let id_str: String = row.get(0).unwrap_or_default();
    let amount: f64 = row.get(3).unwrap_or(0.0);
    let frequency_str: String = row.get(4).unwrap_or_default();
    let donated_on_str: String = row.get(9).unwrap_or_default();
    let created_str: String = row.get(10).unwrap_or_default();
    let updated_str: String = row.get(11).unwrap_or_default();

    Donor {
        id: Uuid::parse_str(&id_str).unwrap_or_else(|_| Uuid::new_v4()),
        name: row.get(1).unwrap_or_default(),
        email: row.get(2).unwrap_or_default(),
        amount: Decimal::try_from(amount).unwrap_or_default(),
        frequency: Frequency::parse(&frequency_str).unwrap_or(Frequency::OneTime),
        campaign: row.get(5).unwrap_or_default(),
        address: row.get(6).ok(),
        organization: row.get(7).ok(),
        coupon_code: row.get(8).ok(),
        donated_on: parse_date(&donated_on_str),
        created_at: parse_timestamp(&created_str),
        updated_at: parse_timestamp(&updated_str),
    }
}

fn row_to_partner(row: &duckdb::Row) -> Partner {
    // 0: partner_id, 1: name, 2: external_ref, 3: email, 4: phone,
    // 5: address, 6: city, 7: region, 8: postal_code, 9: website,
    // 10: category, 11: created_at, 12: updated_at
    let id_str: String = row.get(0).unwrap_or_default();
    let created_str: String = row.get(11).unwrap_or_default();
    let updated_str: String = row.get(12).unwrap_or_default();

    Partner {
        id: Uuid::parse_str(&id_str).unwrap_or_else(|_| Uuid::new_v4()),
        name: row.get(1).unwrap_or_default(),
        external_ref: row.get(2).unwrap_or_default(),
        email: row.get(3).ok(),
        phone: row.get(4).ok(),
        address: row.get(5).ok(),
        city: row.get(6).ok(),
        region: row.get(7).ok(),
        postal_code: row.get(8).ok(),
        website: row.get(9).ok(),
        category: row.get(10).ok(),
        created_at: parse_timestamp(&created_str),
        updated_at: parse_timestamp(&updated_str),
    }
}

fn row_to_company(row: &duckdb::Row) -> Company {
    // 0: company_id, 1: name, 2: external_ref, 3: contact_name, 4: email,
    // 5: phone, 6: website, 7: created_at, 8: updated_at
    let id_str: String = row.get(0).unwrap_or_default();
    let created_str: String = row.get(7).unwrap_or_default();
    let updated_str: String = row.get(8).unwrap_or_default();

    Company {
        id: Uuid::parse_str(&id_str).unwrap_or_else(|_| Uuid::new_v4()),
        name: row.get(1).unwrap_or_default(),
        external_ref: row.get(2).unwrap_or_default(),
        contact_name: row.get(3).ok(),
        email: row.get(4).ok(),
        phone: row.get(5).ok(),
        website: row.get(6).ok(),
        created_at: parse_timestamp(&created_str),
        updated_at: parse_timestamp(&updated_str),
    }
}

fn row_to_run(row: &duckdb::Row) -> ImportRun {
    // 0: run_id, 1: batch_id, 2: entity, 3: source, 4: accepted,
    // 5: duplicates, 6: failed, 7: started_at, 8: finished_at
    let id_str: String = row.get(0).unwrap_or_default();
    let entity_str: String = row.get(2).unwrap_or_default();
    let started_str: String = row.get(7).unwrap_or_default();
    let finished_str: String = row.get(8).unwrap_or_default();

    ImportRun {
        id: Uuid::parse_str(&id_str).unwrap_or_else(|_| Uuid::new_v4()),
        batch_id: row.get(1).unwrap_or_default(),
        entity: entity_str.parse().unwrap_or(EntityKind::Donor),
        source: row.get(3).unwrap_or_default(),
        accepted: row.get(4).unwrap_or(0),
        duplicates: row.get(5).unwrap_or(0),
        failed: row.get(6).unwrap_or(0),
        started_at: parse_timestamp(&started_str),
        finished_at: parse_timestamp(&finished_str),
    }
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn parse_date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap_or_else(|_| Utc::now().date_naive())
}
