use crate::error::LoadError;
use crate::types::{ClaimRecord, ColumnKind, ColumnSpec, FraudFlag, RawRow};
use crate::util::{parse_date_safe, parse_f64_safe, parse_i64_safe};
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

pub const DEFAULT_DATA_PATH: &str = "data/autoinsurance.csv";

const MONTHS_AS_CUSTOMER: ColumnSpec = ColumnSpec::new("months_as_customer", ColumnKind::Integer);
const AGE: ColumnSpec = ColumnSpec::new("age", ColumnKind::Integer);
const POLICY_ANNUAL_PREMIUM: ColumnSpec =
    ColumnSpec::new("policy_annual_premium", ColumnKind::Float);
const INCIDENT_DATE: ColumnSpec = ColumnSpec::new("incident_date", ColumnKind::Date);
const INCIDENT_CITY: ColumnSpec = ColumnSpec::new("incident_city", ColumnKind::Text);
const INCIDENT_HOUR: ColumnSpec =
    ColumnSpec::new("incident_hour_of_the_day", ColumnKind::Integer);
const POLICE_REPORT: ColumnSpec = ColumnSpec::new("police_report_available", ColumnKind::Text);
const TOTAL_CLAIM_AMOUNT: ColumnSpec = ColumnSpec::new("total_claim_amount", ColumnKind::Integer);
const INJURY_CLAIM: ColumnSpec = ColumnSpec::new("injury_claim", ColumnKind::Integer);
const PROPERTY_CLAIM: ColumnSpec = ColumnSpec::new("property_claim", ColumnKind::Integer);
const VEHICLE_CLAIM: ColumnSpec = ColumnSpec::new("vehicle_claim", ColumnKind::Integer);
const AUTO_YEAR: ColumnSpec = ColumnSpec::new("auto_year", ColumnKind::Integer);
const FRAUD_REPORTED: ColumnSpec = ColumnSpec::new("fraud_reported", ColumnKind::Flag);

/// Columns the dataset must provide, checked against the header row once.
pub const SCHEMA: [ColumnSpec; 13] = [
    MONTHS_AS_CUSTOMER,
    AGE,
    POLICY_ANNUAL_PREMIUM,
    INCIDENT_DATE,
    INCIDENT_CITY,
    INCIDENT_HOUR,
    POLICE_REPORT,
    TOTAL_CLAIM_AMOUNT,
    INJURY_CLAIM,
    PROPERTY_CLAIM,
    VEHICLE_CLAIM,
    AUTO_YEAR,
    FRAUD_REPORTED,
];

#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub fraud_rows: usize,
    /// Earliest and latest incident date, `None` when every date is blank.
    pub first_incident: Option<NaiveDate>,
    pub last_incident: Option<NaiveDate>,
}

pub fn load_claims<P: AsRef<Path>>(path: P) -> Result<(Vec<ClaimRecord>, LoadReport), LoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let (records, report) = read_claims(file)?;
    info!(
        path = %path.display(),
        rows = report.total_rows,
        fraud_rows = report.fraud_rows,
        first_incident = ?report.first_incident,
        last_incident = ?report.last_incident,
        "dataset loaded"
    );
    Ok((records, report))
}

/// Read and type every row from any CSV source.
pub fn read_claims<R: std::io::Read>(
    source: R,
) -> Result<(Vec<ClaimRecord>, LoadReport), LoadError> {
    let mut rdr = ReaderBuilder::new().trim(csv::Trim::Headers).from_reader(source);
    let headers = rdr.headers()?.clone();
    check_schema(&headers)?;

    let mut records = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let raw: RawRow = record.deserialize(Some(&headers))?;
        records.push(type_row(line, raw)?);
    }
    debug!(rows = records.len(), "typed all rows");

    let report = summarize(&records).ok_or(LoadError::Empty)?;
    Ok((records, report))
}

fn check_schema(headers: &StringRecord) -> Result<(), LoadError> {
    for spec in SCHEMA.iter() {
        if !headers.iter().any(|h| h == spec.name) {
            return Err(LoadError::MissingColumn { column: spec.name });
        }
    }
    Ok(())
}

fn invalid(line: u64, spec: ColumnSpec, raw: Option<&str>) -> LoadError {
    LoadError::InvalidValue {
        line,
        column: spec.name,
        expected: spec.kind,
        value: raw.unwrap_or_default().to_string(),
    }
}

/// Text of a non-blank cell, `None` for an empty or absent one.
fn present(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

/// Blank cells are missing values; anything else must parse.
fn optional<T>(
    line: u64,
    spec: ColumnSpec,
    raw: Option<&str>,
    parse: impl Fn(Option<&str>) -> Option<T>,
) -> Result<Option<T>, LoadError> {
    match present(raw) {
        None => Ok(None),
        Some(s) => parse(Some(s)).map(Some).ok_or_else(|| invalid(line, spec, raw)),
    }
}

fn int_field(line: u64, spec: ColumnSpec, raw: Option<&str>) -> Result<Option<i64>, LoadError> {
    optional(line, spec, raw, parse_i64_safe)
}

fn float_field(line: u64, spec: ColumnSpec, raw: Option<&str>) -> Result<Option<f64>, LoadError> {
    optional(line, spec, raw, parse_f64_safe)
}

fn date_field(
    line: u64,
    spec: ColumnSpec,
    raw: Option<&str>,
) -> Result<Option<NaiveDate>, LoadError> {
    optional(line, spec, raw, parse_date_safe)
}

fn text_field(raw: Option<&str>) -> Option<String> {
    present(raw).map(str::to_string)
}

fn flag_field(line: u64, spec: ColumnSpec, raw: Option<&str>) -> Result<FraudFlag, LoadError> {
    raw.and_then(FraudFlag::parse)
        .ok_or_else(|| invalid(line, spec, raw))
}

fn type_row(line: u64, row: RawRow) -> Result<ClaimRecord, LoadError> {
    let raw_hour = row.incident_hour_of_the_day.as_deref();
    let incident_hour_of_the_day = int_field(line, INCIDENT_HOUR, raw_hour)?
        .map(|hour| {
            u8::try_from(hour)
                .ok()
                .filter(|h| *h < 24)
                .ok_or_else(|| invalid(line, INCIDENT_HOUR, raw_hour))
        })
        .transpose()?;
    let raw_year = row.auto_year.as_deref();
    let auto_year = int_field(line, AUTO_YEAR, raw_year)?
        .map(|year| i32::try_from(year).map_err(|_| invalid(line, AUTO_YEAR, raw_year)))
        .transpose()?;

    Ok(ClaimRecord {
        months_as_customer: int_field(line, MONTHS_AS_CUSTOMER, row.months_as_customer.as_deref())?,
        age: int_field(line, AGE, row.age.as_deref())?,
        policy_annual_premium: float_field(
            line,
            POLICY_ANNUAL_PREMIUM,
            row.policy_annual_premium.as_deref(),
        )?,
        incident_date: date_field(line, INCIDENT_DATE, row.incident_date.as_deref())?,
        incident_city: text_field(row.incident_city.as_deref()),
        incident_hour_of_the_day,
        police_report_available: text_field(row.police_report_available.as_deref()),
        total_claim_amount: int_field(line, TOTAL_CLAIM_AMOUNT, row.total_claim_amount.as_deref())?,
        injury_claim: int_field(line, INJURY_CLAIM, row.injury_claim.as_deref())?,
        property_claim: int_field(line, PROPERTY_CLAIM, row.property_claim.as_deref())?,
        vehicle_claim: int_field(line, VEHICLE_CLAIM, row.vehicle_claim.as_deref())?,
        auto_year,
        fraud_reported: flag_field(line, FRAUD_REPORTED, row.fraud_reported.as_deref())?,
    })
}

fn summarize(records: &[ClaimRecord]) -> Option<LoadReport> {
    if records.is_empty() {
        return None;
    }
    let dates = || records.iter().filter_map(|r| r.incident_date);
    Some(LoadReport {
        total_rows: records.len(),
        fraud_rows: records.iter().filter(|r| r.is_fraud()).count(),
        first_incident: dates().min(),
        last_incident: dates().max(),
    })
}
