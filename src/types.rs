use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use tabled::Tabled;

/// One CSV row as read from disk, before any typing.
///
/// Only the columns the dashboard uses are listed; every other column in the
/// file is ignored by the deserializer.
#[derive(Debug, Deserialize)]
pub struct RawRow {
    pub months_as_customer: Option<String>,
    pub age: Option<String>,
    pub policy_annual_premium: Option<String>,
    pub incident_date: Option<String>,
    pub incident_city: Option<String>,
    pub incident_hour_of_the_day: Option<String>,
    pub police_report_available: Option<String>,
    pub total_claim_amount: Option<String>,
    pub injury_claim: Option<String>,
    pub property_claim: Option<String>,
    pub vehicle_claim: Option<String>,
    pub auto_year: Option<String>,
    pub fraud_reported: Option<String>,
}

/// The semantic type a dataset column must hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Float,
    Date,
    Text,
    Flag,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnKind::Integer => "an integer",
            ColumnKind::Float => "a number",
            ColumnKind::Date => "a date",
            ColumnKind::Text => "text",
            ColumnKind::Flag => "Y or N",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub kind: ColumnKind,
}

impl ColumnSpec {
    pub const fn new(name: &'static str, kind: ColumnKind) -> Self {
        Self { name, kind }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum FraudFlag {
    #[serde(rename = "Y")]
    Yes,
    #[serde(rename = "N")]
    No,
}

impl FraudFlag {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "Y" => Some(FraudFlag::Yes),
            "N" => Some(FraudFlag::No),
            _ => None,
        }
    }

    pub fn is_fraud(self) -> bool {
        self == FraudFlag::Yes
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FraudFlag::Yes => "Y",
            FraudFlag::No => "N",
        }
    }
}

impl fmt::Display for FraudFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed claim record. The loaded table is a slice of these and is never
/// mutated after loading.
///
/// Blank cells load as `None`; each aggregate skips rows missing the fields
/// it groups or sums on. Only the fraud flag is mandatory.
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimRecord {
    pub months_as_customer: Option<i64>,
    pub age: Option<i64>,
    pub policy_annual_premium: Option<f64>,
    pub incident_date: Option<NaiveDate>,
    pub incident_city: Option<String>,
    pub incident_hour_of_the_day: Option<u8>,
    pub police_report_available: Option<String>,
    pub total_claim_amount: Option<i64>,
    pub injury_claim: Option<i64>,
    pub property_claim: Option<i64>,
    pub vehicle_claim: Option<i64>,
    pub auto_year: Option<i32>,
    pub fraud_reported: FraudFlag,
}

impl ClaimRecord {
    pub fn is_fraud(&self) -> bool {
        self.fraud_reported.is_fraud()
    }

    pub fn age_group(&self) -> Option<AgeGroup> {
        self.age.map(AgeGroup::from_age)
    }
}

/// Customer age bucket used by the age-group chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum AgeGroup {
    Age19To24,
    Age25To30,
    Age31To35,
    Age36To40,
    Age41To45,
    Age46To50,
    Age51To55,
    Age56To59,
    Age60Plus,
}

/// Inclusive upper bound of each bucket, sorted ascending. Ages above the last
/// bound fall into `60+`.
const AGE_BINS: [(i64, AgeGroup); 8] = [
    (24, AgeGroup::Age19To24),
    (30, AgeGroup::Age25To30),
    (35, AgeGroup::Age31To35),
    (40, AgeGroup::Age36To40),
    (45, AgeGroup::Age41To45),
    (50, AgeGroup::Age46To50),
    (55, AgeGroup::Age51To55),
    (59, AgeGroup::Age56To59),
];

impl AgeGroup {
    pub const ALL: [AgeGroup; 9] = [
        AgeGroup::Age19To24,
        AgeGroup::Age25To30,
        AgeGroup::Age31To35,
        AgeGroup::Age36To40,
        AgeGroup::Age41To45,
        AgeGroup::Age46To50,
        AgeGroup::Age51To55,
        AgeGroup::Age56To59,
        AgeGroup::Age60Plus,
    ];

    /// Total over every integer: ages under 19 land in the first bucket.
    pub fn from_age(age: i64) -> Self {
        AGE_BINS
            .iter()
            .find(|(upper, _)| age <= *upper)
            .map(|(_, group)| *group)
            .unwrap_or(AgeGroup::Age60Plus)
    }

    pub fn label(self) -> &'static str {
        match self {
            AgeGroup::Age19To24 => "19 - 24",
            AgeGroup::Age25To30 => "25 - 30",
            AgeGroup::Age31To35 => "31 - 35",
            AgeGroup::Age36To40 => "36 - 40",
            AgeGroup::Age41To45 => "41 - 45",
            AgeGroup::Age46To50 => "46 - 50",
            AgeGroup::Age51To55 => "51 - 55",
            AgeGroup::Age56To59 => "56 - 59",
            AgeGroup::Age60Plus => "60+",
        }
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Display strings for the three summary cards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardData {
    pub percent_fraud: String,
    pub fraud_loss: String,
    pub average_claim: String,
}

impl CardData {
    pub fn rows(&self) -> Vec<CardRow> {
        vec![
            CardRow {
                card: "Fraud Reported".to_string(),
                value: self.percent_fraud.clone(),
            },
            CardRow {
                card: "Fraud Loss".to_string(),
                value: self.fraud_loss.clone(),
            },
            CardRow {
                card: "Median Claim".to_string(),
                value: self.average_claim.clone(),
            },
        ]
    }
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct CardRow {
    #[tabled(rename = "Card")]
    pub card: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

/// Count of rows per category.
#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct CategoryCount {
    #[tabled(rename = "Category")]
    pub category: String,
    #[tabled(rename = "Count")]
    pub count: usize,
}

/// Fraud and non-fraud row counts for one category.
#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct FraudSplit {
    #[tabled(rename = "Category")]
    pub category: String,
    #[tabled(rename = "Fraud")]
    pub fraud: usize,
    #[tabled(rename = "NotFraud")]
    pub not_fraud: usize,
}

/// Claim amounts on fraudulent rows for one vehicle model year.
#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct ClaimBreakdown {
    #[tabled(rename = "AutoYear")]
    pub auto_year: i32,
    #[tabled(rename = "Injury")]
    pub injury: i64,
    #[tabled(rename = "Property")]
    pub property: i64,
    #[tabled(rename = "Vehicle")]
    pub vehicle: i64,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct DailyCount {
    #[tabled(rename = "Date")]
    pub date: NaiveDate,
    #[tabled(rename = "Claims")]
    pub count: usize,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct PremiumPoint {
    pub months_as_customer: i64,
    pub policy_annual_premium: f64,
    pub fraud_reported: FraudFlag,
}
