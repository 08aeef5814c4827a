use crate::aggregate;
use crate::error::SummaryError;
use crate::types::{CardData, CategoryCount, ClaimBreakdown, ClaimRecord, DailyCount, FraudSplit};
use crate::util::{format_currency, format_currency_int, format_percent, median};
use serde::Serialize;

/// Share of rows reported as fraud, as a percentage of all rows.
pub fn percent_fraud(records: &[ClaimRecord]) -> Result<f64, SummaryError> {
    if records.is_empty() {
        return Err(SummaryError::EmptyTable);
    }
    let frauds = records.iter().filter(|r| r.is_fraud()).count();
    if frauds == 0 {
        return Err(SummaryError::NoFraudRows);
    }
    Ok(100.0 * (frauds as f64 / records.len() as f64))
}

/// Total claim amount across fraudulent rows. Blank amounts add nothing.
pub fn fraud_loss(records: &[ClaimRecord]) -> Result<i64, SummaryError> {
    let mut frauds = records.iter().filter(|r| r.is_fraud()).peekable();
    if frauds.peek().is_none() {
        return Err(SummaryError::NoFraudRows);
    }
    Ok(frauds.filter_map(|r| r.total_claim_amount).sum())
}

/// Median claim amount over every row with an amount, fraudulent or not.
pub fn average_claim(records: &[ClaimRecord]) -> Result<f64, SummaryError> {
    if records.is_empty() {
        return Err(SummaryError::EmptyTable);
    }
    median(
        records
            .iter()
            .filter_map(|r| r.total_claim_amount)
            .map(|amount| amount as f64)
            .collect(),
    )
    .ok_or(SummaryError::NoClaimAmounts)
}

pub fn card_data(records: &[ClaimRecord]) -> Result<CardData, SummaryError> {
    Ok(CardData {
        percent_fraud: format_percent(percent_fraud(records)?),
        fraud_loss: format_currency_int(fraud_loss(records)?),
        average_claim: format_currency(average_claim(records)?),
    })
}

/// Cards plus every chart aggregate, for console and JSON output.
#[derive(Debug, Serialize)]
pub struct SummaryReport {
    pub rows: usize,
    pub cards: CardData,
    pub fraud_by_age_group: Vec<CategoryCount>,
    pub premium_points: usize,
    pub daily_counts: Vec<DailyCount>,
    pub police_report: Vec<FraudSplit>,
    pub claim_breakdown_by_year: Vec<ClaimBreakdown>,
    pub claims_by_year: Vec<FraudSplit>,
    pub fraud_by_city: Vec<CategoryCount>,
    pub claims_by_hour: Vec<FraudSplit>,
}

pub fn summary_report(records: &[ClaimRecord]) -> Result<SummaryReport, SummaryError> {
    Ok(SummaryReport {
        rows: records.len(),
        cards: card_data(records)?,
        fraud_by_age_group: aggregate::fraud_by_age_group(records),
        premium_points: aggregate::premium_points(records).len(),
        daily_counts: aggregate::daily_counts(records),
        police_report: aggregate::police_report_split(records),
        claim_breakdown_by_year: aggregate::claim_breakdown_by_year(records),
        claims_by_year: aggregate::claims_by_year(records),
        fraud_by_city: aggregate::fraud_by_city(records),
        claims_by_hour: aggregate::claims_by_hour(records),
    })
}
