//! Filter/group/aggregate step behind each chart.
//!
//! Every function borrows the table and returns an owned series, so charts
//! never derive columns onto shared data.
//!
//! Category axes are the union of keys seen anywhere in the table. A key
//! missing from one series is reported as zero rather than dropped, and the
//! age-group series always lists all nine buckets.
//!
//! A row with a blank key is left out of that grouping only; it still counts
//! everywhere else.
use crate::types::{
    AgeGroup, CategoryCount, ClaimBreakdown, ClaimRecord, DailyCount, FraudSplit, PremiumPoint,
};
use std::collections::BTreeMap;

/// Fraud and non-fraud counts keyed by `key`, in key order. Rows without a
/// key are skipped.
fn split_by<K, F>(records: &[ClaimRecord], key: F) -> BTreeMap<K, (usize, usize)>
where
    K: Ord,
    F: Fn(&ClaimRecord) -> Option<K>,
{
    let mut map: BTreeMap<K, (usize, usize)> = BTreeMap::new();
    for r in records {
        let Some(k) = key(r) else { continue };
        let e = map.entry(k).or_default();
        if r.is_fraud() {
            e.0 += 1;
        } else {
            e.1 += 1;
        }
    }
    map
}

fn to_splits<K: ToString>(map: BTreeMap<K, (usize, usize)>) -> Vec<FraudSplit> {
    map.into_iter()
        .map(|(k, (fraud, not_fraud))| FraudSplit {
            category: k.to_string(),
            fraud,
            not_fraud,
        })
        .collect()
}

pub fn fraud_by_age_group(records: &[ClaimRecord]) -> Vec<CategoryCount> {
    let mut counts: BTreeMap<AgeGroup, usize> = AgeGroup::ALL.iter().map(|g| (*g, 0)).collect();
    for group in records.iter().filter(|r| r.is_fraud()).filter_map(|r| r.age_group()) {
        *counts.entry(group).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(group, count)| CategoryCount {
            category: group.label().to_string(),
            count,
        })
        .collect()
}

/// One point per row that has both tenure and premium.
pub fn premium_points(records: &[ClaimRecord]) -> Vec<PremiumPoint> {
    records
        .iter()
        .filter_map(|r| {
            Some(PremiumPoint {
                months_as_customer: r.months_as_customer?,
                policy_annual_premium: r.policy_annual_premium?,
                fraud_reported: r.fraud_reported,
            })
        })
        .collect()
}

/// Rows per incident date over the continuous range from the first to the
/// last date. Dates without incidents carry the previous day's count forward.
pub fn daily_counts(records: &[ClaimRecord]) -> Vec<DailyCount> {
    let mut counts: BTreeMap<_, usize> = BTreeMap::new();
    for date in records.iter().filter_map(|r| r.incident_date) {
        *counts.entry(date).or_default() += 1;
    }
    let (Some((&first, _)), Some((&last, _))) = (counts.first_key_value(), counts.last_key_value())
    else {
        return Vec::new();
    };

    let mut carry = 0;
    first
        .iter_days()
        .take_while(|day| *day <= last)
        .map(|date| {
            if let Some(c) = counts.get(&date) {
                carry = *c;
            }
            DailyCount { date, count: carry }
        })
        .collect()
}

pub fn police_report_split(records: &[ClaimRecord]) -> Vec<FraudSplit> {
    to_splits(split_by(records, |r| r.police_report_available.clone()))
}

/// Injury, property and vehicle claim totals on fraudulent rows per model
/// year. Years with no fraud still appear with zero totals, and a blank
/// amount adds nothing.
pub fn claim_breakdown_by_year(records: &[ClaimRecord]) -> Vec<ClaimBreakdown> {
    let mut map: BTreeMap<i32, ClaimBreakdown> = BTreeMap::new();
    for r in records {
        let Some(auto_year) = r.auto_year else { continue };
        let e = map.entry(auto_year).or_insert_with(|| ClaimBreakdown {
            auto_year,
            injury: 0,
            property: 0,
            vehicle: 0,
        });
        if r.is_fraud() {
            e.injury += r.injury_claim.unwrap_or(0);
            e.property += r.property_claim.unwrap_or(0);
            e.vehicle += r.vehicle_claim.unwrap_or(0);
        }
    }
    map.into_values().collect()
}

pub fn claims_by_year(records: &[ClaimRecord]) -> Vec<FraudSplit> {
    to_splits(split_by(records, |r| r.auto_year))
}

/// Fraud counts per incident city, highest first; ties sort by name.
pub fn fraud_by_city(records: &[ClaimRecord]) -> Vec<CategoryCount> {
    let mut rows: Vec<CategoryCount> = split_by(records, |r| r.incident_city.clone())
        .into_iter()
        .map(|(category, (fraud, _))| CategoryCount {
            category,
            count: fraud,
        })
        .collect();
    // BTreeMap order is by name, and the sort is stable.
    rows.sort_by(|a, b| b.count.cmp(&a.count));
    rows
}

pub fn claims_by_hour(records: &[ClaimRecord]) -> Vec<FraudSplit> {
    to_splits(split_by(records, |r| r.incident_hour_of_the_day))
}
