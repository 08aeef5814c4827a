//! The eight dashboard charts.
//!
//! Each generator borrows the claims table, runs its aggregation from
//! [`crate::aggregate`], draws the result and returns the PNG with its base64
//! form ready for a `data:` URI.
mod figure;

pub use figure::{FIGURE_HEIGHT, FIGURE_WIDTH};

use crate::aggregate;
use crate::error::ChartError;
use crate::types::{ClaimBreakdown, ClaimRecord, FraudFlag, FraudSplit};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use figure::{
    render_png, BarChart, BarLayout, BarSeries, DailyLineChart, Figure, Orientation,
    ScatterChart, ScatterGroup, FRAUD_RED, LIME, ORANGE, PURE_BLUE, TEAL,
};
use plotters::style::RGBColor;
use std::time::Instant;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartKind {
    AgeGroup,
    Premium,
    Incident,
    PoliceReport,
    AmountClaim,
    TotalClaim,
    IncidentCity,
    IncidentHour,
}

impl ChartKind {
    /// Page order.
    pub const ALL: [ChartKind; 8] = [
        ChartKind::AgeGroup,
        ChartKind::Premium,
        ChartKind::Incident,
        ChartKind::PoliceReport,
        ChartKind::AmountClaim,
        ChartKind::TotalClaim,
        ChartKind::IncidentCity,
        ChartKind::IncidentHour,
    ];

    pub fn title(self) -> &'static str {
        match self {
            ChartKind::AgeGroup => "Fraud Reported by Age group",
            ChartKind::Premium => "Months as Customer per Policy Annual Premium",
            ChartKind::Incident => "Number of Fraud per Day",
            ChartKind::PoliceReport => "Police Report Availability",
            ChartKind::AmountClaim => "Amount Claim",
            ChartKind::TotalClaim => "Total Claim",
            ChartKind::IncidentCity => "Incident City",
            ChartKind::IncidentHour => "Incident Hour Of The Day",
        }
    }

    /// Stable identifier used for element ids in the page.
    pub fn slug(self) -> &'static str {
        match self {
            ChartKind::AgeGroup => "plot_age",
            ChartKind::Premium => "plot_premium",
            ChartKind::Incident => "plot_incident",
            ChartKind::PoliceReport => "plot_report",
            ChartKind::AmountClaim => "plot_amount_claim",
            ChartKind::TotalClaim => "plot_total_claim",
            ChartKind::IncidentCity => "plot_incident_city",
            ChartKind::IncidentHour => "plot_incident_hour",
        }
    }

    pub fn render(self, records: &[ClaimRecord]) -> Result<ChartArtifact, ChartError> {
        match self {
            ChartKind::AgeGroup => plot_age(records),
            ChartKind::Premium => plot_premium(records),
            ChartKind::Incident => plot_incident(records),
            ChartKind::PoliceReport => plot_report(records),
            ChartKind::AmountClaim => plot_amount_claim(records),
            ChartKind::TotalClaim => plot_total_claim(records),
            ChartKind::IncidentCity => plot_incident_city(records),
            ChartKind::IncidentHour => plot_incident_hour(records),
        }
    }
}

/// A rendered chart: PNG bytes and their standard base64 encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartArtifact {
    pub kind: ChartKind,
    pub png: Vec<u8>,
    pub base64: String,
}

impl ChartArtifact {
    fn new(kind: ChartKind, png: Vec<u8>) -> Self {
        let base64 = STANDARD.encode(&png);
        Self { kind, png, base64 }
    }
}

/// All eight charts in page order.
#[derive(Debug, Clone)]
pub struct ChartSet {
    charts: Vec<ChartArtifact>,
}

impl ChartSet {
    pub fn iter(&self) -> impl Iterator<Item = &ChartArtifact> {
        self.charts.iter()
    }

    pub fn get(&self, kind: ChartKind) -> Option<&ChartArtifact> {
        self.charts.iter().find(|c| c.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.charts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }
}

pub fn render_all(records: &[ClaimRecord]) -> Result<ChartSet, ChartError> {
    let charts = ChartKind::ALL
        .iter()
        .map(|kind| {
            let started = Instant::now();
            let artifact = kind.render(records)?;
            debug!(
                chart = kind.slug(),
                bytes = artifact.png.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "chart rendered"
            );
            Ok(artifact)
        })
        .collect::<Result<Vec<_>, ChartError>>()?;
    Ok(ChartSet { charts })
}

fn finish<F: Figure>(kind: ChartKind, figure: &F) -> Result<ChartArtifact, ChartError> {
    Ok(ChartArtifact::new(kind, render_png(figure)?))
}

fn ensure_rows(kind: ChartKind, records: &[ClaimRecord]) -> Result<(), ChartError> {
    if records.is_empty() {
        return Err(ChartError::NoData {
            chart: kind.title(),
        });
    }
    Ok(())
}

fn fraud_series(
    splits: &[FraudSplit],
    labels: (&'static str, &'static str),
    colors: (RGBColor, RGBColor),
) -> Vec<BarSeries> {
    vec![
        BarSeries {
            label: labels.0,
            color: colors.0,
            values: splits.iter().map(|s| s.fraud as f64).collect(),
        },
        BarSeries {
            label: labels.1,
            color: colors.1,
            values: splits.iter().map(|s| s.not_fraud as f64).collect(),
        },
    ]
}

pub fn plot_age(records: &[ClaimRecord]) -> Result<ChartArtifact, ChartError> {
    let kind = ChartKind::AgeGroup;
    ensure_rows(kind, records)?;
    let counts = aggregate::fraud_by_age_group(records);
    let figure = BarChart {
        title: kind.title(),
        category_desc: Some("age_group"),
        categories: counts.iter().map(|c| c.category.clone()).collect(),
        series: vec![BarSeries {
            label: "Fraud",
            color: FRAUD_RED,
            values: counts.iter().map(|c| c.count as f64).collect(),
        }],
        layout: BarLayout::Grouped,
        orientation: Orientation::Horizontal,
        legend: false,
        transparent: true,
    };
    finish(kind, &figure)
}

pub fn plot_premium(records: &[ClaimRecord]) -> Result<ChartArtifact, ChartError> {
    let kind = ChartKind::Premium;
    ensure_rows(kind, records)?;
    let points = aggregate::premium_points(records);
    if points.is_empty() {
        return Err(ChartError::NoData {
            chart: kind.title(),
        });
    }
    let group = |flag: FraudFlag| {
        points
            .iter()
            .filter(|p| p.fraud_reported == flag)
            .map(|p| (p.months_as_customer as f64, p.policy_annual_premium))
            .collect::<Vec<_>>()
    };
    let figure = ScatterChart {
        title: kind.title(),
        x_desc: "Months as Customer",
        y_desc: "Policy Annual Premium",
        groups: vec![
            ScatterGroup {
                label: "Y",
                color: TEAL,
                points: group(FraudFlag::Yes),
            },
            ScatterGroup {
                label: "N",
                color: FRAUD_RED,
                points: group(FraudFlag::No),
            },
        ],
    };
    finish(kind, &figure)
}

pub fn plot_incident(records: &[ClaimRecord]) -> Result<ChartArtifact, ChartError> {
    let kind = ChartKind::Incident;
    let series = aggregate::daily_counts(records);
    let Some(first) = series.first() else {
        return Err(ChartError::NoData {
            chart: kind.title(),
        });
    };
    let figure = DailyLineChart {
        title: kind.title(),
        color: FRAUD_RED,
        start: first.date,
        values: series.iter().map(|d| d.count as f64).collect(),
    };
    finish(kind, &figure)
}

pub fn plot_report(records: &[ClaimRecord]) -> Result<ChartArtifact, ChartError> {
    let kind = ChartKind::PoliceReport;
    ensure_rows(kind, records)?;
    let splits = aggregate::police_report_split(records);
    let figure = BarChart {
        title: kind.title(),
        category_desc: Some("police report available"),
        categories: splits.iter().map(|s| s.category.clone()).collect(),
        series: fraud_series(&splits, ("fraud", "not fraud"), (FRAUD_RED, TEAL)),
        layout: BarLayout::Stacked,
        orientation: Orientation::Vertical,
        legend: true,
        transparent: false,
    };
    finish(kind, &figure)
}

pub fn plot_amount_claim(records: &[ClaimRecord]) -> Result<ChartArtifact, ChartError> {
    let kind = ChartKind::AmountClaim;
    ensure_rows(kind, records)?;
    let years = aggregate::claim_breakdown_by_year(records);
    let column = |f: fn(&ClaimBreakdown) -> i64| {
        years.iter().map(|y| f(y) as f64).collect::<Vec<_>>()
    };
    let figure = BarChart {
        title: kind.title(),
        category_desc: Some("Auto Year"),
        categories: years.iter().map(|y| y.auto_year.to_string()).collect(),
        series: vec![
            BarSeries {
                label: "Injury",
                color: FRAUD_RED,
                values: column(|y| y.injury),
            },
            BarSeries {
                label: "Property",
                color: TEAL,
                values: column(|y| y.property),
            },
            BarSeries {
                label: "Vehicle",
                color: LIME,
                values: column(|y| y.vehicle),
            },
        ],
        layout: BarLayout::Stacked,
        orientation: Orientation::Vertical,
        legend: true,
        transparent: false,
    };
    finish(kind, &figure)
}

pub fn plot_total_claim(records: &[ClaimRecord]) -> Result<ChartArtifact, ChartError> {
    let kind = ChartKind::TotalClaim;
    ensure_rows(kind, records)?;
    let splits = aggregate::claims_by_year(records);
    let figure = BarChart {
        title: kind.title(),
        category_desc: Some("Auto Year"),
        categories: splits.iter().map(|s| s.category.clone()).collect(),
        series: fraud_series(&splits, ("Fraud", "No Fraud"), (ORANGE, PURE_BLUE)),
        layout: BarLayout::Grouped,
        orientation: Orientation::Horizontal,
        legend: true,
        transparent: false,
    };
    finish(kind, &figure)
}

fn incident_city_figure(records: &[ClaimRecord]) -> BarChart {
    let ranking = aggregate::fraud_by_city(records);
    BarChart {
        title: ChartKind::IncidentCity.title(),
        category_desc: Some("incident_city"),
        categories: ranking.iter().map(|c| c.category.clone()).collect(),
        series: vec![BarSeries {
            label: "fraud_reported",
            color: FRAUD_RED,
            values: ranking.iter().map(|c| c.count as f64).collect(),
        }],
        layout: BarLayout::Grouped,
        orientation: Orientation::Vertical,
        legend: true,
        transparent: false,
    }
}

pub fn plot_incident_city(records: &[ClaimRecord]) -> Result<ChartArtifact, ChartError> {
    let kind = ChartKind::IncidentCity;
    ensure_rows(kind, records)?;
    finish(kind, &incident_city_figure(records))
}

pub fn plot_incident_hour(records: &[ClaimRecord]) -> Result<ChartArtifact, ChartError> {
    let kind = ChartKind::IncidentHour;
    ensure_rows(kind, records)?;
    let splits = aggregate::claims_by_hour(records);
    let figure = BarChart {
        title: kind.title(),
        category_desc: Some("Incident Hour Of The Day"),
        categories: splits.iter().map(|s| s.category.clone()).collect(),
        series: fraud_series(&splits, ("Fraud", "No Fraud"), (FRAUD_RED, TEAL)),
        layout: BarLayout::Grouped,
        orientation: Orientation::Vertical,
        legend: true,
        transparent: false,
    };
    finish(kind, &figure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::tests::claim;
    use chrono::NaiveDate;

    fn sample() -> Vec<ClaimRecord> {
        let mut records = Vec::new();
        for i in 0..12u32 {
            let flag = if i % 3 == 0 {
                FraudFlag::Yes
            } else {
                FraudFlag::No
            };
            let mut r = claim(flag);
            r.age = Some(20 + i as i64 * 4);
            r.months_as_customer = Some(10 + i as i64 * 30);
            r.policy_annual_premium = Some(900.0 + i as f64 * 55.5);
            r.incident_date = NaiveDate::from_ymd_opt(2015, 1, 1 + i * 2);
            r.incident_city =
                Some(["Columbus", "Arlington", "Springfield"][i as usize % 3].to_string());
            r.incident_hour_of_the_day = Some((i * 2) as u8);
            r.police_report_available = Some(["YES", "NO", "?"][i as usize % 3].to_string());
            r.auto_year = Some(2000 + (i as i32 % 4));
            records.push(r);
        }
        records
    }

    #[test]
    fn every_chart_renders_a_png() {
        let records = sample();
        let set = render_all(&records).unwrap();
        assert_eq!(set.len(), 8);
        for (artifact, kind) in set.iter().zip(ChartKind::ALL) {
            assert_eq!(artifact.kind, kind);
            assert_eq!(&artifact.png[..8], b"\x89PNG\r\n\x1a\n", "{}", kind.slug());
            assert_eq!(STANDARD.decode(&artifact.base64).unwrap(), artifact.png);
        }
    }

    #[test]
    fn rendering_is_idempotent() {
        let records = sample();
        for kind in ChartKind::ALL {
            let first = kind.render(&records).unwrap();
            let second = kind.render(&records).unwrap();
            assert_eq!(first.png, second.png, "{}", kind.slug());
        }
    }

    #[test]
    fn render_order_does_not_change_output() {
        let records = sample();
        let before = records.clone();
        let forward: Vec<_> = ChartKind::ALL
            .iter()
            .map(|k| k.render(&records).unwrap())
            .collect();
        let backward: Vec<_> = ChartKind::ALL
            .iter()
            .rev()
            .map(|k| k.render(&records).unwrap())
            .collect();
        for (a, b) in forward.iter().zip(backward.iter().rev()) {
            assert_eq!(a.png, b.png, "{}", a.kind.slug());
        }
        assert_eq!(records, before);
    }

    #[test]
    fn base64_has_no_wrapper_characters() {
        let artifact = plot_age(&sample()).unwrap();
        assert!(artifact.base64.starts_with("iVBORw0KGgo"));
        assert!(!artifact.base64.contains('\''));
    }

    #[test]
    fn empty_table_is_no_data() {
        for kind in ChartKind::ALL {
            assert!(
                matches!(kind.render(&[]), Err(ChartError::NoData { .. })),
                "{}",
                kind.slug()
            );
        }
    }

    fn color_type(png_bytes: &[u8]) -> png::ColorType {
        let reader = png::Decoder::new(png_bytes).read_info().unwrap();
        reader.info().color_type
    }

    #[test]
    fn age_chart_background_is_transparent() {
        let records = sample();
        let age = plot_age(&records).unwrap();
        assert_eq!(color_type(&age.png), png::ColorType::Rgba);

        let mut reader = png::Decoder::new(&age.png[..]).read_info().unwrap();
        let mut pixels = vec![0; reader.output_buffer_size()];
        reader.next_frame(&mut pixels).unwrap();
        assert_eq!(pixels[3], 0, "top-left corner alpha");
        assert!(pixels.chunks_exact(4).any(|px| px[3] == 255));

        for kind in ChartKind::ALL.into_iter().filter(|k| *k != ChartKind::AgeGroup) {
            let artifact = kind.render(&records).unwrap();
            assert_eq!(color_type(&artifact.png), png::ColorType::Rgb, "{}", kind.slug());
        }
    }

    #[test]
    fn city_chart_shows_its_series_legend() {
        let figure = incident_city_figure(&sample());
        assert_eq!(figure.legend_entries(), vec![("fraud_reported", FRAUD_RED)]);
        let hidden = BarChart {
            legend: false,
            ..figure
        };
        assert!(hidden.legend_entries().is_empty());
    }

    #[test]
    fn charts_tolerate_blank_cells() {
        let mut records = sample();
        records[0].police_report_available = None;
        records[1].policy_annual_premium = None;
        records[2].auto_year = None;
        records[3].incident_date = None;
        for kind in ChartKind::ALL {
            kind.render(&records).unwrap();
        }

        for r in records.iter_mut() {
            r.months_as_customer = None;
        }
        assert!(matches!(
            plot_premium(&records),
            Err(ChartError::NoData { .. })
        ));
    }

    #[test]
    fn single_row_still_renders() {
        let records = vec![claim(FraudFlag::Yes)];
        for kind in ChartKind::ALL {
            kind.render(&records).unwrap();
        }
    }
}
