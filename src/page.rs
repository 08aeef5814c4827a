use crate::charts::{self, ChartSet};
use crate::error::{DashboardError, PageError};
use crate::summary;
use crate::types::{CardData, ClaimRecord};
use askama::Template;
use std::time::Instant;
use tracing::info;

struct ChartPanel<'a> {
    id: &'static str,
    title: &'static str,
    base64: &'a str,
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate<'a> {
    cards: &'a CardData,
    panels: Vec<ChartPanel<'a>>,
}

pub fn render_page(cards: &CardData, charts: &ChartSet) -> Result<String, PageError> {
    let panels = charts
        .iter()
        .map(|c| ChartPanel {
            id: c.kind.slug(),
            title: c.kind.title(),
            base64: &c.base64,
        })
        .collect();
    Ok(IndexTemplate { cards, panels }.render()?)
}

/// Cards, charts and page for one request, computed from scratch.
pub fn build_dashboard(records: &[ClaimRecord]) -> Result<String, DashboardError> {
    let started = Instant::now();
    let cards = summary::card_data(records)?;
    let charts = charts::render_all(records)?;
    let html = render_page(&cards, &charts)?;
    info!(
        rows = records.len(),
        bytes = html.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "dashboard built"
    );
    Ok(html)
}
