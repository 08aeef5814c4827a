use crate::types::ColumnKind;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("cannot open dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("dataset is missing required column '{column}'")]
    MissingColumn { column: &'static str },

    #[error("line {line}: column '{column}' must be {expected}, got {value:?}")]
    InvalidValue {
        line: u64,
        column: &'static str,
        expected: ColumnKind,
        value: String,
    },

    #[error("dataset contains no rows")]
    Empty,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SummaryError {
    #[error("claims table is empty")]
    EmptyTable,

    #[error("no rows with fraud_reported = 'Y'")]
    NoFraudRows,

    #[error("no row has a total_claim_amount")]
    NoClaimAmounts,
}

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("chart '{chart}' has no data to plot")]
    NoData { chart: &'static str },

    #[error("failed to draw chart '{chart}': {message}")]
    Draw { chart: &'static str, message: String },

    #[error("PNG encoding failed: {0}")]
    Encode(#[from] png::EncodingError),

    #[error("bundled chart font could not be registered")]
    Font,
}

#[derive(Error, Debug)]
pub enum PageError {
    #[error("template rendering failed: {0}")]
    Template(#[from] askama::Error),
}

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Summary(#[from] SummaryError),

    #[error(transparent)]
    Chart(#[from] ChartError),

    #[error(transparent)]
    Page(#[from] PageError),

    #[error("render worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

pub type DashboardResult<T> = Result<T, DashboardError>;
