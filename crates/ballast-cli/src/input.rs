//! Portfolio and price history readers.
//!
//! The portfolio is a JSON object keyed by symbol:
//!
//! ```json
//! {
//!   "AAPL": { "shares": 60, "price": 150.0, "purchase_date": "2023-01-15",
//!             "esg_score": 75.0, "prices": [140.0, 145.5, 150.0] }
//! }
//! ```
//!
//! The document is passed inline, read from stdin (`-`), or read from a
//! file path.
//!
//! Price histories come from each holding's `prices` array, or from a wide
//! CSV with one column per symbol (an optional leading `date` column is
//! ignored). Leading blank cells mark a series that starts late.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use ballast_core::{Asset, Date};
use ballast_portfolio::PriceHistory;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{CliError, CliResult};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct HoldingRecord {
    shares: u64,
    price: f64,
    purchase_date: Date,
    #[serde(default)]
    esg_score: Option<f64>,
    #[serde(default)]
    prices: Option<Vec<f64>>,
}

/// Holdings in document order with their price histories.
#[derive(Debug, Clone)]
pub struct PortfolioInput {
    /// Holdings, in the order they appear in the document.
    pub assets: Vec<Asset>,
    /// Price history per symbol; symbols without one are marked missing.
    pub history: PriceHistory,
}

/// Where the portfolio document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortfolioSource<'a> {
    /// The argument is the JSON document itself.
    Inline(&'a str),
    /// Read the document from standard input.
    Stdin,
    /// Read the document from a file.
    File(&'a Path),
}

impl<'a> PortfolioSource<'a> {
    /// Classifies a portfolio argument: a leading `{` is inline JSON, `-` is
    /// stdin, anything else is a path.
    pub fn from_arg(arg: &'a str) -> Self {
        let trimmed = arg.trim_start();
        if trimmed.starts_with('{') {
            Self::Inline(arg)
        } else if arg == "-" {
            Self::Stdin
        } else {
            Self::File(Path::new(arg))
        }
    }

    fn read(&self) -> Result<String> {
        match self {
            Self::Inline(text) => Ok((*text).to_string()),
            Self::Stdin => {
                let mut text = String::new();
                std::io::stdin()
                    .read_to_string(&mut text)
                    .context("reading portfolio from stdin")?;
                Ok(text)
            }
            Self::File(path) => std::fs::read_to_string(path)
                .with_context(|| format!("reading portfolio {}", path.display())),
        }
    }
}

/// Reads the portfolio, taking histories from `prices_csv` when given.
///
/// CSV columns take precedence over inline `prices` arrays.
pub fn load_input(portfolio: &str, prices_csv: Option<&Path>) -> Result<PortfolioInput> {
    let text = PortfolioSource::from_arg(portfolio).read()?;
    let (assets, mut inline) = parse_portfolio(&text)?;

    let columns = match prices_csv {
        Some(path) => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("reading price history {}", path.display()))?;
            parse_price_csv(file)?
        }
        None => Vec::new(),
    };

    let mut history = PriceHistory::new();
    for asset in &assets {
        let from_csv = columns.iter().find(|(s, _)| *s == asset.symbol);
        let from_json = inline
            .iter_mut()
            .find(|(s, _)| *s == asset.symbol)
            .and_then(|(_, p)| p.take());
        match (from_csv, from_json) {
            (Some((_, prices)), _) => history.insert(asset.symbol.clone(), prices.clone()),
            (None, Some(prices)) => history.insert(asset.symbol.clone(), prices),
            (None, None) => history.mark_missing(asset.symbol.clone()),
        }
    }

    tracing::debug!(
        holdings = assets.len(),
        csv_columns = columns.len(),
        "loaded portfolio"
    );
    Ok(PortfolioInput { assets, history })
}

/// Parses the portfolio document into assets and any inline histories.
pub fn parse_portfolio(text: &str) -> CliResult<(Vec<Asset>, Vec<(String, Option<Vec<f64>>)>)> {
    let document: Map<String, Value> =
        serde_json::from_str(text).map_err(|e| CliError::Portfolio(e.to_string()))?;
    if document.is_empty() {
        return Err(CliError::Portfolio("no holdings".to_string()));
    }

    let mut assets = Vec::with_capacity(document.len());
    let mut histories = Vec::with_capacity(document.len());
    for (symbol, value) in document {
        let record: HoldingRecord = serde_json::from_value(value)
            .map_err(|e| CliError::Portfolio(format!("{symbol}: {e}")))?;

        let asset = Asset::new(symbol.clone(), record.shares, record.price, record.purchase_date);
        let asset = match record.esg_score {
            Some(score) => asset.and_then(|a| a.with_esg_score(score)),
            None => asset,
        }
        .map_err(|e| CliError::Portfolio(format!("{symbol}: {e}")))?;

        assets.push(asset);
        histories.push((symbol, record.prices));
    }
    Ok((assets, histories))
}

/// Parses a wide price CSV into `(symbol, prices)` columns.
pub fn parse_price_csv<R: Read>(reader: R) -> CliResult<Vec<(String, Vec<f64>)>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| CliError::Prices(e.to_string()))?
        .clone();
    let skip = usize::from(
        headers
            .get(0)
            .is_some_and(|h| h.eq_ignore_ascii_case("date")),
    );
    let mut columns: Vec<(String, Vec<f64>)> = headers
        .iter()
        .skip(skip)
        .map(|h| (h.to_string(), Vec::new()))
        .collect();
    if columns.is_empty() {
        return Err(CliError::Prices("no symbol columns".to_string()));
    }

    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(|e| CliError::Prices(e.to_string()))?;
        for ((symbol, prices), cell) in columns.iter_mut().zip(record.iter().skip(skip)) {
            if cell.is_empty() {
                if prices.is_empty() {
                    continue;
                }
                return Err(CliError::Prices(format!(
                    "{symbol}: blank cell on data row {} after the series started",
                    row + 1
                )));
            }
            let price = cell.parse::<f64>().map_err(|_| {
                CliError::Prices(format!(
                    "{symbol}: '{cell}' on data row {} is not a number",
                    row + 1
                ))
            })?;
            prices.push(price);
        }
    }

    Ok(columns)
}

/// Parses an as-of date, defaulting to today (UTC).
pub fn parse_as_of(value: Option<&str>) -> CliResult<Date> {
    match value {
        Some(s) => Date::parse(s).map_err(|_| CliError::InvalidDate(s.to_string())),
        None => Ok(Date::today()),
    }
}
