//! CSV adapters: asset input, closing-price history and frontier export.
//!
//! Asset files have the header
//! `name,price,share_count,expected_return,volatility,daily_returns`
//! with daily returns separated by `;`. Empty cells are missing fields.

use crate::domain::asset::AssetRecord;
use crate::domain::error::PortoptError;
use crate::domain::frontier::FrontierPoint;
use crate::ports::asset_port::AssetPort;
use chrono::NaiveDate;
use std::fs;
use std::io;
use std::path::PathBuf;

const RETURN_SEPARATOR: char = ';';

pub struct CsvAssetAdapter {
    path: PathBuf,
}

impl CsvAssetAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl AssetPort for CsvAssetAdapter {
    fn load_assets(&self) -> Result<Vec<AssetRecord>, PortoptError> {
        let content = fs::read_to_string(&self.path)?;
        parse_assets(&content, &self.path.display().to_string())
    }
}

struct Columns {
    name: Option<usize>,
    price: Option<usize>,
    share_count: Option<usize>,
    expected_return: Option<usize>,
    volatility: Option<usize>,
    daily_returns: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Self {
        let find = |names: &[&str]| {
            headers
                .iter()
                .position(|h| names.contains(&h.trim().to_lowercase().as_str()))
        };
        Columns {
            name: find(&["name"]),
            price: find(&["price"]),
            share_count: find(&["share_count", "active_count"]),
            expected_return: find(&["expected_return"]),
            volatility: find(&["volatility"]),
            daily_returns: find(&["daily_returns"]),
        }
    }
}

pub fn parse_assets(content: &str, source_name: &str) -> Result<Vec<AssetRecord>, PortoptError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = rdr.headers().map_err(|e| PortoptError::Parse {
        source_name: source_name.to_string(),
        reason: format!("CSV header error: {}", e),
    })?;
    let columns = Columns::from_headers(headers);

    let mut records = Vec::new();
    for (row, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| PortoptError::Parse {
            source_name: source_name.to_string(),
            reason: format!("CSV parse error: {}", e),
        })?;
        let line = row + 2;

        let cell = |col: Option<usize>| {
            col.and_then(|c| record.get(c))
                .map(str::trim)
                .filter(|s| !s.is_empty())
        };

        records.push(AssetRecord {
            name: cell(columns.name).map(str::to_string),
            price: parse_number(cell(columns.price), "price", line)?,
            share_count: parse_count(cell(columns.share_count), line)?,
            expected_return: parse_number(cell(columns.expected_return), "expected_return", line)?,
            volatility: parse_number(cell(columns.volatility), "volatility", line)?,
            daily_returns: parse_returns(cell(columns.daily_returns), line)?,
        });
    }

    Ok(records)
}

fn parse_number(
    value: Option<&str>,
    field: &str,
    line: usize,
) -> Result<Option<f64>, PortoptError> {
    value
        .map(|v| {
            v.parse::<f64>().map_err(|_| {
                PortoptError::invalid(format!("line {line}: {field} '{v}' is not a number"))
            })
        })
        .transpose()
}

fn parse_count(value: Option<&str>, line: usize) -> Result<Option<u64>, PortoptError> {
    value
        .map(|v| {
            v.parse::<u64>().map_err(|_| {
                PortoptError::invalid(format!(
                    "line {line}: share_count '{v}' is not a non-negative integer"
                ))
            })
        })
        .transpose()
}

fn parse_returns(value: Option<&str>, line: usize) -> Result<Option<Vec<f64>>, PortoptError> {
    value
        .map(|v| {
            v.split(RETURN_SEPARATOR)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| {
                    s.parse::<f64>().map_err(|_| {
                        PortoptError::invalid(format!(
                            "line {line}: daily return '{s}' is not a number"
                        ))
                    })
                })
                .collect::<Result<Vec<f64>, _>>()
        })
        .transpose()
}

/// Read a `date,...,close,...` price history and return closes in date order.
pub fn read_closes(path: &PathBuf) -> Result<Vec<f64>, PortoptError> {
    let content = fs::read_to_string(path)?;
    parse_closes(&content, &path.display().to_string())
}

pub fn parse_closes(content: &str, source_name: &str) -> Result<Vec<f64>, PortoptError> {
    let parse_err = |reason: String| PortoptError::Parse {
        source_name: source_name.to_string(),
        reason,
    };

    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());
    let headers = rdr
        .headers()
        .map_err(|e| parse_err(format!("CSV header error: {}", e)))?
        .clone();
    let date_col = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case("date"))
        .ok_or_else(|| parse_err("missing date column".into()))?;
    let close_col = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case("close"))
        .ok_or_else(|| parse_err("missing close column".into()))?;

    let mut bars: Vec<(NaiveDate, f64)> = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| parse_err(format!("CSV parse error: {}", e)))?;
        let date_str = record
            .get(date_col)
            .ok_or_else(|| parse_err("missing date value".into()))?;
        let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
            .map_err(|e| parse_err(format!("invalid date format: {}", e)))?;
        let close: f64 = record
            .get(close_col)
            .ok_or_else(|| parse_err("missing close value".into()))?
            .parse()
            .map_err(|e| parse_err(format!("invalid close value: {}", e)))?;
        bars.push((date, close));
    }

    bars.sort_by_key(|b| b.0);
    Ok(bars.into_iter().map(|(_, close)| close).collect())
}

/// Write frontier points as `step,target_return,expected_return,risk`.
pub fn write_frontier<W: io::Write>(
    writer: W,
    points: &[FrontierPoint],
) -> Result<(), PortoptError> {
    let to_err = |e: csv::Error| PortoptError::Io(io::Error::other(e));
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["step", "target_return", "expected_return", "risk"])
        .map_err(to_err)?;
    for (step, p) in points.iter().enumerate() {
        wtr.write_record([
            step.to_string(),
            p.target_return.to_string(),
            p.expected_return.to_string(),
            p.risk.to_string(),
        ])
        .map_err(to_err)?;
    }
    wtr.flush()?;
    Ok(())
}
