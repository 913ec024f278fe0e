//! Rendering of the final allocation table.
//!
//! Rows are emitted in first-seen order with canonical decimal strings, so the same
//! allocation always renders to the same bytes.
//!
//! The `claims` format is the input of the claim-tree builder: one entry per
//! address with a positive reward, earnings as an integer count of base units.

use crate::domain::{Allocation, AllocationRow, Decimal};
use serde::Serialize;
use std::io::Write;
use thiserror::Error;

/// Label attached to every claim entry unless configured otherwise.
pub const DEFAULT_CLAIM_REASON: &str = "Ambassador Delegation";
/// Decimal places of the reward token; earnings are `allocated_rewards * 10^18`.
pub const CLAIM_DECIMALS: u32 = 18;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Csv,
    Json,
    Claims,
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ReportFormat::Csv),
            "json" => Ok(ReportFormat::Json),
            "claims" => Ok(ReportFormat::Claims),
            other => Err(format!("must be csv, json or claims, got {}", other)),
        }
    }
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("earnings for {address} do not fit at {decimals} decimals")]
    EarningsOverflow { address: String, decimals: u32 },
}

#[derive(Debug, Serialize)]
struct CsvRow {
    address: String,
    contribution: String,
    allocated_rewards: String,
}

impl From<&AllocationRow> for CsvRow {
    fn from(row: &AllocationRow) -> Self {
        CsvRow {
            address: row.address.to_string(),
            contribution: row.contribution.to_canonical_string(),
            allocated_rewards: row.allocated_rewards.to_canonical_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    rows: Vec<CsvRow>,
    total_allocated: String,
    remaining_budget: String,
    total_pool: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    digest: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct ClaimEntry {
    address: String,
    earnings: String,
    reasons: String,
}

/// Renders an allocation in one output format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reporter {
    format: ReportFormat,
    claim_reason: String,
}

impl Reporter {
    pub fn new(format: ReportFormat) -> Self {
        Self {
            format,
            claim_reason: DEFAULT_CLAIM_REASON.to_string(),
        }
    }

    /// Set the `reasons` label written on claim entries.
    pub fn with_claim_reason(mut self, reason: impl Into<String>) -> Self {
        self.claim_reason = reason.into();
        self
    }

    pub fn format(&self) -> ReportFormat {
        self.format
    }

    pub fn write<W: Write>(&self, allocation: &Allocation, writer: W) -> Result<(), ReportError> {
        match self.format {
            ReportFormat::Csv => write_csv(allocation, writer),
            ReportFormat::Json => write_json(allocation, writer),
            ReportFormat::Claims => write_claims(allocation, &self.claim_reason, writer),
        }
    }
}

/// Write `allocation` to `writer` in the given format with default settings.
pub fn write_report<W: Write>(
    allocation: &Allocation,
    format: ReportFormat,
    writer: W,
) -> Result<(), ReportError> {
    Reporter::new(format).write(allocation, writer)
}

fn write_csv<W: Write>(allocation: &Allocation, writer: W) -> Result<(), ReportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    if allocation.is_empty() {
        csv_writer.write_record(["address", "contribution", "allocated_rewards"])?;
    }
    for row in &allocation.rows {
        csv_writer.serialize(CsvRow::from(row))?;
    }
    csv_writer.flush()?;
    Ok(())
}

fn write_json<W: Write>(allocation: &Allocation, mut writer: W) -> Result<(), ReportError> {
    let digest = digest(allocation)?;
    let report = JsonReport {
        rows: allocation.rows.iter().map(CsvRow::from).collect(),
        total_allocated: allocation.total_allocated().to_canonical_string(),
        remaining_budget: allocation.remaining_budget.to_canonical_string(),
        total_pool: allocation.total_pool.to_canonical_string(),
        digest: Some(&digest),
    };
    serde_json::to_writer_pretty(&mut writer, &report)?;
    writeln!(writer)?;
    Ok(())
}

fn write_claims<W: Write>(
    allocation: &Allocation,
    reason: &str,
    mut writer: W,
) -> Result<(), ReportError> {
    let mut entries = Vec::new();
    for row in allocation
        .rows
        .iter()
        .filter(|row| row.allocated_rewards.is_positive())
    {
        entries.push(ClaimEntry {
            address: row.address.to_string(),
            earnings: to_base_units(row.allocated_rewards, CLAIM_DECIMALS)
                .ok_or_else(|| ReportError::EarningsOverflow {
                    address: row.address.to_string(),
                    decimals: CLAIM_DECIMALS,
                })?
                .to_canonical_string(),
            reasons: reason.to_string(),
        });
    }

    serde_json::to_writer(&mut writer, &entries)?;
    writeln!(writer)?;
    Ok(())
}

/// `amount * 10^decimals` as a whole number, dropping precision below one base unit.
pub fn to_base_units(amount: Decimal, decimals: u32) -> Option<Decimal> {
    let unit = (0..decimals).try_fold(Decimal::from(1u64), |acc, _| {
        acc.checked_mul(Decimal::from(10u64))
    })?;
    amount
        .truncate_to(decimals)
        .checked_mul(unit)
        .map(|units| units.truncate_to(0))
}

/// Lowercase hex SHA-256 of the CSV rendering.
pub fn digest(allocation: &Allocation) -> Result<String, ReportError> {
    use sha2::{Digest, Sha256};

    let mut buf = Vec::new();
    write_csv(allocation, &mut buf)?;
    Ok(hex::encode(Sha256::digest(&buf)))
}

/// Sum of allocated rewards and unallocated remainder.
pub fn accounted_budget(allocation: &Allocation) -> Decimal {
    allocation.total_allocated() + allocation.remaining_budget
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Address;

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    fn sample() -> Allocation {
        Allocation {
            rows: vec![
                AllocationRow {
                    address: Address::parse("0x2222222222222222222222222222222222222222").unwrap(),
                    contribution: d("50.000"),
                    allocated_rewards: d("24000"),
                },
                AllocationRow {
                    address: Address::parse("0x1111111111111111111111111111111111111111").unwrap(),
                    contribution: d("50"),
                    allocated_rewards: d("8000.5"),
                },
            ],
            remaining_budget: d("0"),
            total_pool: d("100"),
        }
    }

    #[test]
    fn test_csv_rows_in_table_order() {
        let mut out = Vec::new();
        write_report(&sample(), ReportFormat::Csv, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "address,contribution,allocated_rewards\n\
             0x2222222222222222222222222222222222222222,50,24000\n\
             0x1111111111111111111111111111111111111111,50,8000.5\n"
        );
    }

    #[test]
    fn test_csv_empty_table_has_header() {
        let mut out = Vec::new();
        write_report(&Allocation::default(), ReportFormat::Csv, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "address,contribution,allocated_rewards\n"
        );
    }

    #[test]
    fn test_json_report_fields() {
        let mut out = Vec::new();
        write_report(&sample(), ReportFormat::Json, &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(value["rows"].as_array().unwrap().len(), 2);
        assert_eq!(value["rows"][1]["allocated_rewards"], "8000.5");
        assert_eq!(value["total_allocated"], "32000.5");
        assert_eq!(value["digest"], digest(&sample()).unwrap());
    }

    #[test]
    fn test_digest_is_stable_and_sensitive() {
        let a = digest(&sample()).unwrap();
        let b = digest(&sample()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);

        let mut changed = sample();
        changed.rows[1].allocated_rewards = d("8000.4");
        assert_ne!(a, digest(&changed).unwrap());
    }

    #[test]
    fn test_report_format_parse() {
        assert_eq!("CSV".parse::<ReportFormat>().unwrap(), ReportFormat::Csv);
        assert_eq!("json".parse::<ReportFormat>().unwrap(), ReportFormat::Json);
        assert_eq!(
            " Claims ".parse::<ReportFormat>().unwrap(),
            ReportFormat::Claims
        );
        assert!("xml".parse::<ReportFormat>().is_err());
    }

    #[test]
    fn test_accounted_budget() {
        let mut allocation = sample();
        allocation.remaining_budget = d("0.5");
        assert_eq!(accounted_budget(&allocation), d("32001"));
    }

    #[test]
    fn test_claims_skip_zero_rewards_and_scale_earnings() {
        let mut allocation = sample();
        allocation.rows.push(AllocationRow {
            address: Address::parse("0x3333333333333333333333333333333333333333").unwrap(),
            contribution: d("0"),
            allocated_rewards: d("0"),
        });

        let mut out = Vec::new();
        Reporter::new(ReportFormat::Claims)
            .with_claim_reason("Delegation Epoch 1")
            .write(&allocation, &mut out)
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

        let entries = value.as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(
            entries[0]["address"],
            "0x2222222222222222222222222222222222222222"
        );
        assert_eq!(entries[0]["earnings"], "24000000000000000000000");
        assert_eq!(entries[1]["earnings"], "8000500000000000000000");
        assert_eq!(entries[1]["reasons"], "Delegation Epoch 1");
    }

    #[test]
    fn test_claims_default_reason() {
        let mut out = Vec::new();
        write_report(&sample(), ReportFormat::Claims, &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value[0]["reasons"], DEFAULT_CLAIM_REASON);
    }

    #[test]
    fn test_to_base_units_truncates_below_one_unit() {
        assert_eq!(
            to_base_units(d("21485.714285714285714285"), 18),
            Some(d("21485714285714285714285"))
        );
        assert_eq!(
            to_base_units(d("0.0000000000000000019"), 18),
            Some(d("1"))
        );
        assert_eq!(to_base_units(d("1.99"), 0), Some(d("1")));
        assert_eq!(to_base_units(d("79228162514264337593543950335"), 18), None);
    }
}
