// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Snapshot artifacts
//!
//! Three files are produced in the output directory:
//!
//! - `minters.json`: checksummed address to units minted, written after the
//!   mint pass
//! - `minterRefundValues.json`: checksummed address to refund in ether
//! - `mintersDisperse.txt`: `<address> <refund>` lines with two decimals,
//!   the input format of batch-payout tools
//!
//! Keys and lines are ordered by address bytes. Each file is written to a
//! temporary sibling and renamed into place, so readers never observe a
//! partially written artifact.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use alloy_primitives::Address;
use bigdecimal::{BigDecimal, ToPrimitive};
use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::{debug, info};

use crate::balance::BalanceMap;
use crate::errors::ArtifactError;
use crate::refund::RefundEntry;
use crate::types::Units;

/// Units minted per address
pub const MINTERS_FILE: &str = "minters.json";
/// Refund per address
pub const REFUNDS_FILE: &str = "minterRefundValues.json";
/// Refund per address as plain text lines
pub const DISPERSE_FILE: &str = "mintersDisperse.txt";

/// JSON object preserving insertion order.
struct OrderedObject(Vec<(String, serde_json::Number)>);

impl Serialize for OrderedObject {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Integral values become JSON integers, everything else a float.
fn json_number(address: &Address, value: &BigDecimal) -> Result<serde_json::Number, ArtifactError> {
    if value.is_integer() {
        if let Some(int) = value.to_i64() {
            return Ok(serde_json::Number::from(int));
        }
    }

    crate::types::units::decimal_to_f64(value)
        .and_then(serde_json::Number::from_f64)
        .ok_or_else(|| ArtifactError::NonFiniteNumber {
            address: address.to_checksum(None),
            value: value.to_string(),
        })
}

/// Render `minters.json`.
pub fn minters_json(minted: &BalanceMap) -> Result<String, ArtifactError> {
    let entries = minted
        .iter()
        .map(|(address, units)| Ok((address.to_checksum(None), json_number(address, units.as_decimal())?)))
        .collect::<Result<Vec<_>, ArtifactError>>()?;
    to_json(MINTERS_FILE, &OrderedObject(entries))
}

/// Render `minterRefundValues.json`.
pub fn refunds_json(refunds: &[RefundEntry]) -> Result<String, ArtifactError> {
    let entries = refunds
        .iter()
        .map(|entry| Ok((entry.address.to_checksum(None), json_number(&entry.address, &entry.refund)?)))
        .collect::<Result<Vec<_>, ArtifactError>>()?;
    to_json(REFUNDS_FILE, &OrderedObject(entries))
}

/// Render `mintersDisperse.txt`.
pub fn disperse_lines(refunds: &[RefundEntry]) -> String {
    refunds
        .iter()
        .map(|entry| format!("{} {}", entry.address.to_checksum(None), entry.refund_string()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn to_json(file: &str, object: &OrderedObject) -> Result<String, ArtifactError> {
    serde_json::to_string_pretty(object).map_err(|source| ArtifactError::Serialize {
        path: PathBuf::from(file),
        source,
    })
}

/// Parse a `minters.json` document back into balances.
pub fn parse_minters(json: &str) -> Result<BalanceMap, ArtifactError> {
    let parse_error = |source: serde_json::Error| ArtifactError::Serialize {
        path: PathBuf::from(MINTERS_FILE),
        source,
    };
    let raw: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json).map_err(parse_error)?;

    raw.into_iter()
        .map(|(key, value)| {
            let address = Address::from_str(&key).map_err(|e| ArtifactError::Invalid {
                path: PathBuf::from(MINTERS_FILE),
                details: format!("bad address {key:?}: {e}"),
            })?;
            let units = BigDecimal::from_str(&value.to_string()).map_err(|e| ArtifactError::Invalid {
                path: PathBuf::from(MINTERS_FILE),
                details: format!("bad amount for {key}: {e}"),
            })?;
            Ok((address, Units::new(units)))
        })
        .collect()
}

/// Writes artifacts into one directory.
#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    output_dir: PathBuf,
}

impl SnapshotWriter {
    /// Writer targeting `output_dir`, created on first write
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// The target directory
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write `minters.json`.
    pub async fn write_minters(&self, minted: &BalanceMap) -> Result<PathBuf, ArtifactError> {
        let path = self.write_atomic(MINTERS_FILE, minters_json(minted)?).await?;
        info!(path = %path.display(), minters = minted.len(), "Wrote minters");
        Ok(path)
    }

    /// Write `minterRefundValues.json` and `mintersDisperse.txt`.
    pub async fn write_refunds(&self, refunds: &[RefundEntry]) -> Result<Vec<PathBuf>, ArtifactError> {
        let json = refunds_json(refunds)?;
        let lines = disperse_lines(refunds);

        let paths = vec![
            self.write_atomic(REFUNDS_FILE, json).await?,
            self.write_atomic(DISPERSE_FILE, lines).await?,
        ];
        info!(dir = %self.output_dir.display(), entries = refunds.len(), "Wrote refunds");
        Ok(paths)
    }

    /// Read back a `minters.json` written by [`Self::write_minters`].
    pub async fn read_minters(&self) -> Result<BalanceMap, ArtifactError> {
        let path = self.output_dir.join(MINTERS_FILE);
        let json = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| ArtifactError::io(&path, e))?;
        parse_minters(&json)
    }

    async fn write_atomic(&self, file: &str, contents: String) -> Result<PathBuf, ArtifactError> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| ArtifactError::io(&self.output_dir, e))?;

        let path = self.output_dir.join(file);
        let tmp = self.output_dir.join(format!(".{file}.tmp"));

        tokio::fs::write(&tmp, contents)
            .await
            .map_err(|e| ArtifactError::io(&tmp, e))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| ArtifactError::io(&path, e))?;

        debug!(path = %path.display(), "Artifact written");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refund::project_refunds;
    use crate::types::WeiAmount;
    use alloy_primitives::address;

    const PRICE: u64 = 80_000_000_000_000_000;
    const LOW: Address = address!("00000000000000000000000000000000000000a1");
    const HIGH: Address = address!("5719daca15f885d49bf98ea2a9d03c5d97528d44");

    fn balances() -> BalanceMap {
        [(HIGH, Units::from(2u64)), (LOW, Units::from(1u64))]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_minters_json_is_ordered_and_checksummed() {
        let json = minters_json(&balances()).unwrap();
        let low = json.find("0x00000000000000000000000000000000000000A1").unwrap();
        let high = json.find("0x5719DAcA15f885d49bF98ea2a9d03C5d97528d44").unwrap();
        assert!(low < high);
        assert!(json.contains(": 2"));
    }

    #[test]
    fn test_refunds_json_numbers() {
        let refunds = project_refunds(&balances(), WeiAmount::from(PRICE), 2);
        let json = refunds_json(&refunds).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["0x5719DAcA15f885d49bF98ea2a9d03C5d97528d44"].as_f64(), Some(0.16));
        assert_eq!(value["0x00000000000000000000000000000000000000A1"].as_f64(), Some(0.08));
    }

    #[test]
    fn test_disperse_lines() {
        let refunds = project_refunds(&balances(), WeiAmount::from(PRICE), 2);
        assert_eq!(
            disperse_lines(&refunds),
            "0x00000000000000000000000000000000000000A1 0.08\n\
             0x5719DAcA15f885d49bF98ea2a9d03C5d97528d44 0.16"
        );
    }

    #[test]
    fn test_parse_minters_round_trip() {
        let parsed = parse_minters(&minters_json(&balances()).unwrap()).unwrap();
        assert_eq!(parsed, balances());
    }

    #[tokio::test]
    async fn test_write_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let writer = SnapshotWriter::new(dir.path().join("nested/out"));

        let path = writer.write_minters(&balances()).await.unwrap();
        assert!(path.ends_with(MINTERS_FILE));
        assert_eq!(writer.read_minters().await.unwrap(), balances());

        let tmp = dir.path().join("nested/out").join(format!(".{MINTERS_FILE}.tmp"));
        assert!(!tmp.exists());
    }
}
