//! Boundary parsing for entry submissions
//!
//! The wire body is a flat JSON object: fixed scalar fields plus one
//! integer count per package level. This module is the only place that
//! sees that shape; it normalizes blank-string ids to `None`, parses the
//! transaction type, and validates every package-level key, so the ledger
//! core works on typed values exclusively.

use crate::error::{Error, Result};
use crate::types::TransactionType;
use crate::units::PackageQuantity;
use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

/// A validated, typed entry submission
#[derive(Clone)]
pub struct EntryRequest {
    /// Parsed transaction kind
    pub transaction_type: TransactionType,

    /// Source party, when named
    pub source_account_id: Option<Uuid>,

    /// Target party, when named
    pub target_account_id: Option<Uuid>,

    /// Verification secret. Never logged, never persisted.
    pub pin: String,

    /// Monitored product group
    pub product_group: String,

    /// Monitored product name
    pub product_name: String,

    /// Validated package counts
    pub quantities: PackageQuantity,

    /// Business date; submission time when absent
    pub entry_date: Option<DateTime<Utc>>,
}

// The PIN must never reach a log line, so Debug redacts it.
impl std::fmt::Debug for EntryRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryRequest")
            .field("transaction_type", &self.transaction_type)
            .field("source_account_id", &self.source_account_id)
            .field("target_account_id", &self.target_account_id)
            .field("pin", &"<redacted>")
            .field("product_group", &self.product_group)
            .field("product_name", &self.product_name)
            .field("quantities", &self.quantities)
            .field("entry_date", &self.entry_date)
            .finish()
    }
}

impl EntryRequest {
    /// Parse a wire body.
    ///
    /// Every key that is not one of the fixed scalar fields is treated as a
    /// package-level count; unrecognized keys fail with `InvalidLevel`
    /// rather than being silently ignored.
    pub fn from_json(body: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| Error::InvalidRequest(format!("malformed JSON body: {}", e)))?;
        Self::from_json_value(&value)
    }

    /// Parse an already-decoded JSON object
    pub fn from_json_value(value: &Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| Error::InvalidRequest("entry body must be a JSON object".to_string()))?;

        let mut transaction_type = None;
        let mut source_account_id = None;
        let mut target_account_id = None;
        let mut pin = String::new();
        let mut product_group = String::new();
        let mut product_name = String::new();
        let mut entry_date = None;
        let mut levels = Vec::new();

        for (key, field) in object {
            match key.as_str() {
                "transaction_type" => {
                    let raw = string_field(key, field)?;
                    transaction_type = Some(
                        TransactionType::parse(raw.trim())
                            .ok_or_else(|| Error::InvalidType(raw.trim().to_string()))?,
                    );
                }
                "source_account_id" => source_account_id = optional_id(key, field)?,
                "target_account_id" => target_account_id = optional_id(key, field)?,
                "pin" => pin = string_field(key, field)?,
                "product_group" => product_group = string_field(key, field)?,
                "product_name" => product_name = string_field(key, field)?,
                "entry_date" => entry_date = optional_date(key, field)?,
                _ => levels.push((key.as_str(), count_field(field))),
            }
        }

        let transaction_type = transaction_type
            .ok_or_else(|| Error::InvalidType("(missing transaction_type)".to_string()))?;
        let pin = required("pin", pin)?;
        let product_group = required("product_group", product_group)?;
        let product_name = required("product_name", product_name)?;
        let quantities = PackageQuantity::from_pairs(levels)?;

        Ok(EntryRequest {
            transaction_type,
            source_account_id,
            target_account_id,
            pin,
            product_group,
            product_name,
            quantities,
            entry_date,
        })
    }

    /// Supply request: manufacturer stocks its own production
    pub fn supply(
        source: Uuid,
        pin: impl Into<String>,
        product_group: impl Into<String>,
        product_name: impl Into<String>,
        quantities: PackageQuantity,
    ) -> Self {
        Self::new(
            TransactionType::Supply,
            Some(source),
            None,
            pin,
            product_group,
            product_name,
            quantities,
        )
    }

    /// Transfer request between two parties
    pub fn transfer(
        source: Uuid,
        target: Uuid,
        pin: impl Into<String>,
        product_group: impl Into<String>,
        product_name: impl Into<String>,
        quantities: PackageQuantity,
    ) -> Self {
        Self::new(
            TransactionType::Transfer,
            Some(source),
            Some(target),
            pin,
            product_group,
            product_name,
            quantities,
        )
    }

    /// Return request: waste exits circulation
    pub fn waste_return(
        source: Uuid,
        pin: impl Into<String>,
        product_group: impl Into<String>,
        product_name: impl Into<String>,
        quantities: PackageQuantity,
    ) -> Self {
        Self::new(
            TransactionType::Return,
            Some(source),
            None,
            pin,
            product_group,
            product_name,
            quantities,
        )
    }

    fn new(
        transaction_type: TransactionType,
        source_account_id: Option<Uuid>,
        target_account_id: Option<Uuid>,
        pin: impl Into<String>,
        product_group: impl Into<String>,
        product_name: impl Into<String>,
        quantities: PackageQuantity,
    ) -> Self {
        EntryRequest {
            transaction_type,
            source_account_id,
            target_account_id,
            pin: pin.into(),
            product_group: product_group.into(),
            product_name: product_name.into(),
            quantities,
            entry_date: None,
        }
    }
}

/// A blank required scalar never comes from the relay; reject it rather
/// than let an empty product group leak into report categories.
fn required(key: &str, value: String) -> Result<String> {
    if value.trim().is_empty() {
        return Err(Error::InvalidRequest(format!("field {} is required", key)));
    }
    Ok(value)
}

fn string_field(key: &str, field: &Value) -> Result<String> {
    match field {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s.clone()),
        _ => Err(Error::InvalidRequest(format!("field {} must be a string", key))),
    }
}

/// Blank and whitespace-only id strings are the relay's "not set" sentinel;
/// normalize them to `None` here so the core never sees them.
fn optional_id(key: &str, field: &Value) -> Result<Option<Uuid>> {
    match field {
        Value::Null => Ok(None),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            Uuid::parse_str(trimmed).map(Some).map_err(|_| {
                Error::InvalidRequest(format!("field {} is not a valid account id", key))
            })
        }
        _ => Err(Error::InvalidRequest(format!("field {} must be a string id", key))),
    }
}

fn optional_date(key: &str, field: &Value) -> Result<Option<DateTime<Utc>>> {
    match field {
        Value::Null => Ok(None),
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|d| Some(d.with_timezone(&Utc)))
            .map_err(|_| Error::InvalidRequest(format!("field {} is not an RFC 3339 date", key))),
        _ => Err(Error::InvalidRequest(format!("field {} must be a date string", key))),
    }
}

/// Count coercion matching the relay's form handling: integers pass
/// through, numeric strings parse, anything else counts as zero.
/// Negative values survive to `from_pairs`, which rejects them.
fn count_field(field: &Value) -> i64 {
    match field {
        Value::Number(n) => n.as_i64().unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}
