// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("'{0}' is not a valid frequency (expected Daily, Weekly, Monthly or Yearly)")]
    Frequency(String),
    #[error("'{0}' is not a valid kind (expected Income or Expense)")]
    Kind(String),
    #[error("'{0}' is not a valid asset kind")]
    AssetKind(String),
    #[error("amount {0} is negative")]
    NegativeAmount(Decimal),
}

/// Direction of a ledger event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
    Income,
    Expense,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Income => "Income",
            Kind::Expense => "Expense",
        }
    }

    /// Amount with the sign this kind contributes to a balance.
    pub fn signed(&self, amount: Decimal) -> Decimal {
        match self {
            Kind::Income => amount,
            Kind::Expense => -amount,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(Kind::Income),
            "expense" => Ok(Kind::Expense),
            _ => Err(ModelError::Kind(s.to_string())),
        }
    }
}

/// How often a recurring definition comes due.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Frequency {
    Daily,
    Weekly,
    /// A calendar month of variable length.
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "Daily",
            Frequency::Weekly => "Weekly",
            Frequency::Monthly => "Monthly",
            Frequency::Yearly => "Yearly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            "yearly" => Ok(Frequency::Yearly),
            _ => Err(ModelError::Frequency(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AssetKind {
    Cash,
    CreditCardDebt,
    Investment,
    Property,
}

impl AssetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetKind::Cash => "Cash",
            AssetKind::CreditCardDebt => "Credit Card Debt",
            AssetKind::Investment => "Investment",
            AssetKind::Property => "Property",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm: String = s
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match norm.as_str() {
            "cash" => Ok(AssetKind::Cash),
            "creditcarddebt" | "debt" => Ok(AssetKind::CreditCardDebt),
            "investment" => Ok(AssetKind::Investment),
            "property" => Ok(AssetKind::Property),
            _ => Err(ModelError::AssetKind(s.to_string())),
        }
    }
}

/// A schedule that materializes ledger entries on its due dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringDefinition {
    pub id: i64,
    pub name: String,
    pub amount: Decimal,
    pub category: String,
    pub kind: Kind,
    pub frequency: Frequency,
    pub start_date: NaiveDate,
    pub next_due_date: NaiveDate,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewRecurring {
    pub name: String,
    pub amount: Decimal,
    pub category: String,
    pub kind: Kind,
    pub frequency: Frequency,
    pub start_date: NaiveDate,
    pub active: bool,
}

/// Field-by-field edit of a recurring definition; `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecurringPatch {
    pub name: Option<String>,
    pub amount: Option<Decimal>,
    pub category: Option<String>,
    pub kind: Option<Kind>,
    pub frequency: Option<Frequency>,
    pub start_date: Option<NaiveDate>,
    pub active: Option<bool>,
}

impl RecurringPatch {
    pub fn is_empty(&self) -> bool {
        *self == RecurringPatch::default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: i64,
    pub date: NaiveDate, // scheduled date for auto-generated rows
    pub kind: Kind,
    pub category: String,
    pub amount: Decimal,
    pub note: Option<String>,
    pub recurring_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewLedgerEntry {
    pub date: NaiveDate,
    pub kind: Kind,
    pub category: String,
    pub amount: Decimal,
    pub note: Option<String>,
    pub recurring_id: Option<i64>,
}

impl NewLedgerEntry {
    /// The entry a recurring definition produces for one due date.
    pub fn from_recurring(def: &RecurringDefinition, date: NaiveDate) -> Self {
        Self {
            date,
            kind: def.kind,
            category: def.category.clone(),
            amount: def.amount,
            note: Some(format!("Auto-generated: {}", def.name)),
            recurring_id: Some(def.id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetSnapshot {
    pub id: i64,
    pub date: NaiveDate,
    pub kind: AssetKind,
    pub name: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAssetSnapshot {
    pub date: NaiveDate,
    pub kind: AssetKind,
    pub name: String,
    pub amount: Decimal,
}

pub fn ensure_non_negative(amount: Decimal) -> Result<Decimal, ModelError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(ModelError::NegativeAmount(amount));
    }
    Ok(amount)
}
