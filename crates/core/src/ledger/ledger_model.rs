//! Ledger domain models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_LEDGER_CATEGORY, LEDGER_CATEGORY_MAX_LEN, LEDGER_DESCRIPTION_MAX_LEN,
    LEDGER_DESCRIPTION_MIN_LEN, LEDGER_NOTE_MAX_LEN, LEDGER_REFERENCE_MAX_LEN, MAX_AMOUNT,
};
use crate::errors::{Result, ValidationError};
use crate::ids::{ClubId, InvestorId, LedgerEntryId, PeriodId, UserId};
use crate::nav::PeriodTotals;
use crate::utils::{money, zero_money, Money};

/// Kind of cash movement a ledger entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerEntryType {
    Contribution,
    Withdrawal,
    Income,
    Expense,
    /// Signed correction, reclassified by sign and investor attribution
    Adjustment,
}

impl LedgerEntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerEntryType::Contribution => "contribution",
            LedgerEntryType::Withdrawal => "withdrawal",
            LedgerEntryType::Income => "income",
            LedgerEntryType::Expense => "expense",
            LedgerEntryType::Adjustment => "adjustment",
        }
    }

    /// Contribution and withdrawal entries must name an investor.
    pub fn requires_investor(&self) -> bool {
        matches!(self, LedgerEntryType::Contribution | LedgerEntryType::Withdrawal)
    }

    /// Income and expense entries belong to the club as a whole.
    pub fn forbids_investor(&self) -> bool {
        matches!(self, LedgerEntryType::Income | LedgerEntryType::Expense)
    }

    pub fn allows_negative(&self) -> bool {
        matches!(self, LedgerEntryType::Adjustment)
    }
}

impl fmt::Display for LedgerEntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LedgerEntryType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "contribution" => Ok(LedgerEntryType::Contribution),
            "withdrawal" => Ok(LedgerEntryType::Withdrawal),
            "income" => Ok(LedgerEntryType::Income),
            "expense" => Ok(LedgerEntryType::Expense),
            "adjustment" => Ok(LedgerEntryType::Adjustment),
            other => Err(format!("Unknown ledger entry type: {}", other)),
        }
    }
}

/// One immutable transaction within one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub id: LedgerEntryId,
    pub club_id: ClubId,
    pub period_id: PeriodId,
    pub investor_id: Option<InvestorId>,
    pub entry_type: LedgerEntryType,
    pub amount: Money,
    pub category: String,
    pub tx_date: NaiveDate,
    pub description: String,
    pub note: Option<String>,
    pub reference: Option<String>,
    pub created_by_user_id: UserId,
    pub created_at: DateTime<Utc>,
}

fn validate_amount(entry_type: LedgerEntryType, amount: Money) -> Result<()> {
    let amount = money(amount);
    if amount.is_zero() {
        return Err(ValidationError::invalid("Amount cannot be zero.").into());
    }
    if amount < zero_money() && !entry_type.allows_negative() {
        return Err(ValidationError::invalid("Only adjustments may be negative.").into());
    }
    if amount.abs() > MAX_AMOUNT {
        return Err(ValidationError::InvalidInput(format!(
            "Amount cannot exceed {} in magnitude.",
            MAX_AMOUNT
        ))
        .into());
    }
    Ok(())
}

fn validate_text(
    field: &str,
    value: &str,
    min_len: usize,
    max_len: usize,
) -> Result<()> {
    let len = value.trim().chars().count();
    if len < min_len || len > max_len {
        return Err(ValidationError::InvalidInput(format!(
            "{} must be between {} and {} characters",
            field, min_len, max_len
        ))
        .into());
    }
    Ok(())
}

fn validate_optional_text(field: &str, value: Option<&str>, max_len: usize) -> Result<()> {
    match value {
        Some(text) if text.chars().count() > max_len => Err(ValidationError::InvalidInput(
            format!("{} must be at most {} characters", field, max_len),
        )
        .into()),
        _ => Ok(()),
    }
}

/// Input model for posting a ledger entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLedgerEntry {
    pub club_id: ClubId,
    pub period_id: PeriodId,
    pub investor_id: Option<InvestorId>,
    pub entry_type: LedgerEntryType,
    /// Positive for every type except adjustments
    pub amount: Money,
    #[serde(default)]
    pub category: Option<String>,
    /// Defaults to the club's business date when omitted
    #[serde(default)]
    pub tx_date: Option<NaiveDate>,
    pub description: String,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
    pub created_by_user_id: UserId,
}

impl NewLedgerEntry {
    /// Validates attribution, sign and text limits.
    pub fn validate(&self) -> Result<()> {
        if self.entry_type.requires_investor() && self.investor_id.is_none() {
            return Err(ValidationError::invalid(
                "Contribution/withdrawal entries require investor_id.",
            )
            .into());
        }
        if self.entry_type.forbids_investor() && self.investor_id.is_some() {
            return Err(ValidationError::invalid(
                "Income/expense entries must not include investor_id.",
            )
            .into());
        }
        validate_amount(self.entry_type, self.amount)?;
        validate_text(
            "description",
            &self.description,
            LEDGER_DESCRIPTION_MIN_LEN,
            LEDGER_DESCRIPTION_MAX_LEN,
        )?;
        if let Some(category) = &self.category {
            validate_text("category", category, 1, LEDGER_CATEGORY_MAX_LEN)?;
        }
        validate_optional_text("note", self.note.as_deref(), LEDGER_NOTE_MAX_LEN)?;
        validate_optional_text("reference", self.reference.as_deref(), LEDGER_REFERENCE_MAX_LEN)?;
        Ok(())
    }

    /// Quantizes the amount and fills defaults so the entry is ready to store.
    pub fn prepared(mut self, business_date: NaiveDate) -> Self {
        self.amount = money(self.amount);
        self.tx_date = Some(self.tx_date.unwrap_or(business_date));
        if self.category.is_none() {
            self.category = Some(DEFAULT_LEDGER_CATEGORY.to_string());
        }
        self
    }

    /// Materializes the entry without storing it, for dry runs.
    pub fn to_unsaved_entry(&self, business_date: NaiveDate) -> LedgerEntry {
        LedgerEntry {
            id: 0,
            club_id: self.club_id,
            period_id: self.period_id,
            investor_id: self.investor_id,
            entry_type: self.entry_type,
            amount: money(self.amount),
            category: self
                .category
                .clone()
                .unwrap_or_else(|| DEFAULT_LEDGER_CATEGORY.to_string()),
            tx_date: self.tx_date.unwrap_or(business_date),
            description: self.description.clone(),
            note: self.note.clone(),
            reference: self.reference.clone(),
            created_by_user_id: self.created_by_user_id,
            created_at: Utc::now(),
        }
    }
}

/// Input model for editing an existing entry.
///
/// Type and investor attribution are fixed once posted; a misattributed entry
/// is deleted (draft) or offset with an adjustment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntryUpdate {
    pub id: LedgerEntryId,
    pub amount: Option<Money>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub tx_date: Option<NaiveDate>,
    pub note: Option<String>,
    pub reference: Option<String>,
}

impl LedgerEntryUpdate {
    /// Validates the update against the stored entry and applies it.
    pub fn apply_to(&self, entry: &mut LedgerEntry) -> Result<()> {
        if self.id != entry.id {
            return Err(ValidationError::InvalidInput(format!(
                "Update targets entry {} but entry {} was loaded",
                self.id, entry.id
            ))
            .into());
        }
        if let Some(amount) = self.amount {
            validate_amount(entry.entry_type, amount)?;
        }
        if let Some(description) = &self.description {
            validate_text(
                "description",
                description,
                LEDGER_DESCRIPTION_MIN_LEN,
                LEDGER_DESCRIPTION_MAX_LEN,
            )?;
        }
        if let Some(category) = &self.category {
            validate_text("category", category, 1, LEDGER_CATEGORY_MAX_LEN)?;
        }
        validate_optional_text("note", self.note.as_deref(), LEDGER_NOTE_MAX_LEN)?;
        validate_optional_text("reference", self.reference.as_deref(), LEDGER_REFERENCE_MAX_LEN)?;

        if let Some(amount) = self.amount {
            entry.amount = money(amount);
        }
        if let Some(description) = &self.description {
            entry.description = description.clone();
        }
        if let Some(category) = &self.category {
            entry.category = category.clone();
        }
        if let Some(tx_date) = self.tx_date {
            entry.tx_date = tx_date;
        }
        if self.note.is_some() {
            entry.note = self.note.clone();
        }
        if self.reference.is_some() {
            entry.reference = self.reference.clone();
        }
        Ok(())
    }
}

/// Result of posting or editing an entry: the stored entry and the period
/// totals after recomputation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostedEntry {
    pub entry: LedgerEntry,
    pub totals: PeriodTotals,
}

/// Result of a bulk import.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerImportSummary {
    pub dry_run: bool,
    /// Entries created, or that would be created on a dry run
    pub entry_count: usize,
    /// Empty on a dry run
    pub entry_ids: Vec<LedgerEntryId>,
    /// Totals after the import, projected on a dry run
    pub totals: PeriodTotals,
}
