//! Find-and-Replace Mutation Engine.
//!
//! Rewrites `size`, `region`, or `pricing_model` across a row set. The
//! whole rule set is validated before any row is touched, and the input is
//! never mutated: unchanged rows come back borrowed, changed rows owned.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::domain::foundation::{ErrorCode, ValidationError};
use crate::domain::instance::{InstanceRow, PricingModel};

/// Row fields that can be bulk-replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplaceField {
    Size,
    Region,
    PricingModel,
}

impl ReplaceField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplaceField::Size => "size",
            ReplaceField::Region => "region",
            ReplaceField::PricingModel => "pricing_model",
        }
    }
}

impl fmt::Display for ReplaceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReplaceField {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "size" => Ok(ReplaceField::Size),
            "region" => Ok(ReplaceField::Region),
            "pricing_model" | "pricingmodel" | "pricing-model" => Ok(ReplaceField::PricingModel),
            _ => Err(ValidationError::invalid_value(
                "field",
                s,
                "expected one of size, region, pricing_model",
            )),
        }
    }
}

/// A `{from, to}` pair. Only rules with both sides non-empty take part.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplaceRule {
    pub from: String,
    pub to: String,
}

impl ReplaceRule {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.from.trim().is_empty() && !self.to.trim().is_empty()
    }

    /// Returns the rule with `from` and `to` swapped.
    pub fn inverse(&self) -> Self {
        Self {
            from: self.to.clone(),
            to: self.from.clone(),
        }
    }
}

/// Rules keyed by field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReplaceRules(BTreeMap<ReplaceField, ReplaceRule>);

impl ReplaceRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: ReplaceField, rule: ReplaceRule) -> Self {
        self.0.insert(field, rule);
        self
    }

    pub fn get(&self, field: ReplaceField) -> Option<&ReplaceRule> {
        self.0.get(&field)
    }

    /// Iterates the rules that will actually be applied.
    pub fn complete_rules(&self) -> impl Iterator<Item = (ReplaceField, &ReplaceRule)> {
        self.0
            .iter()
            .filter(|(_, rule)| rule.is_complete())
            .map(|(field, rule)| (*field, rule))
    }

    /// Returns the rule set that undoes this one.
    pub fn inverse(&self) -> Self {
        Self(
            self.0
                .iter()
                .map(|(field, rule)| (*field, rule.inverse()))
                .collect(),
        )
    }
}

/// Errors raised before any row is rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplaceError {
    #[error("At least one replacement needs both a 'from' and a 'to' value")]
    RuleConflict,

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl ReplaceError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ReplaceError::RuleConflict => ErrorCode::RuleConflict,
            ReplaceError::Validation(err) => err.code(),
        }
    }
}

/// A rule whose values have been checked and parsed.
#[derive(Debug, Clone)]
enum CompiledRule<'r> {
    Size { from: &'r str, to: &'r str },
    Region { from: &'r str, to: &'r str },
    PricingModel { from: PricingModel, to: PricingModel },
}

impl CompiledRule<'_> {
    fn matches(&self, row: &InstanceRow) -> bool {
        match self {
            CompiledRule::Size { from, .. } => row.size == *from,
            CompiledRule::Region { from, .. } => row.region == *from,
            CompiledRule::PricingModel { from, .. } => row.pricing_model == *from,
        }
    }

    fn apply(&self, row: &mut InstanceRow) {
        match self {
            CompiledRule::Size { to, .. } => row.size = (*to).to_string(),
            CompiledRule::Region { to, .. } => row.region = (*to).to_string(),
            CompiledRule::PricingModel { to, .. } => row.pricing_model = *to,
        }
    }
}

/// Result of a replace pass.
#[derive(Debug, Clone)]
pub struct ReplaceOutcome<'a> {
    rows: Vec<Cow<'a, InstanceRow>>,
}

impl<'a> ReplaceOutcome<'a> {
    pub fn rows(&self) -> &[Cow<'a, InstanceRow>] {
        &self.rows
    }

    /// True if the row at `index` was rewritten.
    pub fn is_changed(&self, index: usize) -> bool {
        matches!(self.rows.get(index), Some(Cow::Owned(_)))
    }

    pub fn changed_count(&self) -> usize {
        self.rows.iter().filter(|r| matches!(r, Cow::Owned(_))).count()
    }

    pub fn into_rows(self) -> Vec<InstanceRow> {
        self.rows.into_iter().map(Cow::into_owned).collect()
    }
}

/// Applies `rules` to every row.
///
/// A row may be hit by several rules in one pass. Matching is against the
/// row's value before this pass.
///
/// # Errors
///
/// - `RuleConflict` if no rule has both sides set
/// - `Validation` if a pricing-model rule names an unknown model
pub fn replace_all<'a>(
    rows: &'a [InstanceRow],
    rules: &ReplaceRules,
) -> Result<ReplaceOutcome<'a>, ReplaceError> {
    let compiled = compile(rules)?;

    let rows = rows
        .iter()
        .map(|row| {
            let hits: Vec<&CompiledRule<'_>> =
                compiled.iter().filter(|rule| rule.matches(row)).collect();
            if hits.is_empty() {
                return Cow::Borrowed(row);
            }
            let mut updated = row.clone();
            for rule in hits {
                rule.apply(&mut updated);
            }
            if updated == *row {
                Cow::Borrowed(row)
            } else {
                Cow::Owned(updated)
            }
        })
        .collect();

    Ok(ReplaceOutcome { rows })
}

fn compile(rules: &ReplaceRules) -> Result<Vec<CompiledRule<'_>>, ReplaceError> {
    let mut compiled = Vec::new();
    for (field, rule) in rules.complete_rules() {
        let from = rule.from.trim();
        let to = rule.to.trim();
        compiled.push(match field {
            ReplaceField::Size => CompiledRule::Size { from, to },
            ReplaceField::Region => CompiledRule::Region { from, to },
            ReplaceField::PricingModel => CompiledRule::PricingModel {
                from: from.parse()?,
                to: to.parse()?,
            },
        });
    }
    if compiled.is_empty() {
        return Err(ReplaceError::RuleConflict);
    }
    Ok(compiled)
}
