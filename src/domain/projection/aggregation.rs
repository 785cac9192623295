//! Aggregation Engine - grand totals across projected rows.
//!
//! All sums run over integer cents and integer counts, so the reduction is
//! associative and commutative: any ordering or chunking of the rows
//! yields the same totals.

use serde::{Deserialize, Serialize};

use super::calculator::{CostProjection, Scenario, ScenarioCost};
use crate::domain::foundation::Money;

/// Totals for one scenario.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioTotal {
    pub monthly_cost: Money,
    pub annual_cost: Money,
    pub annual_savings: Money,
    pub vcpu: u64,
    pub quantity: u64,
}

impl ScenarioTotal {
    fn add_cost(&mut self, cost: &ScenarioCost) {
        self.monthly_cost = self.monthly_cost + cost.monthly_cost;
        self.annual_cost = self.annual_cost + cost.annual_cost;
        self.annual_savings = self.annual_savings + cost.annual_savings;
        self.vcpu += u64::from(cost.vcpu);
        self.quantity += u64::from(cost.quantity);
    }

    fn combine(self, other: ScenarioTotal) -> ScenarioTotal {
        ScenarioTotal {
            monthly_cost: self.monthly_cost + other.monthly_cost,
            annual_cost: self.annual_cost + other.annual_cost,
            annual_savings: self.annual_savings + other.annual_savings,
            vcpu: self.vcpu + other.vcpu,
            quantity: self.quantity + other.quantity,
        }
    }
}

/// Grand totals of a portfolio across all four scenarios.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrandTotal {
    pub rows: usize,
    pub current: ScenarioTotal,
    pub hourly_optimized: ScenarioTotal,
    pub modernized: ScenarioTotal,
    pub modernized_downsized: ScenarioTotal,
}

impl GrandTotal {
    pub fn scenario(&self, scenario: Scenario) -> &ScenarioTotal {
        match scenario {
            Scenario::Current => &self.current,
            Scenario::HourlyOptimized => &self.hourly_optimized,
            Scenario::Modernized => &self.modernized,
            Scenario::ModernizedDownsized => &self.modernized_downsized,
        }
    }

    /// Adds one projection to the totals.
    pub fn accumulate(&mut self, projection: &CostProjection) {
        self.rows += 1;
        self.current.add_cost(&projection.current);
        self.hourly_optimized.add_cost(&projection.hourly_optimized);
        self.modernized.add_cost(&projection.modernized);
        self.modernized_downsized.add_cost(&projection.modernized_downsized);
    }

    /// Merges totals computed over two disjoint chunks.
    pub fn combine(self, other: GrandTotal) -> GrandTotal {
        GrandTotal {
            rows: self.rows + other.rows,
            current: self.current.combine(other.current),
            hourly_optimized: self.hourly_optimized.combine(other.hourly_optimized),
            modernized: self.modernized.combine(other.modernized),
            modernized_downsized: self.modernized_downsized.combine(other.modernized_downsized),
        }
    }
}

/// Reduces projections into grand totals. Empty input yields zeros.
pub fn aggregate<'a, I>(projections: I) -> GrandTotal
where
    I: IntoIterator<Item = &'a CostProjection>,
{
    projections
        .into_iter()
        .fold(GrandTotal::default(), |mut total, projection| {
            total.accumulate(projection);
            total
        })
}

/// Returns one page of `items`; pages are zero-based.
///
/// A page past the end is empty.
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    if page_size == 0 {
        return &[];
    }
    let start = page.saturating_mul(page_size).min(items.len());
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}
