//! Cost Projection Calculator - per-row scenario costs.
//!
//! Every figure is rounded to cents at each derivation step (monthly
//! first, then annual) so totals match what the cost-advice view shows.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::constants::CostConstants;
use crate::domain::foundation::{Money, RowId};
use crate::domain::instance::{extract_vcpu, replace_vcpu_token, InstanceRow, PricingModel};

/// The four projection variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    Current,
    HourlyOptimized,
    Modernized,
    ModernizedDownsized,
}

impl Scenario {
    pub const ALL: [Scenario; 4] = [
        Scenario::Current,
        Scenario::HourlyOptimized,
        Scenario::Modernized,
        Scenario::ModernizedDownsized,
    ];

    /// Returns the display label for this scenario.
    pub fn label(&self) -> &'static str {
        match self {
            Scenario::Current => "Current",
            Scenario::HourlyOptimized => "Hourly optimized",
            Scenario::Modernized => "Modernized",
            Scenario::ModernizedDownsized => "Modernized + downsized",
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Cost of one row under one scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioCost {
    /// Instance label shown for this scenario.
    pub instance: String,
    pub vcpu: u32,
    pub quantity: u32,
    pub monthly_cost: Money,
    pub annual_cost: Money,
    /// Annual cost avoided compared to the current scenario.
    pub annual_savings: Money,
}

/// Derived cost figures for one row. Never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostProjection {
    pub row_id: RowId,
    pub region: String,
    pub pricing_model: PricingModel,
    pub hours: u32,
    pub current: ScenarioCost,
    pub hourly_optimized: ScenarioCost,
    pub modernized: ScenarioCost,
    pub modernized_downsized: ScenarioCost,
}

impl CostProjection {
    pub fn scenario(&self, scenario: Scenario) -> &ScenarioCost {
        match scenario {
            Scenario::Current => &self.current,
            Scenario::HourlyOptimized => &self.hourly_optimized,
            Scenario::Modernized => &self.modernized,
            Scenario::ModernizedDownsized => &self.modernized_downsized,
        }
    }

    /// Iterates the scenarios in display order.
    pub fn scenarios(&self) -> impl Iterator<Item = (Scenario, &ScenarioCost)> {
        Scenario::ALL.into_iter().map(move |s| (s, self.scenario(s)))
    }
}

/// Pure calculator mapping rows to projections.
///
/// Output depends only on the row and the constants, so results are safe
/// to memoize per row.
#[derive(Debug, Clone, Default)]
pub struct CostProjector {
    constants: CostConstants,
}

impl CostProjector {
    pub fn new(constants: CostConstants) -> Self {
        Self { constants }
    }

    pub fn constants(&self) -> &CostConstants {
        &self.constants
    }

    /// Projects one row into all four scenarios.
    pub fn project(&self, row: &InstanceRow) -> CostProjection {
        let c = &self.constants;
        let vcpu = extract_vcpu(&row.size, c.default_vcpu);

        let monthly = Money::from_major(
            c.base_hourly_rate * f64::from(vcpu) * f64::from(row.hours) * f64::from(row.quantity),
        );
        let current = self.scenario_cost(row.size.clone(), vcpu, row.quantity, monthly, None);
        let current_annual = current.annual_cost;

        let hourly_optimized = self.scenario_cost(
            row.size.replacen("standard", "optimized", 1),
            vcpu,
            row.quantity,
            monthly.scale(c.optimized_factor),
            Some(current_annual),
        );

        let modernized = self.scenario_cost(
            format!("e2-{}", row.size),
            vcpu,
            row.quantity,
            monthly.scale(c.modernized_factor),
            Some(current_annual),
        );

        let half = vcpu / 2;
        let modernized_downsized = self.scenario_cost(
            replace_vcpu_token(&row.size, half),
            half,
            row.quantity,
            monthly.scale(c.downsized_factor),
            Some(current_annual),
        );

        CostProjection {
            row_id: row.id,
            region: row.region.clone(),
            pricing_model: row.pricing_model,
            hours: row.hours,
            current,
            hourly_optimized,
            modernized,
            modernized_downsized,
        }
    }

    /// Projects every row, preserving input order.
    pub fn project_all(&self, rows: &[InstanceRow]) -> Vec<CostProjection> {
        rows.iter().map(|row| self.project(row)).collect()
    }

    fn scenario_cost(
        &self,
        instance: String,
        vcpu: u32,
        quantity: u32,
        monthly_cost: Money,
        baseline_annual: Option<Money>,
    ) -> ScenarioCost {
        let annual_cost = monthly_cost * 12;
        ScenarioCost {
            instance,
            vcpu,
            quantity,
            monthly_cost,
            annual_cost,
            annual_savings: baseline_annual.map_or(Money::ZERO, |base| base - annual_cost),
        }
    }
}

/// Projects a row with the default constants.
pub fn project(row: &InstanceRow) -> CostProjection {
    CostProjector::default().project(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::instance::{HOURS_PER_MONTH, MAX_QUANTITY};
    use crate::domain::projection::aggregate;

    fn row(size: &str, quantity: u32, hours: u32) -> InstanceRow {
        InstanceRow {
            id: RowId::new(),
            region: "us-east-1".to_string(),
            size: size.to_string(),
            quantity,
            hours,
            pricing_model: PricingModel::OnDemand,
        }
    }

    #[test]
    fn projects_reference_row() {
        let p = project(&row("c5a.24xlarge", 2, 1000));

        assert_eq!(p.current.vcpu, 24);
        assert_eq!(p.current.monthly_cost, Money::from_cents(240_000));
        assert_eq!(p.current.annual_cost, Money::from_cents(2_880_000));
        assert_eq!(p.current.annual_savings, Money::ZERO);

        assert_eq!(p.hourly_optimized.monthly_cost, Money::from_cents(192_000));
        assert_eq!(p.modernized.monthly_cost, Money::from_cents(175_200));

        assert_eq!(p.modernized_downsized.vcpu, 12);
        assert_eq!(p.modernized_downsized.instance, "c5a.12xlarge");
        assert_eq!(p.modernized_downsized.monthly_cost, Money::from_cents(96_000));
        assert_eq!(p.modernized_downsized.annual_cost, Money::from_cents(1_152_000));
        assert_eq!(p.modernized_downsized.annual_savings, Money::from_cents(1_728_000));
    }

    #[test]
    fn labels_follow_scenario_rules() {
        let p = project(&row("n2-standard-16", 1, 730));

        assert_eq!(p.current.instance, "n2-standard-16");
        assert_eq!(p.hourly_optimized.instance, "n2-optimized-16");
        assert_eq!(p.modernized.instance, "e2-n2-standard-16");
        assert_eq!(p.modernized_downsized.instance, "n2-standard-8");
        assert_eq!(p.modernized_downsized.vcpu, 8);
    }

    #[test]
    fn optimized_label_is_unchanged_without_standard() {
        let p = project(&row("m5.xlarge", 1, 730));
        assert_eq!(p.hourly_optimized.instance, "m5.xlarge");
    }

    #[test]
    fn missing_vcpu_token_uses_default() {
        let p = project(&row("custom", 1, 100));
        assert_eq!(p.current.vcpu, 8);
        // 0.05 * 8 * 100 * 1
        assert_eq!(p.current.monthly_cost, Money::from_cents(4_000));
        assert_eq!(p.modernized_downsized.vcpu, 4);
        assert_eq!(p.modernized_downsized.instance, "custom");
    }

    #[test]
    fn annual_is_derived_from_rounded_monthly() {
        // 0.05 * 3 * 7 * 1 = 1.05 → modernized 0.7665 → 0.77 → annual 9.24
        let p = project(&row("x-3", 1, 7));
        assert_eq!(p.current.monthly_cost, Money::from_cents(105));
        assert_eq!(p.modernized.monthly_cost, Money::from_cents(77));
        assert_eq!(p.modernized.annual_cost, Money::from_cents(924));
    }

    #[test]
    fn projection_is_pure() {
        let r = row("m5.4xlarge", 3, 2000);
        assert_eq!(project(&r), project(&r));
    }

    #[test]
    fn custom_constants_change_the_rate() {
        let projector = CostProjector::new(CostConstants {
            base_hourly_rate: 0.10,
            ..CostConstants::default()
        });
        let p = projector.project(&row("c5a.24xlarge", 2, 1000));
        assert_eq!(p.current.monthly_cost, Money::from_cents(480_000));
    }

    #[test]
    fn largest_row_projects_without_overflow() {
        let quantity = MAX_QUANTITY;
        let p = project(&row("c5a.24xlarge", quantity, quantity * HOURS_PER_MONTH));

        // 0.05 * 24 * 73_000_000 * 100_000 is about 8.76e12 per month
        assert!(p.current.monthly_cost > Money::from_cents(870_000_000_000_000));
        assert_eq!(p.current.annual_cost, p.current.monthly_cost * 12);
        assert!(p.modernized_downsized.annual_savings > Money::ZERO);

        let total = aggregate(&vec![p.clone(); 1_000]);
        assert_eq!(total.current.annual_cost, Money::from_cents(i64::MAX));
    }

    #[test]
    fn huge_vcpu_token_saturates_instead_of_panicking() {
        let p = project(&row("x-4294967295", MAX_QUANTITY, MAX_QUANTITY * HOURS_PER_MONTH));
        assert_eq!(p.current.vcpu, u32::MAX);
        assert_eq!(p.current.monthly_cost, Money::from_cents(i64::MAX));
        assert_eq!(p.current.annual_cost, Money::from_cents(i64::MAX));
    }

    #[test]
    fn scenarios_iterate_in_display_order() {
        let p = project(&row("m5.2xlarge", 1, 730));
        let order: Vec<Scenario> = p.scenarios().map(|(s, _)| s).collect();
        assert_eq!(order, Scenario::ALL.to_vec());
    }
}
