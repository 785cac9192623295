//! Cost report: per-row projections plus grand totals for one row set.

use serde::Serialize;

use crate::domain::instance::InstanceRow;
use crate::domain::projection::{aggregate, paginate, CostProjection, CostProjector, GrandTotal};

/// Everything the cost-advice view renders for a portfolio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CostReport {
    projections: Vec<CostProjection>,
    totals: GrandTotal,
}

impl CostReport {
    pub fn build(projector: &CostProjector, rows: &[InstanceRow]) -> Self {
        let projections = projector.project_all(rows);
        let totals = aggregate(&projections);
        Self {
            projections,
            totals,
        }
    }

    pub fn projections(&self) -> &[CostProjection] {
        &self.projections
    }

    pub fn totals(&self) -> &GrandTotal {
        &self.totals
    }

    /// One table page of projections; totals always cover every row.
    pub fn page(&self, page: usize, page_size: usize) -> &[CostProjection] {
        paginate(&self.projections, page, page_size)
    }

    pub fn page_count(&self, page_size: usize) -> usize {
        if page_size == 0 {
            return 0;
        }
        self.projections.len().div_ceil(page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{Money, RowId};
    use crate::domain::instance::PricingModel;

    fn row(size: &str, quantity: u32, hours: u32) -> InstanceRow {
        InstanceRow {
            id: RowId::new(),
            region: "us-east-1".to_string(),
            size: size.to_string(),
            quantity,
            hours,
            pricing_model: PricingModel::Reserved,
        }
    }

    #[test]
    fn totals_cover_all_pages() {
        let rows: Vec<_> = (0..5).map(|_| row("c5a.24xlarge", 2, 1000)).collect();
        let report = CostReport::build(&CostProjector::default(), &rows);

        assert_eq!(report.page_count(2), 3);
        assert_eq!(report.page(2, 2).len(), 1);
        assert_eq!(report.totals().rows, 5);
        assert_eq!(report.totals().current.monthly_cost, Money::from_cents(1_200_000));
        assert_eq!(
            report.totals().modernized_downsized.annual_savings,
            Money::from_cents(8_640_000)
        );
    }

    #[test]
    fn empty_rows_give_empty_report() {
        let report = CostReport::build(&CostProjector::default(), &[]);
        assert!(report.projections().is_empty());
        assert_eq!(*report.totals(), GrandTotal::default());
        assert_eq!(report.page_count(10), 0);
        assert_eq!(report.page_count(0), 0);
    }
}
