use std::io::Write;

use super::TabularError;
use crate::domain::catalog::{CatalogEntry, TEMPLATE_HEADER};
use crate::domain::projection::CostProjection;

pub const PROJECTION_HEADER: [&str; 11] = [
    "row_id",
    "region",
    "pricing_model",
    "hours",
    "scenario",
    "instance",
    "vcpu",
    "quantity",
    "monthly_cost",
    "annual_cost",
    "annual_savings",
];

/// Writes the catalog template: fixed header, then one line per entry.
pub fn write_template<W: Write>(entries: &[CatalogEntry], writer: W) -> Result<(), TabularError> {
    let mut wtr = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(writer);

    wtr.write_record(TEMPLATE_HEADER)?;
    for entry in entries {
        wtr.write_record(entry.template_record())?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes projected costs, four lines per row in scenario order.
pub fn write_projections<W: Write>(
    projections: &[CostProjection],
    writer: W,
) -> Result<(), TabularError> {
    let mut wtr = csv::Writer::from_writer(writer);

    wtr.write_record(PROJECTION_HEADER)?;
    for projection in projections {
        for (scenario, cost) in projection.scenarios() {
            wtr.write_record([
                projection.row_id.to_string(),
                projection.region.clone(),
                projection.pricing_model.as_str().to_string(),
                projection.hours.to_string(),
                scenario.label().to_string(),
                cost.instance.clone(),
                cost.vcpu.to_string(),
                cost.quantity.to_string(),
                cost.monthly_cost.to_string(),
                cost.annual_cost.to_string(),
                cost.annual_savings.to_string(),
            ])?;
        }
    }
    wtr.flush()?;
    Ok(())
}
