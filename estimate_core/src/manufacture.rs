//! # Manufacture Estimate
//!
//! Shop labor priced from project-wide LF and panel counts. One row per
//! exterior LF, one per interior wall kind, and one for panel handling.

use serde::{Deserialize, Serialize};

use crate::calculations::{sum_subtotals, LineItem, Row};
use crate::project::ProjectAggregate;
use crate::settings::ManufactureRates;
use crate::wall_group::WallKind;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ManufactureEstimate {
    pub rows: Vec<LineItem>,
    pub total: f64,
}

impl ManufactureEstimate {
    pub fn calculate(aggregate: &ProjectAggregate, rates: &ManufactureRates) -> Self {
        let mut rows = vec![LineItem::new(
            "Exterior walls",
            Row::at_rate(aggregate.exterior_lf, "lf", rates.per_lf(WallKind::Exterior)),
        )];
        for kind in WallKind::INTERIOR {
            let lf = aggregate.interior_lf.get(&kind).copied().unwrap_or(0.0);
            rows.push(LineItem::new(
                format!("{} walls", kind.display_name()),
                Row::at_rate(lf, "lf", rates.per_lf(kind)),
            ));
        }
        rows.push(LineItem::new(
            "Panels",
            Row::at_rate(aggregate.panels as f64, "panel", rates.per_panel),
        ));

        let total = sum_subtotals(rows.iter().map(|l| &l.row));
        ManufactureEstimate { rows, total }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_per_kind_and_panels() {
        let mut aggregate = ProjectAggregate {
            exterior_lf: 120.0,
            panels: 17,
            ..Default::default()
        };
        aggregate.interior_lf.insert(WallKind::Partition, 80.0);
        aggregate.interior_lf.insert(WallKind::Shear, 10.0);

        let rates = ManufactureRates {
            exterior_per_lf: 5.0,
            partition_per_lf: 2.0,
            shear_per_lf: 4.0,
            per_panel: 25.0,
            ..Default::default()
        };
        let estimate = ManufactureEstimate::calculate(&aggregate, &rates);

        assert_eq!(estimate.rows.len(), 6);
        assert_eq!(estimate.rows[0].row.subtotal, 600.0);
        assert_eq!(estimate.rows[5].row.qty_final, 17);
        assert_eq!(estimate.total, 600.0 + 160.0 + 40.0 + 425.0);
    }

    #[test]
    fn test_fractional_lf_is_not_rounded_up() {
        let aggregate = ProjectAggregate {
            exterior_lf: 120.5,
            ..Default::default()
        };
        let rates = ManufactureRates {
            exterior_per_lf: 4.0,
            ..Default::default()
        };
        let estimate = ManufactureEstimate::calculate(&aggregate, &rates);
        assert_eq!(estimate.rows[0].row.subtotal, 482.0);
        assert_eq!(estimate.total, 482.0);
    }

    #[test]
    fn test_zero_rates_cost_nothing() {
        let aggregate = ProjectAggregate {
            exterior_lf: 50.0,
            panels: 7,
            ..Default::default()
        };
        let estimate = ManufactureEstimate::calculate(&aggregate, &ManufactureRates::default());
        assert_eq!(estimate.total, 0.0);
        assert_eq!(estimate.rows[0].row.qty_final, 50);
    }
}
