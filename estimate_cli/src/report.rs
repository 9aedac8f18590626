//! Plain-text rendering of project summaries and catalog listings.

use std::fmt::Write;

use estimate_core::calculations::{LineItem, Row};
use estimate_core::catalog::Catalog;
use estimate_core::level::LevelSummary;
use estimate_core::project::{Project, ProjectSummary};
use estimate_core::wall_group::GroupSummary;

const RULE: &str = "═══════════════════════════════════════════════════════════════";

fn row_line(out: &mut String, label: &str, row: &Row) {
    let _ = writeln!(
        out,
        "    {:<34} {:>6} {:<6} @ {:>9.2} = {:>11.2}",
        label, row.qty_final, row.unit, row.unit_price, row.subtotal
    );
}

fn lines(out: &mut String, items: &[LineItem]) {
    for item in items {
        row_line(out, &item.label, &item.row);
    }
}

fn group(out: &mut String, summary: &GroupSummary) {
    let _ = writeln!(
        out,
        "  {} [{}] {:.1} LF, {} panels",
        summary.name,
        summary.kind.display_name(),
        summary.stats.length_lf,
        summary.stats.panels
    );
    lines(out, &summary.rows);
    lines(out, &summary.extras);
    let _ = writeln!(out, "    {:<34} {:>48.2}", "Group subtotal", summary.subtotal);
}

fn level(out: &mut String, summary: &LevelSummary) {
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "  {}", summary.name);
    let _ = writeln!(out, "{RULE}");

    for g in summary.exterior.iter().chain(&summary.interior) {
        group(out, g);
        let _ = writeln!(out);
    }

    let _ = writeln!(out, "  Loose materials");
    for line in &summary.loose {
        row_line(out, line.label(), &line.row);
    }
    lines(out, &summary.panel_nails);
    let _ = writeln!(out, "    {:<34} {:>48.2}", "Loose subtotal", summary.loose_subtotal);
    let _ = writeln!(out);

    let _ = writeln!(out, "  Nails and bracing");
    lines(out, &summary.nails_bracing.lines());
    let _ = writeln!(out);
    let _ = writeln!(out, "  {:<36} {:>48.2}", "Level total", summary.level_total);
}

/// Full text report for a project summary.
pub fn render_summary(project: &Project, summary: &ProjectSummary) -> String {
    let mut out = String::new();
    let meta = &project.meta;
    let _ = writeln!(out, "Job {}  {}  (estimator: {})", meta.job_id, meta.client, meta.estimator);
    let _ = writeln!(out);

    for l in &summary.levels {
        level(&mut out, l);
        let _ = writeln!(out);
    }

    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "  Manufacture");
    lines(&mut out, &summary.manufacture.rows);
    let _ = writeln!(out);

    let aggregate = &summary.aggregate;
    let _ = writeln!(out, "  Exterior LF:      {:>10.1}", aggregate.exterior_lf);
    let _ = writeln!(out, "  Interior LF:      {:>10.1}", aggregate.interior_lf_total());
    let _ = writeln!(out, "  Panels:           {:>10}", aggregate.panels);
    let _ = writeln!(out);
    let _ = writeln!(out, "  Levels:           {:>12.2}", summary.levels_total);
    let _ = writeln!(out, "  Manufacture:      {:>12.2}", summary.manufacture.total);
    let _ = writeln!(out, "  Nails & bracing:  {:>12.2}", summary.nails_bracing_total);
    let _ = writeln!(out, "  GRAND TOTAL:      {:>12.2}", summary.grand_total);
    out
}

/// Vendors, a vendor's families, or a family's sizes depending on the filters.
pub fn render_catalog(catalog: &Catalog, vendor: Option<&str>, family: Option<&str>) -> String {
    let mut out = String::new();
    match (vendor, family) {
        (None, _) => {
            for v in catalog.vendors() {
                let label = if v.is_empty() { "(no vendor)" } else { v };
                let _ = writeln!(out, "{label}");
            }
        }
        (Some(v), None) => {
            for f in catalog.families(v) {
                let _ = writeln!(out, "{f}");
            }
        }
        (Some(v), Some(f)) => {
            for item in catalog.sizes(v, f) {
                let _ = writeln!(
                    out,
                    "{:<24} {:<6} {:>9.2}",
                    item.size_label,
                    item.unit,
                    item.unit_price()
                );
            }
        }
    }
    out
}
