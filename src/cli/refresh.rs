use super::ui;
use crate::refresh::{PriceRefresher, RefreshReport};
use anyhow::Result;
use comfy_table::{Cell, Color};

pub fn render_report(report: &RefreshReport) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Products"),
        ui::header_cell("Updated"),
        ui::header_cell("Failed"),
    ]);
    table.add_row(vec![
        Cell::new(report.total),
        ui::count_cell(report.succeeded, Color::Green),
        ui::count_cell(report.failed, Color::Red),
    ]);

    let mut output = table.to_string();
    if !report.failures.is_empty() {
        output.push_str("\n\n");
        output.push_str(&ui::style_text("Failures", ui::StyleType::TotalLabel));
        for failure in &report.failures {
            output.push_str(&format!(
                "\n  {}: {}",
                failure.product_id,
                ui::style_text(&failure.error, ui::StyleType::Error)
            ));
        }
    }
    output
}

pub async fn run_refresh(refresher: &PriceRefresher) -> Result<()> {
    let pb = ui::new_spinner("Refreshing product prices...");
    let result = refresher.refresh_all_prices().await;
    pb.finish_and_clear();

    let report = result?;
    println!("{}", render_report(&report));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refresh::RefreshFailure;
    use chrono::Utc;

    #[test]
    fn test_render_report_lists_failures() {
        console::set_colors_enabled(false);
        let now = Utc::now();
        let report = RefreshReport {
            total: 3,
            succeeded: 2,
            failed: 1,
            failures: vec![RefreshFailure {
                product_id: "ring-7".to_string(),
                error: "validation failed: karat must be between 1 and 24, got 0".to_string(),
            }],
            started_at: now,
            finished_at: now,
        };

        let output = render_report(&report);
        assert!(output.contains("Updated"));
        assert!(output.contains("ring-7: validation failed"));
    }
}
