use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use crate::core::models::SessionRecord;
use crate::outcome::extractor::SessionReport;

pub struct TableBuilder {
    table: Table,
}

impl TableBuilder {
    pub fn new() -> Self {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_content_arrangement(ContentArrangement::Dynamic);

        Self { table }
    }

    fn header(&mut self, titles: &[&str]) {
        self.table.set_header(
            titles
                .iter()
                .map(|t| Cell::new(t).add_attribute(Attribute::Bold))
                .collect::<Vec<_>>(),
        );
    }

    /// One row per visited URL.
    pub fn outcomes(record: &SessionRecord) -> String {
        let mut builder = Self::new();
        builder.header(&["URL", "Status", "Reason"]);

        for (url, outcome) in &record.outcomes {
            builder.table.add_row(vec![
                Cell::new(url),
                status_cell(&outcome.status),
                Cell::new(&outcome.reason),
            ]);
        }

        builder.table.to_string()
    }

    /// One row per saved session of a build.
    pub fn build_sessions(reports: &[SessionReport]) -> String {
        let mut builder = Self::new();
        builder.header(&["Session", "Device", "Browser", "Outcomes", "Skipped"]);

        for report in reports {
            let device = report.record.device_info.as_ref();
            let browser = device
                .map(|d| {
                    let name = d.browser.as_deref().unwrap_or("?");
                    match &d.browser_version {
                        Some(version) => format!("{} ({})", name, version),
                        None => name.to_string(),
                    }
                })
                .unwrap_or_default();

            let skipped = if report.skipped > 0 {
                Cell::new(report.skipped).fg(Color::Yellow)
            } else {
                Cell::new(0)
            };

            builder.table.add_row(vec![
                Cell::new(&report.session_id),
                Cell::new(device.and_then(|d| d.device.as_deref()).unwrap_or("-")),
                Cell::new(browser),
                Cell::new(report.record.outcomes.len()),
                skipped,
            ]);
        }

        builder.table.to_string()
    }
}

fn status_cell(status: &str) -> Cell {
    match status {
        "passed" => Cell::new(status).fg(Color::Green),
        "failed" => Cell::new(status).fg(Color::Red),
        _ => Cell::new(status).fg(Color::Yellow),
    }
}
