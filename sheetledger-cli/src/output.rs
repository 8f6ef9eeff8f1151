//! Output formatting utilities

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, ContentArrangement, Table};

use sheetledger_core::{Income, Payment};

pub fn success(msg: &str) {
    println!("{}", msg.green());
}

pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

pub fn info(msg: &str) {
    println!("{}", msg.cyan());
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Format bytes as human-readable size
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

fn or_dash(s: &str) -> String {
    if s.is_empty() {
        "-".to_string()
    } else {
        s.to_string()
    }
}

/// A record that can be shown as a table row
pub trait TableRow {
    fn headers() -> Vec<&'static str>;
    fn cells(&self) -> Vec<String>;
}

impl TableRow for Payment {
    fn headers() -> Vec<&'static str> {
        vec!["Date", "Beneficiary", "Account", "Project", "Description", "Total"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.date.to_string(),
            or_dash(&self.beneficiary),
            self.account.clone(),
            self.project.clone(),
            or_dash(&self.description),
            self.total.to_string(),
        ]
    }
}

impl TableRow for Income {
    fn headers() -> Vec<&'static str> {
        vec!["Date", "Project", "Unit", "Client", "Total", "Method", "Proof"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.date.to_string(),
            self.project.clone(),
            or_dash(&self.unit),
            self.client.clone(),
            self.total.to_string(),
            or_dash(&self.payment_method),
            or_dash(&self.payment_proof),
        ]
    }
}

/// Table of the first `limit` records
pub fn record_table<R: TableRow>(records: &[R], limit: usize) -> Table {
    let mut table = create_table();
    table.set_header(R::headers());
    for record in records.iter().take(limit) {
        table.add_row(record.cells());
    }
    table
}
