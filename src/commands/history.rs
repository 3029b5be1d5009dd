//! History command - List payment and spend entries

use anyhow::Result;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, CellAlignment, ContentArrangement, Table};

use super::utils::{self, App};
use hyodo::ledger::{format_money, EntryType, LedgerData};

/// Options for the history command
#[derive(Debug, Default)]
pub struct HistoryOptions {
    /// Only show entries of this type
    pub kind: Option<EntryType>,
    /// Limit number of rows
    pub limit: Option<usize>,
    /// Show entry ids (needed for edit/remove)
    pub with_id: bool,
}

/// Render the history table, newest first
pub fn render(data: &LedgerData, options: &HistoryOptions) -> String {
    let mut entries = data.history();
    if let Some(kind) = options.kind {
        entries.retain(|e| e.kind() == kind);
    }

    let total_count = entries.len();
    if total_count == 0 {
        return "기록이 없습니다.".to_string();
    }
    if let Some(n) = options.limit {
        entries.truncate(n);
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic);

    let mut header = vec![];
    if options.with_id {
        header.push(Cell::new("ID"));
    }
    header.push(Cell::new("날짜"));
    header.push(Cell::new("구분"));
    header.push(Cell::new("금액"));
    header.push(Cell::new("메모"));
    table.set_header(header);

    for entry in &entries {
        let amount = match entry.kind() {
            EntryType::Repayment => format_money(entry.amount),
            EntryType::Spend => format!("+{}", format_money(entry.amount)),
        };

        let mut row = vec![];
        if options.with_id {
            row.push(Cell::new(&entry.id));
        }
        row.push(Cell::new(&entry.date));
        row.push(Cell::new(entry.kind().label()));
        row.push(Cell::new(amount).set_alignment(CellAlignment::Right));
        row.push(Cell::new(&entry.memo));
        table.add_row(row);
    }

    let mut output = table.to_string();
    if entries.len() < total_count {
        output.push_str(&format!("\n\n{}건 중 {}건 표시", total_count, entries.len()));
    } else {
        output.push_str(&format!("\n\n총 {}건", total_count));
    }
    output
}

/// Execute the history command
pub fn execute(app: &App, options: &HistoryOptions) -> Result<()> {
    let data = utils::load_synced(app)?;
    println!("{}", render(&data, options));
    Ok(())
}
