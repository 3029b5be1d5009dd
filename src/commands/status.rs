//! Status command - Show the repayment summary (home view)

use anyhow::Result;
use owo_colors::OwoColorize;

use super::utils::{self, App};
use hyodo::ledger::{format_money, totals, LedgerData};

/// Totals derived from the ledger
#[derive(Debug, Default, PartialEq)]
pub struct Summary {
    /// Target repayment amount
    pub target: i64,

    /// Target plus spends
    pub effective: i64,

    pub paid: i64,

    pub spent: i64,

    /// Still owed (negative when overpaid)
    pub remaining: i64,

    pub progress: f64,

    pub entries: usize,
}

pub fn summarize(data: &LedgerData) -> Summary {
    Summary {
        target: data.total_amount,
        effective: totals::effective_total(data),
        paid: totals::paid_total(data),
        spent: totals::spend_total(data),
        remaining: totals::remaining(data),
        progress: totals::progress_percent(data),
        entries: data.payments.len(),
    }
}

/// Width of the text progress bar
const BAR_WIDTH: usize = 20;

fn progress_bar(percent: f64) -> String {
    let filled = ((percent / 100.0) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

/// Format the summary for display
pub fn format_summary(summary: &Summary, user: Option<&str>) -> String {
    let mut lines = vec![];

    match user {
        Some(u) => lines.push(format!("사용자: {}", u)),
        None => lines.push("사용자: (로그인 안 됨, 이 기기에만 저장)".to_string()),
    }
    lines.push(String::new());

    lines.push(format!("목표 금액: {}", format_money(summary.target)));
    if summary.spent > 0 {
        lines.push(format!("추가 대출: {}", format_money(summary.spent)));
        lines.push(format!("총 갚을 돈: {}", format_money(summary.effective)));
    }
    lines.push(format!("갚은 돈: {}", format_money(summary.paid)));

    if summary.remaining <= 0 && summary.effective > 0 {
        lines.push(format!("남은 돈: {}", "0원 (완납!)".green()));
    } else {
        lines.push(format!("남은 돈: {}", format_money(summary.remaining.max(0))));
    }

    lines.push(format!(
        "진행률: {} {:.1}%",
        progress_bar(summary.progress),
        summary.progress
    ));
    lines.push(format!("기록: {}건", summary.entries));

    lines.join("\n")
}

/// Execute the status command
pub fn execute(app: &App) -> Result<()> {
    let data = utils::load_synced(app)?;
    println!("{}", format_summary(&summarize(&data), app.current_user()));
    Ok(())
}
