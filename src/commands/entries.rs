//! Entry commands - Set the target amount, add, edit and remove entries

use anyhow::{bail, Context, Result};
use owo_colors::OwoColorize;

use super::utils::{self, App};
use hyodo::ledger::{format_money, generate_id, EntryType, LedgerData, PaymentEntry};

/// A new entry as typed on the command line
#[derive(Debug)]
pub struct NewEntry {
    pub amount: String,
    pub date: Option<String>,
    pub memo: Option<String>,
    pub kind: EntryType,
}

/// Changes to an existing entry; `None` leaves a field alone
#[derive(Debug, Default)]
pub struct EntryEdit {
    pub amount: Option<String>,
    pub date: Option<String>,
    pub memo: Option<String>,
    pub kind: Option<EntryType>,
}

/// Build a ledger entry from command-line input
pub fn build_entry(input: &NewEntry) -> Result<PaymentEntry> {
    let date = match &input.date {
        Some(d) => utils::parse_date(d)?,
        None => utils::today(),
    };
    Ok(PaymentEntry {
        id: generate_id(),
        date,
        amount: utils::parse_amount(&input.amount)?,
        memo: input.memo.clone().unwrap_or_default().trim().to_string(),
        entry_type: Some(input.kind),
    })
}

/// Apply an edit to the entry with `id`
pub fn apply_edit(data: &mut LedgerData, id: &str, edit: &EntryEdit) -> Result<()> {
    let amount = edit.amount.as_deref().map(utils::parse_amount).transpose()?;
    let date = edit.date.as_deref().map(utils::parse_date).transpose()?;

    let entry = data
        .find_mut(id)
        .with_context(|| format!("기록을 찾을 수 없습니다: {}", id))?;
    if let Some(amount) = amount {
        entry.amount = amount;
    }
    if let Some(date) = date {
        entry.date = date;
    }
    if let Some(memo) = &edit.memo {
        entry.memo = memo.trim().to_string();
    }
    if let Some(kind) = edit.kind {
        entry.entry_type = Some(kind);
    }
    Ok(())
}

/// Execute the set-total command
pub fn set_total(app: &App, amount: &str) -> Result<()> {
    let total = match hyodo::ledger::format::parse_money(amount) {
        Some(n) if n >= 0 => n,
        _ => bail!("올바른 금액을 입력해주세요: {}", amount),
    };

    let mut data = utils::load_synced(app)?;
    data.total_amount = total;
    app.save_data(&data).context("Failed to save data")?;

    println!("{} 목표 금액 {}", "Saved:".green(), format_money(total));
    Ok(())
}

/// Execute the add command
pub fn add(app: &App, input: &NewEntry) -> Result<()> {
    let entry = build_entry(input)?;

    let mut data = utils::load_synced(app)?;
    let summary = format!(
        "{} {} {} ({})",
        entry.date,
        entry.kind().label(),
        format_money(entry.amount),
        entry.id
    );
    data.payments.push(entry);
    app.save_data(&data).context("Failed to save data")?;

    println!("{} {}", "Added:".green(), summary);
    Ok(())
}

/// Execute the edit command
pub fn edit(app: &App, id: &str, changes: &EntryEdit) -> Result<()> {
    let mut data = utils::load_synced(app)?;
    apply_edit(&mut data, id, changes)?;
    app.save_data(&data).context("Failed to save data")?;

    println!("{} {}", "Updated:".green(), id);
    Ok(())
}

/// Execute the remove command
pub fn remove(app: &App, id: &str, yes: bool) -> Result<()> {
    let mut data = utils::load_synced(app)?;

    let Some(entry) = data.find(id) else {
        bail!("기록을 찾을 수 없습니다: {}", id);
    };
    let description = format!(
        "{} {} {}",
        entry.date,
        entry.kind().label(),
        format_money(entry.amount)
    );

    if !yes && !utils::confirm(&format!("삭제할까요? {}", description))? {
        println!("Aborted.");
        return Ok(());
    }

    data.remove(id);
    app.save_data(&data).context("Failed to save data")?;

    println!("{} {}", "Deleted:".green(), description);
    Ok(())
}
