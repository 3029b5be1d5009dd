//! Full-overwrite synchronization against the hosted tables
//!
//! `push` replaces the remote copy wholesale: the profile total is upserted,
//! every payment row of the user is deleted, then the local list is inserted.

use super::{Backend, PaymentRow, ProfileRow, Session};
use crate::error::Result;
use crate::ledger::{EntryType, LedgerData, PaymentEntry};

/// Read the signed-in user's data from the remote store
///
/// Returns `None` when the session no longer identifies a user.
pub fn pull<B: Backend + ?Sized>(backend: &B, session: &Session) -> Result<Option<LedgerData>> {
    let Some(user) = backend.get_user(session)? else {
        return Ok(None);
    };

    let total_amount = backend
        .select_profile_total(session, &user.id)?
        .unwrap_or(0);
    let payments = backend
        .select_payments(session, &user.id)?
        .into_iter()
        .map(row_to_entry)
        .collect();

    tracing::debug!("Pulled remote data for {}", user.display_name());

    Ok(Some(LedgerData {
        total_amount,
        payments,
    }))
}

/// Overwrite the signed-in user's remote data with `data`
pub fn push<B: Backend + ?Sized>(backend: &B, session: &Session, data: &LedgerData) -> Result<()> {
    let Some(user) = backend.get_user(session)? else {
        return Ok(());
    };

    backend.upsert_profile(
        Some(session),
        &ProfileRow {
            id: user.id.clone(),
            nickname: None,
            total_amount: Some(data.total_amount),
        },
    )?;

    backend.delete_payments(session, &user.id)?;

    if !data.payments.is_empty() {
        let rows: Vec<PaymentRow> = data
            .payments
            .iter()
            .map(|p| entry_to_row(p, &user.id))
            .collect();
        if let Err(e) = backend.insert_payments(session, &rows) {
            tracing::error!("Data push error: {}", e);
            return Err(e);
        }
    }

    tracing::debug!(
        "Pushed {} entries for {}",
        data.payments.len(),
        user.display_name()
    );
    Ok(())
}

fn row_to_entry(row: PaymentRow) -> PaymentEntry {
    let entry_type = match row.entry_type.as_deref() {
        Some("spend") => EntryType::Spend,
        _ => EntryType::Repayment,
    };
    PaymentEntry {
        id: row.id,
        date: row.date,
        amount: row.amount,
        memo: row.memo.unwrap_or_default(),
        entry_type: Some(entry_type),
    }
}

fn entry_to_row(entry: &PaymentEntry, user_id: &str) -> PaymentRow {
    PaymentRow {
        id: entry.id.clone(),
        user_id: user_id.to_string(),
        date: entry.date.clone(),
        amount: entry.amount,
        memo: Some(entry.memo.clone()),
        entry_type: Some(entry.kind().as_str().to_string()),
    }
}
