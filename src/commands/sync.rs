//! Sync command - Pull the cloud copy, or push the local one

use anyhow::{Context, Result};
use owo_colors::OwoColorize;

use super::utils::App;

/// Execute the sync command
///
/// Pull overwrites the local cache with the cloud copy; `push` does the
/// reverse with the local cache.
pub fn execute(app: &App, push: bool) -> Result<()> {
    if !app.is_authenticated() {
        println!("로그인되어 있지 않아 이 기기에만 저장됩니다.");
        return Ok(());
    }

    if push {
        let data = app.push_data().context("Failed to push data")?;
        println!("{} {}건", "Pushed:".green(), data.payments.len());
        return Ok(());
    }

    match app.sync_data() {
        Some(data) => println!("{} {}건", "Synced:".green(), data.payments.len()),
        None => println!(
            "{}",
            "동기화하지 못했습니다. 로컬 데이터를 유지합니다.".yellow()
        ),
    }
    Ok(())
}
