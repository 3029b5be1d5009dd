//! Shared utilities for commands

use anyhow::{Context, Result};
use std::io::{self, Write};
use std::path::Path;

use hyodo::config::{self, RemoteConfig};
use hyodo::ledger::LedgerData;
use hyodo::remote::RestBackend;
use hyodo::store::LocalStore;
use hyodo::Hyodo;

/// The application as the CLI runs it
pub type App = Hyodo<RestBackend>;

/// Open the local cache, connect the backend if configured and restore the session
pub fn open_app(data_dir: Option<&Path>, remote: Option<RemoteConfig>) -> Result<App> {
    let db_path = config::database_path(data_dir)?;
    let store = LocalStore::open(&db_path)
        .with_context(|| format!("Failed to open: {}", db_path.display()))?;

    let redirect_url = remote.as_ref().and_then(|r| r.redirect_url.clone());
    let backend = remote
        .as_ref()
        .map(RestBackend::new)
        .transpose()
        .context("Invalid backend configuration")?;

    let mut app = Hyodo::new(store, backend).with_redirect_url(redirect_url);
    app.init_auth();
    Ok(app)
}

/// Pull remote data when signed in, otherwise read the local cache
pub fn load_synced(app: &App) -> Result<LedgerData> {
    match app.sync_data() {
        Some(data) => Ok(data),
        None => app.load_data().context("Failed to read local data"),
    }
}

/// Ask a yes/no question on stdin; anything but `y` is no
pub fn confirm(prompt: &str) -> Result<bool> {
    print!("{} (y/N) ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

/// Use the given secret or read one from the terminal without echoing it
pub fn password_or_prompt(given: Option<String>, prompt: &str) -> Result<String> {
    if let Some(password) = given {
        return Ok(password);
    }
    rpassword::prompt_password(secret_label(prompt)).context("Failed to read password")
}

fn secret_label(prompt: &str) -> String {
    format!("{}: ", prompt)
}

/// Today's date as stored in entries
pub fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

/// Validate a `YYYY-MM-DD` date
pub fn parse_date(text: &str) -> Result<String> {
    let date = chrono::NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date (use YYYY-MM-DD): {}", text))?;
    Ok(date.format("%Y-%m-%d").to_string())
}

/// Parse a positive amount such as `1,000` or `1000원`
pub fn parse_amount(text: &str) -> Result<i64> {
    match hyodo::ledger::format::parse_money(text) {
        Some(n) if n > 0 => Ok(n),
        Some(_) => anyhow::bail!("금액은 0보다 커야 합니다."),
        None => anyhow::bail!("올바른 금액을 입력해주세요: {}", text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2024-02-29").unwrap(), "2024-02-29");
        assert!(parse_date("2023-02-29").is_err());
        assert!(parse_date("29/02/2024").is_err());
    }

    #[test]
    fn test_today_shape() {
        assert!(parse_date(&today()).is_ok());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1,000원").unwrap(), 1000);
        assert!(parse_amount("0").is_err());
        assert!(parse_amount("-5").is_err());
        assert!(parse_amount("lots").is_err());
    }

    #[test]
    fn test_password_given() {
        assert_eq!(
            password_or_prompt(Some("secret1".to_string()), "Password").unwrap(),
            "secret1"
        );
    }

    #[test]
    fn test_secret_label() {
        assert_eq!(secret_label("비밀번호"), "비밀번호: ");
    }

    #[test]
    fn test_open_app_local_only() {
        let tmp = TempDir::new().unwrap();
        let app = open_app(Some(tmp.path()), None).unwrap();
        assert!(!app.is_remote());
        assert!(!app.is_authenticated());
        assert_eq!(load_synced(&app).unwrap(), LedgerData::default());
    }
}
