//! Account commands - signup, login, logout and profile changes

use anyhow::{Context, Result};
use owo_colors::OwoColorize;

use super::utils::{self, App};
use hyodo::account::SignupOutcome;

/// Execute the signup command
pub fn signup(
    app: &mut App,
    email: &str,
    password: Option<String>,
    nickname: Option<&str>,
) -> Result<()> {
    let password = utils::password_or_prompt(password, "비밀번호 (6자 이상)")?;
    let outcome = app.signup(email, &password, nickname)?;

    println!("{}", outcome.message().green());
    if outcome == SignupOutcome::SignedIn {
        println!("로그인: {}", email);
        sync_after_login(app);
    }
    Ok(())
}

/// Execute the login command
pub fn login(app: &mut App, email: &str, password: Option<String>) -> Result<()> {
    let password = utils::password_or_prompt(password, "비밀번호")?;
    app.login(email, &password)?;

    println!("{} {}", "로그인:".green(), email);
    sync_after_login(app);
    Ok(())
}

fn sync_after_login(app: &App) {
    if let Some(data) = app.sync_data() {
        println!("클라우드에서 {}건을 불러왔습니다.", data.payments.len());
    }
}

/// Execute the logout command
pub fn logout(app: &mut App) -> Result<()> {
    let Some(user) = app.current_user().map(str::to_string) else {
        println!("로그인되어 있지 않습니다.");
        return Ok(());
    };
    app.logout()?;
    println!("{} {}", "로그아웃:".green(), user);
    Ok(())
}

/// Execute the whoami command
pub fn whoami(app: &App) -> Result<()> {
    match app.session() {
        Some(session) => {
            println!("{}", session.user.display_name());
            if let Some(nickname) = session.user.nickname() {
                println!("닉네임: {}", nickname);
            }
        }
        None => {
            println!("로그인되어 있지 않습니다.");
            if let Some(last) = app.last_user() {
                println!("마지막 로그인: {}", last.dimmed());
            }
            if !app.is_remote() {
                println!(
                    "{}",
                    "클라우드 백엔드가 설정되지 않았습니다 (HYODO_SUPABASE_URL).".dimmed()
                );
            }
        }
    }
    Ok(())
}

/// Execute the delete-account command
pub fn delete_account(app: &mut App, yes: bool) -> Result<()> {
    if !app.is_authenticated() {
        anyhow::bail!(hyodo::Error::NotAuthenticated);
    }
    if !yes && !utils::confirm("정말로 탈퇴하시겠습니까? 모든 데이터가 삭제됩니다.")? {
        println!("Aborted.");
        return Ok(());
    }
    app.delete_account()?;
    println!("{}", "탈퇴되었습니다.".green());
    Ok(())
}

/// Execute the reset-password command
pub fn reset_password(app: &App, email: &str) -> Result<()> {
    app.reset_password(email)?;
    println!("비밀번호 재설정 메일을 보냈습니다: {}", email);
    Ok(())
}

/// Execute the set-password command
pub fn set_password(app: &App, password: Option<String>) -> Result<()> {
    let password = utils::password_or_prompt(password, "새 비밀번호 (6자 이상)")?;
    app.update_password(&password)
        .context("비밀번호를 변경하지 못했습니다")?;
    println!("{}", "비밀번호가 변경되었습니다.".green());
    Ok(())
}

/// Execute the set-nickname command
pub fn set_nickname(app: &mut App, nickname: &str) -> Result<()> {
    app.update_nickname(nickname)?;
    println!("{} {}", "닉네임 변경:".green(), nickname);
    Ok(())
}

/// Execute the find-email command
pub fn find_email(app: &App, nickname: &str) -> Result<()> {
    let email = app.find_email_by_nickname(nickname)?;
    println!("{}", email);
    Ok(())
}

/// Execute the login-log command
pub fn login_log(app: &App, limit: Option<usize>) -> Result<()> {
    let log = app.store().login_log();
    if log.is_empty() {
        println!("기록이 없습니다.");
        return Ok(());
    }

    let skip = limit.map(|n| log.len().saturating_sub(n)).unwrap_or(0);
    for entry in log.iter().skip(skip) {
        println!(
            "{}  {:<15} {}",
            entry.time.dimmed(),
            entry.action,
            entry.username
        );
    }
    Ok(())
}
