//! hyodo: repayment ledger CLI
//!
//! Records a target repayment amount and payment/spend entries, shows totals
//! and history, and keeps a signed-in user's data in sync with the cloud.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use hyodo::config::RemoteConfig;
use hyodo::ledger::EntryType;

mod commands;

#[derive(Parser)]
#[command(name = "hyodo")]
#[command(about = "Repayment ledger with cloud sync", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory holding the local cache
    #[arg(long, global = true, env = "HYODO_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Backend project URL (cloud sync is off without it)
    #[arg(long, global = true, env = "HYODO_SUPABASE_URL")]
    supabase_url: Option<String>,

    /// Backend public API key
    #[arg(long, global = true, env = "HYODO_SUPABASE_ANON_KEY", hide_env_values = true)]
    supabase_key: Option<String>,

    /// Landing page for password-reset links
    #[arg(long, global = true, env = "HYODO_REDIRECT_URL")]
    redirect_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show target, paid, remaining and progress
    Status,

    /// List entries, newest first
    History {
        /// Only show one type: repayment or spend
        #[arg(long, short = 't')]
        r#type: Option<EntryType>,

        /// Limit number of results
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Show entry ids (for edit/remove)
        #[arg(long)]
        with_id: bool,
    },

    /// Set the target repayment amount
    SetTotal {
        /// Amount, e.g. 5,000,000
        amount: String,
    },

    /// Record a repayment (or a spend with --spend)
    Add {
        /// Amount, e.g. 100,000
        amount: String,

        /// Date as YYYY-MM-DD (default: today)
        #[arg(long, short)]
        date: Option<String>,

        /// Free-form memo
        #[arg(long, short)]
        memo: Option<String>,

        /// Record additional borrowing instead of a repayment
        #[arg(long, short)]
        spend: bool,
    },

    /// Change an existing entry
    Edit {
        /// Entry id (see history --with-id)
        id: String,

        #[arg(long, short)]
        amount: Option<String>,

        #[arg(long, short)]
        date: Option<String>,

        #[arg(long, short)]
        memo: Option<String>,

        /// repayment or spend
        #[arg(long, short = 't')]
        r#type: Option<EntryType>,
    },

    /// Delete an entry
    Remove {
        /// Entry id (see history --with-id)
        id: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Pull cloud data into the local cache
    Sync {
        /// Push the local cache to the cloud instead
        #[arg(long)]
        push: bool,
    },

    /// Create an account
    Signup {
        email: String,

        /// Password (prompts if omitted)
        #[arg(long, env = "HYODO_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        #[arg(long)]
        nickname: Option<String>,
    },

    /// Sign in
    Login {
        email: String,

        /// Password (prompts if omitted)
        #[arg(long, env = "HYODO_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Sign out on this device
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Delete the account and all of its data
    DeleteAccount {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Send a password-reset email
    ResetPassword { email: String },

    /// Change the password of the signed-in user
    SetPassword {
        /// New password (prompts if omitted)
        #[arg(long, env = "HYODO_NEW_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Change the nickname of the signed-in user
    SetNickname { nickname: String },

    /// Find the (masked) email registered under a nickname
    FindEmail { nickname: String },

    /// Show the local login history
    LoginLog {
        /// Only the most recent N records
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("HYODO_LOG")
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let remote = RemoteConfig::from_parts(cli.supabase_url, cli.supabase_key, cli.redirect_url);
    let mut app = commands::utils::open_app(cli.data_dir.as_deref(), remote)?;

    match cli.command {
        Commands::Status => commands::status::execute(&app)?,

        Commands::History {
            r#type,
            limit,
            with_id,
        } => {
            let options = commands::history::HistoryOptions {
                kind: r#type,
                limit,
                with_id,
            };
            commands::history::execute(&app, &options)?;
        }

        Commands::SetTotal { amount } => commands::entries::set_total(&app, &amount)?,

        Commands::Add {
            amount,
            date,
            memo,
            spend,
        } => {
            let input = commands::entries::NewEntry {
                amount,
                date,
                memo,
                kind: if spend {
                    EntryType::Spend
                } else {
                    EntryType::Repayment
                },
            };
            commands::entries::add(&app, &input)?;
        }

        Commands::Edit {
            id,
            amount,
            date,
            memo,
            r#type,
        } => {
            let changes = commands::entries::EntryEdit {
                amount,
                date,
                memo,
                kind: r#type,
            };
            commands::entries::edit(&app, &id, &changes)?;
        }

        Commands::Remove { id, yes } => commands::entries::remove(&app, &id, yes)?,

        Commands::Sync { push } => commands::sync::execute(&app, push)?,

        Commands::Signup {
            email,
            password,
            nickname,
        } => commands::account::signup(&mut app, &email, password, nickname.as_deref())?,

        Commands::Login { email, password } => {
            commands::account::login(&mut app, &email, password)?
        }

        Commands::Logout => commands::account::logout(&mut app)?,

        Commands::Whoami => commands::account::whoami(&app)?,

        Commands::DeleteAccount { yes } => commands::account::delete_account(&mut app, yes)?,

        Commands::ResetPassword { email } => commands::account::reset_password(&app, &email)?,

        Commands::SetPassword { password } => commands::account::set_password(&app, password)?,

        Commands::SetNickname { nickname } => {
            commands::account::set_nickname(&mut app, &nickname)?
        }

        Commands::FindEmail { nickname } => commands::account::find_email(&app, &nickname)?,

        Commands::LoginLog { limit } => commands::account::login_log(&app, limit)?,
    }

    Ok(())
}
