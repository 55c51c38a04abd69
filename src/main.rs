//! Glicemia CLI
//!
//! Command-line interface for the glycemia tracker:
//! - Account registration and login
//! - Measurement submission and history rendering
//! - Risk analysis and the emergency alert
//! - Public chat, one-shot or live

use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use glicemia::api::ApiClient;
use glicemia::config::Config;
use glicemia::render::NO_DATA_MESSAGE;
use glicemia::session::Session;
use glicemia::store::{Store, LOCALE_KEY, NOTIFICATIONS_KEY};
use glicemia::sync::{ChatSynchronizer, FeedEntry, HistorySynchronizer};
use glicemia::theme::ThemeController;

#[derive(Parser)]
#[command(name = "glicemia")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Terminal client for the glycemia tracking backend")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Backend base URL (overrides the config file)
    #[arg(long, global = true)]
    pub api_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create an account
    Register {
        email: String,
        password: String,
    },

    /// Log in and store the session token
    Login {
        email: String,
        password: String,
    },

    /// Discard the stored session token
    Logout,

    /// Submit one glycemia measurement
    Record {
        /// Measured value in mg/dL (comma or dot decimal)
        value: String,
        /// Last meal time (YYYY-MM-DDTHH:MM, local clock)
        #[arg(long, default_value = "")]
        meal: String,
        /// Last exercise time (YYYY-MM-DDTHH:MM, local clock)
        #[arg(long, default_value = "")]
        exercise: String,
        /// Free-text symptoms
        #[arg(long, default_value = "")]
        symptoms: String,
    },

    /// Show the measurement history table and chart
    History {
        /// Skip the chart
        #[arg(long)]
        no_chart: bool,
        /// Chart width in columns
        #[arg(long, default_value = "72")]
        width: usize,
        /// Chart height in rows
        #[arg(long, default_value = "12")]
        height: usize,
    },

    /// Fetch the risk analysis for the stored records
    Analyze,

    /// Read or post to the public chat
    Chat {
        /// Message to post before showing the feed
        message: Option<String>,
        /// Keep the feed live until interrupted
        #[arg(short, long)]
        watch: bool,
    },

    /// Send the manual emergency alert
    Emergency {
        /// Attach the latest analysis report
        #[arg(long)]
        include_last_report: bool,
    },

    /// Show the profile or update the Telegram contact ids
    Profile {
        #[command(subcommand)]
        action: Option<ProfileCommands>,
    },

    /// Show or toggle the display theme
    Theme {
        /// Flip between light and dark
        #[arg(long)]
        toggle: bool,
    },

    /// Show or change local-only settings (never sent to the backend)
    Settings {
        /// Enable or disable notifications (true/false)
        #[arg(long)]
        notifications: Option<bool>,
        /// Interface locale, e.g. pt-BR
        #[arg(long)]
        locale: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// Show the stored profile
    Show,
    /// Set the Telegram chat ids (digits only; empty clears)
    SetTelegram {
        #[arg(long, default_value = "")]
        chat_id: String,
        #[arg(long, default_value = "")]
        trusted_id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load_default();

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| format!("glicemia={}", config.logging.level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let store = Arc::new(RwLock::new(Store::open_default()?));
    let base_url = cli.api_url.unwrap_or_else(|| config.api.base_url.clone());
    let api = ApiClient::new(base_url, Arc::clone(&store));

    let theme = Arc::new(ThemeController::new(Arc::clone(&store)));
    theme.load().await;

    let session = Session::new(api.clone());

    match cli.command {
        Commands::Register { email, password } => {
            session.register(&email, &password).await?;
            println!("Account created. You can log in now.");
        }

        Commands::Login { email, password } => {
            session.login(&email, &password).await?;
            println!("Logged in as {email}.");
        }

        Commands::Logout => {
            session.logout().await?;
            println!("Logged out.");
        }

        Commands::Record {
            value,
            meal,
            exercise,
            symptoms,
        } => {
            session.save_record(&value, &meal, &exercise, &symptoms).await?;
            println!("Measurement saved.");
        }

        Commands::History {
            no_chart,
            width,
            height,
        } => {
            let mut history = HistorySynchronizer::new(api, Arc::clone(&theme));
            history.refresh().await;
            println!("{}", history.table());

            if !no_chart {
                match history.chart() {
                    Some(chart) => {
                        println!();
                        println!("{}", chart.render(width, height));
                    }
                    None => println!("{NO_DATA_MESSAGE}"),
                }
            }
        }

        Commands::Analyze => match session.analyze().await {
            Ok(analysis) => {
                println!("{}", analysis.message);
                if let Some(risk) = analysis.risk_level {
                    println!("Risk level: {risk}");
                }
            }
            Err(e) => {
                tracing::warn!("analysis unavailable: {e}");
                println!("No analysis available.");
            }
        },

        Commands::Chat { message, watch } => {
            run_chat(api, &config, message, watch).await?;
        }

        Commands::Emergency {
            include_last_report,
        } => {
            let confirmation = session.emergency(include_last_report).await?;
            println!("{confirmation}");
        }

        Commands::Profile { action } => match action.unwrap_or(ProfileCommands::Show) {
            ProfileCommands::Show => {
                let profile = session.user_me().await?;
                println!("Email:            {}", profile.email);
                if let Some(username) = profile.username {
                    println!("Username:         {username}");
                }
                println!(
                    "Telegram chat id: {}",
                    profile.telegram_chat_id.as_deref().unwrap_or("(unset)")
                );
                println!(
                    "Trusted contact:  {}",
                    profile.trusted_telegram_id.as_deref().unwrap_or("(unset)")
                );
            }
            ProfileCommands::SetTelegram { chat_id, trusted_id } => {
                session.update_telegram(&chat_id, &trusted_id).await?;
                println!("Telegram contact ids updated.");
            }
        },

        Commands::Settings {
            notifications,
            locale,
        } => {
            {
                let mut store = store.write().await;
                if let Some(on) = notifications {
                    store.set(NOTIFICATIONS_KEY, if on { "true" } else { "false" })?;
                }
                if let Some(locale) = &locale {
                    store.set(LOCALE_KEY, locale)?;
                }
            }
            let store = store.read().await;
            println!(
                "Notifications: {}",
                store.get(NOTIFICATIONS_KEY).unwrap_or("true")
            );
            println!("Locale:        {}", store.get(LOCALE_KEY).unwrap_or("pt-BR"));
        }

        Commands::Theme { toggle } => {
            if toggle {
                let next = theme.toggle().await?;
                println!("Theme set to {}.", next.as_str());
            } else {
                let indicator = theme.indicator();
                println!(
                    "Active theme: {} {}",
                    theme.active().as_str(),
                    indicator.glyph
                );
            }
        }
    }

    Ok(())
}

/// One-shot feed print, optional post, or a live watch loop that runs
/// until Ctrl-C.
async fn run_chat(
    api: ApiClient,
    config: &Config,
    message: Option<String>,
    watch: bool,
) -> anyhow::Result<()> {
    let poll = Duration::from_millis(config.chat.poll_interval_ms);
    let mut chat = ChatSynchronizer::new(Arc::new(api), poll);

    if let Some(message) = message {
        match chat.send(&message).await {
            Ok(true) => {}
            Ok(false) => println!("Nothing to send."),
            Err(e) => anyhow::bail!(e),
        }
    } else {
        chat.refresh().await;
    }

    let feed = chat.feed().await;
    print_entries(&feed.entries);

    if !watch {
        return Ok(());
    }

    chat.start_polling();
    let mut shown = feed.entries;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = tokio::time::sleep(poll) => {
                let feed = chat.feed().await;
                if feed.entries == shown {
                    continue;
                }
                if feed.entries.starts_with(&shown) {
                    print_entries(&feed.entries[shown.len()..]);
                } else {
                    // The feed is replaced wholesale on every refresh, so
                    // an edit or deletion upstream reprints everything.
                    print_entries(&feed.entries);
                }
                shown = feed.entries;
            }
        }
    }

    chat.stop_polling();
    Ok(())
}

fn print_entries(entries: &[FeedEntry]) {
    for entry in entries {
        println!("[{}] {}: {}", entry.timestamp, entry.username, entry.content);
    }
}
