use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info, warn};

use wheelie_hunter::config::Config;
use wheelie_hunter::extractor::embedded;
use wheelie_hunter::fetcher::{HttpFetcher, PageSource};
use wheelie_hunter::formatter;
use wheelie_hunter::logging;
use wheelie_hunter::pipeline::{cached_offers, Scanner};
use wheelie_hunter::rates;
use wheelie_hunter::storage::{JsonFileStore, StateStore};
use wheelie_hunter::subscribers::{JsonSubscriberStore, SubscriberStore};
use wheelie_hunter::telegram::{TelegramClient, TelegramNotifier};

#[derive(Parser)]
#[command(name = "wheelie_hunter")]
#[command(about = "Promotional slot watcher for the Pol Ferrer academy booking page")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the periodic scanner and the Telegram bot
    Serve,
    /// Run a single scan (fetch, alert, persist) and print the result
    Scan,
    /// Print the cached offer list without scanning
    Offers,
    /// Look up the price for a specific date and hour
    Price {
        /// Calendar date, e.g. 2026-02-25
        #[arg(long)]
        date: NaiveDate,
        /// Hour of day, 24h clock
        #[arg(long)]
        hour: i64,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Serve => serve(config).await?,
        Commands::Scan => scan_once(config).await?,
        Commands::Offers => {
            let store = JsonFileStore::new(&config.state_file);
            let (offers, date_range) = cached_offers(&store).await;
            println!(
                "{}",
                formatter::format_offer_message(&offers, &date_range, &config.target_url)
            );
        }
        Commands::Price { date, hour } => price_lookup(&config, date, hour).await?,
    }
    Ok(())
}

fn build_scanner(config: &Config, client: Arc<TelegramClient>) -> Result<Scanner, Box<dyn std::error::Error>> {
    let store: Arc<dyn StateStore> = Arc::new(JsonFileStore::new(&config.state_file));
    let subscribers: Arc<dyn SubscriberStore> =
        Arc::new(JsonSubscriberStore::new(&config.subscribers_file));
    let notifier = Arc::new(TelegramNotifier::new(client, subscribers));
    let source = Arc::new(HttpFetcher::new(config)?);
    Ok(Scanner::new(source, store, notifier, config.target_url.clone()))
}

async fn scan_once(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let client = Arc::new(TelegramClient::new(Config::bot_token()?));
    let scanner = build_scanner(&config, client)?;

    let outcome = scanner.scan().await?;
    println!("📊 Scan results:");
    println!("   Total slots: {}", outcome.total_slots);
    println!("   Current offers: {}", outcome.offers.len());
    println!("   New offers: {}", outcome.new_offers.len());
    println!("   Alerts delivered: {}", outcome.delivered);
    Ok(())
}

async fn serve(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let client = Arc::new(TelegramClient::new(Config::bot_token()?));
    let store: Arc<dyn StateStore> = Arc::new(JsonFileStore::new(&config.state_file));
    let subscribers: Arc<dyn SubscriberStore> =
        Arc::new(JsonSubscriberStore::new(&config.subscribers_file));
    let notifier = Arc::new(TelegramNotifier::new(client.clone(), subscribers.clone()));
    let source: Arc<dyn PageSource> = Arc::new(HttpFetcher::new(&config)?);
    let scanner = Scanner::new(source, store.clone(), notifier, config.target_url.clone());

    if let Err(e) = client.set_my_commands().await {
        warn!("Could not register bot commands: {e}");
    }

    info!(
        "Starting offer hunter: scanning {} every {} minutes",
        config.target_url, config.scan_interval_minutes
    );

    let scan_loop = {
        let minutes = config.scan_interval_minutes;
        tokio::spawn(async move {
            let mut ticker = interval(Duration::from_secs(minutes * 60));
            // Scans never overlap: the next tick is not taken until the
            // previous scan, including its persistence write, returns.
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match scanner.scan().await {
                    Ok(outcome) => info!(
                        "Scan done: {} slots, {} offers, {} new, {} alerts delivered",
                        outcome.total_slots,
                        outcome.offers.len(),
                        outcome.new_offers.len(),
                        outcome.delivered
                    ),
                    Err(e) => error!("Scan failed, keeping previous state: {e}"),
                }
            }
        })
    };

    let command_loop = tokio::spawn(poll_commands(client, store, subscribers, config));

    tokio::select! {
        _ = scan_loop => {}
        _ = command_loop => {}
    }
    Ok(())
}

/// Long-polls Telegram for subscriber commands. Reads of the snapshot can
/// overlap a running scan; the atomic state replace guarantees a consistent
/// view either way.
async fn poll_commands(
    client: Arc<TelegramClient>,
    store: Arc<dyn StateStore>,
    subscribers: Arc<dyn SubscriberStore>,
    config: Config,
) {
    let mut offset = 0i64;
    loop {
        let updates = match client.get_updates(offset, 30).await {
            Ok(updates) => updates,
            Err(e) => {
                warn!("getUpdates failed: {e}");
                tokio::time::sleep(Duration::from_secs(5)).await;
                continue;
            }
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);
            let Some(message) = update.message else { continue };
            let Some(text) = message.text else { continue };
            let chat_id = message.chat.id;

            let reply = match text.trim() {
                "/start" => handle_start(&*subscribers, chat_id).await,
                "/stop" => handle_stop(&*subscribers, chat_id).await,
                "/offers" => {
                    info!("Chat {chat_id} requested the cached offer list");
                    let (offers, date_range) = cached_offers(&*store).await;
                    formatter::format_offer_message(&offers, &date_range, &config.target_url)
                }
                "/help" => help_text(config.scan_interval_minutes),
                _ => continue,
            };

            if let Err(e) = client.send_message(chat_id, &reply).await {
                warn!("Reply to {chat_id} failed: {e}");
            }
        }
    }
}

async fn handle_start(subscribers: &dyn SubscriberStore, chat_id: i64) -> String {
    match subscribers.add(chat_id).await {
        Ok(true) => "👋 <b>Welcome to WheelieHunter!</b>\nI will notify you automatically when new offers are detected.".to_string(),
        Ok(false) => "You are already subscribed. Waiting for offers...".to_string(),
        Err(e) => {
            error!("Failed to subscribe {chat_id}: {e}");
            "⚠️ Subscription failed, please try again later.".to_string()
        }
    }
}

async fn handle_stop(subscribers: &dyn SubscriberStore, chat_id: i64) -> String {
    match subscribers.remove(chat_id).await {
        Ok(_) => "🔕 You have unsubscribed. You will not receive further alerts.".to_string(),
        Err(e) => {
            error!("Failed to unsubscribe {chat_id}: {e}");
            "⚠️ Unsubscribe failed, please try again later.".to_string()
        }
    }
}

fn help_text(interval_minutes: u64) -> String {
    format!(
        "🤖 <b>WheelieHunter</b>\n\n\
         This bot scans the Pol Ferrer academy every {interval_minutes} minutes looking for offers.\n\n\
         <b>Available commands:</b>\n\
         • /start - Subscribe to automatic alerts.\n\
         • /offers - Show the currently active offers.\n\
         • /stop - Stop receiving notifications.\n\
         • /help - Show this help message."
    )
}

async fn price_lookup(
    config: &Config,
    date: NaiveDate,
    hour: i64,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("🕵️ Looking up the price for {date} at {hour:02}:00...");
    let fetcher = HttpFetcher::new(config)?;
    let html = fetcher.fetch().await?;

    let raw_offers = embedded::extract_offers_payload(&html)?;
    let standard_rates = rates::parse_rates(embedded::extract_rates_payload(&html)?);

    match rates::price_for(&raw_offers, &standard_rates, date, hour) {
        Some(quote) if quote.from_offer => {
            println!("✅ Promotional offer for that slot");
            println!("   Total price: {}", quote.total);
            println!("   Deposit: {}€", quote.deposit_cents / 100);
        }
        Some(quote) => {
            let discipline = quote
                .discipline
                .map(|d| format!(" [{d}]"))
                .unwrap_or_default();
            println!("✅ Standard rate{discipline}");
            println!("   Total price: {}", quote.total);
            println!("   Deposit: {}€", quote.deposit_cents / 100);
        }
        None => println!("❌ No rate defined for that slot."),
    }
    Ok(())
}
