//! TaskBuddy notifier daemon
//!
//! Wires configuration, storage, and the core services together and drives
//! the deadline-reminder sweep on an interval. Chat command front-ends run
//! as separate processes against the same database.

use std::sync::Arc;
use std::time::Duration;
use teloxide::Bot;
use tracing::{info, error};

use TaskBuddy::{
    config::Settings,
    utils::logging,
    database::{DatabaseService, connection},
    services::{ServiceFactory, ChannelSender, TelegramSender, reminders},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new()?;
    settings.validate()?;

    // Initialize logging
    logging::init_logging(&settings.logging)?;

    info!("Starting {}...", TaskBuddy::info());

    // Initialize database connection
    info!("Connecting to database...");
    let db_pool = connection::create_pool(&settings.database).await?;
    connection::run_migrations(&db_pool).await?;

    let database_service = DatabaseService::new(db_pool);

    // Wire channel senders; platforms without configuration are skipped
    let mut senders: Vec<Arc<dyn ChannelSender>> = Vec::new();
    if let Some(token) = &settings.bot.telegram_token {
        info!("Telegram sender enabled");
        senders.push(Arc::new(TelegramSender::new(Bot::new(token))));
    } else {
        info!("Telegram sender disabled (no token configured)");
    }

    // Initialize services
    let services = ServiceFactory::new(settings.clone(), database_service, senders)?;

    info!("TaskBuddy is ready!");

    if settings.notifications.deadline_reminders {
        run_reminder_loop(&services, &settings).await;
    } else {
        info!("Deadline reminders disabled, waiting for shutdown signal");
        tokio::signal::ctrl_c().await?;
    }

    info!("TaskBuddy has been shut down.");
    Ok(())
}

/// Sweep deadlines on the configured interval until ctrl-c.
async fn run_reminder_loop(services: &ServiceFactory, settings: &Settings) {
    let mut interval = tokio::time::interval(Duration::from_secs(
        settings.notifications.check_interval_minutes * 60,
    ));

    info!(
        interval_minutes = settings.notifications.check_interval_minutes,
        windows = ?settings.notifications.reminder_hours,
        "Starting deadline reminder loop"
    );

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let result = reminders::run_sweep(
                    &services.task_service,
                    &services.notification_dispatcher,
                    &settings.notifications.reminder_hours,
                )
                .await;

                if let Err(e) = result {
                    error!(error = %e, "Deadline sweep failed");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal");
                break;
            }
        }
    }
}
