use anyhow::Result;
use dotenvy::dotenv;
use log::{error, info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use medimate::commands::handlers::session::login_and_schedule;
use medimate::commands::{create_all_handlers, CommandContext, CommandInvocation, CommandRegistry};
use medimate::core::{Config, UserRole};
use medimate::database::Database;
use medimate::features::assistant::{generator_from_config, AiAssistant};
use medimate::features::messaging::SimulatedCounterpart;
use medimate::features::reminders::{LogNotifier, ReminderScheduler};
use medimate::features::store::PatientStore;

fn build_registry() -> CommandRegistry {
    let mut registry = CommandRegistry::new();
    for handler in create_all_handlers() {
        registry.register(handler);
    }
    registry
}

/// Resume a session from MEDIMATE_PATIENT_ID / MEDIMATE_ROLE when both are usable
async fn auto_login(ctx: &CommandContext, config: &Config) {
    let Some(patient_id) = config.patient_id.as_deref() else {
        return;
    };
    let role = match config.role.as_deref() {
        Some(raw) => match raw.parse::<UserRole>() {
            Ok(role) => role,
            Err(e) => {
                warn!("Ignoring MEDIMATE_ROLE: {e}");
                UserRole::Caretaker
            }
        },
        None => UserRole::Caretaker,
    };

    match login_and_schedule(ctx, patient_id, role).await {
        Ok(reply) => println!("{reply}"),
        Err(e) => error!("Automatic login failed: {e}"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    // The openai crate reads its key from the environment
    if let Some(key) = &config.openai_api_key {
        std::env::set_var("OPENAI_API_KEY", key);
        std::env::set_var("OPENAI_KEY", key);
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting MediMate v{}...", env!("CARGO_PKG_VERSION"));

    let database = Database::new(&config.database_path).await?;
    let store = PatientStore::new(Arc::new(database)).into_shared();

    let notifier = Arc::new(LogNotifier::new(config.notification_permission));
    let scheduler = Arc::new(ReminderScheduler::new(notifier));
    let messaging = Arc::new(SimulatedCounterpart::new(store.clone()));
    let assistant = Arc::new(AiAssistant::new(generator_from_config(&config)));
    info!(
        "AI assistant using {:?} ({})",
        config.ai_provider, config.ai_model
    );

    let ctx = Arc::new(CommandContext::new(
        store,
        scheduler.clone(),
        messaging,
        assistant,
        PathBuf::from("."),
    ));
    let registry = build_registry();
    info!("Registered {} commands", registry.len());

    auto_login(&ctx, &config).await;
    println!("MediMate is ready. Type 'help' for commands, 'quit' to exit.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line.to_lowercase().as_str(), "quit" | "exit") {
            break;
        }

        let Some(invocation) = CommandInvocation::parse(line) else {
            continue;
        };
        match registry.dispatch(ctx.clone(), &invocation).await {
            Ok(reply) => println!("{reply}"),
            Err(e) => println!("❌ {e}"),
        }
    }

    scheduler.cancel_all();
    info!("MediMate stopped");
    Ok(())
}
