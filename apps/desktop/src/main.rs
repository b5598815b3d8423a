use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    demo::{DEMO_CALLER, DEMO_CALL_LABEL},
    CallTimerConfig, CompanionConfig, GuardianDirectory, HttpBackend, PanicLedger, PanicOutcome,
    SafetyCompanion, StorageBackend, TracingSynthesizer, VoiceAnnouncer,
};
use shared::safety::{EMERGENCY_NUMBERS, VERIFICATION_CARDS};
use storage::Storage;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod console;
mod settings;
mod speech;

use console::{
    describe_call, render_call_events, render_demo_events, render_panic_events, ConsoleNotifier,
};
use settings::{load_settings, CompanionSettings, SpeechBackend};
use speech::EspeakSynthesizer;

#[derive(Parser, Debug)]
#[command(about = "Sahayak: a companion against digital-arrest scam calls")]
struct Cli {
    /// Settings file; defaults to `companion.toml` in the working directory when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    database_url: Option<String>,
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long, value_enum)]
    speech: Option<SpeechBackend>,
    #[arg(long)]
    call_budget_secs: Option<u32>,
    #[arg(long)]
    grant_notifications: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Alert your guardian.
    Panic,
    /// Simulated incoming call with a time limit.
    Call,
    /// Scripted scam call followed by the intervention.
    Demo,
    Guardian {
        #[command(subcommand)]
        action: GuardianCommand,
    },
    /// Past panic activations.
    Log,
    /// How to verify a caller, and who to call.
    Verify,
    /// Remind that protection is active.
    Watch {
        #[arg(long)]
        repeat_secs: Option<u64>,
    },
}

#[derive(Subcommand, Debug)]
enum GuardianCommand {
    Show,
    Set { name: String, phone_number: String },
}

impl Cli {
    fn apply_overrides(&self, settings: &mut CompanionSettings) {
        if let Some(database_url) = &self.database_url {
            settings.database_url = database_url.clone();
        }
        if let Some(server_url) = &self.server_url {
            settings.server_url = Some(server_url.clone());
        }
        if let Some(speech) = self.speech {
            settings.speech = speech;
        }
        if let Some(budget) = self.call_budget_secs {
            settings.call_budget_secs = budget;
        }
        if self.grant_notifications {
            settings.notifications_granted = true;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut settings = load_settings(cli.config.as_deref())?;
    cli.apply_overrides(&mut settings);

    if matches!(cli.command, Command::Verify) {
        print_verification_hub();
        return Ok(());
    }

    let companion = build_companion(&settings).await?;
    companion.start().await;

    match cli.command {
        Command::Panic => run_panic(&companion).await,
        Command::Call => run_call(&companion).await,
        Command::Demo => run_demo(&companion).await,
        Command::Guardian { action } => run_guardian(&companion, action).await,
        Command::Log => print_panic_log(&companion).await,
        Command::Verify => Ok(()),
        Command::Watch { repeat_secs } => run_watch(&companion, repeat_secs).await,
    }
}

async fn build_companion(settings: &CompanionSettings) -> Result<SafetyCompanion> {
    let (directory, ledger): (Arc<dyn GuardianDirectory>, Arc<dyn PanicLedger>) =
        match &settings.server_url {
            Some(server_url) => {
                info!(%server_url, "using companion server");
                let backend = Arc::new(HttpBackend::new(server_url)?);
                (backend.clone(), backend)
            }
            None => {
                let storage = Storage::new(&settings.database_url)
                    .await
                    .with_context(|| format!("failed to open {}", settings.database_url))?;
                let backend = Arc::new(StorageBackend::new(storage));
                (backend.clone(), backend)
            }
        };

    let announcer = match settings.speech {
        SpeechBackend::Log => VoiceAnnouncer::new(Arc::new(TracingSynthesizer)),
        SpeechBackend::Espeak => VoiceAnnouncer::new(Arc::new(EspeakSynthesizer::new())),
    };
    let config = CompanionConfig {
        call: CallTimerConfig {
            budget_seconds: settings.call_budget_secs,
            ..CallTimerConfig::default()
        },
        ..CompanionConfig::default()
    };

    Ok(SafetyCompanion::new(
        config,
        directory,
        ledger,
        announcer,
        Arc::new(ConsoleNotifier::new(settings.notifications_granted)),
    ))
}

fn stdin_lines() -> Lines<BufReader<Stdin>> {
    BufReader::new(tokio::io::stdin()).lines()
}

async fn run_panic(companion: &SafetyCompanion) -> Result<()> {
    let controller = companion.panic_controller();
    let renderer = tokio::spawn(render_panic_events(controller.subscribe_events()));
    match controller.activate().await {
        PanicOutcome::Started => renderer.await?,
        PanicOutcome::AlreadyActive | PanicOutcome::Cancelled => renderer.abort(),
    }
    Ok(())
}

async fn run_call(companion: &SafetyCompanion) -> Result<()> {
    let call = companion.open_call_screen().await;
    let renderer = tokio::spawn(render_call_events(call.subscribe_events()));
    println!("commands: ring answer decline ff end hangup dismiss reset status quit");
    println!("{}", describe_call(&call.snapshot().await));

    let mut lines = stdin_lines();
    while let Some(line) = lines.next_line().await? {
        let result = match line.trim() {
            "ring" => call.ring().await.map(drop),
            "answer" => call.answer().await.map(drop),
            "decline" => call.decline().await.map(drop),
            "ff" => call.fast_forward().await.map(drop),
            "end" => call.end_call().await.map(drop),
            "hangup" => call.hang_up().await.map(drop),
            "dismiss" => call.dismiss_warning().await.map(drop),
            "reset" => {
                call.reset().await;
                Ok(())
            }
            "status" => {
                println!("{}", describe_call(&call.snapshot().await));
                Ok(())
            }
            "quit" | "exit" => break,
            "" => continue,
            other => {
                println!("unknown command `{other}`");
                continue;
            }
        };
        if let Err(err) = result {
            println!("{err}");
        }
    }

    call.close().await;
    renderer.abort();
    Ok(())
}

async fn run_demo(companion: &SafetyCompanion) -> Result<()> {
    let demo = companion.open_demo();
    let renderer = tokio::spawn(render_demo_events(demo.subscribe_events()));
    println!("{DEMO_CALL_LABEL}");
    println!("{DEMO_CALLER}");
    println!("commands: accept decline safe guardian close");

    let mut lines = stdin_lines();
    while let Some(line) = lines.next_line().await? {
        let result = match line.trim() {
            "accept" => demo.accept().await,
            "decline" => demo.decline().await,
            "safe" => demo.hang_up_safe().await,
            "guardian" => demo.call_guardian().await,
            "close" | "quit" => demo.dismiss().await,
            "" => continue,
            other => {
                println!("unknown command `{other}`");
                continue;
            }
        };
        match result {
            Ok(snapshot) if snapshot.is_closed() => break,
            Ok(_) => {}
            Err(err) => println!("{err}"),
        }
    }

    let _ = demo.dismiss().await;
    renderer.await?;
    Ok(())
}

async fn run_guardian(companion: &SafetyCompanion, action: GuardianCommand) -> Result<()> {
    match action {
        GuardianCommand::Show => match companion.guardian().snapshot().await {
            Some(contact) => println!("{} ({})", contact.name(), contact.phone_number()),
            None => println!("No guardian saved yet."),
        },
        GuardianCommand::Set { name, phone_number } => {
            companion.guardian().save(&name, &phone_number).await?;
        }
    }
    Ok(())
}

async fn print_panic_log(companion: &SafetyCompanion) -> Result<()> {
    let entries = companion.panic_history().await?;
    if entries.is_empty() {
        println!("No panic activations recorded.");
    }
    for entry in entries {
        println!("{}", entry.timestamp.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    Ok(())
}

fn print_verification_hub() {
    for card in VERIFICATION_CARDS {
        println!("{} - {}", card.title, card.subtitle);
        for item in card.items {
            println!("  * {item}");
        }
    }
    println!("Emergency numbers:");
    for entry in EMERGENCY_NUMBERS {
        println!("  {:<14} {}", entry.label, entry.number);
    }
}

async fn run_watch(companion: &SafetyCompanion, repeat_secs: Option<u64>) -> Result<()> {
    if !companion.remind() {
        println!(
            "Notifications are off. Pass --grant-notifications \
             or set COMPANION__NOTIFICATIONS_GRANTED=true."
        );
        return Ok(());
    }
    let Some(repeat_secs) = repeat_secs.filter(|secs| *secs > 0) else {
        return Ok(());
    };
    let mut interval = tokio::time::interval(Duration::from_secs(repeat_secs));
    interval.tick().await;
    loop {
        interval.tick().await;
        companion.remind();
    }
}
