use anyhow::Result;
use clap::{Parser, Subcommand};
use shared::domain::GuardianContact;
use storage::Storage;

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, default_value = "sqlite://./data/server.db")]
    database_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    SetGuardian { name: String, phone_number: String },
    ShowGuardian,
    PanicLog {
        /// Record an activation before listing.
        #[arg(long)]
        append: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let storage = Storage::new(&cli.database_url).await?;

    match cli.command {
        Command::SetGuardian { name, phone_number } => {
            let contact = GuardianContact::new(&name, &phone_number)?;
            storage.save_guardian_contact(&contact).await?;
            println!("saved guardian {}", contact.name());
        }
        Command::ShowGuardian => match storage.load_guardian_contact().await? {
            Some(contact) => println!("{} {}", contact.name(), contact.phone_number()),
            None => println!("guardian not set"),
        },
        Command::PanicLog { append } => {
            if append {
                let entry = storage.append_panic_log().await?;
                println!("appended {}", entry.timestamp.to_rfc3339());
            }
            for (index, entry) in storage.list_panic_log().await?.iter().enumerate() {
                println!("{:>4} {}", index + 1, entry.timestamp.to_rfc3339());
            }
        }
    }

    Ok(())
}
