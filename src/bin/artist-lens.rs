use artist_lens::commands::{execute_command, utils, Commands};
use artist_lens::EngineError;
use clap::Parser;

/// Artist audio-feature analyzer
#[derive(Parser)]
#[command(
    name = "artist-lens",
    about = "Analyze an artist's sound, mood, and complexity from catalog audio features",
    long_about = None
)]
struct Cli {
    /// Show detailed progress information
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();

    // Verbose mode turns on debug logging for our own crate only
    let default_filter = if args.verbose {
        "artist_lens=debug"
    } else {
        "artist_lens=warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if args.verbose {
        println!("🔍 Verbose mode enabled");
    }

    // Local-only commands run without credentials
    let catalog = if args.command.requires_catalog() {
        let (client_id, client_secret) = match utils::get_credentials() {
            Ok(credentials) => credentials,
            Err(_) => {
                eprintln!("❌ Error: Spotify credentials are not configured");
                eprintln!();
                eprintln!("Please set the following environment variables:");
                eprintln!("  SPOTIFY_CLIENT_ID=your_application_id");
                eprintln!("  SPOTIFY_CLIENT_SECRET=your_application_secret");
                eprintln!();
                eprintln!("Create an application at https://developer.spotify.com/dashboard");
                eprintln!("to obtain client credentials.");
                std::process::exit(2);
            }
        };
        if args.verbose {
            println!("🔐 Using client id: {client_id}");
        }
        Some(utils::build_catalog(&client_id, &client_secret))
    } else {
        None
    };

    if let Err(e) = execute_command(args.command, catalog.as_ref(), args.verbose).await {
        eprintln!("❌ {e}");
        std::process::exit(exit_code_for(&e));
    }

    Ok(())
}

/// Exit codes distinguish caller mistakes from provider trouble so shell
/// scripts can react to each.
fn exit_code_for(error: &EngineError) -> i32 {
    match error {
        EngineError::InvalidInput(_) => 2,
        EngineError::NotFound(_) => 3,
        EngineError::ProviderUnavailable(_) => 4,
        _ => 1,
    }
}
