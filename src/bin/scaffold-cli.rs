use std::path::PathBuf;

use clap::{Parser, Subcommand};
use uuid::Uuid;

use web_scaffold::auth::TokenService;
use web_scaffold::config::{load_config, read_environment_file, ConfigMap, SharedConfig};
use web_scaffold::validation::Validator;

#[derive(Parser)]
#[command(name = "scaffold-cli")]
#[command(about = "Operator CLI for web-scaffold services", long_about = None)]
struct Cli {
    /// Config file to use instead of the standard search path
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and validate the config file
    CheckConfig,
    /// Issue a token for a user id
    IssueToken { user_id: Uuid },
    /// Verify a token and print its claims
    InspectToken { token: String },
    /// Check a password against the password rule
    CheckPassword { password: String },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::CheckConfig => {
            let (path, config) = load(cli.config)?;
            println!("{} is valid", path.display());
            println!("  env:         {}", config.app.env);
            println!("  bind:        {}", config.app.bind_address());
            println!("  tls:         {}", if config.app.ssl.is_enabled() { "enabled" } else { "disabled" });
            println!("  static root: {}", config.app.static_root);
            println!("  api:         {}", config.api.api_endpoint);
        }
        Commands::IssueToken { user_id } => {
            let (_, config) = load(cli.config)?;
            let tokens = TokenService::new(SharedConfig::new(config));
            println!("{}", tokens.create_token(user_id)?);
        }
        Commands::InspectToken { token } => {
            let (_, config) = load(cli.config)?;
            let tokens = TokenService::new(SharedConfig::new(config));
            let claims = tokens.decode(&token)?;
            println!("{}", serde_json::to_string_pretty(&claims)?);
        }
        Commands::CheckPassword { password } => {
            let validator = Validator::new()?;
            match validator.validate_field("Password", &password, "required,passwd") {
                Ok(()) => println!("password is acceptable"),
                Err(e) => {
                    eprintln!("{}", e.message);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}

fn load(path: Option<PathBuf>) -> Result<(PathBuf, ConfigMap), Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let config = load_config(&path)?;
            Ok((path, config))
        }
        None => Ok(read_environment_file()?),
    }
}
