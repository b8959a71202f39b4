//! Command-line interface parsing and startup wiring.
//!
//! Startup order matters: config, then credentials, then the one-time
//! provider-shape probe. Any failure on that path is fatal and reported
//! with quick fixes before the terminal UI ever starts.

use std::error::Error;
use std::io::{self, Write};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::auth::{remove_api_key, resolve_credentials, store_api_key};
use crate::core::app::App;
use crate::core::config::Config;
use crate::core::message::NoticeKind;
use crate::core::roles::RoleRegistry;
use crate::core::session::Session;
use crate::provider::{detect_provider, ProviderSettings};
use crate::ui::chat_loop::{run_chat, ChatLoopConfig};
use crate::utils::logging::LoggingState;

#[derive(Parser)]
#[command(name = "studiolo")]
#[command(about = "A terminal chat studio with creative role personas and image generation")]
#[command(
    long_about = "Studiolo is a full-screen terminal chat interface. Pick a creative role, \
chat with it, and generate images from text prompts.\n\n\
Authentication:\n\
  Use 'studiolo auth' to store an API key in your system keyring.\n\n\
Environment Variables (fallback if no key stored):\n\
  OPENAI_API_KEY    Your API key\n\
  OPENAI_BASE_URL   Custom API base URL (optional, defaults to https://api.openai.com/v1)\n\n\
Controls:\n\
  Type              Enter your message in the input field\n\
  Enter             Send the message\n\
  Up/Down/Mouse     Scroll through chat history\n\
  Ctrl+C            Quit\n\n\
Commands:\n\
  /role <name>      Switch the active role\n\
  /image <prompt>   Generate an image\n\
  /images [on|off]  Toggle image generation\n\
  /help             Show all commands"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Chat model to use (overrides the config file)
    #[arg(short = 'm', long, global = true)]
    pub model: Option<String>,

    /// Role active at startup
    #[arg(short = 'r', long, global = true)]
    pub role: Option<String>,

    /// Enable transcript logging to the specified file
    #[arg(short = 'l', long, global = true)]
    pub log: Option<String>,

    /// Resolve the API key from the environment only, skipping the keyring
    #[arg(long, global = true)]
    pub env_only: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Store an API key in the system keyring
    Auth,
    /// Remove the stored API key
    Deauth,
    /// Start the chat interface (default)
    Chat,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    match args.command {
        Some(Commands::Auth) => run_auth(),
        Some(Commands::Deauth) => run_deauth(),
        Some(Commands::Chat) | None => run_chat_command(args).await,
    }
}

fn run_auth() -> Result<(), Box<dyn Error>> {
    print!("API key: ");
    io::stdout().flush()?;
    let mut key = String::new();
    io::stdin().read_line(&mut key)?;
    let key = key.trim();
    if key.is_empty() {
        eprintln!("❌ No key entered");
        std::process::exit(1);
    }
    store_api_key(key)?;
    println!("API key stored in the system keyring.");
    Ok(())
}

fn run_deauth() -> Result<(), Box<dyn Error>> {
    remove_api_key()?;
    println!("Stored API key removed.");
    Ok(())
}

fn report_fatal(error: &dyn std::fmt::Display, fixes: &[&str]) -> ! {
    eprintln!("❌ {error}");
    if !fixes.is_empty() {
        eprintln!();
        eprintln!("💡 Quick fixes:");
        for fix in fixes {
            eprintln!("  • {fix}");
        }
    }
    std::process::exit(1);
}

async fn run_chat_command(args: Args) -> Result<(), Box<dyn Error>> {
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => report_fatal(&e, &[]),
    };

    let credentials = match resolve_credentials(args.env_only) {
        Ok(credentials) => credentials,
        Err(e) => {
            let fixes = e.quick_fixes();
            report_fatal(&e, &fixes);
        }
    };

    let mut client_builder = reqwest::Client::builder();
    if let Some(secs) = config.request_timeout_secs {
        client_builder = client_builder.timeout(std::time::Duration::from_secs(secs));
    }
    let client = client_builder.build()?;

    let settings = ProviderSettings {
        base_url: credentials.base_url,
        api_key: credentials.api_key,
        chat_model: args
            .model
            .unwrap_or_else(|| config.chat_model().to_string()),
        image_model: config.image_model().to_string(),
        image_size: config.image_size().to_string(),
    };

    let adapter = match detect_provider(client.clone(), settings).await {
        Ok(adapter) => adapter,
        Err(e) => {
            let fixes = e.quick_fixes();
            report_fatal(&e, &fixes);
        }
    };
    tracing::debug!(shape = adapter.shape_name(), "provider selected");

    let registry = RoleRegistry::from_config(&config);
    let role = match args.role.as_deref() {
        Some(name) => match registry.lookup(name) {
            Ok(role) => role.clone(),
            Err(e) => report_fatal(&e, &[]),
        },
        None => registry.default_role(&config).clone(),
    };

    let session = Session::new(role, config.image_generation_enabled());
    let logging = LoggingState::new(args.log);
    let mut app = App::new(registry, session, logging);
    app.post_notice(
        NoticeKind::Info,
        format!(
            "Chatting with the {}. /help lists commands.",
            app.session.role().name
        ),
    );

    run_chat(
        app,
        adapter,
        ChatLoopConfig {
            client,
            image_dir: config.image_dir(),
        },
    )
    .await
}
