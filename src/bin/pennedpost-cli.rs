use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::json;

use pennedpost::config::load_or_default;
use pennedpost::lifecycle::build_runtime;
use pennedpost::observability::logging;
use pennedpost::{BackendKind, Envelope, PostDraft};

#[derive(Parser)]
#[command(name = "pennedpost-cli")]
#[command(about = "Management CLI for the PennedPost blog client", long_about = None)]
struct Cli {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show preference, effective backend and session
    Status,
    /// Switch the preferred backend (signs you out)
    Backend {
        /// primary or fallback
        kind: BackendKind,
    },
    /// Run one availability check now
    Check,
    /// Sign in
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account and sign in
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Sign out
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Manage posts
    #[command(subcommand)]
    Posts(PostCommands),
}

#[derive(Subcommand)]
enum PostCommands {
    /// List every post
    List,
    /// Show one post
    Get { id: String },
    /// Publish a post
    Create(DraftArgs),
    /// Replace a post's fields
    Update {
        id: String,
        #[command(flatten)]
        draft: DraftArgs,
    },
    /// Delete a post
    Delete { id: String },
}

#[derive(Args)]
struct DraftArgs {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    content: Option<String>,
    #[arg(long)]
    excerpt: Option<String>,
    #[arg(long)]
    cover_image: Option<String>,
    /// Repeat for several tags
    #[arg(long = "tag")]
    tags: Vec<String>,
}

impl From<DraftArgs> for PostDraft {
    fn from(args: DraftArgs) -> Self {
        PostDraft {
            title: args.title,
            content: args.content,
            excerpt: args.excerpt,
            cover_image: args.cover_image,
            tags: (!args.tags.is_empty()).then_some(args.tags),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_or_default(cli.config.as_deref())?;
    logging::init_logging(&config.observability);

    let runtime = build_runtime(config)?;
    let selector = &runtime.selector;

    match cli.command {
        Commands::Status => {
            let effective = selector.effective_backend().await;
            let session = pennedpost::facade::SessionCredential::load(runtime.store.as_ref());
            print_json(&json!({
                "preference": selector.preference(),
                "primaryReachable": selector.primary_reachable().await,
                "effective": effective,
                "session": session.map(|s| json!({ "issuer": s.issuer })),
                "monitor": format!("{:?}", runtime.monitor.state()),
            }))?;
        }
        Commands::Backend { kind } => {
            let envelope: Envelope<bool> = match selector.switch_backend(kind).await {
                Ok(changed) => Envelope::ok(changed),
                Err(e) => Envelope::err(e.to_string()),
            };
            print_json(&envelope)?;
        }
        Commands::Check => {
            let outcome = runtime.monitor.tick().await;
            print_json(&json!({
                "outcome": format!("{:?}", outcome),
                "preference": selector.preference(),
            }))?;
        }
        Commands::Login { email, password } => {
            print_json(&selector.auth().await.login(&email, &password).await)?;
        }
        Commands::Register { name, email, password } => {
            print_json(&selector.auth().await.register(&name, &email, &password).await)?;
        }
        Commands::Logout => {
            print_json(&selector.auth().await.logout().await)?;
        }
        Commands::Whoami => {
            print_json(&selector.auth().await.get_current_user().await)?;
        }
        Commands::Posts(command) => {
            let content = selector.content().await;
            match command {
                PostCommands::List => print_json(&content.get_all_posts().await)?,
                PostCommands::Get { id } => print_json(&content.get_post_by_id(&id).await)?,
                PostCommands::Create(draft) => print_json(&content.create_post(draft.into()).await)?,
                PostCommands::Update { id, draft } => {
                    print_json(&content.update_post(&id, draft.into()).await)?
                }
                PostCommands::Delete { id } => print_json(&content.delete_post(&id).await)?,
            }
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
