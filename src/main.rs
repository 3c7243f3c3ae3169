//! # Coachdesk CLI (`coachdesk`)
//!
//! Ask the in-app assistant questions, browse its knowledge base, hold a
//! chat session in the terminal, or serve the HTTP API used by the widget.
//!
//! ## Usage
//!
//! ```bash
//! coachdesk --config ./config/coachdesk.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `coachdesk ask "<query>"` | Match one query and print the answer |
//! | `coachdesk suggest [path]` | Starter suggestions for a route |
//! | `coachdesk chat` | Interactive session |
//! | `coachdesk kb list` | List knowledge base entries |
//! | `coachdesk kb check` | Validate content files |
//! | `coachdesk serve` | Start the HTTP server |
//!
//! ## Examples
//!
//! ```bash
//! coachdesk ask "how much does it cost" --role visitor
//! coachdesk ask "how do I book for an athlete" --role coach --explain
//! coachdesk suggest /admin/drills
//! coachdesk chat --role athlete --name Sam --path /dashboard
//! coachdesk serve --config ./config/coachdesk.toml
//! ```

use clap::{Parser, Subcommand};
use std::io;
use std::path::{Path, PathBuf};

use coachdesk::config::{self, Config};
use coachdesk::{ask, chat, kb_cmd, knowledge, logging, server, suggest_cmd};
use coachdesk_core::role::{Viewer, ViewerRole};

/// Coachdesk: the in-app help assistant for a coaching platform.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. When the file does not exist the built-in content and defaults
/// are used.
#[derive(Parser)]
#[command(
    name = "coachdesk",
    about = "Coachdesk: role-aware in-app help assistant",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/coachdesk.toml`.
    #[arg(long, global = true, default_value = "./config/coachdesk.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Match a single query and print the answer.
    Ask {
        /// The question, as a viewer would type it.
        query: String,

        /// Viewer role: visitor, athlete, or coach.
        #[arg(long, default_value = "visitor", value_parser = parse_role)]
        role: ViewerRole,

        /// Show the score breakdown of the top candidates.
        #[arg(long)]
        explain: bool,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Show starter suggestions for an application route.
    Suggest {
        /// Route path, e.g. `/admin/drills`. Defaults to `/`.
        #[arg(default_value = "/")]
        path: String,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Hold an interactive session on stdin/stdout.
    Chat {
        /// Viewer role: visitor, athlete, or coach.
        #[arg(long, default_value = "visitor", value_parser = parse_role)]
        role: ViewerRole,

        /// First name used in the greeting.
        #[arg(long)]
        name: Option<String>,

        /// Route the viewer is on; drives starter suggestions.
        #[arg(long, default_value = "/")]
        path: String,
    },

    /// Inspect the knowledge base.
    Kb {
        #[command(subcommand)]
        action: KbAction,
    },

    /// Start the HTTP server.
    Serve {
        /// Override `[server].bind`.
        #[arg(long)]
        bind: Option<String>,
    },
}

#[derive(Subcommand)]
enum KbAction {
    /// List entries, optionally only those visible to a role.
    List {
        #[arg(long, value_parser = parse_role)]
        role: Option<ViewerRole>,
    },
    /// Load and validate the configured content, then print a summary.
    Check,
}

fn parse_role(s: &str) -> Result<ViewerRole, String> {
    s.parse::<ViewerRole>().map_err(|e| e.to_string())
}

/// Load the config file if it exists, otherwise fall back to defaults.
fn load_or_minimal(path: &Path) -> anyhow::Result<Config> {
    if path.exists() {
        config::load_config(path)
    } else {
        Ok(Config::minimal())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut cfg = load_or_minimal(&cli.config)?;
    logging::init(&cfg.logging.level)?;
    tracing::debug!(config = %cli.config.display(), "configuration loaded");

    let assistant = knowledge::load_assistant(&cfg)?;

    match cli.command {
        Commands::Ask {
            query,
            role,
            explain,
            json,
        } => {
            ask::run_ask(&assistant, &query, role, explain, json)?;
        }
        Commands::Suggest { path, json } => {
            suggest_cmd::run_suggest(&assistant, &path, json)?;
        }
        Commands::Chat { role, name, path } => {
            let mut viewer = Viewer::new(role);
            if let Some(name) = name {
                viewer = viewer.with_first_name(name);
            }
            let interactive = atty::is(atty::Stream::Stdin);
            let stdin = io::stdin();
            let mut stdout = io::stdout();
            chat::run_chat(
                &assistant,
                viewer,
                &path,
                stdin.lock(),
                &mut stdout,
                interactive,
            )?;
        }
        Commands::Kb { action } => match action {
            KbAction::List { role } => {
                kb_cmd::list_entries(&assistant, role)?;
            }
            KbAction::Check => {
                kb_cmd::check(&assistant)?;
            }
        },
        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                cfg.server.bind = bind;
            }
            server::run_server(&cfg, assistant).await?;
        }
    }

    Ok(())
}
