//! `aidkit` — command-line client for the emergency guide catalog.
//!
//! Every service is built once at startup from the configured SQLite store
//! and handed to the command being run.
//!
//! # Usage
//!
//! ```text
//! aidkit list
//! aidkit signup --email medic@example.org --password hunter22 --name Ada
//! aidkit add --email admin@example.org --password … --title Sunburn --content "1. …"
//! aidkit watch
//! ```

mod settings;

use std::{path::PathBuf, sync::Arc};

use aidkit_core::{federated::NoFederation, guide::Guide, session::Session};
use aidkit_store_sqlite::SqliteStore;
use aidkit_sync::Services;
use anyhow::{Context as _, bail};
use clap::{Args, Parser, Subcommand};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::settings::AppConfig;

type Client = Services<SqliteStore, NoFederation>;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "aidkit", author, version, about = "Emergency guide catalog client")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "aidkit.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Args)]
struct Credentials {
  #[arg(long)]
  email:    String,
  #[arg(long)]
  password: String,
}

#[derive(Args)]
struct GuideFields {
  #[arg(long)]
  title:   String,
  #[arg(long)]
  content: String,
  #[arg(long, default_value = "")]
  image:   String,
}

#[derive(Subcommand)]
enum Command {
  /// Insert the default guides if the catalog is empty.
  Seed,
  /// Print every guide title.
  List,
  /// Print one guide in full.
  Show { id: Uuid },
  /// Create an account and its profile.
  Signup {
    #[command(flatten)]
    creds: Credentials,
    #[arg(long)]
    name:  String,
    #[arg(long, default_value = "")]
    phone: String,
  },
  /// Sign in and report the session and role.
  Whoami {
    #[command(flatten)]
    creds: Credentials,
  },
  /// Create a guide (privileged accounts only).
  Add {
    #[command(flatten)]
    creds:  Credentials,
    #[command(flatten)]
    fields: GuideFields,
  },
  /// Replace a guide's title, content and image (privileged accounts only).
  Edit {
    id:     Uuid,
    #[command(flatten)]
    creds:  Credentials,
    #[command(flatten)]
    fields: GuideFields,
  },
  /// Delete a guide permanently (privileged accounts only).
  Delete {
    id:    Uuid,
    #[command(flatten)]
    creds: Credentials,
    /// Confirm the deletion; it cannot be undone.
    #[arg(long)]
    yes:   bool,
  },
  /// Print the catalog whenever it changes, until Ctrl-C.
  Watch,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let cfg = AppConfig::load(&cli.config)?;

  let store = SqliteStore::open(&cfg.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", cfg.store_path))?;
  let client = Services::new(Arc::new(store), Arc::new(NoFederation), &cfg.sync);

  if cfg.seed_on_start || matches!(cli.command, Command::Seed) {
    let inserted = client
      .seeder
      .ensure_default_content()
      .await
      .context("seeding default guides")?;
    if inserted > 0 {
      tracing::info!(inserted, "catalog seeded");
    }
  }

  match cli.command {
    Command::Seed => Ok(()),
    Command::List => list(&client).await,
    Command::Show { id } => show(&client, id).await,
    Command::Signup { creds, name, phone } => {
      let session = client
        .sessions
        .create_account(&creds.email, &creds.password, &name, &phone)
        .await
        .context("creating account")?;
      println!("created account {} ({})", session.identity_id, session.email);
      client.sessions.sign_out().await;
      Ok(())
    }
    Command::Whoami { creds } => {
      let session = sign_in(&client, &creds).await?;
      let privileged = client.roles.is_privileged(Some(&session)).await;
      println!("{} <{}>", session.identity_id, session.email);
      println!("privileged: {privileged}");
      client.sessions.sign_out().await;
      Ok(())
    }
    Command::Add { creds, fields } => {
      as_privileged(&client, &creds, async {
        let guide = client
          .content
          .create_guide(&fields.title, &fields.content, &fields.image)
          .await?;
        println!("created {}", guide.id);
        Ok(())
      })
      .await
    }
    Command::Edit { id, creds, fields } => {
      as_privileged(&client, &creds, async {
        client
          .content
          .update_guide(id, &fields.title, &fields.content, &fields.image)
          .await?;
        println!("updated {id}");
        Ok(())
      })
      .await
    }
    Command::Delete { id, creds, yes } => {
      if !yes {
        bail!("refusing to delete {id} without --yes");
      }
      as_privileged(&client, &creds, async {
        client.content.delete_guide(id).await?;
        println!("deleted {id}");
        Ok(())
      })
      .await
    }
    Command::Watch => watch(&client, &cfg).await,
  }
}

// ─── Commands ─────────────────────────────────────────────────────────────────

async fn list(client: &Client) -> anyhow::Result<()> {
  let catalog = client.content.list_guides().await.context("reading catalog")?;
  print_catalog(&catalog);
  Ok(())
}

async fn show(client: &Client, id: Uuid) -> anyhow::Result<()> {
  let guide = client.content.get_guide(id).await?;
  println!("{}\n", guide.title);
  println!("{}", guide.content);
  if !guide.image_path.is_empty() {
    println!("\nimage: {}", guide.image_path);
  }
  Ok(())
}

async fn watch(client: &Client, cfg: &AppConfig) -> anyhow::Result<()> {
  let mut snapshots = client
    .content
    .subscribe_guides()
    .await
    .context("subscribing to catalog")?;
  let mut ticker = tokio::time::interval(cfg.sync.refresh_interval());

  loop {
    tokio::select! {
      snapshot = snapshots.next() => {
        let Some(catalog) = snapshot else { break };
        print_catalog(&catalog);
        println!();
      }
      _ = ticker.tick() => {
        if let Err(e) = client.content.refresh().await {
          tracing::warn!("catalog refresh failed: {e}");
        }
      }
      _ = tokio::signal::ctrl_c() => break,
    }
  }
  Ok(())
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

async fn sign_in(client: &Client, creds: &Credentials) -> anyhow::Result<Session> {
  client
    .sessions
    .sign_in_with_password(&creds.email, &creds.password)
    .await
    .context("signing in")
}

/// Run `action` signed in as a privileged identity, signing out afterwards
/// whatever the outcome.
async fn as_privileged(
  client: &Client,
  creds: &Credentials,
  action: impl Future<Output = aidkit_core::Result<()>>,
) -> anyhow::Result<()> {
  let session = sign_in(client, creds).await?;
  let outcome = if client.roles.is_privileged(Some(&session)).await {
    action.await.map_err(anyhow::Error::from)
  } else {
    Err(anyhow::anyhow!("{} is not allowed to edit guides", session.email))
  };
  client.sessions.sign_out().await;
  outcome
}

fn print_catalog(catalog: &[Guide]) {
  if catalog.is_empty() {
    println!("(no guides)");
  }
  for guide in catalog {
    println!("{}  {}", guide.id, guide.title);
  }
}
