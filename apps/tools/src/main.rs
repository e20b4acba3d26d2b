use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use shared::domain::{VisitorId, VisitorRecord};
use storage::{encode_visitors, JsonFileStore, VisitorBook};
use tracing_subscriber::EnvFilter;

/// Inspects the kiosk's visitor store. Commands only read the store; an
/// unreadable visitor list is reported and left in place.
#[derive(Parser, Debug)]
struct Cli {
    /// Directory holding the visitor store. Defaults to the kiosk's data directory.
    #[arg(long)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Newest visits first.
    List {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    Count,
    Show {
        id: String,
    },
    /// Writes the stored visitor list, images included, as JSON.
    Export {
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();
    let cli = Cli::parse();

    let settings = client_core::load_settings();
    let data_dir = settings.resolve_data_dir(cli.data_dir.as_deref())?;
    let book = open_book(&data_dir)?;

    match cli.command {
        Command::List { limit } => print!("{}", render_list(book.visitors(), limit)),
        Command::Count => println!("{}", book.len()),
        Command::Show { id } => {
            let Some(record) = book.find(&VisitorId(id.clone())) else {
                bail!("no visitor with id {id}");
            };
            print!("{}", render_record(record));
        }
        Command::Export { output } => {
            let encoded = encode_visitors(book.visitors())?;
            fs::write(&output, encoded)
                .with_context(|| format!("failed to write {}", output.display()))?;
            tracing::info!(count = book.len(), output = %output.display(), "exported visitor list");
            println!("exported {} visitor(s) to {}", book.len(), output.display());
        }
    }

    Ok(())
}

fn open_book(data_dir: &Path) -> Result<VisitorBook<JsonFileStore>> {
    let store = JsonFileStore::open_in_dir(data_dir)?;
    tracing::info!(path = %store.path().display(), "reading visitor store");
    let book = VisitorBook::open_read_only(store)?;
    if book.is_empty() {
        tracing::warn!(data_dir = %data_dir.display(), "visitor store holds no readable visits");
    }
    Ok(book)
}

fn render_list(visitors: &[VisitorRecord], limit: usize) -> String {
    if visitors.is_empty() {
        return "no visitors recorded\n".to_string();
    }
    let mut out = String::new();
    for record in visitors.iter().take(limit) {
        out.push_str(&format!(
            "{}  {}  [{}]  {}{}\n",
            record.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
            record.id,
            record.display_category(),
            record.name,
            if record.institution.is_empty() {
                String::new()
            } else {
                format!(" ({})", record.institution)
            },
        ));
    }
    if visitors.len() > limit {
        out.push_str(&format!("... {} more\n", visitors.len() - limit));
    }
    out
}

fn render_record(record: &VisitorRecord) -> String {
    let yes_no = |present: bool| if present { "yes" } else { "no" };
    format!(
        "id:          {}\ntime:        {}\nname:        {}\ninstitution: {}\nphone:       {}\npurpose:     {}\ncategory:    {}\nmessage:     {}\nphoto:       {}\nsignature:   {}\n",
        record.id,
        record.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S"),
        record.name,
        record.institution,
        record.phone,
        record.purpose,
        record.display_category(),
        record.summary_message.as_deref().unwrap_or(""),
        yes_no(record.photo_image.is_some()),
        yes_no(record.signature_image.is_some()),
    )
}
