use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::export::{ExportFormat, export_conversation};
use crate::filters::{matches_filter, parse_filter};
use crate::indexer::{FavoriteSet, Library, ProviderStatus, load_library};
use crate::models::{BlockFilter, Provider};
use crate::parsers::{EmptyNameDedup, ParseOptions, inspect_export_file};
use crate::search::{HitKind, strict_search};
use crate::utils::environment::{
    CHATGPT_PATH_VAR, CLAUDE_PATH_VAR, DATA_DIR_VAR, DEFAULT_DATA_DIR, FAVORITES_PATH_VAR,
};
use crate::utils::{
    Settings, expand_tilde, format_path_with_tilde, format_timestamp, preview, strip_ansi_codes,
};

const WARNING_SAMPLES: usize = 5;
const PREVIEW_CHARS: usize = 120;

#[derive(Parser)]
#[command(name = "chat-history-explorer")]
#[command(version = "0.1.0")]
#[command(about = "Inspect, search and export ChatGPT and Claude conversation exports", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub sources: SourceArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Export locations and parser policy shared by every command
#[derive(Args)]
pub struct SourceArgs {
    /// Data directory (favorites, bare ChatGPT export)
    #[arg(long, global = true, env = DATA_DIR_VAR, default_value = DEFAULT_DATA_DIR, value_name = "DIR")]
    pub data_dir: String,

    /// ChatGPT conversations.json or the directory containing it
    #[arg(long, global = true, env = CHATGPT_PATH_VAR, value_name = "PATH")]
    pub chatgpt_path: Option<String>,

    /// Claude conversations.json or the directory containing it
    #[arg(long, global = true, env = CLAUDE_PATH_VAR, value_name = "PATH")]
    pub claude_path: Option<String>,

    /// Favorites file (defaults to <DATA_DIR>/favorites.json)
    #[arg(long, global = true, env = FAVORITES_PATH_VAR, value_name = "FILE")]
    pub favorites: Option<String>,

    /// Show Claude file uploads even when neither they nor their attachment have a name
    #[arg(long, global = true)]
    pub keep_unnamed_files: bool,
}

impl SourceArgs {
    pub fn settings(&self) -> Settings {
        let path = |raw: &Option<String>| raw.as_deref().map(expand_tilde);
        Settings::new(
            expand_tilde(&self.data_dir),
            path(&self.chatgpt_path),
            path(&self.claude_path),
            path(&self.favorites),
        )
    }

    pub fn parse_options(&self) -> ParseOptions {
        let empty_name_dedup =
            if self.keep_unnamed_files { EmptyNameDedup::Keep } else { EmptyNameDedup::Suppress };
        ParseOptions { empty_name_dedup, ..ParseOptions::default() }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ProviderArg {
    #[default]
    All,
    Chatgpt,
    Claude,
}

impl ProviderArg {
    fn includes(self, provider: Provider) -> bool {
        match self {
            Self::All => true,
            Self::Chatgpt => provider == Provider::ChatGpt,
            Self::Claude => provider == Provider::Claude,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    #[default]
    Markdown,
    Text,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse the configured exports and report counts, warnings and asset resolution
    Inspect {
        #[arg(long, value_enum, default_value_t = ProviderArg::All)]
        provider: ProviderArg,
    },
    /// Identify the provider and date range of one export file
    Detect {
        /// Path to a conversations.json file
        path: PathBuf,
    },
    /// Write conversations as Markdown or text files
    Export {
        /// Output directory
        #[arg(long, default_value = "exports", value_name = "DIR")]
        out: PathBuf,
        #[arg(long, value_enum, default_value_t = ProviderArg::All)]
        provider: ProviderArg,
        /// Filter query, e.g. 'provider:claude favorite:true since:2024-01-01'
        #[arg(long, value_name = "QUERY")]
        filter: Option<String>,
        #[arg(long, value_enum, default_value_t = FormatArg::Markdown)]
        format: FormatArg,
        #[arg(long)]
        exclude_system: bool,
        #[arg(long)]
        exclude_tool: bool,
        #[arg(long)]
        exclude_thinking: bool,
        #[arg(long)]
        exclude_attachments: bool,
    },
    /// Case-insensitive substring search; wrap the query in quotes for an exact phrase
    Search {
        query: String,
        #[arg(long, default_value_t = 20)]
        limit: usize,
        #[arg(long, value_enum, default_value_t = ProviderArg::All)]
        provider: ProviderArg,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Inspect { provider }) => inspect(&cli.sources, *provider),
        Some(Commands::Detect { path }) => detect(path),
        Some(Commands::Export {
            out,
            provider,
            filter,
            format,
            exclude_system,
            exclude_tool,
            exclude_thinking,
            exclude_attachments,
        }) => {
            let blocks = BlockFilter {
                include_system: !exclude_system,
                include_tool: !exclude_tool,
                include_thinking: !exclude_thinking,
                include_attachments: !exclude_attachments,
            };
            let format = match format {
                FormatArg::Markdown => ExportFormat::Markdown,
                FormatArg::Text => ExportFormat::Text,
            };
            export(&cli.sources, out, *provider, filter.as_deref(), format, &blocks)
        }
        Some(Commands::Search { query, limit, provider }) => {
            search(&cli.sources, query, *limit, *provider)
        }
        None => {
            println!("Use --help for usage information");
            Ok(())
        }
    }
}

fn load(sources: &SourceArgs) -> (Settings, Library) {
    let settings = sources.settings();
    let favorites = FavoriteSet::load(&settings.favorites_path).unwrap_or_else(|e| {
        tracing::warn!(error = %format!("{:#}", e), "ignoring favorites");
        FavoriteSet::new()
    });
    let library = load_library(&settings, &sources.parse_options(), &favorites);
    (settings, library)
}

fn inspect(sources: &SourceArgs, selection: ProviderArg) -> Result<()> {
    let (settings, library) = load(sources);

    println!("Chat History Inspection");
    println!("=======================");
    println!("Data directory: {}", format_path_with_tilde(&settings.data_dir));

    for provider in Provider::ALL.into_iter().filter(|p| selection.includes(*p)) {
        println!();
        let Some(status) = library.status(provider) else {
            println!("{}: not configured", provider.label());
            continue;
        };
        println!("{} ({})", provider.label(), format_path_with_tilde(status.source()));

        if let Some(message) = status.failure_message() {
            println!("  {}", message);
            continue;
        }
        if let ProviderStatus::Loaded { conversations, skipped, .. } = status {
            let messages: usize = library.by_provider(provider).map(|c| c.messages.len()).sum();
            println!("  Conversations: {}", conversations);
            println!("  Messages: {}", messages);
            println!("  Skipped: {}", skipped);
        }

        if let Some(warnings) = library.provider_warnings(provider) {
            println!("  Warnings: {}", warnings.len());
            for (kind, count) in warnings.count_by_kind() {
                println!("    {}: {}", kind, count);
            }
            let inventory = warnings.unknown_tag_inventory();
            if !inventory.is_empty() {
                println!("  Unknown tags:");
                for (tag, count) in inventory {
                    println!("    {}: {}", strip_ansi_codes(&tag), count);
                }
            }
            let samples = warnings.samples(WARNING_SAMPLES);
            if !samples.is_empty() {
                println!("  Sample warnings:");
                for warning in samples {
                    println!("    {}", preview(&warning.to_string(), PREVIEW_CHARS));
                }
            }
        }

        if let Some(assets) = library.assets(provider) {
            println!("  Assets: {}", assets.len());
            for (kind, stats) in assets.stats() {
                println!("    {}: {}/{} resolved", kind, stats.resolved, stats.total);
            }
        }
    }

    Ok(())
}

fn detect(path: &Path) -> Result<()> {
    let summary = inspect_export_file(path)?;

    println!("Provider: {}", summary.provider.label());
    println!("Conversations: {}", summary.conversations);
    match (summary.first_date, summary.last_date) {
        (Some(first), Some(last)) => {
            println!("First conversation: {}", format_timestamp(&first));
            println!("Last conversation: {}", format_timestamp(&last));
        }
        _ => println!("Dates: unknown"),
    }
    Ok(())
}

fn export(
    sources: &SourceArgs,
    out: &Path,
    selection: ProviderArg,
    query: Option<&str>,
    format: ExportFormat,
    blocks: &BlockFilter,
) -> Result<()> {
    let filter = parse_filter(query.unwrap_or_default()).context("Invalid --filter")?;
    let (_, library) = load(sources);

    let mut written = 0;
    for conversation in library
        .conversations()
        .iter()
        .filter(|c| selection.includes(c.provider) && matches_filter(c, &filter))
    {
        export_conversation(conversation, blocks, format, out)?;
        written += 1;
    }

    println!("Exported {} conversations to {}", written, format_path_with_tilde(out));
    Ok(())
}

fn search(sources: &SourceArgs, query: &str, limit: usize, selection: ProviderArg) -> Result<()> {
    let (_, library) = load(sources);
    let candidates = library.conversations().iter().filter(|c| selection.includes(c.provider));
    let hits = strict_search(candidates, query, limit);

    if hits.is_empty() {
        println!("No matches for {}", strip_ansi_codes(query));
        return Ok(());
    }

    for hit in &hits {
        let label = match (hit.kind, hit.role) {
            (HitKind::Message, Some(role)) => role.as_str(),
            _ => "conversation",
        };
        println!(
            "[{}] {} | {} | {}",
            hit.provider,
            format_timestamp(&hit.created_at),
            preview(&hit.title, 60),
            label
        );
        if !hit.text.is_empty() {
            println!("    {}", preview(&hit.text, PREVIEW_CHARS));
        }
        println!("    {}", hit.open_url);
    }
    println!();
    println!("{} result(s)", hits.len());
    Ok(())
}
