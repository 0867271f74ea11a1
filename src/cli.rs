use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::export::ExportFormat;
use crate::commands::{self, CommandReport, Session};
use crate::journal::query::{FilterSpec, PhaseFilter, split_list};
use crate::logging;

#[derive(Debug, Parser)]
#[command(
    name = "astraea",
    version,
    about = "Lunar and cycle journal: browse, compose and publish entries"
)]
pub struct Cli {
    /// Print the command report as JSON
    #[arg(long, global = true)]
    pub json: bool,
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
    /// Ignore local drafts when reading
    #[arg(long, global = true)]
    pub no_drafts: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Library: visible entries, filtered, newest first
    List(FilterArgs),
    /// Distinct tags across visible entries
    Tags,
    /// One entry, as the public sees it
    Show { id: String },
    /// Entries in a thread
    Thread { slug: String },
    /// Cycle plans with their entries and top tags/herbs
    Cycle {
        #[arg(long)]
        id: Option<String>,
    },
    /// Compose an entry and publish it, keep it as a draft, or print it
    Compose(ComposeArgs),
    /// Publish an entry from a JSON file
    Publish {
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        key: Option<String>,
    },
    /// Local drafts
    Drafts {
        #[command(subcommand)]
        action: DraftsAction,
    },
    /// Export the library view
    Export {
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(long, value_enum, default_value = "json")]
        format: ExportFormat,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Paths, config, store reachability and env sanity
    Status,
    /// Serve the JSON HTTP API
    Serve {
        #[arg(long)]
        bind: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum DraftsAction {
    List,
    Clear,
}

#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// Free-text search
    #[arg(long, default_value = "")]
    pub q: String,
    /// Lunar phase, or `any`
    #[arg(long)]
    pub phase: Option<String>,
    /// Comma-separated tags; all must match
    #[arg(long, default_value = "")]
    pub tags: String,
    #[arg(long)]
    pub thread: Option<String>,
    #[arg(long)]
    pub from: Option<String>,
    #[arg(long)]
    pub to: Option<String>,
    /// Whole filter as a query string (`q=..&phase=..&tags=..`); overrides the flags
    #[arg(long)]
    pub query: Option<String>,
}

impl FilterArgs {
    pub fn to_spec(&self) -> FilterSpec {
        if let Some(query) = &self.query {
            return FilterSpec::from_query_string(query);
        }
        FilterSpec {
            q: self.q.trim().to_string(),
            phase: self
                .phase
                .as_deref()
                .map(PhaseFilter::parse)
                .unwrap_or_default(),
            tags: split_list(&self.tags),
            thread: self.thread.clone(),
            from: self.from.clone(),
            to: self.to.clone(),
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct ComposeArgs {
    /// Entry date (YYYY-MM-DD); defaults to today in the configured timezone
    #[arg(long)]
    pub date: Option<String>,
    /// Evening slot (`-pm` id suffix)
    #[arg(long)]
    pub pm: bool,
    #[arg(long)]
    pub cycle_day: Option<i64>,
    #[arg(long, default_value = "full")]
    pub phase: String,
    #[arg(long, default_value = "")]
    pub tags: String,
    #[arg(long, default_value = "")]
    pub symptoms: String,
    #[arg(long, default_value = "")]
    pub practices: String,
    #[arg(long, default_value = "")]
    pub threads: String,
    #[arg(long, default_value = "")]
    pub herbs: String,
    #[arg(long)]
    pub mood: Option<String>,
    #[arg(long)]
    pub digestion_notes: Option<String>,
    #[arg(long, default_value = "")]
    pub digestion_tags: String,
    #[arg(long)]
    pub baseline_prompt: Option<String>,
    #[arg(long)]
    pub baseline_response: Option<String>,
    #[arg(long, default_value = "")]
    pub helped: String,
    #[arg(long, default_value = "")]
    pub hindered: String,
    #[arg(long)]
    pub thread_notes: Option<String>,
    #[arg(long, default_value = "public")]
    pub privacy: String,
    #[arg(long, default_value = "")]
    pub notes: String,
    /// Save to local drafts instead of publishing
    #[arg(long, conflicts_with = "print")]
    pub draft: bool,
    /// Validate and print the entry without saving it
    #[arg(long)]
    pub print: bool,
    /// Write key; falls back to ASTRAEA_COMPOSE_KEY
    #[arg(long)]
    pub key: Option<String>,
}

fn print_report(report: &CommandReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }
    for line in &report.details {
        println!("{line}");
    }
    for issue in &report.issues {
        println!("issue: {issue}");
    }
    Ok(())
}

fn dispatch(cli: &Cli) -> Result<CommandReport> {
    if let Command::Status = cli.command {
        return commands::status::run();
    }
    let session = Session::load(!cli.no_drafts)?;
    match &cli.command {
        Command::List(filter) => commands::list::run(&session, &filter.to_spec()),
        Command::Tags => commands::tags::run(&session),
        Command::Show { id } => commands::show::run(&session, id),
        Command::Thread { slug } => commands::thread::run(&session, slug),
        Command::Cycle { id } => commands::cycle::run(&session, id.as_deref()),
        Command::Compose(args) => commands::compose::run(&session, args),
        Command::Publish { file, key } => commands::publish::run(&session, file, key.as_deref()),
        Command::Drafts { action } => match action {
            DraftsAction::List => commands::drafts::list(&session),
            DraftsAction::Clear => commands::drafts::clear(&session),
        },
        Command::Export {
            filter,
            format,
            out,
        } => commands::export::run(&session, &filter.to_spec(), *format, out.as_deref()),
        Command::Serve { bind } => commands::serve::run(&session, bind.as_deref()),
        Command::Status => commands::status::run(),
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);

    let report = dispatch(&cli)?;
    print_report(&report, cli.json)?;
    if !report.ok {
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::entry::Phase;

    #[test]
    fn filter_flags_build_a_filter() {
        let cli = Cli::parse_from([
            "astraea", "list", "--q", " Sleep ", "--phase", "new", "--tags", "a, b",
        ]);
        let Command::List(filter) = cli.command else {
            panic!("expected list");
        };
        let spec = filter.to_spec();
        assert_eq!(spec.q, "Sleep");
        assert_eq!(spec.phase, PhaseFilter::Only(Phase::New));
        assert_eq!(spec.tags, vec!["a", "b"]);
    }

    #[test]
    fn query_string_overrides_flags() {
        let cli = Cli::parse_from(["astraea", "list", "--q", "x", "--query", "tags=TCM&phase=any"]);
        let Command::List(filter) = cli.command else {
            panic!("expected list");
        };
        let spec = filter.to_spec();
        assert_eq!(spec.q, "");
        assert_eq!(spec.phase, PhaseFilter::Any);
        assert_eq!(spec.tags, vec!["TCM"]);
    }

    #[test]
    fn draft_and_print_conflict() {
        assert!(Cli::try_parse_from(["astraea", "compose", "--draft", "--print"]).is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["astraea", "tags", "--json", "--no-drafts"]);
        assert!(cli.json);
        assert!(cli.no_drafts);
    }
}
