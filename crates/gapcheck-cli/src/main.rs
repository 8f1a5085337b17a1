mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{
    channel::ChannelSubcommand, config::ConfigSubcommand, report::ReportSubcommand,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "gapcheck",
    about = "Business gap analysis: capture questionnaire answers, compute market and funnel gaps, share reports",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .gapcheck/)
    #[arg(long, global = true, env = "GAPCHECK_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize gapcheck in the current directory
    Init,

    /// Create, list, show and delete saved reports
    Report {
        #[command(subcommand)]
        subcommand: ReportSubcommand,
    },

    /// Set one or more fields on a report: `set <slug> <field> <value> [<field> <value>...]`
    Set {
        slug: String,
        /// Alternating field names and values. An empty value clears the field.
        #[arg(num_args = 2.., value_names = ["FIELD", "VALUE"], required = true)]
        pairs: Vec<String>,
    },

    /// Print the current value of a field
    Get { slug: String, field: String },

    /// List settable fields, grouped by questionnaire section
    Fields {
        /// Only list fields in this section (e.g. market, funnel)
        #[arg(long)]
        section: Option<String>,
    },

    /// Import `Label: Value` lines into a report (reads stdin without --file)
    Import {
        slug: String,
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Add or remove marketing channels
    Channel {
        #[command(subcommand)]
        subcommand: ChannelSubcommand,
    },

    /// Show the planned budget and 5-year SBA projection
    Budget { slug: String },

    /// Project revenue from funnel improvements
    Scenario {
        slug: String,
        /// Percentage-point increase to reach / store traffic
        #[arg(long)]
        visibility: Option<f64>,
        /// Percentage-point increase to lead conversion / purchase rate
        #[arg(long)]
        conversion: Option<f64>,
        /// Percentage-point increase to close rate / repeat rate
        #[arg(long)]
        closing: Option<f64>,
        /// Store the given increases on the report
        #[arg(long)]
        save: bool,
    },

    /// Inspect and validate .gapcheck/config.yaml
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Serve the JSON API and shareable report links
    Serve {
        /// Port to listen on (default: server.port from config)
        #[arg(long)]
        port: Option<u16>,

        /// Open the report list (/api/reports) in a browser
        #[arg(long)]
        open: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::Report { subcommand } => cmd::report::run(&root, subcommand, cli.json),
        Commands::Set { slug, pairs } => cmd::set::run(&root, &slug, &pairs, cli.json),
        Commands::Get { slug, field } => cmd::set::get(&root, &slug, &field, cli.json),
        Commands::Fields { section } => cmd::fields::run(section.as_deref(), cli.json),
        Commands::Import { slug, file } => cmd::import::run(&root, &slug, file.as_deref(), cli.json),
        Commands::Channel { subcommand } => cmd::channel::run(&root, subcommand, cli.json),
        Commands::Budget { slug } => cmd::budget::run(&root, &slug, cli.json),
        Commands::Scenario {
            slug,
            visibility,
            conversion,
            closing,
            save,
        } => cmd::scenario::run(
            &root,
            &slug,
            cmd::scenario::Overrides {
                visibility,
                conversion,
                closing,
            },
            save,
            cli.json,
        ),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
        Commands::Serve { port, open } => cmd::serve::run(&root, port, open),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
