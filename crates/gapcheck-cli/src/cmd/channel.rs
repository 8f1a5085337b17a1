use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use gapcheck_core::numeric::parse_amount;
use gapcheck_core::record::MarketingChannel;
use std::path::Path;

#[derive(Subcommand)]
pub enum ChannelSubcommand {
    /// Add a marketing channel to a report
    Add {
        slug: String,
        name: String,
        /// Monthly spend (accepts 1.5K, $2,000)
        #[arg(long)]
        monthly_spend: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Remove a marketing channel by name
    Remove { slug: String, name: String },
}

pub fn run(root: &Path, subcmd: ChannelSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ChannelSubcommand::Add {
            slug,
            name,
            monthly_spend,
            notes,
        } => add(root, &slug, name, monthly_spend.as_deref(), notes, json),
        ChannelSubcommand::Remove { slug, name } => remove(root, &slug, &name, json),
    }
}

fn add(
    root: &Path,
    slug: &str,
    name: String,
    monthly_spend: Option<&str>,
    notes: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let monthly_spend = monthly_spend
        .map(|raw| {
            parse_amount(raw).ok_or_else(|| anyhow::anyhow!("invalid monthly spend '{raw}'"))
        })
        .transpose()?;

    let mut session = super::Session::open(root, slug)?;
    let count = session
        .form
        .add_channel(MarketingChannel {
            name: name.trim().to_string(),
            monthly_spend,
            notes,
        })
        .context("cannot add channel")?;
    let record = session.finish()?;

    if json {
        print_json(&record.channels)?;
    } else {
        println!("Added channel '{}' to {slug} ({count} total)", name.trim());
    }
    Ok(())
}

fn remove(root: &Path, slug: &str, name: &str, json: bool) -> anyhow::Result<()> {
    let mut session = super::Session::open(root, slug)?;
    let removed = session
        .form
        .remove_channel(name)
        .with_context(|| format!("cannot remove channel from '{slug}'"))?;
    let record = session.finish()?;

    if json {
        print_json(&record.channels)?;
    } else {
        println!("Removed channel '{}' from {slug}", removed.name);
    }
    Ok(())
}
