use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use gapcheck_core::form::FormState;
use gapcheck_core::report::ReportView;
use gapcheck_core::{paths, persist};
use std::path::{Path, PathBuf};

#[derive(Subcommand)]
pub enum ReportSubcommand {
    /// Create and save a new report for a company
    Create {
        company_name: String,
        /// Use this slug instead of deriving one from the company name
        #[arg(long)]
        slug: Option<String>,
        /// Seed the report from a JSON record file
        #[arg(long)]
        from: Option<PathBuf>,
        /// Overwrite an existing report with the same slug
        #[arg(long)]
        force: bool,
    },
    /// List saved reports
    List,
    /// Show a report with every derived metric
    Show { slug: String },
    /// Print the saved record as JSON
    Export { slug: String },
    /// Merge a partial JSON record into a report (`null` clears a field)
    Patch {
        slug: String,
        #[arg(id = "patch_json", value_name = "JSON")]
        json: String,
    },
    /// Delete a saved report
    Delete { slug: String },
}

pub fn run(root: &Path, subcmd: ReportSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ReportSubcommand::Create {
            company_name,
            slug,
            from,
            force,
        } => create(root, &company_name, slug, from.as_deref(), force, json),
        ReportSubcommand::List => list(root, json),
        ReportSubcommand::Show { slug } => show(root, &slug, json),
        ReportSubcommand::Export { slug } => export(root, &slug),
        ReportSubcommand::Patch { slug, json: patch } => patch_report(root, &slug, &patch, json),
        ReportSubcommand::Delete { slug } => delete(root, &slug, json),
    }
}

fn create(
    root: &Path,
    company_name: &str,
    slug: Option<String>,
    from: Option<&Path>,
    force: bool,
    json: bool,
) -> anyhow::Result<()> {
    let (config, store) = super::open(root)?;

    let mut form = FormState::new();
    if let Some(path) = from {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let seed: serde_json::Value = serde_json::from_str(&data)
            .with_context(|| format!("{} is not valid JSON", path.display()))?;
        form.update(&seed)
            .with_context(|| format!("{} is not a valid record", path.display()))?;
    }
    form.set("client.company_name", company_name)?;
    let name = form
        .record()
        .require_company_name()
        .context("pass a non-empty company name")?
        .to_string();

    let slug = slug.unwrap_or_else(|| paths::slug_for(Some(&name)));
    if !force && persist::exists(store.as_ref(), &slug)? {
        anyhow::bail!(
            "report '{slug}' already exists: edit it with `gapcheck set {slug} ...` or pass --force"
        );
    }

    let mut record = form.into_record();
    record.share_url = Some(paths::share_url(&config.share.base_url, &slug));
    persist::save_as(store.as_ref(), &slug, &record)
        .with_context(|| format!("failed to save report '{slug}'"))?;

    if json {
        print_json(&serde_json::json!({
            "slug": slug,
            "share_url": record.share_url,
        }))?;
    } else {
        println!("Created report: {slug} ({name})");
        if let Some(url) = &record.share_url {
            println!("Share: {url}");
        }
        println!("Next: gapcheck fields  |  gapcheck set {slug} <field> <value>");
    }
    Ok(())
}

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let (_, store) = super::open(root)?;
    let reports = persist::list_summaries(store.as_ref()).context("failed to list reports")?;

    if json {
        print_json(&reports)?;
        return Ok(());
    }

    if reports.is_empty() {
        println!("No reports yet.");
        return Ok(());
    }

    let rows = reports
        .into_iter()
        .map(|r| {
            vec![
                r.slug,
                r.company_name.unwrap_or_default(),
                r.industry.unwrap_or_default(),
            ]
        })
        .collect();
    print_table(&["SLUG", "COMPANY", "INDUSTRY"], rows);
    Ok(())
}

fn show(root: &Path, slug: &str, json: bool) -> anyhow::Result<()> {
    let (config, store) = super::open(root)?;
    let record = super::load_report(store.as_ref(), slug)?;
    let view = ReportView::build(record, Some(slug), &config);

    if json {
        print_json(&view)?;
    } else {
        print!("{}", view.render_text());
    }
    Ok(())
}

fn export(root: &Path, slug: &str) -> anyhow::Result<()> {
    let (_, store) = super::open(root)?;
    let record = super::load_report(store.as_ref(), slug)?;
    print_json(&record)
}

fn patch_report(root: &Path, slug: &str, patch: &str, json: bool) -> anyhow::Result<()> {
    let partial: serde_json::Value =
        serde_json::from_str(patch).context("patch is not valid JSON")?;
    let mut session = super::Session::open(root, slug)?;
    session
        .form
        .update(&partial)
        .with_context(|| format!("patch rejected; report '{slug}' unchanged"))?;
    let record = session.finish()?;

    if json {
        print_json(&record)?;
    } else {
        println!("Updated report: {slug}");
    }
    Ok(())
}

fn delete(root: &Path, slug: &str, json: bool) -> anyhow::Result<()> {
    let (_, store) = super::open(root)?;
    persist::delete(store.as_ref(), slug).map_err(|e| match e {
        gapcheck_core::GapError::ReportNotFound(_) => {
            anyhow::anyhow!("report '{slug}' not found: run `gapcheck report list`")
        }
        other => anyhow::Error::new(other).context(format!("failed to delete report '{slug}'")),
    })?;

    if json {
        print_json(&serde_json::json!({ "deleted": slug }))?;
    } else {
        println!("Deleted report: {slug}");
    }
    Ok(())
}
