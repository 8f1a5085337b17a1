use crate::output::print_json;
use anyhow::Context;
use gapcheck_core::import::{self, SkipReason};
use std::io::Read;
use std::path::Path;

pub fn run(root: &Path, slug: &str, file: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let paste = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read paste from stdin")?;
            buf
        }
    };
    if paste.trim().is_empty() {
        anyhow::bail!("nothing to import: the paste is empty");
    }

    let mut session = super::Session::open(root, slug)?;
    let outcome = import::import(&mut session.form, &paste)?;
    session.finish()?;

    if json {
        print_json(&outcome)?;
        return Ok(());
    }

    println!(
        "Imported {} value(s) into {slug}; {} line(s) skipped.",
        outcome.applied.len(),
        outcome.skipped.len()
    );
    for a in &outcome.applied {
        println!("  line {:>3}  {} = {}", a.line, a.field, a.value);
    }
    for s in &outcome.skipped {
        let why = match &s.reason {
            SkipReason::NoSeparator => "no `Label: Value` separator".to_string(),
            SkipReason::UnknownLabel => "unknown label".to_string(),
            SkipReason::NoAnswer => "no answer".to_string(),
            SkipReason::Invalid(msg) => msg.clone(),
        };
        println!("  line {:>3}  skipped ({why}): {}", s.line, s.text.trim());
    }
    Ok(())
}
