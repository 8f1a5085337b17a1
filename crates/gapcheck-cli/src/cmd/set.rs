use crate::output::print_json;
use anyhow::Context;
use gapcheck_core::fields;
use std::path::Path;

pub fn run(root: &Path, slug: &str, pairs: &[String], json: bool) -> anyhow::Result<()> {
    if pairs.len() % 2 != 0 {
        anyhow::bail!(
            "expected FIELD VALUE pairs, got {} arguments; quote values with spaces and use \"\" to clear",
            pairs.len()
        );
    }

    let mut session = super::Session::open(root, slug)?;
    let mut changed = Vec::new();
    for pair in pairs.chunks(2) {
        let (name, raw) = (&pair[0], &pair[1]);
        // all-or-nothing: an error here returns before the session is saved
        let field = session
            .form
            .set(name, raw)
            .with_context(|| format!("cannot set '{name}'; report '{slug}' unchanged"))?;
        changed.push(field.path.clone());
    }
    let record = session.finish()?;

    if json {
        let doc = serde_json::to_value(&record)?;
        let values: serde_json::Map<String, serde_json::Value> = changed
            .iter()
            .filter_map(|path| fields::find(path))
            .map(|f| {
                let v = doc.pointer(&f.pointer).cloned().unwrap_or_default();
                (f.path.clone(), v)
            })
            .collect();
        print_json(&values)?;
    } else {
        for path in &changed {
            println!("Set {path}");
        }
        for issue in record.validate() {
            if changed.contains(&issue.field) {
                println!("  warning: {}: {}", issue.field, issue.message);
            }
        }
    }
    Ok(())
}

pub fn get(root: &Path, slug: &str, field: &str, json: bool) -> anyhow::Result<()> {
    let session = super::Session::open(root, slug)?;
    let spec = fields::lookup(field)?;
    let value = session.form.get(&spec.path)?;

    if json {
        print_json(&serde_json::json!({ "field": spec.path, "value": value }))?;
    } else {
        match value {
            serde_json::Value::Null => {}
            serde_json::Value::String(s) => println!("{s}"),
            other => println!("{other}"),
        }
    }
    Ok(())
}
