use crate::output::{print_json, print_table};
use gapcheck_core::fields::{self, Section};

pub fn run(section: Option<&str>, json: bool) -> anyhow::Result<()> {
    let sections: Vec<Section> = match section {
        Some(name) => vec![name.parse::<Section>()?],
        None => Section::all().to_vec(),
    };

    if json {
        let list: Vec<_> = sections
            .iter()
            .flat_map(|s| fields::in_section(*s))
            .collect();
        print_json(&list)?;
        return Ok(());
    }

    for (i, section) in sections.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("{}", section.title());
        let rows = fields::in_section(*section)
            .map(|f| {
                vec![
                    f.path.clone(),
                    f.label.clone(),
                    f.kind.hint().to_string(),
                ]
            })
            .collect();
        print_table(&["FIELD", "LABEL", "VALUE"], rows);
    }
    Ok(())
}
