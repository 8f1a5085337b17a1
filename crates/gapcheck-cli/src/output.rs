use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}

pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    print!("{}", render_table(headers, &rows));
}

/// Aligned `label: value` lines, e.g. the totals under a table.
pub fn print_pairs(pairs: &[(&str, String)]) {
    let width = pairs
        .iter()
        .map(|(label, _)| label.chars().count() + 1)
        .max()
        .unwrap_or(0);
    for (label, value) in pairs {
        println!("{:<width$} {value}", format!("{label}:"));
    }
}

/// Figures (`$1,200`, `-$40`, `12.5%`, `5,000`) line up on the right.
fn is_figure(cell: &str) -> bool {
    let body = cell.trim_start_matches('-').trim_start_matches('$');
    let body = body.strip_suffix('%').unwrap_or(body);
    !body.is_empty() && body.chars().all(|c| c.is_ascii_digit() || c == ',' || c == '.')
}

fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(widths.len()) {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }
    // a column is numeric when every non-empty cell is a figure
    let numeric: Vec<bool> = (0..widths.len())
        .map(|i| {
            let mut cells = rows.iter().filter_map(|r| r.get(i)).filter(|c| !c.is_empty());
            let first = cells.next();
            first.is_some_and(|c| is_figure(c)) && cells.all(|c| is_figure(c))
        })
        .collect();

    let mut out = render_line(headers.iter().copied(), &widths, &numeric);
    let sep: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    out.push_str(&sep.join("  "));
    out.push('\n');
    for row in rows {
        out.push_str(&render_line(row.iter().map(String::as_str), &widths, &numeric));
    }
    out
}

fn render_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize], numeric: &[bool]) -> String {
    let parts: Vec<String> = cells
        .zip(widths.iter().zip(numeric))
        .map(|(cell, (&w, &right))| {
            if right {
                format!("{cell:>w$}")
            } else {
                format!("{cell:<w$}")
            }
        })
        .collect();
    format!("{}\n", parts.join("  ").trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn figures_align_right() {
        let out = render_table(
            &["YEAR", "BUDGET"],
            &[row(&["1", "$80,000"]), row(&["2", "$99,200"]), row(&["10", "$1,000,000"])],
        );
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "YEAR      BUDGET");
        assert_eq!(lines[2], "   1     $80,000");
        assert_eq!(lines[4], "  10  $1,000,000");
    }

    #[test]
    fn text_aligns_left_without_trailing_space() {
        let out = render_table(
            &["SLUG", "COMPANY"],
            &[row(&["acme", "Acme"]), row(&["suncoast-cooling", ""])],
        );
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[2], "acme              Acme");
        assert_eq!(lines[3], "suncoast-cooling");
    }

    #[test]
    fn figure_detection() {
        assert!(is_figure("$1,200"));
        assert!(is_figure("-$40"));
        assert!(is_figure("12.5%"));
        assert!(!is_figure("Year 1"));
        assert!(!is_figure("$"));
        assert!(!is_figure(""));
    }
}
