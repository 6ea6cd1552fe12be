use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    print!("{}", render_table(headers, &rows));
}

/// Left-aligned columns two spaces apart, a dashed rule under the header.
/// Widths count chars so titles with non-ASCII text stay aligned; trailing
/// padding is dropped from every line. Cells beyond the header count are cut.
fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(col, header)| {
            rows.iter()
                .filter_map(|row| row.get(col))
                .map(|cell| cell.chars().count())
                .fold(header.chars().count(), usize::max)
        })
        .collect();

    let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    let mut out = render_line(headers, &widths);
    out.push_str(&render_line(&rule, &widths));
    for row in rows {
        out.push_str(&render_line(row, &widths));
    }
    out
}

fn render_line<S: AsRef<str>>(cells: &[S], widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{:width$}", cell.as_ref()))
        .collect();
    format!("{}\n", padded.join("  ").trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn columns_fit_widest_cell() {
        let table = render_table(
            &["ID", "TITLE"],
            &[row(&["task-007", "Add retry logic"]), row(&["task-010", "Docs"])],
        );
        assert_eq!(
            table,
            "ID        TITLE\n\
             --------  ---------------\n\
             task-007  Add retry logic\n\
             task-010  Docs\n"
        );
    }

    #[test]
    fn non_ascii_titles_align_by_char() {
        let table = render_table(&["T", "X"], &[row(&["Überprüfung", "1"]), row(&["a", "2"])]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[2], "Überprüfung  1");
        assert_eq!(lines[3], "a            2");
    }

    #[test]
    fn extra_cells_are_dropped() {
        let table = render_table(&["A"], &[row(&["x", "ignored"])]);
        assert_eq!(table, "A\n-\nx\n");
    }
}
