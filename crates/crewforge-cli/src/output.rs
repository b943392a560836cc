use crewforge_core::validate::ValidationError;
use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.len());
            }
        }
    }

    let header_row: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| format!("{:width$}", h, width = widths[i]))
        .collect();
    println!("{}", header_row.join("  "));

    let sep: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    println!("{}", sep.join("  "));

    for row in &rows {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let w = widths.get(i).copied().unwrap_or(0);
                format!("{:width$}", cell, width = w)
            })
            .collect();
        println!("{}", cells.join("  "));
    }
}

/// Print the post-edit state of an entity: a confirmation plus any
/// validation errors still attached to it. Errors do not fail the command —
/// fields are always written; only export is gated.
pub fn report_entity(
    errors: &[ValidationError],
    json: bool,
    confirm: impl FnOnce(),
) -> anyhow::Result<()> {
    if json {
        print_json(&serde_json::json!({ "errors": errors }))?;
        return Ok(());
    }
    confirm();
    if !errors.is_empty() {
        print_errors(errors);
    }
    Ok(())
}

/// Shared rendering for validation error lists.
pub fn print_errors(errors: &[ValidationError]) {
    let rows = errors
        .iter()
        .map(|e| {
            vec![
                format!("{:?}", e.scope).to_lowercase(),
                e.key.clone(),
                e.field.clone(),
                e.message.clone(),
            ]
        })
        .collect();
    print_table(&["scope", "key", "field", "message"], rows);
}
