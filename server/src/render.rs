use std::fmt::Write as _;

use entity::User;
use products_usuarios::PageInfo;

const HEADERS: [&str; 5] = ["ID", "USUARIO", "ESTADO", "SECTOR", "DEACTIVATE"];

/// Plain-text table of `users`, one row per user. The last column shows
/// whether the deactivate action is available.
pub fn table(users: &[&User]) -> String {
    if users.is_empty() {
        return "No users found.\n".to_string();
    }

    let rows: Vec<[String; 5]> = users
        .iter()
        .map(|user| {
            [
                user.id.clone(),
                user.usuario.clone(),
                user.estado.to_string(),
                user.sector.map(|s| s.to_string()).unwrap_or_else(|| "-".into()),
                if user.estado.is_active() { "yes" } else { "-" }.to_string(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    write_row(&mut out, &HEADERS.map(String::from), &widths);
    for row in &rows {
        write_row(&mut out, row, &widths);
    }
    out
}

fn write_row(out: &mut String, cells: &[String; 5], widths: &[usize; 5]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    let _ = writeln!(out, "{}", line.trim_end());
}

pub fn footer(info: &PageInfo) -> String {
    format!(
        "page {} of {} ({} records)",
        info.page,
        info.page_count().max(1),
        info.total_records
    )
}
