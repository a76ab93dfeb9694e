use cinecurate_config::CredentialStatus;

pub const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Lay out `names` alphabetically in fixed-width columns.
pub fn grid_lines<S: AsRef<str>>(
    names: &[S],
    columns: usize,
    width: usize,
) -> Vec<String> {
    let mut sorted: Vec<&str> = names.iter().map(|name| name.as_ref()).collect();
    sorted.sort_unstable();

    sorted
        .chunks(columns.max(1))
        .map(|row| {
            row.iter()
                .map(|name| format!("{name:<width$}"))
                .collect::<String>()
                .trim_end()
                .to_string()
        })
        .collect()
}

pub fn status_lines(status: CredentialStatus) -> Vec<String> {
    let mark = |present: bool| if present { "✔" } else { "✘" };
    vec![
        format!("Plex Token: {}", mark(status.plex_token)),
        format!("Plex URL: {}", mark(status.plex_url)),
        format!("TMDb API Key: {}", mark(status.tmdb_api_key)),
    ]
}
