use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use publish_core::{ProgressBar, ProgressViewModel, StatusIcon, Tone};

const BAR_WIDTH: usize = 20;
const CLOSE_HINT: &str = "[ Close ]";

/// Renders the progress view as plain text lines.
pub fn render(view: &ProgressViewModel) -> Vec<String> {
    if !view.visible {
        return Vec::new();
    }

    let mut lines = vec![format!("{} {}", icon_glyph(view.icon), view.heading)];

    if let Some(bar) = view.progress {
        lines.push(render_bar(bar));
    }

    lines.push(view.message.clone());

    if !view.platforms.is_empty() {
        lines.push("Platform Status:".to_string());
        for row in &view.platforms {
            let badge = row.badge.map(icon_glyph).unwrap_or("");
            lines.push(
                format!("  {:<12} {} {}", capitalize(&row.name), row.status, badge)
                    .trim_end()
                    .to_string(),
            );
        }
    }

    if let Some(error) = &view.error {
        lines.push(format!("Error: {error}"));
    }

    if let Some(result) = &view.result {
        lines.push(format!("Result: {}", result.summary));
        if let Some(warning) = &result.warning {
            lines.push(format!("  {} note: {}", capitalize(&warning.platform), warning.text));
        }
    }

    if let Some(hint) = view.hint {
        lines.push(format!("Note: {hint}"));
    }

    if let Some(updated) = view.updated_at.as_deref().and_then(format_timestamp) {
        lines.push(format!("Last update: {updated}"));
    }

    if view.can_close {
        lines.push(CLOSE_HINT.to_string());
    }

    lines
}

fn icon_glyph(icon: StatusIcon) -> &'static str {
    match icon {
        StatusIcon::Error => "[x]",
        StatusIcon::Warning => "[!]",
        StatusIcon::Success => "[ok]",
        StatusIcon::Spinner => "[..]",
    }
}

fn tone_label(tone: Tone) -> &'static str {
    match tone {
        Tone::Red => "red",
        Tone::Yellow => "yellow",
        Tone::Green => "green",
        Tone::Blue => "blue",
    }
}

fn render_bar(bar: ProgressBar) -> String {
    let filled = usize::from(bar.percent) * BAR_WIDTH / 100;
    format!(
        "[{}{}] {}% ({})",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        bar.percent,
        tone_label(bar.tone)
    )
}

/// The backend emits naive UTC ISO-8601 timestamps; shown in local time.
fn format_timestamp(raw: &str) -> Option<String> {
    let utc: DateTime<Utc> = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        })?;
    Some(utc.with_timezone(&Local).format("%H:%M:%S").to_string())
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
