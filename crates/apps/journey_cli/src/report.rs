use foundation::{format_number, stop_label, DistanceUnit};
use journey::{ComparisonMode, Journey};
use services::SearchResult;

pub fn render_stops(journey: &Journey) -> Vec<String> {
    journey
        .points()
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let mut line = format!("{}  {}", stop_label(i), p.name);
            if let Some(country) = p.country.as_deref().filter(|c| !c.is_empty()) {
                line.push_str(&format!(" ({country})"));
            }
            if p.is_pending() {
                line.push_str(" [unresolved]");
            } else if let Some(err) = p.status.error() {
                line.push_str(&format!(" [{err}]"));
            }
            line
        })
        .collect()
}

pub fn render_legs(journey: &Journey, unit: DistanceUnit) -> Vec<String> {
    let mut lines: Vec<String> = journey
        .segments(unit)
        .iter()
        .map(|s| format!("{} → {}  {}", stop_label(s.from), stop_label(s.to), s.label))
        .collect();

    let summary = journey.summary(unit);
    lines.push(format!(
        "Total  {}  ({})",
        summary.formatted,
        summary.route.join(" → ")
    ));
    lines
}

fn stat(value: Option<f64>, mode: ComparisonMode) -> String {
    match (value, mode) {
        (None, _) => "?".to_string(),
        (Some(v), ComparisonMode::Area) => format!("{} km²", format_number(v)),
        (Some(v), _) => format_number(v),
    }
}

/// Empty in distance mode.
pub fn render_comparisons(journey: &Journey, mode: ComparisonMode) -> Vec<String> {
    journey
        .comparisons(mode)
        .iter()
        .map(|c| {
            let mut line = format!(
                "{} → {}  {} → {}",
                stop_label(c.from),
                stop_label(c.to),
                stat(c.from_value, mode),
                stat(c.to_value, mode)
            );
            if let Some(ratio) = c.ratio {
                line.push_str(&format!("  ×{}", format_number(ratio)));
            }
            line
        })
        .collect()
}

pub fn render_results(results: &[SearchResult]) -> Vec<String> {
    results
        .iter()
        .map(|r| format!("{}  {:.4}, {:.4}  {}", r.name, r.lat, r.lng, r.description))
        .collect()
}
