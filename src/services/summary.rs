//! Summary renderer
//!
//! Renders the aggregate statistics of the last refresh into an SVG artifact
//! at a well-known cache path, retrievable via `GET /countries/image`. The
//! file is written to a temporary sibling first and renamed into place so a
//! concurrent reader never sees a half-written artifact.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};

use crate::db::models::CountryRecord;

const WIDTH: u32 = 640;
const ROW_HEIGHT: u32 = 28;

/// Input contract for the renderer
pub struct SummaryInput<'a> {
    pub total_countries: i64,
    /// Up to 5 countries, ordered descending by estimated GDP
    pub top_countries: &'a [CountryRecord],
    pub last_refreshed: Option<DateTime<Utc>>,
}

/// Writes the summary artifact for the latest refresh pass
pub struct SummaryRenderer {
    path: PathBuf,
}

impl SummaryRenderer {
    /// Create a renderer writing to the given artifact path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path where the artifact is written
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Render the summary and persist it atomically.
    pub fn render(&self, input: &SummaryInput<'_>) -> Result<()> {
        let svg = render_svg(input);

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create cache dir {}", parent.display()))?;
        }

        let tmp = self.path.with_extension("svg.tmp");
        fs::write(&tmp, svg)
            .with_context(|| format!("Failed to write summary artifact {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to move artifact into {}", self.path.display()))?;

        tracing::info!(path = %self.path.display(), "Summary artifact rendered");

        Ok(())
    }
}

fn render_svg(input: &SummaryInput<'_>) -> String {
    let height = 120 + ROW_HEIGHT * (input.top_countries.len() as u32 + 1);
    let refreshed = input
        .last_refreshed
        .map(|ts| ts.to_rfc3339())
        .unwrap_or_else(|| "never".to_string());

    let mut svg = format!(
        concat!(
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" "##,
            r##"font-family="sans-serif">"##,
            r##"<rect width="{w}" height="{h}" fill="#1e2a38"/>"##,
            r##"<text x="24" y="40" font-size="22" fill="#ffffff">Country Currency Summary</text>"##,
            r##"<text x="24" y="70" font-size="14" fill="#9fb3c8">Total countries: {total}</text>"##,
            r##"<text x="24" y="92" font-size="14" fill="#9fb3c8">Last refreshed: {refreshed}</text>"##,
            r##"<text x="24" y="124" font-size="15" fill="#ffffff">Top countries by estimated GDP</text>"##,
        ),
        w = WIDTH,
        h = height,
        total = input.total_countries,
        refreshed = xml_escape(&refreshed),
    );

    for (i, country) in input.top_countries.iter().enumerate() {
        let y = 124 + ROW_HEIGHT * (i as u32 + 1);
        let gdp = country
            .estimated_gdp
            .map(|g| format!("{g:.2}"))
            .unwrap_or_else(|| "n/a".to_string());
        svg.push_str(&format!(
            r##"<text x="40" y="{y}" font-size="13" fill="#d9e2ec">{rank}. {name}: {gdp}</text>"##,
            rank = i + 1,
            name = xml_escape(&country.name),
        ));
    }

    svg.push_str("</svg>");
    svg
}

fn xml_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::tempdir;

    fn record(name: &str, gdp: f64) -> CountryRecord {
        CountryRecord {
            id: 1,
            name: name.to_string(),
            capital: None,
            region: None,
            population: 1000,
            currency_code: Some("TST".to_string()),
            exchange_rate: Some(1.0),
            estimated_gdp: Some(gdp),
            flag_url: None,
            last_refreshed_at: Utc::now(),
        }
    }

    #[test]
    fn test_render_writes_artifact_with_totals() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache").join("summary.svg");
        let renderer = SummaryRenderer::new(&path);

        let top = [record("Largeland", 9000.0), record("Smallland", 10.0)];
        renderer
            .render(&SummaryInput {
                total_countries: 42,
                top_countries: &top,
                last_refreshed: Some(Utc::now()),
            })
            .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("Total countries: 42"));
        assert!(content.contains("Largeland"));
        assert!(!path.with_extension("svg.tmp").exists());
    }

    #[test]
    fn test_render_overwrites_previous_artifact() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("summary.svg");
        let renderer = SummaryRenderer::new(&path);

        for total in [1, 2] {
            renderer
                .render(&SummaryInput {
                    total_countries: total,
                    top_countries: &[],
                    last_refreshed: None,
                })
                .unwrap();
        }

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("Total countries: 2"));
        assert!(content.contains("Last refreshed: never"));
    }

    #[test]
    fn test_names_are_escaped() {
        let input = SummaryInput {
            total_countries: 1,
            top_countries: &[record("A & B <Islands>", 1.0)],
            last_refreshed: None,
        };
        let svg = render_svg(&input);
        assert!(svg.contains("A &amp; B &lt;Islands&gt;"));
    }
}
