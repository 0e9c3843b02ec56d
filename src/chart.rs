//! Kattams (chart squares) and the South Indian text chart.

use serde::{Deserialize, Serialize};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::angle::{DegMinSec, DEGREE_SYMBOL, MINUTE_SYMBOL, RETROGRADE_SYMBOL};
use crate::error::{AstroError, Result};
use crate::locale::Locale;
use crate::positions::{planets_posited_in, PlanetPosition};
use crate::zodiac::{House, Planet, Rasi};

/// Inner width of one chart cell, in terminal columns.
const CELL_WIDTH: usize = 16;
/// Text lines per chart cell.
const CELL_HEIGHT: usize = 4;

/// One square of the chart: a rasi and what occupies it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kattam {
    /// Position in zodiac order, 1 for Aries.
    pub order: u8,
    pub is_ascendant: bool,
    /// How far the ascendant has advanced into this rasi, when it is here.
    pub asc_longitude: Option<DegMinSec>,
    /// Lord of the rasi.
    pub owner: Planet,
    pub rasi: Rasi,
    pub house: House,
    pub planets: Vec<PlanetPosition>,
}

/// Twelve kattams in rasi order. `positions` must include the ascendant.
pub fn build_kattams(positions: &[PlanetPosition]) -> Result<Vec<Kattam>> {
    let ascendant = positions
        .iter()
        .find(|p| p.is_ascendant)
        .ok_or(AstroError::MissingAscendant)?;
    let asc_rasi = ascendant.rasi_occupied;

    let kattams = Rasi::ALL
        .iter()
        .map(|rasi| {
            let is_ascendant = *rasi == asc_rasi;
            Kattam {
                order: rasi.number(),
                is_ascendant,
                asc_longitude: is_ascendant.then_some(ascendant.advanced_by),
                owner: rasi.lord(),
                rasi: *rasi,
                house: House::from_rasis(asc_rasi, *rasi),
                planets: planets_posited_in(*rasi, positions)
                    .into_iter()
                    .filter(|p| !p.is_ascendant)
                    .cloned()
                    .collect(),
            }
        })
        .collect();
    Ok(kattams)
}

fn short_degree(dms: &DegMinSec) -> String {
    format!("{}{}{}{}", dms.degree, DEGREE_SYMBOL, dms.minute, MINUTE_SYMBOL)
}

fn cell_tokens(kattam: &Kattam) -> Vec<String> {
    let mut tokens = Vec::new();
    if let Some(asc) = &kattam.asc_longitude {
        tokens.push(format!("{} {}", Planet::Ascendant.short_name(), short_degree(asc)));
    }
    for planet in &kattam.planets {
        let mut token = format!("{} {}", planet.short_name, short_degree(&planet.advanced_by));
        if planet.retrograde {
            token.push(RETROGRADE_SYMBOL);
        }
        tokens.push(token);
    }
    tokens
}

/// Packs tokens into at most `max_lines` lines of `width` characters.
fn pack(tokens: &[String], width: usize, max_lines: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for token in tokens {
        match lines.last_mut() {
            Some(line) if line.width() + 1 + token.width() <= width => {
                line.push(' ');
                line.push_str(token);
            }
            _ => lines.push(token.clone()),
        }
    }
    if lines.len() > max_lines {
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            *last = clip(last, width - 1);
            last.push('+');
        }
    }
    lines
}

/// Longest prefix of `text` that fits in `width` terminal columns.
fn clip(text: &str, width: usize) -> String {
    let mut used = 0;
    let mut out = String::new();
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        out.push(ch);
    }
    out
}

/// Pads or clips to exactly `width` columns. Combining marks take no column.
fn fit(text: &str, width: usize) -> String {
    let clipped = clip(text, width);
    let pad = width.saturating_sub(clipped.width());
    format!("{}{}", clipped, " ".repeat(pad))
}

/// Renders the South Indian chart as a 4x4 text grid with Pisces at the top
/// left. The four centre cells form one empty panel.
pub fn render_south_chart(kattams: &[Kattam], locale: Locale) -> String {
    let grid = Rasi::south_chart_grid();

    let cell_lines = |rasi: Rasi| -> Vec<String> {
        let mut lines = vec![locale.rasi(rasi)];
        if let Some(kattam) = kattams.iter().find(|k| k.rasi == rasi) {
            if kattam.is_ascendant {
                lines[0].push_str(" /");
            }
            lines.extend(pack(&cell_tokens(kattam), CELL_WIDTH, CELL_HEIGHT - 1));
        }
        lines
    };

    let rule = "-".repeat(CELL_WIDTH);
    let blank = " ".repeat(CELL_WIDTH);
    let full_border = format!("+{}+{}+{}+{}+", rule, rule, rule, rule);
    let centre_border = format!("+{}+{} {}+{}+", rule, blank, blank, rule);

    let mut out = String::new();
    out.push_str(&full_border);
    out.push('\n');

    for (row_idx, row) in grid.iter().enumerate() {
        let cells: Vec<Vec<String>> = row
            .iter()
            .map(|cell| cell.map(&cell_lines).unwrap_or_default())
            .collect();

        for line_idx in 0..CELL_HEIGHT {
            out.push('|');
            for (col_idx, cell) in cells.iter().enumerate() {
                let text = cell.get(line_idx).map(String::as_str).unwrap_or("");
                out.push_str(&fit(text, CELL_WIDTH));
                let merged = row[col_idx].is_none() && row.get(col_idx + 1).is_some_and(|c| c.is_none());
                out.push(if merged { ' ' } else { '|' });
            }
            out.push('\n');
        }

        out.push_str(if row_idx == 1 { &centre_border } else { &full_border });
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zodiac::Nakshatra;

    fn position(planet: Planet, nirayana: f64, retrograde: bool) -> PlanetPosition {
        let rasi = Rasi::from_longitude(nirayana);
        PlanetPosition {
            name: planet.to_string(),
            short_name: planet.short_name().to_string(),
            planet,
            latitude: 0.0,
            longitude: nirayana,
            distance_au: 1.0,
            nirayana_longitude: nirayana,
            rasi_occupied: rasi,
            house_posited_at: House::FIRST,
            advanced_by: DegMinSec::from_decimal(nirayana - rasi.start_degree()),
            retrograde,
            is_ascendant: planet == Planet::Ascendant,
            natchaththiram: Nakshatra::Aswinni,
            paatham: 1,
        }
    }

    fn sample() -> Vec<PlanetPosition> {
        vec![
            position(Planet::Ascendant, 95.5, false),
            position(Planet::Sun, 266.8, false),
            position(Planet::Moon, 40.25, false),
            position(Planet::Mars, 100.0, true),
            position(Planet::Rahu, 340.0, true),
            position(Planet::Kethu, 160.0, true),
        ]
    }

    #[test]
    fn test_build_kattams() {
        let kattams = build_kattams(&sample()).unwrap();
        assert_eq!(kattams.len(), 12);
        assert_eq!(kattams[0].rasi, Rasi::Aries);
        assert_eq!(kattams[11].order, 12);

        let cancer = &kattams[3];
        assert!(cancer.is_ascendant);
        assert_eq!(cancer.house, House::FIRST);
        assert_eq!(cancer.owner, Planet::Moon);
        assert_eq!(cancer.asc_longitude, Some(DegMinSec::new(5, 30, 0)));
        assert_eq!(cancer.planets.len(), 1);
        assert_eq!(cancer.planets[0].planet, Planet::Mars);

        assert_eq!(kattams.iter().filter(|k| k.is_ascendant).count(), 1);
        assert_eq!(kattams[2].house.number(), 12);
        let placed: usize = kattams.iter().map(|k| k.planets.len()).sum();
        assert_eq!(placed, 5);
    }

    #[test]
    fn test_build_kattams_requires_ascendant() {
        let without: Vec<_> = sample().into_iter().filter(|p| !p.is_ascendant).collect();
        assert!(matches!(build_kattams(&without), Err(AstroError::MissingAscendant)));
    }

    #[test]
    fn test_render_south_chart() {
        let kattams = build_kattams(&sample()).unwrap();
        let chart = render_south_chart(&kattams, Locale::En);
        let lines: Vec<&str> = chart.lines().collect();

        assert_eq!(lines.len(), 4 * (CELL_HEIGHT + 1) + 1);
        let width = lines[0].width();
        assert!(lines.iter().all(|l| l.width() == width));

        assert!(lines[1].starts_with("|Pisces"));
        assert!(chart.contains("Cancer /"));
        assert!(chart.contains("Ma 10°0′℞"));
        assert!(chart.contains("La 5°30′"));
        // centre panel has no inner border
        assert!(lines[2 * (CELL_HEIGHT + 1)].contains(&" ".repeat(CELL_WIDTH * 2 + 1)));
    }

    #[test]
    fn test_render_in_tamil() {
        let kattams = build_kattams(&sample()).unwrap();
        let chart = render_south_chart(&kattams, Locale::Ta);
        assert!(chart.contains("மீனம்"));

        let lines: Vec<&str> = chart.lines().collect();
        let width = lines[0].width();
        assert_eq!(width, 4 * CELL_WIDTH + 5);
        assert!(lines.iter().all(|l| l.width() == width), "{}", chart);
    }

    #[test]
    fn test_fit_counts_columns_not_chars() {
        // the vowel sign and virama are combining marks
        let name = "மீனம்";
        assert!(name.chars().count() > name.width());
        let cell = fit(name, CELL_WIDTH);
        assert_eq!(cell.width(), CELL_WIDTH);
        assert!(cell.starts_with(name));

        assert_eq!(fit("Sagittarius-long-name", 8), "Sagittar");
    }

    #[test]
    fn test_pack_overflow_marker() {
        let tokens: Vec<String> = (0..10).map(|i| format!("P{} 1°2′", i)).collect();
        let lines = pack(&tokens, 16, 3);
        assert_eq!(lines.len(), 3);
        assert!(lines[2].ends_with('+'));
        assert!(lines.iter().all(|l| l.width() <= 16));
    }
}
