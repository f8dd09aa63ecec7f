use std::io::stdout;

use crossterm::execute;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use indexmap::IndexMap;

use crate::domain::DomainSpan;
use crate::error::DomscanError;

/// Fixed palette for domain coloring, repeated once exhausted
///
/// Fifteen hues sampled across the spectrum; with more distinct
/// domains than colors the differences stop being readable anyway.
pub const PALETTE: [Color; 15] = [
    Color::Rgb { r: 255, g: 64, b: 64 },
    Color::Rgb { r: 255, g: 128, b: 0 },
    Color::Rgb { r: 255, g: 192, b: 0 },
    Color::Rgb { r: 224, g: 224, b: 0 },
    Color::Rgb { r: 160, g: 224, b: 0 },
    Color::Rgb { r: 64, g: 208, b: 64 },
    Color::Rgb { r: 0, g: 208, b: 144 },
    Color::Rgb { r: 0, g: 192, b: 192 },
    Color::Rgb { r: 0, g: 144, b: 224 },
    Color::Rgb { r: 64, g: 96, b: 255 },
    Color::Rgb { r: 128, g: 64, b: 255 },
    Color::Rgb { r: 176, g: 48, b: 224 },
    Color::Rgb { r: 224, g: 32, b: 192 },
    Color::Rgb { r: 255, g: 48, b: 128 },
    Color::Rgb { r: 255, g: 96, b: 96 },
];

/// Palette lookup, wrapping around once the palette is exhausted
pub fn color_for(index: usize) -> Color {
    PALETTE[index % PALETTE.len()]
}

const TRACK_CHAR: &str = "█";
const BACKBONE_CHAR: &str = "─";

/// Terminal plot of domain layouts
///
/// Each protein is one horizontal track scaled to `max_width` columns,
/// with matched domains drawn as colored blocks at their sequence
/// position and the protein identifier at the right.
pub struct DomainPlot {
    max_width: usize,
    max_tracks: usize,
}

impl Default for DomainPlot {
    fn default() -> Self {
        Self {
            max_width: 80,
            max_tracks: 20,
        }
    }
}

impl DomainPlot {
    pub fn new(max_width: usize, max_tracks: usize) -> Self {
        Self {
            max_width,
            max_tracks,
        }
    }
    /// Draw the layout tracks and the domain color legend
    pub fn render(
        &self,
        layouts: &IndexMap<String, Vec<DomainSpan>>,
    ) -> Result<(), DomscanError> {
        if layouts.is_empty() {
            return Ok(());
        }

        // scale all tracks against the longest protein
        let longest = layouts
            .values()
            .flatten()
            .map(|span| span.length)
            .max()
            .unwrap_or(1)
            .max(1);

        let mut colors: IndexMap<String, usize> = IndexMap::new();
        let mut drawn = 0;
        for (protein_id, spans) in layouts {
            if drawn >= self.max_tracks {
                log::warn!(
                    "Plot limited to {} proteins, {} not drawn",
                    self.max_tracks,
                    layouts.len() - drawn
                );
                break;
            }

            let track = build_track(spans, longest, self.max_width, &mut colors);
            self.draw_track(&track, protein_id)?;
            drawn += 1;
        }

        self.draw_legend(&colors)?;
        Ok(())
    }
    fn draw_track(&self, track: &[Option<usize>], protein_id: &str) -> Result<(), DomscanError> {
        let mut out = stdout();
        let mut column = 0;
        while column < track.len() {
            // emit runs of equal color in one styled print
            let current = track[column];
            let run_start = column;
            while column < track.len() && track[column] == current {
                column += 1;
            }
            let run = column - run_start;
            match current {
                Some(index) => execute!(
                    out,
                    SetForegroundColor(color_for(index)),
                    Print(TRACK_CHAR.repeat(run)),
                    ResetColor
                )?,
                None => execute!(out, Print(BACKBONE_CHAR.repeat(run)))?,
            }
        }
        execute!(out, Print(format!("  {protein_id}\n")))?;
        Ok(())
    }
    fn draw_legend(&self, colors: &IndexMap<String, usize>) -> Result<(), DomscanError> {
        let mut out = stdout();
        for (name, index) in colors {
            execute!(
                out,
                SetForegroundColor(color_for(*index)),
                Print(TRACK_CHAR.repeat(2)),
                ResetColor,
                Print(format!(" {name}\n"))
            )?;
        }
        Ok(())
    }
}

/// Rasterize one protein into per-column color indices
///
/// `None` columns are backbone; `Some(index)` columns belong to the
/// domain assigned that palette index. Domains are assigned indices in
/// first-seen order across the whole plot, so the same domain keeps its
/// color on every track.
fn build_track(
    spans: &[DomainSpan],
    longest: usize,
    max_width: usize,
    colors: &mut IndexMap<String, usize>,
) -> Vec<Option<usize>> {
    let length = spans.first().map(|span| span.length).unwrap_or(0);
    let columns = scale(length, longest, max_width).max(1);
    let mut track = vec![None; columns];

    for span in spans {
        let next_index = colors.len();
        let index = *colors.entry(span.name.clone()).or_insert(next_index);

        let start = scale(span.start, longest, max_width).min(columns - 1);
        let end = scale(span.end, longest, max_width).clamp(start + 1, columns);
        for cell in &mut track[start..end] {
            *cell = Some(index);
        }
    }
    track
}

fn scale(value: usize, longest: usize, max_width: usize) -> usize {
    value * max_width / longest
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(name: &str, start: usize, end: usize, length: usize) -> DomainSpan {
        DomainSpan {
            name: name.to_string(),
            start,
            end,
            length,
        }
    }

    #[test]
    fn palette_wraps_after_fifteen_domains() {
        assert_eq!(color_for(0), color_for(15));
        assert_eq!(color_for(3), color_for(18));
        assert_ne!(color_for(0), color_for(1));
    }

    #[test]
    fn track_marks_domain_columns() {
        let mut colors = IndexMap::new();
        let spans = vec![span("M1", 0, 50, 100), span("M2", 75, 100, 100)];
        let track = build_track(&spans, 100, 100, &mut colors);

        assert_eq!(track.len(), 100);
        assert_eq!(track[0], Some(0));
        assert_eq!(track[49], Some(0));
        assert_eq!(track[50], None);
        assert_eq!(track[80], Some(1));
        assert_eq!(track[99], Some(1));
    }

    #[test]
    fn tracks_scale_against_longest_protein() {
        let mut colors = IndexMap::new();
        let track = build_track(&[span("M1", 0, 100, 100)], 200, 80, &mut colors);
        // half the longest protein occupies half the plot width
        assert_eq!(track.len(), 40);
    }

    #[test]
    fn color_indices_stable_across_tracks() {
        let mut colors = IndexMap::new();
        build_track(&[span("M1", 0, 5, 10), span("M2", 5, 10, 10)], 10, 20, &mut colors);
        build_track(&[span("M2", 0, 5, 10), span("M3", 5, 10, 10)], 10, 20, &mut colors);

        let assigned: Vec<(&str, usize)> = colors
            .iter()
            .map(|(name, index)| (name.as_str(), *index))
            .collect();
        assert_eq!(assigned, vec![("M1", 0), ("M2", 1), ("M3", 2)]);
    }

    #[test]
    fn zero_width_spans_still_visible() {
        let mut colors = IndexMap::new();
        // a short motif in a long protein must still occupy one column
        let track = build_track(&[span("M1", 2, 5, 2000)], 2000, 80, &mut colors);
        assert!(track.iter().any(|cell| cell.is_some()));
    }
}
