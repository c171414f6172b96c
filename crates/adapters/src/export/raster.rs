use crashlens_application::{ApplicationError, ReportRasterizer};
use crashlens_domain::{RasterFrame, ReportBlock};
use font8x8::UnicodeFonts;

/// Width of the report layout in logical pixels, before the export scale.
pub const LAYOUT_WIDTH: u32 = 520;
const MARGIN: u32 = 24;
const GLYPH: u32 = 8;
const LINE_GAP: u32 = 4;

const TEXT: u32 = 0x1F2937;
const MUTED: u32 = 0x6B7280;
const HEADING: u32 = 0x1E3A8A;
const RULE: u32 = 0xD1D5DB;
const VEHICLE_FILL: u32 = 0xEFF6FF;
const CALLOUT_FILL: u32 = 0xFEF3C7;
const CALLOUT_ACCENT: u32 = 0xF59E0B;
const DISCLAIMER_FILL: u32 = 0xF3F4F6;
const DISCLAIMER_ACCENT: u32 = 0x9CA3AF;

#[derive(Debug, Clone, Copy)]
struct Style {
    mag: u32,
    color: u32,
    bold: bool,
}

impl Style {
    const BODY: Self = Self {
        mag: 1,
        color: TEXT,
        bold: false,
    };

    fn line_height(self) -> u32 {
        GLYPH * self.mag + LINE_GAP
    }
}

#[derive(Debug)]
struct PlacedLine {
    x: u32,
    y: u32,
    text: String,
    style: Style,
}

#[derive(Debug)]
struct Panel {
    y: u32,
    height: u32,
    fill: u32,
    accent: Option<u32>,
}

#[derive(Debug, Default)]
struct Layout {
    lines: Vec<PlacedLine>,
    panels: Vec<Panel>,
    cursor: u32,
}

impl Layout {
    fn gap(&mut self, amount: u32) {
        self.cursor += amount;
    }

    fn text(&mut self, text: &str, style: Style, indent: u32) {
        let available = LAYOUT_WIDTH - 2 * MARGIN - indent;
        let max_chars = (available / (GLYPH * style.mag)).max(1) as usize;
        for line in wrap(text, max_chars) {
            self.lines.push(PlacedLine {
                x: MARGIN + indent,
                y: self.cursor,
                text: line,
                style,
            });
            self.cursor += style.line_height();
        }
    }

    fn labeled(&mut self, label: &str, text: &str, indent: u32, text_color: u32) {
        self.text(
            label,
            Style {
                bold: true,
                ..Style::BODY
            },
            indent,
        );
        self.text(
            text,
            Style {
                color: text_color,
                ..Style::BODY
            },
            indent,
        );
    }

    fn boxed(&mut self, fill: u32, accent: Option<u32>, body: impl FnOnce(&mut Self)) {
        let top = self.cursor;
        self.gap(8);
        body(self);
        self.gap(4);
        self.panels.push(Panel {
            y: top,
            height: self.cursor - top,
            fill,
            accent,
        });
    }
}

/// Draws report blocks with the 8x8 bitmap font onto a plain background.
#[derive(Debug, Default)]
pub struct Font8x8Rasterizer;

impl ReportRasterizer for Font8x8Rasterizer {
    fn rasterize(
        &self,
        blocks: &[ReportBlock],
        scale: u32,
        background: u32,
    ) -> Result<RasterFrame, ApplicationError> {
        if scale == 0 {
            return Err(ApplicationError::InvalidInput(
                "raster scale must be positive".to_string(),
            ));
        }
        let layout = layout(blocks);
        let mut frame =
            RasterFrame::filled(LAYOUT_WIDTH * scale, layout.cursor * scale, background);

        for panel in &layout.panels {
            fill_rect(
                &mut frame,
                MARGIN * scale,
                panel.y * scale,
                (LAYOUT_WIDTH - 2 * MARGIN) * scale,
                panel.height * scale,
                panel.fill,
            );
            if let Some(accent) = panel.accent {
                fill_rect(
                    &mut frame,
                    MARGIN * scale,
                    panel.y * scale,
                    4 * scale,
                    panel.height * scale,
                    accent,
                );
            }
        }
        for line in &layout.lines {
            draw_text(&mut frame, line, scale);
        }
        Ok(frame)
    }
}

fn layout(blocks: &[ReportBlock]) -> Layout {
    let mut layout = Layout::default();
    layout.gap(MARGIN);

    for block in blocks {
        match block {
            ReportBlock::Title(text) => {
                layout.text(
                    text,
                    Style {
                        mag: 3,
                        color: HEADING,
                        bold: true,
                    },
                    0,
                );
                layout.gap(2);
            }
            ReportBlock::Subtitle(text) => {
                layout.text(
                    text,
                    Style {
                        color: MUTED,
                        ..Style::BODY
                    },
                    0,
                );
                layout.gap(6);
                layout.panels.push(Panel {
                    y: layout.cursor,
                    height: 1,
                    fill: RULE,
                    accent: None,
                });
                layout.gap(8);
            }
            ReportBlock::SectionHeading(text) => {
                layout.gap(10);
                layout.text(
                    text,
                    Style {
                        mag: 2,
                        color: HEADING,
                        bold: true,
                    },
                    0,
                );
                layout.gap(4);
            }
            ReportBlock::Paragraph(text) => {
                layout.text(text, Style::BODY, 0);
                layout.gap(6);
            }
            ReportBlock::VehicleHeading(text) => {
                layout.gap(4);
                layout.boxed(VEHICLE_FILL, Some(HEADING), |inner| {
                    inner.text(
                        text,
                        Style {
                            bold: true,
                            ..Style::BODY
                        },
                        12,
                    );
                });
                layout.gap(6);
            }
            ReportBlock::Labeled { label, text } => {
                layout.labeled(label, text, 12, TEXT);
                layout.gap(6);
            }
            ReportBlock::SpeedNote { label, text } => {
                layout.labeled(label, text, 12, MUTED);
                layout.gap(6);
            }
            ReportBlock::Callout { label, text } => {
                layout.boxed(CALLOUT_FILL, Some(CALLOUT_ACCENT), |inner| {
                    inner.labeled(label, text, 12, TEXT);
                });
                layout.gap(6);
            }
            ReportBlock::Disclaimer { label, text } => {
                layout.gap(10);
                layout.boxed(DISCLAIMER_FILL, Some(DISCLAIMER_ACCENT), |inner| {
                    inner.labeled(label, text, 12, MUTED);
                });
            }
        }
    }

    layout.gap(MARGIN);
    layout
}

/// Greedy word wrap on character counts. Words longer than a line are cut.
fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut current = String::new();
        let mut current_len = 0;
        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > max_chars {
                if current_len > 0 {
                    lines.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                let rest = word.split_off(max_chars);
                lines.push(word.into_iter().collect());
                word = rest;
            }
            let needed = if current_len == 0 {
                word.len()
            } else {
                current_len + 1 + word.len()
            };
            if needed > max_chars && current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current.extend(word.iter());
            current_len += word.len();
        }
        if current_len > 0 {
            lines.push(current);
        }
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

fn draw_text(frame: &mut RasterFrame, line: &PlacedLine, scale: u32) {
    let cell = GLYPH * line.style.mag * scale;
    let mut x = line.x * scale;
    let y = line.y * scale;
    for ch in line.text.chars() {
        draw_char(frame, x, y, ch, line.style, scale);
        if line.style.bold {
            draw_char(frame, x + scale, y, ch, line.style, scale);
        }
        x += cell;
    }
}

fn draw_char(frame: &mut RasterFrame, x: u32, y: u32, ch: char, style: Style, scale: u32) {
    let dot = style.mag * scale;
    for (row, bits) in glyph(ch).iter().enumerate() {
        for col in 0..8_u32 {
            if (bits >> col) & 1 == 1 {
                fill_rect(frame, x + col * dot, y + row as u32 * dot, dot, dot, style.color);
            }
        }
    }
}

fn glyph(ch: char) -> [u8; 8] {
    let ch = match ch {
        '\u{2018}' | '\u{2019}' => '\'',
        '\u{201C}' | '\u{201D}' => '"',
        '\u{2013}' | '\u{2014}' => '-',
        '\u{2026}' => '.',
        other => other,
    };
    font8x8::BASIC_FONTS
        .get(ch)
        .or_else(|| font8x8::LATIN_FONTS.get(ch))
        .unwrap_or([0; 8])
}

fn fill_rect(frame: &mut RasterFrame, left: u32, top: u32, w: u32, h: u32, color: u32) {
    for y in top..top.saturating_add(h) {
        for x in left..left.saturating_add(w) {
            frame.set_pixel(x, y, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crashlens_domain::{report_blocks, ReportData, VehicleAnalysis, EXPORT_BACKGROUND};

    fn report(summary: &str, vehicles: usize) -> ReportData {
        ReportData {
            summary: summary.to_string(),
            probable_cause: "El vehículo B no respetó la señal de ceda el paso.".to_string(),
            vehicles: (0..vehicles)
                .map(|i| VehicleAnalysis {
                    description: format!("Sedán {i}"),
                    damage_analysis: "Abolladura en la puerta".to_string(),
                    estimated_impact_speed: "Baja, <20km/h".to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn raster_is_scaled_and_has_ink() {
        let blocks = report_blocks(&report("Colisión lateral en cruce.", 1));
        let frame = Font8x8Rasterizer
            .rasterize(&blocks, 2, EXPORT_BACKGROUND)
            .expect("raster");
        assert_eq!(frame.width(), LAYOUT_WIDTH * 2);
        assert_eq!(frame.height() % 2, 0);
        assert_eq!(frame.pixel(0, 0), Some(EXPORT_BACKGROUND));
        let ink = frame
            .pixels()
            .chunks_exact(3)
            .filter(|px| px != &[0xFF, 0xFF, 0xFF])
            .count();
        assert!(ink > 1_000);
    }

    #[test]
    fn longer_reports_are_taller() {
        let short = layout(&report_blocks(&report("Corto.", 1))).cursor;
        let long = layout(&report_blocks(&report(&"palabra ".repeat(400), 3))).cursor;
        assert!(long > short);
    }

    #[test]
    fn zero_scale_is_rejected() {
        assert!(Font8x8Rasterizer.rasterize(&[], 0, 0xFFFFFF).is_err());
    }

    #[test]
    fn wrap_respects_width_and_keeps_words() {
        let lines = wrap("uno dos tres cuatro cinco", 9);
        assert_eq!(lines, vec!["uno dos", "tres", "cuatro", "cinco"]);
        assert!(lines.iter().all(|line| line.chars().count() <= 9));
    }

    #[test]
    fn wrap_cuts_long_words_and_keeps_newlines() {
        assert_eq!(wrap("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert_eq!(wrap("a\nb", 10), vec!["a", "b"]);
        assert_eq!(wrap("", 10), vec![""]);
    }

    #[test]
    fn accented_letters_have_glyphs() {
        for ch in ['á', 'é', 'í', 'ó', 'ú', 'ñ', 'Á'] {
            assert_ne!(glyph(ch), [0; 8], "missing glyph for {ch}");
        }
    }
}
