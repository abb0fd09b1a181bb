use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Mutex;
use ttf_parser::{Face, GlyphId};

use crate::layout::Dimension;

/// Estimates the rendered size of a label. Implementations must be
/// deterministic for identical inputs and safe to call from many threads.
pub trait TextMeasurer: Send + Sync {
    fn measure(&self, text: &str, font_size: f32) -> Dimension;

    fn measure_with_overrides(
        &self,
        text: &str,
        font_size: f32,
        width_override: Option<f32>,
        height_override: Option<f32>,
    ) -> Dimension {
        match (width_override, height_override) {
            (Some(width), Some(height)) => Dimension::new(width, height),
            _ => {
                let measured = self.measure(text, font_size);
                Dimension::new(
                    width_override.unwrap_or(measured.width),
                    height_override.unwrap_or(measured.height),
                )
            }
        }
    }
}

/// Splits a label into display lines on `\n`, escaped `\n` and `<br>` tags.
pub fn split_lines(text: &str) -> Vec<String> {
    let normalized = text
        .replace("<br/>", "\n")
        .replace("<br />", "\n")
        .replace("<br>", "\n")
        .replace("\\n", "\n");
    normalized
        .split('\n')
        .map(|line| line.trim().to_string())
        .collect()
}

/// Width factors relative to the font size, calibrated against the default
/// sans-serif stack at 16px.
pub fn char_width_factor(ch: char) -> f32 {
    match ch {
        ' ' => 0.306,
        '\\' | '.' | ',' | ':' | ';' | '|' | '!' | '(' | ')' | '[' | ']' | '{' | '}' => 0.321,
        'A' => 0.652,
        'B' => 0.648,
        'C' => 0.734,
        'D' => 0.723,
        'E' => 0.594,
        'F' => 0.575,
        'G' | 'H' => 0.742,
        'I' => 0.272,
        'J' => 0.557,
        'K' => 0.648,
        'L' => 0.559,
        'M' => 0.903,
        'N' => 0.763,
        'O' => 0.754,
        'P' => 0.623,
        'Q' => 0.755,
        'R' => 0.637,
        'S' => 0.633,
        'T' => 0.599,
        'U' => 0.746,
        'V' => 0.661,
        'W' => 0.958,
        'X' => 0.655,
        'Y' => 0.646,
        'Z' => 0.621,
        'a' | 'z' => 0.550,
        'b' => 0.603,
        'c' => 0.547,
        'd' => 0.609,
        'e' => 0.570,
        'f' => 0.340,
        'g' | 'h' => 0.600,
        'i' => 0.235,
        'j' => 0.227,
        'k' => 0.522,
        'l' => 0.239,
        'm' => 0.867,
        'n' | 'q' | 'u' => 0.585,
        'o' => 0.574,
        'p' => 0.595,
        'r' => 0.364,
        's' => 0.523,
        't' => 0.305,
        'v' => 0.545,
        'w' => 0.811,
        'x' => 0.538,
        'y' => 0.556,
        '0' => 0.613,
        '1' => 0.396,
        '2' | '9' => 0.609,
        '3' => 0.597,
        '4' => 0.614,
        '5' => 0.586,
        '6' => 0.608,
        '7' => 0.559,
        '8' => 0.611,
        '@' | '#' | '%' | '&' => 0.946,
        // Wide scripts take roughly a full em.
        c if is_wide(c) => 1.0,
        _ => 0.568,
    }
}

fn is_wide(ch: char) -> bool {
    matches!(ch as u32,
        0x1100..=0x115F
        | 0x2E80..=0xA4CF
        | 0xAC00..=0xD7A3
        | 0xF900..=0xFAFF
        | 0xFE30..=0xFE4F
        | 0xFF00..=0xFF60
        | 0xFFE0..=0xFFE6
        | 0x1F300..=0x1FAFF)
}

fn table_width(text: &str, font_size: f32) -> f32 {
    text.chars()
        .map(|ch| if ch == '\t' { 4.0 * char_width_factor(' ') } else { char_width_factor(ch) })
        .sum::<f32>()
        * font_size
}

/// Table-driven measurer with no font access; the default for layout.
#[derive(Debug, Clone, Copy)]
pub struct DeterministicTextMeasurer {
    pub line_height: f32,
}

impl Default for DeterministicTextMeasurer {
    fn default() -> Self {
        Self { line_height: 1.5 }
    }
}

impl TextMeasurer for DeterministicTextMeasurer {
    fn measure(&self, text: &str, font_size: f32) -> Dimension {
        if font_size <= 0.0 {
            return Dimension::ZERO;
        }
        let lines = split_lines(text);
        let width = lines
            .iter()
            .map(|line| table_width(line, font_size))
            .fold(0.0, f32::max);
        Dimension::new(width, lines.len() as f32 * font_size * self.line_height)
    }
}

static FONT_CACHE: Lazy<Mutex<FontCache>> = Lazy::new(|| Mutex::new(FontCache::new()));

/// Measures with glyph advances of an installed font, resolved through
/// `fontdb` and shared process-wide. Characters the font lacks and fonts that
/// cannot be found fall back to the calibrated table.
#[derive(Debug, Clone)]
pub struct FontTextMeasurer {
    pub font_family: String,
    pub line_height: f32,
}

impl FontTextMeasurer {
    pub fn new(font_family: impl Into<String>) -> Self {
        Self {
            font_family: font_family.into(),
            line_height: 1.5,
        }
    }

    fn line_width(&self, line: &str, font_size: f32) -> f32 {
        let Ok(mut cache) = FONT_CACHE.lock() else {
            return table_width(line, font_size);
        };
        cache
            .measure(line, font_size, &self.font_family)
            .unwrap_or_else(|| table_width(line, font_size))
    }
}

impl TextMeasurer for FontTextMeasurer {
    fn measure(&self, text: &str, font_size: f32) -> Dimension {
        if font_size <= 0.0 {
            return Dimension::ZERO;
        }
        let lines = split_lines(text);
        let width = lines
            .iter()
            .map(|line| self.line_width(line, font_size))
            .fold(0.0, f32::max);
        Dimension::new(width, lines.len() as f32 * font_size * self.line_height)
    }
}

struct FontCache {
    db: Database,
    loaded_system_fonts: bool,
    faces: HashMap<String, Option<FontFace>>,
}

impl FontCache {
    fn new() -> Self {
        Self {
            db: Database::new(),
            loaded_system_fonts: false,
            faces: HashMap::new(),
        }
    }

    fn measure(&mut self, text: &str, font_size: f32, font_family: &str) -> Option<f32> {
        if text.is_empty() {
            return Some(0.0);
        }
        let key = normalize_family_key(font_family);
        if !self.faces.contains_key(&key) {
            let face = self.load_face(&key);
            if face.is_none() {
                tracing::debug!(family = %key, "no installed font matched; using width table");
            }
            self.faces.insert(key.clone(), face);
        }
        self.faces
            .get_mut(&key)
            .and_then(|face| face.as_mut())
            .map(|face| face.measure_width(text, font_size))
    }

    fn load_face(&mut self, font_family: &str) -> Option<FontFace> {
        let names: Vec<&str> = font_family
            .split(',')
            .map(|part| part.trim().trim_matches('"').trim_matches('\''))
            .filter(|part| !part.is_empty())
            .collect();
        let mut families: Vec<Family<'_>> = names
            .iter()
            .map(|name| match name.to_ascii_lowercase().as_str() {
                "serif" => Family::Serif,
                "sans-serif" | "system-ui" | "-apple-system" | "ui-sans-serif" => {
                    Family::SansSerif
                }
                "monospace" | "ui-monospace" => Family::Monospace,
                "cursive" => Family::Cursive,
                "fantasy" => Family::Fantasy,
                _ => Family::Name(name),
            })
            .collect();
        if families.is_empty() {
            families.push(Family::SansSerif);
        }

        if !self.loaded_system_fonts {
            self.db.load_system_fonts();
            self.loaded_system_fonts = true;
        }

        let query = Query {
            families: &families,
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = self.db.query(&query)?;
        self.db
            .with_face_data(id, |data, index| FontFace::parse(data.to_vec(), index))
            .flatten()
    }
}

struct FontFace {
    data: Vec<u8>,
    index: u32,
    units_per_em: u16,
    ascii_advances: [Option<u16>; 128],
    glyph_advances: HashMap<char, Option<u16>>,
}

impl FontFace {
    fn parse(data: Vec<u8>, index: u32) -> Option<Self> {
        let face = Face::parse(&data, index).ok()?;
        let units_per_em = face.units_per_em().max(1);
        let mut ascii_advances = [None; 128];
        for byte in 0u8..=127 {
            ascii_advances[byte as usize] = glyph_advance(&face, byte as char);
        }
        Some(Self {
            data,
            index,
            units_per_em,
            ascii_advances,
            glyph_advances: HashMap::new(),
        })
    }

    fn measure_width(&mut self, text: &str, font_size: f32) -> f32 {
        let scale = font_size / self.units_per_em as f32;
        let text = text.replace('\t', "    ");
        let missing: Vec<char> = text
            .chars()
            .filter(|ch| !ch.is_ascii() && !self.glyph_advances.contains_key(ch))
            .collect();
        if !missing.is_empty() {
            // Faces borrow their data, so the parse is repeated only when new
            // non-ASCII glyphs show up.
            let face = Face::parse(&self.data, self.index).ok();
            for ch in missing {
                let advance = face.as_ref().and_then(|face| glyph_advance(face, ch));
                self.glyph_advances.insert(ch, advance);
            }
        }

        let mut width = 0.0f32;
        for ch in text.chars() {
            let advance = if ch.is_ascii() {
                self.ascii_advances[ch as usize]
            } else {
                self.glyph_advances.get(&ch).copied().flatten()
            };
            width += match advance {
                Some(advance) => advance as f32 * scale,
                None => char_width_factor(ch) * font_size,
            };
        }
        width.max(0.0)
    }
}

fn glyph_advance(face: &Face<'_>, ch: char) -> Option<u16> {
    let glyph: GlyphId = face.glyph_index(ch)?;
    face.glyph_hor_advance(glyph).filter(|advance| *advance > 0)
}

fn normalize_family_key(font_family: &str) -> String {
    let trimmed = font_family.trim();
    if trimmed.is_empty() {
        "sans-serif".to_string()
    } else {
        trimmed.to_string()
    }
}
