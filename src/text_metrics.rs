use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Mutex;
use ttf_parser::Face;

static FONT_METRICS: Lazy<Mutex<FontMetrics>> = Lazy::new(|| Mutex::new(FontMetrics::new()));

/// Width of `text` in pixels using the first installed face of `font_family`.
///
/// Returns `None` when no matching face can be loaded; callers fall back to an
/// estimate.
pub fn measure_text_width(text: &str, font_size: f32, font_family: &str) -> Option<f32> {
    if text.is_empty() || font_size <= 0.0 {
        return Some(0.0);
    }
    let mut guard = FONT_METRICS.lock().ok()?;
    guard.measure(text, font_size, font_family)
}

struct FontMetrics {
    db: Database,
    system_fonts_loaded: bool,
    faces: HashMap<String, Option<FaceAdvances>>,
}

impl FontMetrics {
    fn new() -> Self {
        Self {
            db: Database::new(),
            system_fonts_loaded: false,
            faces: HashMap::new(),
        }
    }

    fn measure(&mut self, text: &str, font_size: f32, font_family: &str) -> Option<f32> {
        let key = family_key(font_family);
        if !self.faces.contains_key(&key) {
            let face = self.load(&key);
            if face.is_none() {
                tracing::debug!(family = %key, "no installed face, using estimated widths");
            }
            self.faces.insert(key.clone(), face);
        }
        let face = self.faces.get_mut(&key)?.as_mut()?;
        Some(face.width(text, font_size))
    }

    fn load(&mut self, families: &str) -> Option<FaceAdvances> {
        if !self.system_fonts_loaded {
            self.db.load_system_fonts();
            self.system_fonts_loaded = true;
        }

        let names: Vec<String> = families
            .split(',')
            .map(|part| part.trim().trim_matches('"').trim_matches('\'').to_string())
            .filter(|part| !part.is_empty())
            .collect();
        let mut query_families: Vec<Family<'_>> = names
            .iter()
            .map(|name| match name.to_ascii_lowercase().as_str() {
                "serif" => Family::Serif,
                "monospace" | "ui-monospace" => Family::Monospace,
                "sans-serif" | "system-ui" | "-apple-system" | "ui-sans-serif" => {
                    Family::SansSerif
                }
                _ => Family::Name(name.as_str()),
            })
            .collect();
        query_families.push(Family::SansSerif);

        let query = Query {
            families: &query_families,
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = self.db.query(&query)?;
        self.db
            .with_face_data(id, |data, index| FaceAdvances::parse(data, index))
            .flatten()
    }
}

/// Horizontal advances of one face, in font units.
struct FaceAdvances {
    data: Vec<u8>,
    index: u32,
    units_per_em: f32,
    ascii: [u16; 128],
    other: HashMap<char, u16>,
}

impl FaceAdvances {
    fn parse(data: &[u8], index: u32) -> Option<Self> {
        let face = Face::parse(data, index).ok()?;
        let mut ascii = [0u16; 128];
        for byte in 0u8..128 {
            if let Some(glyph) = face.glyph_index(byte as char) {
                ascii[byte as usize] = face.glyph_hor_advance(glyph).unwrap_or(0);
            }
        }
        Some(Self {
            data: data.to_vec(),
            index,
            units_per_em: face.units_per_em().max(1) as f32,
            ascii,
            other: HashMap::new(),
        })
    }

    fn advance(&mut self, ch: char) -> u16 {
        if ch.is_ascii() {
            return self.ascii[ch as usize];
        }
        if let Some(advance) = self.other.get(&ch) {
            return *advance;
        }
        let advance = Face::parse(&self.data, self.index)
            .ok()
            .and_then(|face| {
                let glyph = face.glyph_index(ch)?;
                face.glyph_hor_advance(glyph)
            })
            .unwrap_or(0);
        self.other.insert(ch, advance);
        advance
    }

    fn width(&mut self, text: &str, font_size: f32) -> f32 {
        let scale = font_size / self.units_per_em;
        let missing = font_size * 0.56;
        let mut width = 0.0f32;
        for ch in text.chars() {
            if ch == '\n' {
                continue;
            }
            match self.advance(ch) {
                0 => width += missing,
                advance => width += advance as f32 * scale,
            }
        }
        width
    }
}

fn family_key(font_family: &str) -> String {
    let trimmed = font_family.trim();
    if trimmed.is_empty() {
        "sans-serif".to_string()
    } else {
        trimmed.to_string()
    }
}
