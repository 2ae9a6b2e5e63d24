use font8x8::{BASIC_FONTS, GREEK_FONTS, LATIN_FONTS, UnicodeFonts};

/// Glyph cell size of the bitmap font, in pixels
pub(crate) const GLYPH_SIZE: u32 = 8;

fn glyph(c: char) -> [u8; 8] {
    BASIC_FONTS
        .get(c)
        .or_else(|| LATIN_FONTS.get(c))
        .or_else(|| GREEK_FONTS.get(c))
        .or_else(|| BASIC_FONTS.get('?'))
        .unwrap_or([0; 8])
}

/// A word rasterized at an integer scale
pub(crate) struct Bitmap {
    pub width: u32,
    pub height: u32,
    pixels: Vec<bool>,
}

impl Bitmap {
    /// Coordinates of every inked pixel
    pub fn set_pixels(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.pixels
            .iter()
            .enumerate()
            .filter(|(_, set)| **set)
            .map(|(index, _)| {
                let index = index as u32;
                (index % self.width, index / self.width)
            })
    }
}

/// Width and height `text` would occupy once rasterized
pub(crate) fn extent(text: &str, scale: u32, vertical: bool) -> (u32, u32) {
    let scale = scale.max(1);
    let run_width = text.chars().count() as u32 * GLYPH_SIZE * scale;
    let run_height = GLYPH_SIZE * scale;
    if vertical {
        (run_height, run_width)
    } else {
        (run_width, run_height)
    }
}

/// Rasterize `text` with each font pixel drawn as a `scale`×`scale` block
///
/// Vertical words are rotated 90° counter-clockwise and read bottom to top.
pub(crate) fn rasterize(text: &str, scale: u32, vertical: bool) -> Bitmap {
    let scale = scale.max(1);
    let chars: Vec<char> = text.chars().collect();
    let run_width = chars.len() as u32 * GLYPH_SIZE * scale;
    let run_height = GLYPH_SIZE * scale;
    let (width, height) = if vertical {
        (run_height, run_width)
    } else {
        (run_width, run_height)
    };

    let mut pixels = vec![false; (width * height) as usize];

    for (index, c) in chars.iter().enumerate() {
        let origin = index as u32 * GLYPH_SIZE;
        for (row, bits) in glyph(*c).iter().enumerate() {
            for col in 0..GLYPH_SIZE {
                if bits & (1u8 << col) == 0 {
                    continue;
                }
                for dy in 0..scale {
                    for dx in 0..scale {
                        let hx = (origin + col) * scale + dx;
                        let hy = row as u32 * scale + dy;
                        let (x, y) = if vertical {
                            (hy, run_width - 1 - hx)
                        } else {
                            (hx, hy)
                        };
                        pixels[(y * width + x) as usize] = true;
                    }
                }
            }
        }
    }

    Bitmap {
        width,
        height,
        pixels,
    }
}
