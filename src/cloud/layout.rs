use std::collections::HashMap;
use std::sync::LazyLock;

use image::Rgb;
use rand::Rng;
use rand::rngs::StdRng;
use regex::Regex;
use tracing::debug;

use super::WordCloudOptions;
use super::glyph::{Bitmap, GLYPH_SIZE, extent, rasterize};
use crate::stopwords::is_stopword;

/// Words of two or more characters, apostrophes allowed after the first
static WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w[\w']+").expect("word pattern is a valid regex"));

/// Sampled from the viridis colormap
const PALETTE: [Rgb<u8>; 8] = [
    Rgb([68, 1, 84]),
    Rgb([70, 50, 126]),
    Rgb([54, 92, 141]),
    Rgb([39, 127, 142]),
    Rgb([31, 161, 135]),
    Rgb([74, 193, 109]),
    Rgb([160, 218, 57]),
    Rgb([253, 231, 37]),
];

/// A word positioned on the canvas
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedWord {
    pub text: String,
    pub font_size: u32,
    /// Pixel multiplier applied to the 8×8 glyphs
    pub scale: u32,
    /// Left edge of the word's bitmap
    pub x: u32,
    /// Top edge of the word's bitmap
    pub y: u32,
    pub vertical: bool,
    pub color: Rgb<u8>,
}

impl PlacedWord {
    pub(crate) fn bitmap(&self) -> Bitmap {
        rasterize(&self.text, self.scale, self.vertical)
    }
}

#[derive(Default)]
struct WordCount {
    total: usize,
    casings: HashMap<String, usize>,
}

/// Count the words of `text`, most frequent first
///
/// Counting folds case and reports each word in its most common casing. A
/// trailing `'s` is dropped, numbers and English stopwords are skipped, and
/// a plural ending in `s` is merged into its singular when both occur. Ties
/// are ordered alphabetically.
///
/// # Example
///
/// ```
/// use pubmed_wordcloud::cloud::word_frequencies;
///
/// let counts = word_frequencies("Insulin and insulin; the tumor and tumors");
/// assert_eq!(counts, vec![("Insulin".to_string(), 2), ("tumor".to_string(), 2)]);
/// ```
pub fn word_frequencies(text: &str) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, WordCount> = HashMap::new();

    for found in WORD.find_iter(text) {
        let mut word = found.as_str();
        if let Some(stripped) = word
            .strip_suffix("'s")
            .or_else(|| word.strip_suffix("'S"))
        {
            word = stripped;
        }
        if word.chars().all(char::is_numeric) {
            continue;
        }

        let lower = word.to_lowercase();
        if is_stopword(&lower) {
            continue;
        }

        let entry = counts.entry(lower).or_default();
        entry.total += 1;
        *entry.casings.entry(word.to_string()).or_default() += 1;
    }

    let plurals: Vec<String> = counts
        .keys()
        .filter(|key| {
            key.ends_with('s')
                && !key.ends_with("ss")
                && counts.contains_key(&key[..key.len() - 1])
        })
        .cloned()
        .collect();
    for plural in plurals {
        if let Some(merged) = counts.remove(&plural) {
            if let Some(singular) = counts.get_mut(&plural[..plural.len() - 1]) {
                singular.total += merged.total;
            }
        }
    }

    let mut frequencies: Vec<(String, usize)> = counts
        .into_values()
        .map(|count| {
            let display = count
                .casings
                .into_iter()
                .max_by(|(a, a_count), (b, b_count)| a_count.cmp(b_count).then_with(|| b.cmp(a)))
                .map(|(word, _)| word)
                .unwrap_or_default();
            (display, count.total)
        })
        .collect();

    frequencies.sort_by(|(a, a_count), (b, b_count)| b_count.cmp(a_count).then_with(|| a.cmp(b)));
    frequencies
}

/// Canvas occupancy with a summed-area table for constant-time box queries
struct Occupancy {
    width: u32,
    height: u32,
    occupied: Vec<bool>,
    /// `(width + 1) × (height + 1)` prefix sums of `occupied`
    integral: Vec<u32>,
}

impl Occupancy {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            occupied: vec![false; (width * height) as usize],
            integral: vec![0; ((width + 1) * (height + 1)) as usize],
        }
    }

    fn sum_at(&self, x: u32, y: u32) -> u32 {
        self.integral[(y * (self.width + 1) + x) as usize]
    }

    fn is_free(&self, x: u32, y: u32, w: u32, h: u32) -> bool {
        let total = self.sum_at(x + w, y + h) + self.sum_at(x, y)
            - self.sum_at(x + w, y)
            - self.sum_at(x, y + h);
        total == 0
    }

    /// Pick a random free `w`×`h` box among candidates on a stride grid
    fn sample_free(&self, w: u32, h: u32, rng: &mut StdRng) -> Option<(u32, u32)> {
        if w == 0 || h == 0 || w > self.width || h > self.height {
            return None;
        }

        let stride = (w.min(h) / 4).max(1) as usize;
        let candidates = || {
            (0..=self.height - h).step_by(stride).flat_map(move |y| {
                (0..=self.width - w)
                    .step_by(stride)
                    .map(move |x| (x, y))
            })
        };

        let free = candidates()
            .filter(|&(x, y)| self.is_free(x, y, w, h))
            .count();
        if free == 0 {
            return None;
        }

        let pick = rng.gen_range(0..free);
        candidates()
            .filter(|&(x, y)| self.is_free(x, y, w, h))
            .nth(pick)
    }

    fn mark(&mut self, x: u32, y: u32, bitmap: &Bitmap) {
        for (bx, by) in bitmap.set_pixels() {
            self.occupied[((y + by) * self.width + x + bx) as usize] = true;
        }

        let stride = (self.width + 1) as usize;
        for row in y..self.height {
            let mut running = 0;
            for col in 0..self.width {
                running += self.occupied[(row * self.width + col) as usize] as u32;
                let above = self.integral[row as usize * stride + col as usize + 1];
                self.integral[(row as usize + 1) * stride + col as usize + 1] = above + running;
            }
        }
    }
}

/// Position words on the canvas, largest first
///
/// The first word starts at the maximum font size. Each later word's size
/// follows its frequency relative to the previous word, blended by
/// `relative_scaling`. A word that does not fit is tried once in the other
/// orientation, then shrunk one glyph scale at a time. Placement stops
/// entirely once the size drops under `min_font_size`, or when a word does
/// not fit even at glyph scale 1.
pub(crate) fn layout(
    frequencies: &[(String, usize)],
    options: &WordCloudOptions,
    rng: &mut StdRng,
) -> Vec<PlacedWord> {
    let Some((_, max_count)) = frequencies.first() else {
        return Vec::new();
    };
    let max_count = *max_count as f64;

    let mut occupancy = Occupancy::new(options.width, options.height);
    let mut placed = Vec::new();
    let mut font_size = options.max_font_size.unwrap_or(options.height).max(1);
    let mut last_frequency = 1.0;
    let scaling = options.relative_scaling.clamp(0.0, 1.0);

    for (word, count) in frequencies.iter().take(options.max_words) {
        let frequency = *count as f64 / max_count;
        if scaling > 0.0 {
            font_size = ((scaling * frequency / last_frequency + (1.0 - scaling))
                * font_size as f64)
                .round() as u32;
        }

        let mut vertical = rng.gen_bool(1.0 - options.prefer_horizontal.clamp(0.0, 1.0));
        let mut tried_other_orientation = false;

        let position = loop {
            if font_size < options.min_font_size {
                break None;
            }

            let scale = (font_size / GLYPH_SIZE).max(1);
            let (w, h) = extent(word, scale, vertical);
            let padded = (w + options.margin, h + options.margin);
            if padded.0 <= options.width && padded.1 <= options.height {
                if let Some((x, y)) = occupancy.sample_free(padded.0, padded.1, rng) {
                    let half = options.margin / 2;
                    break Some((x + half, y + half, scale, rasterize(word, scale, vertical)));
                }
            }

            if !tried_other_orientation && options.prefer_horizontal < 1.0 {
                vertical = !vertical;
                tried_other_orientation = true;
                continue;
            }

            // the glyph grid has no size below scale 1
            if scale == 1 {
                break None;
            }
            font_size = scale * GLYPH_SIZE - 1;
            tried_other_orientation = false;
        };

        let Some((x, y, scale, bitmap)) = position else {
            debug!(word = %word, placed = placed.len(), "No room left at the minimum size, stopping layout");
            break;
        };

        occupancy.mark(x, y, &bitmap);
        placed.push(PlacedWord {
            text: word.clone(),
            font_size,
            scale,
            x,
            y,
            vertical,
            color: PALETTE[rng.gen_range(0..PALETTE.len())],
        });
        last_frequency = frequency;
    }

    placed
}
