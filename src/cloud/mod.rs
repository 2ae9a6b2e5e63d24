//! Word cloud rendering
//!
//! Entity mentions are joined into one text, counted with
//! [`word_frequencies`] and laid out largest first on a raster canvas using
//! an 8×8 bitmap font scaled to each word's size.

mod glyph;
mod layout;

pub use layout::{PlacedWord, word_frequencies};

use std::io;
use std::path::Path;
use std::process::Command;

use image::{Rgb, RgbImage};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, instrument};

use crate::error::{Error, Result};

/// Canvas and layout settings
#[derive(Debug, Clone, PartialEq)]
pub struct WordCloudOptions {
    pub width: u32,
    pub height: u32,
    pub background: Rgb<u8>,
    /// Words are never drawn smaller than this
    pub min_font_size: u32,
    /// Size of the most frequent word, the canvas height when unset
    pub max_font_size: Option<u32>,
    pub max_words: usize,
    /// Share of words drawn horizontally, between 0 and 1
    pub prefer_horizontal: f64,
    /// How strongly font size follows frequency, between 0 and 1
    pub relative_scaling: f64,
    /// Free pixels kept around each word
    pub margin: u32,
    /// Seed for a reproducible layout
    pub seed: Option<u64>,
}

impl Default for WordCloudOptions {
    fn default() -> Self {
        Self {
            width: 800,
            height: 800,
            background: Rgb([255, 255, 255]),
            min_font_size: 10,
            max_font_size: None,
            max_words: 200,
            prefer_horizontal: 0.9,
            relative_scaling: 0.5,
            margin: 2,
            seed: None,
        }
    }
}

impl WordCloudOptions {
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_background(mut self, background: Rgb<u8>) -> Self {
        self.background = background;
        self
    }

    pub fn with_min_font_size(mut self, min_font_size: u32) -> Self {
        self.min_font_size = min_font_size;
        self
    }

    pub fn with_max_font_size(mut self, max_font_size: u32) -> Self {
        self.max_font_size = Some(max_font_size);
        self
    }

    pub fn with_max_words(mut self, max_words: usize) -> Self {
        self.max_words = max_words;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Word cloud renderer
///
/// # Example
///
/// ```
/// use pubmed_wordcloud::cloud::{WordCloud, WordCloudOptions};
///
/// let cloud = WordCloud::new(WordCloudOptions::default().with_size(200, 200).with_seed(1));
/// let image = cloud.render(&["insulin".to_string(), "glucose".to_string()]).unwrap();
/// assert_eq!(image.dimensions(), (200, 200));
/// ```
#[derive(Debug, Clone, Default)]
pub struct WordCloud {
    options: WordCloudOptions,
}

impl WordCloud {
    pub fn new(options: WordCloudOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &WordCloudOptions {
        &self.options
    }

    /// Lay out the words of `entities` without drawing them
    ///
    /// Fails with [`Error::EmptyWordCloud`] when no countable word remains.
    pub fn layout(&self, entities: &[String]) -> Result<Vec<PlacedWord>> {
        let frequencies = word_frequencies(&entities.join(" "));
        if frequencies.is_empty() {
            return Err(Error::EmptyWordCloud);
        }

        let mut rng = match self.options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let placed = layout::layout(&frequencies, &self.options, &mut rng);
        debug!(
            distinct = frequencies.len(),
            placed = placed.len(),
            "Word cloud laid out"
        );
        Ok(placed)
    }

    /// Render `entities` to an image of the configured size
    pub fn render(&self, entities: &[String]) -> Result<RgbImage> {
        let placed = self.layout(entities)?;
        let mut image =
            RgbImage::from_pixel(self.options.width, self.options.height, self.options.background);

        for word in &placed {
            for (bx, by) in word.bitmap().set_pixels() {
                image.put_pixel(word.x + bx, word.y + by, word.color);
            }
        }

        Ok(image)
    }

    /// Render `entities` and save the image, format chosen by extension
    #[instrument(skip(self, entities), fields(path = %path.display(), entities = entities.len()))]
    pub fn render_to_file(&self, entities: &[String], path: &Path) -> Result<()> {
        let image = self.render(entities)?;
        image.save(path)?;
        info!("Word cloud image saved");
        Ok(())
    }
}

/// Open `path` with the platform's default viewer
pub fn open_in_viewer(path: &Path) -> io::Result<()> {
    #[cfg(target_os = "macos")]
    let mut command = {
        let mut command = Command::new("open");
        command.arg(path);
        command
    };

    #[cfg(target_os = "windows")]
    let mut command = {
        let mut command = Command::new("cmd");
        command.args(["/C", "start", ""]).arg(path);
        command
    };

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    let mut command = {
        let mut command = Command::new("xdg-open");
        command.arg(path);
        command
    };

    let status = command.status()?;
    if status.success() {
        Ok(())
    } else {
        Err(io::Error::other(format!("viewer exited with {status}")))
    }
}
