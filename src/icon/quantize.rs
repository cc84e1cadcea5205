//! Adaptive palette reduction (median cut) for the resampled icon.

use std::collections::{BTreeMap, HashMap};

use image::RgbImage;

use crate::resource::{PALETTE_ENTRIES, PALETTE_ENTRY_LEN};

type Color = [u8; 3];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quantized {
    /// At most 256 entries, in RGB order.
    pub palette: Vec<Color>,
    /// One palette index per pixel, row-major.
    pub indices: Vec<u8>,
}

impl Quantized {
    /// Serializes the palette as a full 256-entry BGR0 color table. Slots past
    /// the end of the palette are zero.
    pub fn color_table_bytes(&self) -> Vec<u8> {
        let mut table = vec![0u8; PALETTE_ENTRIES * PALETTE_ENTRY_LEN];
        for (entry, &[r, g, b]) in table.chunks_exact_mut(PALETTE_ENTRY_LEN).zip(&self.palette) {
            entry.copy_from_slice(&[b, g, r, 0]);
        }
        table
    }
}

pub fn quantize(rgb: &RgbImage, max_colors: usize) -> Quantized {
    assert!((1..=PALETTE_ENTRIES).contains(&max_colors));

    let histogram: Vec<(Color, u32)> = rgb
        .pixels()
        .fold(BTreeMap::new(), |mut counts, p| {
            *counts.entry(p.0).or_insert(0u32) += 1;
            counts
        })
        .into_iter()
        .collect();

    let palette = if histogram.len() <= max_colors {
        histogram.iter().map(|&(color, _)| color).collect()
    } else {
        median_cut(histogram, max_colors)
    };
    log::debug!("quantized {} pixels to {} colors", rgb.len() / 3, palette.len());

    let mut lookup: HashMap<Color, u8> = HashMap::new();
    let indices = rgb
        .pixels()
        .map(|p| *lookup.entry(p.0).or_insert_with(|| nearest(&palette, p.0)))
        .collect();

    Quantized { palette, indices }
}

fn median_cut(histogram: Vec<(Color, u32)>, max_colors: usize) -> Vec<Color> {
    let mut boxes = vec![ColorBox::new(histogram)];
    while boxes.len() < max_colors {
        let candidate = boxes
            .iter()
            .enumerate()
            .filter(|(_, b)| b.colors.len() > 1)
            .max_by_key(|(_, b)| (b.population, b.widest_channel().1))
            .map(|(i, _)| i);
        let Some(i) = candidate else { break };
        let (low, high) = boxes.swap_remove(i).split();
        boxes.push(low);
        boxes.push(high);
    }
    boxes.iter().map(ColorBox::mean).collect()
}

fn nearest(palette: &[Color], color: Color) -> u8 {
    let distance = |p: &Color| -> u32 {
        p.iter()
            .zip(color.iter())
            .map(|(&a, &b)| (a as i32 - b as i32).pow(2) as u32)
            .sum()
    };
    let mut best = (0usize, u32::MAX);
    for (i, p) in palette.iter().enumerate() {
        let d = distance(p);
        if d < best.1 {
            best = (i, d);
        }
    }
    best.0 as u8
}

struct ColorBox {
    colors: Vec<(Color, u32)>,
    population: u64,
}

impl ColorBox {
    fn new(colors: Vec<(Color, u32)>) -> Self {
        let population = colors.iter().map(|&(_, n)| n as u64).sum();
        Self { colors, population }
    }

    /// Channel with the largest value spread, and that spread.
    fn widest_channel(&self) -> (usize, u8) {
        (0..3)
            .map(|ch| {
                let (lo, hi) = self
                    .colors
                    .iter()
                    .fold((u8::MAX, u8::MIN), |(lo, hi), (c, _)| (lo.min(c[ch]), hi.max(c[ch])));
                (ch, hi.saturating_sub(lo))
            })
            .max_by_key(|&(ch, range)| (range, std::cmp::Reverse(ch)))
            .unwrap_or((0, 0))
    }

    /// Splits at the population median along the widest channel. Both halves
    /// are non-empty.
    fn split(mut self) -> (ColorBox, ColorBox) {
        let (ch, _) = self.widest_channel();
        self.colors.sort_by_key(|&(c, _)| (c[ch], c));

        let half = self.population / 2;
        let mut seen = 0u64;
        let mut at = self.colors.len() - 1;
        for (i, &(_, n)) in self.colors.iter().enumerate() {
            seen += n as u64;
            if seen >= half {
                at = i + 1;
                break;
            }
        }
        let at = at.clamp(1, self.colors.len() - 1);
        let high = self.colors.split_off(at);
        (ColorBox::new(self.colors), ColorBox::new(high))
    }

    /// Population-weighted mean color, rounded to nearest.
    fn mean(&self) -> Color {
        let mut sum = [0u64; 3];
        for &(c, n) in &self.colors {
            for ch in 0..3 {
                sum[ch] += c[ch] as u64 * n as u64;
            }
        }
        let pop = self.population.max(1);
        sum.map(|s| ((s + pop / 2) / pop).min(255) as u8)
    }
}
