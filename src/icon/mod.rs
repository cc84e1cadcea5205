pub mod mask;
pub mod quantize;
pub mod resample;

use image::{imageops, Rgb, RgbImage, Rgba, RgbaImage};

use crate::resource::{IconLayout, IconResource, PALETTE_ENTRY_LEN};
use mask::Mask;
use resample::{resample_color, Kernel};

/// Expands an 8-bit index plane through its BGR0 color table. Rows keep
/// their storage order.
pub fn to_rgb(pixels: &[u8], color_table: &[u8], side: u32) -> RgbImage {
    RgbImage::from_fn(side, side, |x, y| {
        let index = pixels[(y * side + x) as usize] as usize;
        let entry = &color_table[index * PALETTE_ENTRY_LEN..][..3];
        Rgb([entry[2], entry[1], entry[0]])
    })
}

/// Replacement body for the 48×48 resource: everything after its header.
#[derive(Debug, Clone)]
pub struct IconPayload {
    pub color_table: Vec<u8>,
    pub pixels: Vec<u8>,
    pub mask: Vec<u8>,
    pub palette_size: usize,
    pub resampled_mask: Mask,
}

impl IconPayload {
    /// `color_table ++ pixels ++ mask`, exactly `IconLayout::Large.body_len()` bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(IconLayout::Large.body_len());
        out.extend_from_slice(&self.color_table);
        out.extend_from_slice(&self.pixels);
        out.extend_from_slice(&self.mask);
        out
    }

    /// Renders the payload as a top-down RGBA image, masked pixels transparent.
    pub fn to_rgba(&self) -> RgbaImage {
        let side = IconLayout::Large.side() as u32;
        let rgb = to_rgb(&self.pixels, &self.color_table, side);
        let mut rgba = RgbaImage::from_fn(side, side, |x, y| {
            let Rgb([r, g, b]) = *rgb.get_pixel(x, y);
            let alpha = if self.resampled_mask.get(x as usize, y as usize) { 0 } else { 255 };
            Rgba([r, g, b, alpha])
        });
        imageops::flip_vertical_in_place(&mut rgba);
        rgba
    }
}

/// Turns the 32×32 icon into a 48×48 body: color plane resampled with
/// `kernel` and requantized to an adaptive palette, mask resampled
/// nearest-neighbour and re-packed to the 48×48 stride.
pub fn build_payload(small: &IconResource<'_>, kernel: Kernel) -> IconPayload {
    let from = small.layout();
    let to = IconLayout::Large;

    let rgb = to_rgb(small.pixels(), small.color_table(), from.side() as u32);
    let mask = Mask::unpack(small.mask(), from.side(), from.mask_stride());

    let resampled = resample_color(&rgb, to.side() as u32, kernel);
    let resampled_mask = mask.resize_nearest(to.side());

    let quantized = quantize::quantize(&resampled, 256);
    log::info!(
        "resampled {} icon to {} with {} palette entries",
        from,
        to,
        quantized.palette.len()
    );

    IconPayload {
        color_table: quantized.color_table_bytes(),
        mask: resampled_mask.pack(to.mask_stride()),
        palette_size: quantized.palette.len(),
        pixels: quantized.indices,
        resampled_mask,
    }
}
