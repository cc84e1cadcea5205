use image::imageops::{self, FilterType};
use image::RgbImage;
use serde::{Deserialize, Serialize};

use super::mask::nearest_source;

/// Smooth kernels allowed for the color plane. Nearest-neighbour is
/// deliberately absent: it is reserved for the mask.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ColorFilter {
    #[default]
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl ColorFilter {
    fn filter_type(self) -> FilterType {
        match self {
            ColorFilter::Triangle => FilterType::Triangle,
            ColorFilter::CatmullRom => FilterType::CatmullRom,
            ColorFilter::Gaussian => FilterType::Gaussian,
            ColorFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kernel {
    Smooth(ColorFilter),
    Nearest,
}

impl From<ColorFilter> for Kernel {
    fn from(filter: ColorFilter) -> Self {
        Kernel::Smooth(filter)
    }
}

/// Resizes a square RGB raster to `side`×`side`.
pub fn resample_color(rgb: &RgbImage, side: u32, kernel: Kernel) -> RgbImage {
    match kernel {
        Kernel::Smooth(filter) => imageops::resize(rgb, side, side, filter.filter_type()),
        Kernel::Nearest => {
            let (w, h) = rgb.dimensions();
            RgbImage::from_fn(side, side, |x, y| {
                let sx = nearest_source(x as usize, w as usize, side as usize) as u32;
                let sy = nearest_source(y as usize, h as usize, side as usize) as u32;
                *rgb.get_pixel(sx, sy)
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn gradient(side: u32) -> RgbImage {
        RgbImage::from_fn(side, side, |x, y| Rgb([(x * 5) as u8, (y * 5) as u8, ((x + y) * 2) as u8]))
    }

    #[test]
    fn test_nearest_identity_at_same_size() {
        let img = gradient(48);
        assert_eq!(resample_color(&img, 48, Kernel::Nearest), img);
    }

    #[test]
    fn test_smooth_upscale_dimensions() {
        let img = gradient(32);
        for filter in [ColorFilter::Triangle, ColorFilter::CatmullRom, ColorFilter::Gaussian, ColorFilter::Lanczos3] {
            let out = resample_color(&img, 48, filter.into());
            assert_eq!(out.dimensions(), (48, 48));
        }
    }

    #[test]
    fn test_smooth_upscale_blends_edges() {
        // left half black, right half white
        let img = RgbImage::from_fn(32, 32, |x, _| if x < 16 { Rgb([0, 0, 0]) } else { Rgb([255, 255, 255]) });
        let out = resample_color(&img, 48, ColorFilter::Triangle.into());
        assert!(out.get_pixel(0, 10)[0] <= 1);
        assert!(out.get_pixel(47, 10)[0] >= 254);
        let boundary: Vec<u8> = (20..28).map(|x| out.get_pixel(x, 10)[0]).collect();
        assert!(boundary.iter().any(|&v| v > 8 && v < 247), "no blending in {:?}", boundary);
    }

    #[test]
    fn test_filter_config_names() {
        let f: ColorFilter = serde_json::from_str("\"catmull-rom\"").unwrap();
        assert_eq!(f, ColorFilter::CatmullRom);
        assert_eq!(serde_json::to_string(&ColorFilter::Lanczos3).unwrap(), "\"lanczos3\"");
    }
}
