//! 1-bit AND mask: a set bit means the pixel is masked out (transparent).

/// Boolean pixel mask, stored row-major in the same vertical order as the
/// resource (bottom row first).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    side: usize,
    bits: Vec<bool>,
}

impl Mask {
    #[cfg(test)]
    pub fn new(side: usize, bits: Vec<bool>) -> Self {
        assert_eq!(bits.len(), side * side, "mask must be square");
        Self { side, bits }
    }

    /// Unpacks `side` rows of `stride` bytes, most significant bit first.
    /// Bits beyond `side` in each row are row padding and are dropped.
    pub fn unpack(bytes: &[u8], side: usize, stride: usize) -> Self {
        assert!(stride * 8 >= side && bytes.len() >= side * stride);
        let bits = bytes
            .chunks_exact(stride)
            .take(side)
            .flat_map(|row| (0..side).map(move |x| row[x / 8] & (0x80 >> (x % 8)) != 0))
            .collect();
        Self { side, bits }
    }

    /// Packs into rows of `stride` bytes, most significant bit first. Padding
    /// bits after the last pixel of each row are set.
    pub fn pack(&self, stride: usize) -> Vec<u8> {
        assert!(stride * 8 >= self.side);
        let mut out = Vec::with_capacity(self.side * stride);
        for row in self.rows() {
            let mut packed = vec![0xFFu8; stride];
            for (x, &bit) in row.iter().enumerate() {
                if !bit {
                    packed[x / 8] &= !(0x80 >> (x % 8));
                }
            }
            out.extend_from_slice(&packed);
        }
        out
    }

    pub fn get(&self, x: usize, y: usize) -> bool {
        self.bits[y * self.side + x]
    }

    pub fn rows(&self) -> impl DoubleEndedIterator<Item = &[bool]> {
        self.bits.chunks_exact(self.side)
    }

    /// Nearest-neighbour resize. Mask bits are never blended.
    pub fn resize_nearest(&self, side: usize) -> Self {
        let src: Vec<usize> = (0..side).map(|d| nearest_source(d, self.side, side)).collect();
        let bits = src
            .iter()
            .flat_map(|&sy| src.iter().map(move |&sx| (sx, sy)))
            .map(|(sx, sy)| self.get(sx, sy))
            .collect();
        Self { side, bits }
    }

    /// Text rendering with the top row first, one `0`/`1` per pixel.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.side * (self.side + 1));
        for row in self.rows().rev() {
            out.extend(row.iter().map(|&b| if b { '1' } else { '0' }));
            out.push('\n');
        }
        out
    }
}

/// Source coordinate sampled by destination coordinate `dst` when scaling an
/// axis from `src_len` to `dst_len`, sampling at pixel centres.
pub fn nearest_source(dst: usize, src_len: usize, dst_len: usize) -> usize {
    (((2 * dst + 1) * src_len) / (2 * dst_len)).min(src_len - 1)
}
