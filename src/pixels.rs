use egui::Color32;

/// Owned RGBA8 pixel buffer, row-major, unpremultiplied.
///
/// Used for the document's raster paint layer and for every buffer the
/// rasterizer produces. Cloning is a deep copy.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

impl PixelBuffer {
    /// A fully transparent buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Color32::TRANSPARENT)
    }

    pub fn filled(width: u32, height: u32, color: Color32) -> Self {
        let rgba = color.to_srgba_unmultiplied();
        let count = width as usize * height as usize;
        let mut data = Vec::with_capacity(count * 4);
        for _ in 0..count {
            data.extend_from_slice(&rgba);
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> [usize; 2] {
        [self.width as usize, self.height as usize]
    }

    /// Raw RGBA bytes
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    #[inline]
    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < self.width as i64 && y < self.height as i64
    }

    /// RGBA value of a pixel; `None` outside the buffer.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let o = self.offset(x, y);
        Some([self.data[o], self.data[o + 1], self.data[o + 2], self.data[o + 3]])
    }

    pub fn color(&self, x: u32, y: u32) -> Option<Color32> {
        self.get(x, y)
            .map(|[r, g, b, a]| Color32::from_rgba_unmultiplied(r, g, b, a))
    }

    /// Overwrite a pixel. Out-of-bounds writes are ignored.
    #[inline]
    pub fn put(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let o = self.offset(x, y);
        self.data[o..o + 4].copy_from_slice(&rgba);
    }

    /// Source-over blend of a straight-alpha pixel.
    pub fn blend(&mut self, x: u32, y: u32, src: [u8; 4]) {
        match src[3] {
            0 => {}
            255 => self.put(x, y, src),
            _ => {
                let Some(dst) = self.get(x, y) else {
                    return;
                };
                self.put(x, y, blend_over(src, dst));
            }
        }
    }

    /// Blend `layer` over this buffer at the origin. Sizes may differ; only the
    /// overlapping area is touched.
    pub fn composite(&mut self, layer: &PixelBuffer) {
        let w = self.width.min(layer.width);
        let h = self.height.min(layer.height);
        for y in 0..h {
            for x in 0..w {
                if let Some(src) = layer.get(x, y) {
                    self.blend(x, y, src);
                }
            }
        }
    }

    /// Nearest-neighbour rescale to a new size.
    pub fn resized(&self, width: u32, height: u32) -> PixelBuffer {
        let mut out = PixelBuffer::new(width, height);
        if self.width == 0 || self.height == 0 {
            return out;
        }
        for y in 0..height {
            let sy = (y as u64 * self.height as u64 / height.max(1) as u64) as u32;
            for x in 0..width {
                let sx = (x as u64 * self.width as u64 / width.max(1) as u64) as u32;
                if let Some(px) = self.get(sx, sy) {
                    out.put(x, y, px);
                }
            }
        }
        out
    }

    /// Paint `color` at every set position of `mask` (same dimensions).
    pub fn paint_mask(&mut self, mask: &FillMask, color: Color32) {
        let rgba = color.to_srgba_unmultiplied();
        for (index, set) in mask.bits.iter().enumerate() {
            if *set {
                let o = index * 4;
                self.data[o..o + 4].copy_from_slice(&rgba);
            }
        }
    }

    /// Drop alpha by flattening onto an opaque backdrop.
    pub fn to_rgb(&self, backdrop: Color32) -> Vec<u8> {
        let back = backdrop.to_srgba_unmultiplied();
        let mut out = Vec::with_capacity(self.width as usize * self.height as usize * 3);
        for px in self.data.chunks_exact(4) {
            let [r, g, b, _] = blend_over([px[0], px[1], px[2], px[3]], [back[0], back[1], back[2], 255]);
            out.extend_from_slice(&[r, g, b]);
        }
        out
    }
}

fn blend_over(src: [u8; 4], dst: [u8; 4]) -> [u8; 4] {
    let sa = src[3] as u32;
    let da = dst[3] as u32;
    // out_a = sa + da * (1 - sa), in 0..=255 fixed point
    let out_a = sa * 255 + da * (255 - sa);
    if out_a == 0 {
        return [0, 0, 0, 0];
    }
    let mut out = [0u8; 4];
    for c in 0..3 {
        let num = src[c] as u32 * sa * 255 + dst[c] as u32 * da * (255 - sa);
        out[c] = ((num + out_a / 2) / out_a) as u8;
    }
    out[3] = ((out_a + 127) / 255) as u8;
    out
}

/// Boolean mask over a buffer, as produced by a flood fill.
#[derive(Clone, PartialEq, Eq)]
pub struct FillMask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
    count: usize,
}

impl std::fmt::Debug for FillMask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FillMask")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("count", &self.count)
            .finish()
    }
}

impl FillMask {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![false; width as usize * height as usize],
            count: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.bits[y as usize * self.width as usize + x as usize]
    }

    /// Set a bit, returning true if it was previously clear.
    #[inline]
    pub fn insert(&mut self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let index = y as usize * self.width as usize + x as usize;
        if self.bits[index] {
            return false;
        }
        self.bits[index] = true;
        self.count += 1;
        true
    }

    /// Number of set pixels
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_put_bounds() {
        let mut buf = PixelBuffer::new(4, 3);
        buf.put(3, 2, [1, 2, 3, 4]);
        buf.put(4, 0, [9, 9, 9, 9]);
        assert_eq!(buf.get(3, 2), Some([1, 2, 3, 4]));
        assert_eq!(buf.get(4, 0), None);
        assert_eq!(buf.as_raw().len(), 4 * 3 * 4);
    }

    #[test]
    fn test_blend_opaque_and_clear() {
        let mut buf = PixelBuffer::filled(1, 1, Color32::WHITE);
        buf.blend(0, 0, [0, 0, 0, 0]);
        assert_eq!(buf.get(0, 0), Some([255, 255, 255, 255]));
        buf.blend(0, 0, [255, 0, 0, 255]);
        assert_eq!(buf.get(0, 0), Some([255, 0, 0, 255]));
    }

    #[test]
    fn test_blend_half_over_opaque() {
        let mut buf = PixelBuffer::filled(1, 1, Color32::BLACK);
        buf.blend(0, 0, [255, 255, 255, 128]);
        let [r, _, _, a] = buf.get(0, 0).unwrap();
        assert_eq!(a, 255);
        assert!((127..=129).contains(&r));
    }

    #[test]
    fn test_resized_nearest() {
        let mut buf = PixelBuffer::new(2, 2);
        buf.put(1, 1, [255, 0, 0, 255]);
        let big = buf.resized(4, 4);
        assert_eq!(big.get(3, 3), Some([255, 0, 0, 255]));
        assert_eq!(big.get(2, 2), Some([255, 0, 0, 255]));
        assert_eq!(big.get(1, 1), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_mask_count() {
        let mut mask = FillMask::new(3, 3);
        assert!(mask.insert(1, 1));
        assert!(!mask.insert(1, 1));
        assert!(!mask.insert(5, 5));
        assert_eq!(mask.count(), 1);
        assert!(mask.contains(1, 1));
    }
}
