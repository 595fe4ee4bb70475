//! Frame geometry and the row-major pixel grid shared by every stage.

/// Width of a frame as it comes off the bulk endpoint.
pub const RAW_WIDTH: usize = 342;
/// Height of a frame as it comes off the bulk endpoint.
pub const RAW_HEIGHT: usize = 260;
/// Width of the usable sensor area.
pub const WIDTH: usize = 320;
/// Height of the usable sensor area.
pub const HEIGHT: usize = 240;

/// First raw row of the usable area.
pub const CROP_TOP: usize = 4;
/// First raw column of the usable area.
pub const CROP_LEFT: usize = 1;

/// Byte length of a complete raw frame (16-bit samples).
pub const FRAME_BYTES: usize = 2 * RAW_WIDTH * RAW_HEIGHT;

/// A row-major grid of samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image<T> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

impl<T: Copy> Image<T> {
    /// Wrap `data` as a `width` x `height` grid.
    ///
    /// Returns `None` if the buffer length does not match the dimensions.
    pub fn from_raw(width: usize, height: usize, data: Vec<T>) -> Option<Self> {
        if data.len() != width * height {
            return None;
        }
        Some(Self {
            width,
            height,
            data,
        })
    }

    /// A grid with every sample set to `value`.
    pub fn filled(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, row: usize, col: usize) -> T {
        self.data[row * self.width + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: T) {
        self.data[row * self.width + col] = value;
    }

    pub fn row(&self, row: usize) -> &[T] {
        &self.data[row * self.width..(row + 1) * self.width]
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Apply `f` to every sample.
    pub fn map<U: Copy>(&self, f: impl Fn(T) -> U) -> Image<U> {
        Image {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }

    /// Combine two grids of the same size sample by sample.
    ///
    /// Returns `None` if the dimensions differ.
    pub fn zip_map<U: Copy, V: Copy>(
        &self,
        other: &Image<U>,
        f: impl Fn(T, U) -> V,
    ) -> Option<Image<V>> {
        if self.width != other.width || self.height != other.height {
            return None;
        }
        Some(Image {
            width: self.width,
            height: self.height,
            data: self
                .data
                .iter()
                .zip(other.data.iter())
                .map(|(&a, &b)| f(a, b))
                .collect(),
        })
    }
}

/// A complete `RAW_HEIGHT` x `RAW_WIDTH` frame as read from the sensor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame(Image<u16>);

impl RawFrame {
    /// Decode a frame from little-endian 16-bit samples.
    ///
    /// `bytes` must be exactly [`FRAME_BYTES`] long.
    pub fn from_le_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != FRAME_BYTES {
            return None;
        }
        let samples = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        Image::from_raw(RAW_WIDTH, RAW_HEIGHT, samples).map(RawFrame)
    }

    /// Wrap an already decoded grid, which must have raw frame dimensions.
    pub fn from_image(image: Image<u16>) -> Option<Self> {
        if image.width() != RAW_WIDTH || image.height() != RAW_HEIGHT {
            return None;
        }
        Some(RawFrame(image))
    }

    pub fn image(&self) -> &Image<u16> {
        &self.0
    }

    /// Strip the sensor border: rows `[4, 244)` and columns `[1, 321)`.
    pub fn crop(&self) -> Image<u16> {
        let mut data = Vec::with_capacity(WIDTH * HEIGHT);
        for row in CROP_TOP..CROP_TOP + HEIGHT {
            data.extend_from_slice(&self.0.row(row)[CROP_LEFT..CROP_LEFT + WIDTH]);
        }
        Image {
            width: WIDTH,
            height: HEIGHT,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indexed_frame(sample: impl Fn(usize, usize) -> u16) -> RawFrame {
        let mut image = Image::filled(RAW_WIDTH, RAW_HEIGHT, 0u16);
        for row in 0..RAW_HEIGHT {
            for col in 0..RAW_WIDTH {
                image.set(row, col, sample(row, col));
            }
        }
        RawFrame::from_image(image).unwrap()
    }

    #[test]
    fn test_frame_bytes() {
        assert_eq!(FRAME_BYTES, 177_840);
    }

    #[test]
    fn test_from_raw_checks_length() {
        assert!(Image::from_raw(2, 2, vec![0u8; 4]).is_some());
        assert!(Image::from_raw(2, 2, vec![0u8; 5]).is_none());
    }

    #[test]
    fn test_crop_dimensions() {
        let cropped = RawFrame::from_le_bytes(&vec![0u8; FRAME_BYTES])
            .unwrap()
            .crop();
        assert_eq!(cropped.width(), WIDTH);
        assert_eq!(cropped.height(), HEIGHT);
        assert_eq!(cropped.data().len(), 240 * 320);
    }

    #[test]
    fn test_crop_offsets() {
        let rows = indexed_frame(|row, _| row as u16).crop();
        let cols = indexed_frame(|_, col| col as u16).crop();

        assert_eq!(rows.get(0, 0), 4);
        assert_eq!(rows.get(239, 0), 243);
        assert_eq!(cols.get(0, 0), 1);
        assert_eq!(cols.get(0, 319), 320);
        assert_eq!(rows.row(17), &[21u16; WIDTH][..]);
    }

    #[test]
    fn test_from_le_bytes() {
        let mut bytes = vec![0u8; FRAME_BYTES];
        bytes[0] = 0x34;
        bytes[1] = 0x12;
        bytes[2 * RAW_WIDTH] = 0xff;
        let frame = RawFrame::from_le_bytes(&bytes).unwrap();
        assert_eq!(frame.image().get(0, 0), 0x1234);
        assert_eq!(frame.image().get(1, 0), 0x00ff);

        assert!(RawFrame::from_le_bytes(&bytes[..FRAME_BYTES - 2]).is_none());
    }

    #[test]
    fn test_from_image_checks_dimensions() {
        assert!(RawFrame::from_image(Image::filled(WIDTH, HEIGHT, 0)).is_none());
    }

    #[test]
    fn test_zip_map() {
        let a = Image::from_raw(2, 1, vec![5u16, 7]).unwrap();
        let b = Image::from_raw(2, 1, vec![1i32, -3]).unwrap();
        let diff = a.zip_map(&b, |x, y| x as i32 - y).unwrap();
        assert_eq!(diff.data(), &[4, 10]);

        let c = Image::filled(1, 2, 0i32);
        assert!(a.zip_map(&c, |x, y| x as i32 - y).is_none());
    }
}
