use crate::foundation::error::{ScatterwallError, ScatterwallResult};

/// Logical surface dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SurfaceSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl SurfaceSize {
    /// Construct a surface size, rejecting zero-sized axes.
    pub fn new(width: u32, height: u32) -> ScatterwallResult<Self> {
        if width == 0 || height == 0 {
            return Err(ScatterwallError::InvalidDimensions { width, height });
        }
        Ok(Self { width, height })
    }

    /// Total number of pixels (`width * height`).
    pub fn pixel_count(self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    /// Premultiplied red channel.
    pub r: u8,
    /// Premultiplied green channel.
    pub g: u8,
    /// Premultiplied blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8Premul {
    /// A fully transparent pixel.
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    /// Premultiply straight-alpha RGBA8 channels.
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }

    /// The channels as a `[r, g, b, a]` array.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// An owned premultiplied-RGBA8 pixel buffer.
///
/// All offscreen layer buffers, the composition surface and the presented
/// output share this representation; pixel math on it lives in
/// [`crate::render::composite`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major premultiplied RGBA8, `width * height * 4` bytes.
    pub data: Vec<u8>,
}

impl Frame {
    /// Allocate a fully transparent frame.
    pub fn transparent(size: SurfaceSize) -> Self {
        Self {
            width: size.width,
            height: size.height,
            data: vec![0; size.pixel_count() * 4],
        }
    }

    /// Wrap an existing pixel buffer, validating its length.
    pub fn from_data(size: SurfaceSize, data: Vec<u8>) -> ScatterwallResult<Self> {
        if data.len() != size.pixel_count() * 4 {
            return Err(ScatterwallError::composite(format!(
                "frame byte length {} does not match {}x{}",
                data.len(),
                size.width,
                size.height
            )));
        }
        Ok(Self {
            width: size.width,
            height: size.height,
            data,
        })
    }

    /// The frame's dimensions as a [`SurfaceSize`].
    pub fn size(&self) -> SurfaceSize {
        SurfaceSize {
            width: self.width,
            height: self.height,
        }
    }

    /// Overwrite every pixel with `color`.
    pub fn fill(&mut self, color: Rgba8Premul) {
        let px = color.to_array();
        for chunk in self.data.chunks_exact_mut(4) {
            chunk.copy_from_slice(&px);
        }
    }

    /// Alpha channel of every pixel, row-major. Used to compare silhouettes.
    pub fn alpha_mask(&self) -> Vec<u8> {
        self.data.chunks_exact(4).map(|px| px[3]).collect()
    }
}
