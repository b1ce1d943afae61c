//! RGB images as sample grids
//!
//! A channel of a `width` by `height` image is encoded with the x axis as
//! the item axis and the y axis as the slot axis. Both axes get their own
//! locality codes, so horizontally and vertically adjacent pixels each sit
//! one bit apart.
//!
//! ```text
//! address(x, y) = code_x[x] * 2^ceil(log2(height)) + code_y[y]
//! ```

use serde::{Deserialize, Serialize};

use crate::codec::{SampleSink, SampleSource};
use crate::effects::Effect;
use crate::error::{Error, Result};
use crate::simulator::StateVectorSimulator;
use crate::transform::transform_in_place;

/// Linear RGB colour with components nominally in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    pub fn channel(&self, channel: ColorChannel) -> f64 {
        match channel {
            ColorChannel::R => self.r,
            ColorChannel::G => self.g,
            ColorChannel::B => self.b,
        }
    }

    pub fn channel_mut(&mut self, channel: ColorChannel) -> &mut f64 {
        match channel {
            ColorChannel::R => &mut self.r,
            ColorChannel::G => &mut self.g,
            ColorChannel::B => &mut self.b,
        }
    }

    /// Opaque 8-bit RGBA, components clamped to `[0, 1]` first.
    pub fn to_rgba8(&self) -> [u8; 4] {
        [quantize(self.r), quantize(self.g), quantize(self.b), u8::MAX]
    }
}

fn quantize(component: f64) -> u8 {
    if component.is_nan() {
        return 0;
    }
    (component.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// One of the three colour channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorChannel {
    R,
    G,
    B,
}

impl ColorChannel {
    pub const ALL: [ColorChannel; 3] = [ColorChannel::R, ColorChannel::G, ColorChannel::B];
}

/// Row-major RGB image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    width: usize,
    height: usize,
    pixels: Vec<Rgb>,
}

impl Image {
    /// Image filled with `fill`
    pub fn filled(width: usize, height: usize, fill: Rgb) -> Self {
        Self {
            width,
            height,
            pixels: vec![fill; width * height],
        }
    }

    /// Wrap row-major `pixels`.
    pub fn from_pixels(width: usize, height: usize, pixels: Vec<Rgb>) -> Result<Self> {
        if pixels.len() != width * height {
            return Err(Error::BufferSizeMismatch {
                expected: width * height,
                actual: pixels.len(),
            });
        }
        Ok(Self { width, height, pixels })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    pub fn pixel(&self, x: usize, y: usize) -> Rgb {
        self.pixels[y * self.width + x]
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, value: Rgb) {
        self.pixels[y * self.width + x] = value;
    }

    /// Read-only view of one channel
    pub fn channel(&self, channel: ColorChannel) -> ChannelView<'_> {
        ChannelView { image: self, channel }
    }

    /// Writable view of one channel
    pub fn channel_mut(&mut self, channel: ColorChannel) -> ChannelViewMut<'_> {
        ChannelViewMut { image: self, channel }
    }

    /// Row-major RGBA8 bytes, ready for a raster encoder.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(Rgb::to_rgba8).collect()
    }
}

/// One channel of an [`Image`] seen as a sample grid.
#[derive(Debug, Clone, Copy)]
pub struct ChannelView<'a> {
    image: &'a Image,
    channel: ColorChannel,
}

impl SampleSource for ChannelView<'_> {
    fn item_count(&self) -> usize {
        self.image.width
    }

    fn slot_count(&self) -> usize {
        self.image.height
    }

    fn sample(&self, x: usize, y: usize) -> f64 {
        self.image.pixel(x, y).channel(self.channel)
    }
}

/// Writable counterpart of [`ChannelView`].
#[derive(Debug)]
pub struct ChannelViewMut<'a> {
    image: &'a mut Image,
    channel: ColorChannel,
}

impl SampleSource for ChannelViewMut<'_> {
    fn item_count(&self) -> usize {
        self.image.width
    }

    fn slot_count(&self) -> usize {
        self.image.height
    }

    fn sample(&self, x: usize, y: usize) -> f64 {
        self.image.pixel(x, y).channel(self.channel)
    }
}

impl SampleSink for ChannelViewMut<'_> {
    fn set_sample(&mut self, x: usize, y: usize, value: f64) {
        let width = self.image.width;
        *self.image.pixels[y * width + x].channel_mut(self.channel) = value;
    }
}

/// Copy of `image` with each channel run through `effect` independently.
pub fn transform_image(image: &Image, effect: &Effect, max_qubits: u32) -> Result<Image> {
    let mut output = image.clone();
    for channel in ColorChannel::ALL {
        transform_in_place::<StateVectorSimulator, _>(&mut output.channel_mut(channel), effect, max_qubits)?;
    }
    tracing::debug!(width = image.width, height = image.height, "image transformed");
    Ok(output)
}

/// Copy of `image` blurred by `angle`.
pub fn blur_image(image: &Image, angle: f64, max_qubits: u32) -> Result<Image> {
    transform_image(image, &Effect::blur(angle), max_qubits)
}
