//! Capture modes and media-bus formats offered by the GC2607.

use crate::registers::{MODE_1080P_30FPS, Program};

/// Media-bus pixel formats.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PixelFormat {
    /// Raw Bayer, GRBG order, 10 bits per sample.
    Sgrbg10,
}

impl PixelFormat {
    pub fn bits_per_sample(&self) -> u8 {
        match self {
            PixelFormat::Sgrbg10 => 10,
        }
    }
}

/// Field order of a frame.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Field {
    /// Progressive scan.
    None,
}

/// Colour space tag of the output.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ColorSpace {
    Raw,
}

/// A supported capture mode and the register program that selects it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Mode {
    pub width: u16,
    pub height: u16,
    /// Line length in pixel clocks (HTS).
    pub hts: u16,
    /// Frame length in lines (VTS).
    pub vts: u16,
    pub max_fps: u16,
    pub pixel_format: PixelFormat,
    pub program: Program,
}

impl Mode {
    /// Pixel rate in pixels per second needed for `max_fps`.
    pub fn pixel_rate(&self) -> u64 {
        u64::from(self.hts) * u64::from(self.vts) * u64::from(self.max_fps)
    }

    /// Frame interval at `max_fps`, in microseconds.
    pub fn frame_interval_us(&self) -> u32 {
        1_000_000 / u32::from(self.max_fps)
    }

    /// Media-bus format produced by this mode.
    pub fn format(&self) -> Format {
        Format {
            width: self.width,
            height: self.height,
            pixel_format: self.pixel_format,
            field: Field::None,
            colorspace: ColorSpace::Raw,
        }
    }
}

/// A media-bus format as seen by the imaging pipeline.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Format {
    pub width: u16,
    pub height: u16,
    pub pixel_format: PixelFormat,
    pub field: Field,
    pub colorspace: ColorSpace,
}

/// A format the caller would like. Negotiation picks the closest supported mode.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FormatRequest {
    pub width: u16,
    pub height: u16,
    pub pixel_format: PixelFormat,
}

/// Whether a negotiation only probes or also changes the active format.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Negotiation {
    /// Report what would be chosen; state is untouched.
    Try,
    /// Make the chosen mode active.
    Commit,
}

/// Frame size offered for a pixel format.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FrameSize {
    pub width: u16,
    pub height: u16,
}

/// All supported modes; the first one is the default.
pub static MODES: &[Mode] = &[Mode {
    width: 1920,
    height: 1080,
    hts: 2048,
    vts: 1335,
    max_fps: 30,
    pixel_format: PixelFormat::Sgrbg10,
    program: MODE_1080P_30FPS,
}];

/// Iterate the mode catalog in order.
pub fn enumerate() -> core::slice::Iter<'static, Mode> {
    MODES.iter()
}

pub fn default_mode() -> &'static Mode {
    &MODES[0]
}

/// Distinct pixel formats in catalog order.
pub fn pixel_formats() -> impl Iterator<Item = PixelFormat> {
    pixel_formats_in(MODES)
}

pub fn pixel_formats_in(catalog: &'static [Mode]) -> impl Iterator<Item = PixelFormat> {
    catalog
        .iter()
        .enumerate()
        .filter(|(i, m)| !catalog[..*i].iter().any(|p| p.pixel_format == m.pixel_format))
        .map(|(_, m)| m.pixel_format)
}

/// Frame sizes offered for `pixel_format`.
pub fn frame_sizes(pixel_format: PixelFormat) -> impl Iterator<Item = FrameSize> {
    frame_sizes_in(MODES, pixel_format)
}

pub fn frame_sizes_in(catalog: &'static [Mode], pixel_format: PixelFormat) -> impl Iterator<Item = FrameSize> {
    catalog
        .iter()
        .filter(move |m| m.pixel_format == pixel_format)
        .map(|m| FrameSize {
            width: m.width,
            height: m.height,
        })
}

/// Mode for `request`: an exact size and format match, else the default mode.
pub fn find_mode(request: &FormatRequest) -> &'static Mode {
    find_mode_in(MODES, request).unwrap_or_else(default_mode)
}

/// [`find_mode`] over another catalog. The first entry is the fallback; `None` only
/// for an empty catalog.
pub fn find_mode_in(catalog: &'static [Mode], request: &FormatRequest) -> Option<&'static Mode> {
    catalog
        .iter()
        .find(|m| m.width == request.width && m.height == request.height && m.pixel_format == request.pixel_format)
        .or_else(|| catalog.first())
}
