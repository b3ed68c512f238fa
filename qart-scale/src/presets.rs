// SPDX-License-Identifier: MIT
//! # Backdrop Geometry and Plan Computation
//!
//! This module computes the output dimensions for backdrop resampling. A backdrop
//! is the small raster a QR art encoder blends behind the code modules, so the
//! planning here only ever shrinks or grows an image until its long side hits a
//! fixed bound.
//!
//! ## Proportional Rule
//!
//! Every fit in this crate uses the same integer rule:
//! - the longer side (width wins only when strictly longer) maps to the bound
//! - the other side is `other * bound / longer`, truncated toward zero
//! - a side that truncates to zero is raised to 1 so no stage sees an empty raster
//!
//! ## Two Stages
//!
//! Very large inputs (either side above `pre_downsample_factor * max_side`) are
//! first brought down to `intermediate_factor * max_side` on the long side with a
//! coarse filter, then smoothly resized to `max_side`. Everything else goes
//! straight to the final resize.

/// Represents a 2D size with width and height in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Size {
    pub w: u32,
    pub h: u32,
}

impl Size {
    pub const fn new(w: u32, h: u32) -> Self {
        Self { w, h }
    }

    /// Length of the longer side.
    pub fn long_side(self) -> u32 {
        self.w.max(self.h)
    }

    /// Whether either side is zero.
    pub fn is_empty(self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// Number of bytes an RGBA8 buffer of this size occupies.
    pub fn rgba_len(self) -> usize {
        (self.w as usize) * (self.h as usize) * 4
    }
}

/// Bounds used when planning a backdrop resample.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BackdropTarget {
    /// Long side of the final raster.
    pub max_side: u32,
    /// Inputs with a side above `pre_downsample_factor * max_side` get a coarse first pass.
    pub pre_downsample_factor: u32,
    /// Long side of the coarse pass, as a multiple of `max_side`.
    pub intermediate_factor: u32,
}

impl BackdropTarget {
    /// The bounds QR art backdrops are normalized to: 128px, pre-downsample above 512px to 256px.
    pub const QR_ART: Self = Self {
        max_side: 128,
        pre_downsample_factor: 4,
        intermediate_factor: 2,
    };

    /// Threshold above which the coarse pass kicks in.
    pub fn pre_downsample_threshold(self) -> u32 {
        self.max_side.saturating_mul(self.pre_downsample_factor)
    }

    /// Long side of the coarse pass output.
    pub fn intermediate_side(self) -> u32 {
        self.max_side.saturating_mul(self.intermediate_factor)
    }
}

impl Default for BackdropTarget {
    fn default() -> Self {
        Self::QR_ART
    }
}

/// Complete two-stage resample plan computed from the input size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResamplePlan {
    /// Original input dimensions
    pub input: Size,
    /// Output of the first stage. Equal to `input` when no coarse pass runs.
    pub intermediate: Size,
    /// Whether the first stage resizes at all
    pub pre_downsample: bool,
    /// Final computed output dimensions
    pub out: Size,
}

/// Compute the two-stage plan for `input` under `target`.
///
/// The final size is derived from the intermediate size, not from the input,
/// so truncation in the first stage carries into the second exactly as the
/// two resizes will see it.
pub fn build_plan(input: Size, target: BackdropTarget) -> ResamplePlan {
    let threshold = target.pre_downsample_threshold();
    let pre_downsample = input.w > threshold || input.h > threshold;

    let intermediate = if pre_downsample {
        fit_long_side(input, target.intermediate_side())
    } else {
        input
    };
    let out = fit_long_side(intermediate, target.max_side);

    ResamplePlan {
        input,
        intermediate,
        pre_downsample,
        out,
    }
}

/// Fit `input` so its long side is exactly `long`, preserving aspect ratio.
///
/// Upscales as readily as it downscales. Square inputs map to `long × long`.
/// Returns `long × long` for an empty input, since there is no ratio to keep.
pub fn fit_long_side(input: Size, long: u32) -> Size {
    if input.is_empty() {
        return Size::new(long, long);
    }

    let (w, h) = (u64::from(input.w), u64::from(input.h));
    let bound = u64::from(long);
    let (w, h) = if w > h {
        (bound, h * bound / w)
    } else {
        (w * bound / h, bound)
    };

    Size::new((w as u32).max(1), (h as u32).max(1))
}

/// Resampling filters selectable per stage.
///
/// The names follow the filter families `fast_image_resize` implements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum ResampleFilter {
    /// Point sampling, fastest and roughest
    #[clap(name = "nearest")]
    Nearest,
    /// Box average, a cheap area filter well suited to large reductions
    #[clap(name = "box")]
    Box,
    /// Bilinear convolution
    #[clap(name = "bilinear")]
    Bilinear,
    /// Catmull-Rom cubic convolution
    #[clap(name = "catmull-rom")]
    CatmullRom,
    /// Lanczos with a 3-lobe window, sharpest and slowest
    #[clap(name = "lanczos3")]
    Lanczos3,
}

/// Filters used by each stage of [`build_plan`]'s resample.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResampleOptions {
    /// Filter for the coarse first pass on gigantic inputs
    pub coarse: ResampleFilter,
    /// Filter for the final resize to `max_side`
    pub fine: ResampleFilter,
}

impl Default for ResampleOptions {
    fn default() -> Self {
        Self {
            coarse: ResampleFilter::Box,
            fine: ResampleFilter::Bilinear,
        }
    }
}
