// SPDX-License-Identifier: MIT
// CPU scaler built on fast_image_resize (SIMD-accelerated).
// RGBA8 in → RGBA8 out, tightly packed rows on both sides.

use fast_image_resize as fir;
use fir::images::{TypedImage, TypedImageRef};
use fir::pixels::U8x4;
use fir::{FilterType, ResizeAlg, ResizeOptions, Resizer};

use crate::presets::{ResampleFilter, ResampleOptions, ResamplePlan, Size};

#[derive(Debug, thiserror::Error)]
pub enum ScaleError {
    #[error("Input buffer holds {actual} bytes, {expected} needed for {w}x{h} RGBA")]
    BufferSizeMismatch {
        expected: usize,
        actual: usize,
        w: u32,
        h: u32,
    },
    #[error("Cannot resize an empty {w}x{h} raster")]
    EmptyRaster { w: u32, h: u32 },
    #[error("Fast image resize error: {0}")]
    Fir(#[from] fir::ResizeError),
    #[error("Image buffer error: {0}")]
    ImageBuf(#[from] fir::ImageBufferError),
}

impl ResampleFilter {
    fn to_alg(self) -> ResizeAlg {
        match self {
            ResampleFilter::Nearest => ResizeAlg::Nearest,
            ResampleFilter::Box => ResizeAlg::Convolution(FilterType::Box),
            ResampleFilter::Bilinear => ResizeAlg::Convolution(FilterType::Bilinear),
            ResampleFilter::CatmullRom => ResizeAlg::Convolution(FilterType::CatmullRom),
            ResampleFilter::Lanczos3 => ResizeAlg::Convolution(FilterType::Lanczos3),
        }
    }
}

/// Resize a tightly packed RGBA8 buffer from `src` to `out` dimensions.
///
/// Returns a freshly allocated `out.w * out.h * 4` byte buffer. Equal sizes
/// short-circuit to a copy so callers can run a stage unconditionally.
pub fn resize_rgba(
    resizer: &mut Resizer,
    src_rgba: &[u8],
    src: Size,
    out: Size,
    filter: ResampleFilter,
) -> Result<Vec<u8>, ScaleError> {
    if src.is_empty() {
        return Err(ScaleError::EmptyRaster { w: src.w, h: src.h });
    }
    if out.is_empty() {
        return Err(ScaleError::EmptyRaster { w: out.w, h: out.h });
    }
    if src_rgba.len() != src.rgba_len() {
        return Err(ScaleError::BufferSizeMismatch {
            expected: src.rgba_len(),
            actual: src_rgba.len(),
            w: src.w,
            h: src.h,
        });
    }
    if src == out {
        return Ok(src_rgba.to_vec());
    }

    let src_view = TypedImageRef::<U8x4>::from_buffer(src.w, src.h, src_rgba)?;

    let mut dst = vec![0u8; out.rgba_len()];
    {
        let mut dst_view = TypedImage::<U8x4>::from_buffer(out.w, out.h, &mut dst)?;
        let opts = ResizeOptions::new().resize_alg(filter.to_alg());
        resizer.resize_typed::<U8x4>(&src_view, &mut dst_view, &opts)?;
    }

    Ok(dst)
}

/// Run both stages of `plan` over a tightly packed RGBA8 buffer.
///
/// Stage one only resizes when `plan.pre_downsample` is set, using the coarse
/// filter; stage two always lands on `plan.out` with the fine filter.
///
/// # Performance Notes
/// - One resizer is reused across both stages
/// - The intermediate buffer is dropped before returning
pub fn resample_two_stage(
    resizer: &mut Resizer,
    src_rgba: &[u8],
    plan: &ResamplePlan,
    options: ResampleOptions,
) -> Result<Vec<u8>, ScaleError> {
    let stage_one = if plan.pre_downsample {
        log::debug!(
            "coarse pass {}x{} -> {}x{} ({:?})",
            plan.input.w,
            plan.input.h,
            plan.intermediate.w,
            plan.intermediate.h,
            options.coarse
        );
        Some(resize_rgba(
            resizer,
            src_rgba,
            plan.input,
            plan.intermediate,
            options.coarse,
        )?)
    } else {
        None
    };
    let intermediate = stage_one.as_deref().unwrap_or(src_rgba);

    log::debug!(
        "final pass {}x{} -> {}x{} ({:?})",
        plan.intermediate.w,
        plan.intermediate.h,
        plan.out.w,
        plan.out.h,
        options.fine
    );
    resize_rgba(
        resizer,
        intermediate,
        plan.intermediate,
        plan.out,
        options.fine,
    )
}
