// SPDX-License-Identifier: MIT
//! # qart-scale: Backdrop Resampling for QR Art
//!
//! This crate shrinks (or grows) arbitrary RGBA rasters to the small, fixed-bound
//! backdrop a QR art encoder blends behind its modules. It owns the geometry and
//! the pixel work; decoding and PNG serialization live in the `qart-backdrop` crate.
//!
//! ## Key Components
//!
//! - [`presets`]: Proportional fitting, the two-stage [`presets::ResamplePlan`] and filter presets
//! - [`cpu`]: CPU resizing on top of fast_image_resize
//!
//! ## Why Two Stages
//!
//! Resizing a huge photo straight to 128px with a smooth filter is slow and the
//! kernel still aliases. A coarse box pass to 256px followed by a smooth pass to
//! 128px is cheaper and looks better.
//!
//! ## Usage Example
//!
//! ```rust
//! use qart_scale::cpu::resample_two_stage;
//! use qart_scale::presets::{build_plan, BackdropTarget, ResampleOptions, Size};
//!
//! let input = Size { w: 1920, h: 1080 };
//! let plan = build_plan(input, BackdropTarget::QR_ART);
//! assert_eq!(plan.out, Size { w: 128, h: 72 });
//!
//! let rgba = vec![255u8; input.rgba_len()];
//! let mut resizer = fast_image_resize::Resizer::new();
//! let out = resample_two_stage(&mut resizer, &rgba, &plan, ResampleOptions::default())?;
//! assert_eq!(out.len(), plan.out.rgba_len());
//! # Ok::<(), qart_scale::cpu::ScaleError>(())
//! ```

pub mod cpu;
pub mod presets;
