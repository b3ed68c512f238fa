//! # Encode Orchestration
//!
//! Drives decode → normalize → encode → output selection.
//!
//! [`QartSession`] bundles the two pluggable collaborators (a
//! [`TargetBuilder`] and a [`QrArtEncoder`]) with the resample filters. The
//! free functions at the bottom of this module run a default session for
//! callers that do not need to swap anything.
//!
//! A session holds no per-call state: every call decodes its own raster and
//! builds its own [`EncodeConfig`], which is dropped once the encoder returns.
//!
//! ```text
//! raw bytes ──decode──▶ DynamicImage ──resample──▶ 128px PNG
//!                                                     │
//!                                         build_target(17 + 4·version + size)
//!                                                     ▼
//!            EncodeParams ──clamp──▶ EncodeConfig ──encode──▶ control PNG | code PNG
//! ```

use std::ffi::OsString;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use qart_scale::presets::ResampleOptions;

use crate::config::config::{
    DEFAULT_SCALE, EncodeParams, FileEncodeConfig, HALVE_SCALE_MIN, HALVE_SCALE_VERSION,
    MAX_MODULE_COUNT, MAX_VERSION, OUTPUT_FILE_MODE,
};
use crate::encoder::{EncodeConfig, PlainQrEncoder, QrArtEncoder};
use crate::error::{QartError, QartResult};
use crate::processing::backdrop;
use crate::target::{LumaTargetBuilder, TargetBuilder};

/// Clamp a requested version to at most [`MAX_VERSION`].
///
/// There is no lower bound: zero and negative versions pass through and are
/// rejected later by the target builder or the encoder.
pub fn normalize_version(version: i32) -> i32 {
    version.min(MAX_VERSION)
}

/// Default a zero scale to [`DEFAULT_SCALE`], then halve large scales for large versions.
///
/// The halving branch only fires for versions ≥ 12, which
/// [`normalize_version`] never produces while [`MAX_VERSION`] is 8.
pub fn normalize_scale(version: i32, scale: i32) -> i32 {
    let mut scale = if scale == 0 { DEFAULT_SCALE } else { scale };
    if version >= HALVE_SCALE_VERSION && scale >= HALVE_SCALE_MIN {
        scale /= 2;
    }
    scale
}

/// Number of modules per side a target is built for, `17 + 4 * version + size`.
///
/// `None` if the sum does not fit in an `i32`.
pub fn module_count(version: i32, size: i32) -> Option<i32> {
    version.checked_mul(4)?.checked_add(17)?.checked_add(size)
}

/// Pluggable encode pipeline.
#[derive(Debug, Clone, Default)]
pub struct QartSession<B = LumaTargetBuilder, E = PlainQrEncoder> {
    builder: B,
    encoder: E,
    resample: ResampleOptions,
}

impl<B, E> QartSession<B, E>
where
    B: TargetBuilder,
    E: QrArtEncoder,
{
    pub fn new(builder: B, encoder: E) -> Self {
        Self {
            builder,
            encoder,
            resample: ResampleOptions::default(),
        }
    }

    /// Override the filters used when normalizing the backdrop.
    pub fn with_resample(mut self, resample: ResampleOptions) -> Self {
        self.resample = resample;
        self
    }

    pub fn resample_options(&self) -> ResampleOptions {
        self.resample
    }

    /// Normalize parameters and the backdrop image into an encode configuration.
    ///
    /// The returned configuration has an empty `url` and a rotation of 0.
    ///
    /// # Errors
    ///
    /// - [`QartError::EmptyInput`] / [`QartError::Decode`] if `src` is not an image
    /// - [`QartError::Serialization`] if the backdrop cannot be re-encoded
    /// - [`QartError::InvalidConfig`] if `version` and `size` overflow the
    ///   module count or push it past [`MAX_MODULE_COUNT`]
    /// - whatever the target builder reports, e.g. [`QartError::InvalidConfig`]
    ///   for a version so low the module count is not positive
    pub fn init_image(&self, src: &[u8], params: &EncodeParams) -> QartResult<EncodeConfig> {
        let version = normalize_version(params.version);
        let scale = normalize_scale(version, params.scale);
        if version < 1 {
            log::warn!("QR version {} is below 1 and passes through unclamped", version);
        }
        let modules = module_count(version, params.size)
            .filter(|&m| m <= MAX_MODULE_COUNT)
            .ok_or_else(|| {
                QartError::InvalidConfig(format!(
                    "version {} with size {} exceeds {} modules",
                    version, params.size, MAX_MODULE_COUNT
                ))
            })?;

        let img = backdrop::decode(src)?;
        let png = backdrop::convert_to_png(&img, self.resample)?;
        let target = self.builder.build_target(&png, modules)?;

        Ok(EncodeConfig {
            dx: params.dx,
            dy: params.dy,
            url: String::new(),
            version,
            mask: params.mask,
            rand_control: params.rand_control,
            dither: params.dither,
            only_data_bits: params.only_data_bits,
            save_control: params.save_control,
            scale,
            target,
            seed: params.seed,
            rotation: 0,
            size: params.size,
        })
    }

    /// Encode `url` with a prepared configuration and select the output bytes.
    ///
    /// Returns the control bitmap when `save_control` is set, otherwise the
    /// finished code as PNG. Encoder failures are logged before being returned.
    pub fn encode_url(&self, url: &str, mut config: EncodeConfig) -> QartResult<Vec<u8>> {
        config.url = url.to_string();
        let art = match self.encoder.encode(&config) {
            Ok(art) => art,
            Err(e) => {
                log::error!("error: {}", e);
                return Err(e);
            }
        };

        if config.save_control {
            Ok(art.control)
        } else {
            art.code.to_png()
        }
    }

    /// [`Self::init_image`] followed by [`Self::encode_url`].
    pub fn encode(&self, url: &str, src: &[u8], params: &EncodeParams) -> QartResult<Vec<u8>> {
        let config = self.init_image(src, params)?;
        self.encode_url(url, config)
    }

    /// Read `src_path`, encode `url` over it, and write the result to `dst_path`.
    ///
    /// The output is staged next to `dst_path` and renamed into place, so
    /// `dst_path` is either fully written or left as it was. The file ends up
    /// with mode `0o644` on Unix. Nothing is written if reading or encoding fails.
    pub fn encode_by_file(
        &self,
        url: &str,
        src_path: impl AsRef<Path>,
        dst_path: impl AsRef<Path>,
        version: i32,
        file_config: &FileEncodeConfig,
    ) -> QartResult<()> {
        let (src_path, dst_path) = (src_path.as_ref(), dst_path.as_ref());
        file_config.validate()?;

        let data = std::fs::read(src_path).map_err(|e| {
            log::error!("err: reading {}: {}", src_path.display(), e);
            QartError::io(src_path, e)
        })?;

        let dst = self.encode(url, &data, &file_config.to_params(version))?;

        write_output(dst_path, &dst).map_err(|e| {
            log::error!("err: writing {}: {}", dst_path.display(), e);
            QartError::io(dst_path, e)
        })?;

        log::info!(
            "wrote {} bytes to {} (version {})",
            dst.len(),
            dst_path.display(),
            normalize_version(version)
        );
        Ok(())
    }
}

fn write_output(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let staging = staging_path(path);
    let result = write_new(&staging, bytes).and_then(|()| std::fs::rename(&staging, path));
    if result.is_err() {
        let _ = std::fs::remove_file(&staging);
    }
    result
}

/// `<dst>.partial` in the same directory, so the final rename stays on one filesystem.
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}

fn write_new(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(OUTPUT_FILE_MODE);
    }
    #[cfg(not(unix))]
    let _ = OUTPUT_FILE_MODE;

    let mut file = options.open(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

/// [`QartSession::init_image`] on a default session.
pub fn init_image(src: &[u8], params: &EncodeParams) -> QartResult<EncodeConfig> {
    QartSession::<LumaTargetBuilder, PlainQrEncoder>::default().init_image(src, params)
}

/// [`QartSession::encode_url`] on a default session.
pub fn encode_url(url: &str, config: EncodeConfig) -> QartResult<Vec<u8>> {
    QartSession::<LumaTargetBuilder, PlainQrEncoder>::default().encode_url(url, config)
}

/// [`QartSession::encode`] on a default session.
pub fn encode(url: &str, src: &[u8], params: &EncodeParams) -> QartResult<Vec<u8>> {
    QartSession::<LumaTargetBuilder, PlainQrEncoder>::default().encode(url, src, params)
}

/// [`QartSession::encode_by_file`] on a default session with [`FileEncodeConfig::default`].
pub fn encode_by_file(
    url: &str,
    src_path: impl AsRef<Path>,
    dst_path: impl AsRef<Path>,
    version: i32,
) -> QartResult<()> {
    QartSession::<LumaTargetBuilder, PlainQrEncoder>::default().encode_by_file(
        url,
        src_path,
        dst_path,
        version,
        &FileEncodeConfig::default(),
    )
}
