use anyhow::{Context, Result};
use clap::Parser;
use qart_backdrop::config::FileEncodeConfig;
use qart_backdrop::{LumaTargetBuilder, PlainQrEncoder, QartSession};
use qart_scale::presets::{ResampleFilter, ResampleOptions};

/// Encode a URL into a QR code with an image as its backdrop.
#[derive(Parser, Debug)]
#[command(name = "qart")]
#[command(about = "Encode a URL as a QR code over a backdrop image")]
#[command(long_about = "Encode a URL as a QR code over a backdrop image.
The backdrop is decoded from any common format, normalized to 128px on its long side,
and turned into a per-module target for the encoder. Versions above 8 are clamped to 8.")]
struct Args {
    /// Payload to encode
    url: String,

    /// Backdrop image (format detected from content)
    src: String,

    /// Output PNG path
    dst: String,

    /// QR version
    #[arg(short = 'v', long = "qr-version", default_value_t = 6,
          help = "QR version; values above 8 are clamped to 8")]
    version: i32,

    /// Pixels per module
    #[arg(long, default_value_t = 4, help = "Pixels per module (0 = default of 8)")]
    scale: i32,

    /// Mask pattern
    #[arg(long, default_value_t = 2, help = "Mask pattern id, 0-7")]
    mask: i32,

    /// Horizontal backdrop offset in modules
    #[arg(long, default_value_t = 4)]
    dx: i32,

    /// Vertical backdrop offset in modules
    #[arg(long, default_value_t = 4)]
    dy: i32,

    /// Seed for randomized control pixels
    #[arg(long, default_value_t = 879_633_355)]
    seed: i64,

    #[arg(long, help = "Randomize which pixels become control pixels")]
    rand_control: bool,

    #[arg(long, help = "Dither the backdrop")]
    dither: bool,

    #[arg(long, help = "Only steer data bits")]
    only_data: bool,

    #[arg(long, help = "Write the control bitmap instead of the finished code")]
    save_control: bool,

    /// Filter for the final backdrop resize
    #[arg(long, value_enum, default_value_t = ResampleFilter::Bilinear)]
    filter: ResampleFilter,

    /// Also write the normalized 128px backdrop here
    #[arg(long)]
    emit_backdrop: Option<String>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let file_config = FileEncodeConfig {
        seed: args.seed,
        scale: args.scale,
        mask: args.mask,
        dx: args.dx,
        dy: args.dy,
        rand_control: args.rand_control,
        dither: args.dither,
        only_data_bits: args.only_data,
        save_control: args.save_control,
    };
    file_config.validate()?;

    let resample = ResampleOptions {
        fine: args.filter,
        ..Default::default()
    };
    let session = QartSession::new(LumaTargetBuilder::default(), PlainQrEncoder).with_resample(resample);

    if let Some(path) = &args.emit_backdrop {
        let src = std::fs::read(&args.src).with_context(|| format!("reading {}", args.src))?;
        let png = qart_backdrop::backdrop_png(&src, session.resample_options())?;
        std::fs::write(path, png).with_context(|| format!("writing {}", path))?;
        log::info!("backdrop written to {}", path);
    }

    session.encode_by_file(&args.url, &args.src, &args.dst, args.version, &file_config)?;
    Ok(())
}
