mod output;

use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;
use seekpro::{SeekPro, SessionConfig};

/// Capture calibrated frames from a Seek Thermal Pro and save them as PNG.
#[derive(Parser, Debug)]
#[command(name = "seekpro_capture", version)]
struct Args {
    /// Number of frames to capture
    #[arg(short, long, default_value_t = 10)]
    frames: usize,

    /// Directory to write frames to
    #[arg(short, long, default_value = "img_out")]
    output_dir: PathBuf,

    /// Init + grab rounds spent looking for the dead pixel map
    #[arg(long, default_value_t = 4)]
    discovery_attempts: usize,

    /// Timeout for each bulk read, in milliseconds
    #[arg(long, default_value_t = 1000)]
    bulk_timeout_ms: u64,

    /// Timeout for each control transfer, in milliseconds
    #[arg(long, default_value_t = 1000)]
    control_timeout_ms: u64,

    /// Leave the sensor streaming on exit
    #[arg(long)]
    skip_deinit: bool,
}

impl Args {
    fn session_config(&self) -> SessionConfig {
        SessionConfig::default()
            .with_control_timeout(Duration::from_millis(self.control_timeout_ms))
            .with_bulk_timeout(Duration::from_millis(self.bulk_timeout_ms))
            .with_discovery_attempts(self.discovery_attempts)
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    fs::create_dir_all(&args.output_dir)?;

    let mut camera = SeekPro::open_with(args.session_config())?;
    log::debug!("session config {:?}", camera.config());

    log::info!("chip id {}", hex::encode(camera.read_chip_id()?));
    log::info!("firmware {}", hex::encode(camera.firmware_info()?));
    log::info!("correcting {} dead pixels", camera.dead_pixels().len());

    let mut last = Instant::now();
    for n in 0..args.frames {
        let image = camera.get_image()?;

        let now = Instant::now();
        let elapsed = now.duration_since(last).as_secs_f64();
        last = now;
        if elapsed > 0.0 {
            log::info!("frame {}: {:.1} fps", n, 1.0 / elapsed);
        }

        let path = args.output_dir.join(format!("frame_{:04}.png", n));
        output::write_png(&path, &image)?;
        log::debug!("wrote {}", path.display());
    }

    if !args.skip_deinit {
        camera.deinit()?;
    }

    Ok(())
}
