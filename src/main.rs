use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;

use ringwave::analyzer::{AudioSource, FrequencyAnalyzer, TrackSource};
use ringwave::audio::decode;
use ringwave::cli::Cli;
use ringwave::config::{self, Geometry, VisualizerConfig};
use ringwave::encode::ffmpeg::{EncodeOptions, FfmpegEncoder};
use ringwave::player;
use ringwave::render::frame::RenderLoop;
use ringwave::render::surface::Framebuffer;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let mut cli = Cli::parse();

    // Load config: explicit --config path, or auto-detect ringwave.toml / global config
    let config_path = cli.config.clone().or_else(|| {
        let local = std::path::PathBuf::from("ringwave.toml");
        if local.exists() {
            return Some(local);
        }
        if let Some(home) = dirs::home_dir() {
            let xdg = home.join(".config").join("ringwave").join("config.toml");
            if xdg.exists() {
                return Some(xdg);
            }
        }
        if let Some(config_dir) = dirs::config_dir() {
            let platform = config_dir.join("ringwave").join("config.toml");
            if platform.exists() {
                return Some(platform);
            }
        }
        None
    });
    if let Some(ref path) = config_path {
        if let Some(cfg) = config::load_config(path) {
            log::info!("Loaded config from {}", path.display());
            // Merge: config values apply only when CLI is at its default
            if cli.size == 560 { cli.size = cfg.visual.size; }
            if cli.wave_length == 78 { cli.wave_length = cfg.visual.wave_length; }
            if cli.color == "#FFFFFF" { cli.color = cfg.visual.color; }
            if cli.fps == 60 { cli.fps = cfg.output.fps; }
            if cli.crf == 18 { cli.crf = cfg.output.crf; }
            if cli.codec == "libx264" { cli.codec = cfg.output.codec; }
        } else {
            log::warn!("Failed to load config from {}", path.display());
        }
    }

    let input = cli.input.as_ref().context("Input audio file is required")?;
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }

    log::info!("ringwave - circular waveform visualizer");
    log::info!("Input: {}", input.display());
    log::info!("Output: {}", cli.output.display());
    log::info!("Canvas: {0}x{0} @ {1}fps", cli.size, cli.fps);

    // 1. Decode audio
    let track = decode::decode(input)?;
    let sample_rate = track.sample_rate;
    let duration = match cli.duration {
        Some(limit) => track.duration_secs().min(limit),
        None => track.duration_secs(),
    };

    // 2. Build the engine
    let visual = VisualizerConfig {
        size: cli.size,
        wave_length: cli.wave_length,
        color: cli.color.parse()?,
        viewport_height: cli.viewport_height.unwrap_or(cli.size),
    };
    let geometry = Geometry::derive(&visual)?;
    let surface = Framebuffer::new(visual.size, visual.color)?;

    let source = Arc::new(TrackSource::new(track.samples, sample_rate));
    let (mut analyzer, reader) = FrequencyAnalyzer::attach(Arc::clone(&source))?;
    let mut render_loop = RenderLoop::new(geometry, surface, reader);

    // User-intent play: resume the suspended pipeline first, then start.
    if source.is_suspended() {
        source.resume();
    }
    source.set_muted(cli.mute);
    source.play();

    // 3. Start the encoder
    let encode_opts = EncodeOptions {
        fps: cli.fps,
        codec: &cli.codec,
        pix_fmt: &cli.pix_fmt,
        crf: cli.crf,
        bitrate: cli.bitrate.as_deref(),
        muted: cli.mute,
    };
    let mut encoder = FfmpegEncoder::new(&cli.output, input, visual.size, &encode_opts)?;

    // 4. Frame loop: the host clocks playback, one audio hop per video frame
    let total_frames = (duration * cli.fps as f32).ceil() as u64;
    let pb = ProgressBar::new(total_frames);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} frames ({eta} remaining)")
            .unwrap()
            .progress_chars("=>-"),
    );

    let mut advanced: u64 = 0;
    for frame_idx in 0..total_frames {
        let target = (frame_idx + 1) * sample_rate as u64 / cli.fps as u64;
        source.advance((target - advanced) as usize);
        advanced = target;

        analyzer.publish_once();
        match render_loop.render_frame() {
            Ok(true) => {}
            Ok(false) => break,
            Err(err) => {
                log::warn!("frame {frame_idx} skipped: {err:#}");
                continue;
            }
        }

        encoder.write_frame(&render_loop.surface().scaled_rgba())?;
        pb.set_position(frame_idx + 1);
    }
    pb.finish_with_message("Rendering complete");

    // 5. Finish encoding
    encoder.finish()?;
    log::info!(
        "Done! Output: {} ({} rendered)",
        cli.output.display(),
        player::format_elapsed(duration as u64)
    );
    Ok(())
}
