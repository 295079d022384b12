use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ringwave", about = "Audio-reactive circular waveform video renderer")]
pub struct Cli {
    /// Input audio file (WAV, MP3, FLAC, OGG, AAC)
    pub input: Option<PathBuf>,

    /// Output video file
    #[arg(short, long, default_value = "ringwave.mp4")]
    pub output: PathBuf,

    /// Canvas edge length in pixels (the video is square)
    #[arg(long, default_value_t = 560)]
    pub size: u32,

    /// Thickness of the tick band in pixels
    #[arg(long, default_value_t = 78)]
    pub wave_length: u32,

    /// Tick stroke color (#RRGGBB)
    #[arg(long, default_value = "#FFFFFF")]
    pub color: String,

    /// Viewport height feeding the pulse scale; defaults to --size
    #[arg(long)]
    pub viewport_height: Option<u32>,

    /// Frames per second
    #[arg(long, default_value_t = 60)]
    pub fps: u32,

    /// Limit the rendered duration in seconds
    #[arg(short, long)]
    pub duration: Option<f32>,

    /// Export without the audio track
    #[arg(long)]
    pub mute: bool,

    /// H.264 CRF quality (0-51, lower = better). Ignored when --bitrate is set.
    #[arg(long, default_value_t = 18)]
    pub crf: u32,

    /// Video bitrate (e.g. 2400k, 5M). When set, uses -b:v instead of -crf.
    #[arg(short, long)]
    pub bitrate: Option<String>,

    /// FFmpeg video codec
    #[arg(long, default_value = "libx264")]
    pub codec: String,

    /// FFmpeg pixel format
    #[arg(long, default_value = "yuv420p")]
    pub pix_fmt: String,

    /// Config file path (defaults to ringwave.toml or the user config dir)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
