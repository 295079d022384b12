use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use std::process::{Child, Command, Stdio};

/// Encoder settings the CLI exposes.
pub struct EncodeOptions<'a> {
    pub fps: u32,
    pub codec: &'a str,
    pub pix_fmt: &'a str,
    pub crf: u32,
    pub bitrate: Option<&'a str>,
    /// Skip the audio track entirely (muted export).
    pub muted: bool,
}

/// Pipes raw RGBA frames into an ffmpeg child process, muxing the source
/// audio unless muted.
pub struct FfmpegEncoder {
    child: Child,
}

impl FfmpegEncoder {
    pub fn new(
        output_path: &Path,
        input_audio: &Path,
        size: u32,
        opts: &EncodeOptions,
    ) -> Result<Self> {
        let mut args = vec![
            "-y".to_string(),
            "-f".into(), "rawvideo".into(),
            "-pixel_format".into(), "rgba".into(),
            "-video_size".into(), format!("{size}x{size}"),
            "-framerate".into(), opts.fps.to_string(),
            "-i".into(), "pipe:0".into(),
        ];

        if !opts.muted {
            args.extend(["-i".to_string(), input_audio.display().to_string()]);
        }

        args.extend(["-c:v".to_string(), opts.codec.to_string()]);
        args.extend(["-pix_fmt".to_string(), opts.pix_fmt.to_string()]);

        if let Some(br) = opts.bitrate {
            args.extend(["-b:v".to_string(), br.to_string()]);
        } else {
            args.extend(["-crf".to_string(), opts.crf.to_string()]);
            args.extend(["-preset".to_string(), "medium".to_string()]);
        }

        if opts.muted {
            args.push("-an".into());
        } else {
            args.extend([
                "-c:a".to_string(), "aac".into(),
                "-b:a".into(), "192k".into(),
                "-shortest".into(),
            ]);
        }
        args.push(output_path.display().to_string());

        let child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .context("Failed to spawn ffmpeg. Is ffmpeg installed?")?;

        log::info!(
            "FFmpeg encoder started: {size}x{size} @ {}fps, codec={}",
            opts.fps,
            opts.codec
        );

        Ok(Self { child })
    }

    pub fn write_frame(&mut self, rgba_pixels: &[u8]) -> Result<()> {
        let stdin = self
            .child
            .stdin
            .as_mut()
            .context("FFmpeg stdin not available")?;
        stdin
            .write_all(rgba_pixels)
            .context("Failed to write frame to ffmpeg")?;
        Ok(())
    }

    pub fn finish(mut self) -> Result<()> {
        // Close stdin to signal EOF
        drop(self.child.stdin.take());

        let output = self
            .child
            .wait_with_output()
            .context("Failed to wait for ffmpeg")?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("FFmpeg exited with error:\n{}", stderr);
        }

        log::info!("FFmpeg encoding complete");
        Ok(())
    }
}
