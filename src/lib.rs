//! ringwave: an audio-reactive circular waveform renderer.
//!
//! The engine core is platform-independent: [`analyzer::AudioSource`] and
//! [`render::surface::DrawSurface`] are the only seams to the host. The
//! shipped binary binds them to decoded audio files and an ffmpeg-encoded
//! video.

pub mod analyzer;
pub mod audio;
pub mod cli;
pub mod config;
pub mod encode;
pub mod error;
pub mod player;
pub mod render;
