//! Host-side audio: decoding playable files into PCM for [`crate::analyzer::TrackSource`].

pub mod decode;
