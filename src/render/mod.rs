//! Frame-rate side of the engine: tick geometry, pulse scale estimation,
//! drawing surfaces, and the render loop that orchestrates them.

pub mod frame;
pub mod geometry;
pub mod scale;
pub mod surface;
