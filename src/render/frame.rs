use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::analyzer::SnapshotReader;
use crate::config::Geometry;

use super::geometry::TickEngine;
use super::scale;
use super::surface::DrawSurface;

/// Cancellation token for a running render loop. Stopping is idempotent and
/// terminal; a stopped loop never draws again.
#[derive(Clone)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Drives the animation: per frame it clears the surface, reads the latest
/// snapshot, strokes the tick ring, and applies the estimated pulse scale.
/// The loop never pauses itself on audio state; silence draws resting ticks.
pub struct RenderLoop<D: DrawSurface> {
    engine: TickEngine,
    surface: D,
    reader: SnapshotReader,
    cancelled: Arc<AtomicBool>,
}

impl<D: DrawSurface> RenderLoop<D> {
    pub fn new(geometry: Geometry, surface: D, reader: SnapshotReader) -> Self {
        Self {
            engine: TickEngine::new(geometry),
            surface,
            reader,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle(Arc::clone(&self.cancelled))
    }

    pub fn surface(&self) -> &D {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut D {
        &mut self.surface
    }

    /// Draw one frame. Returns `Ok(false)` without touching the surface once
    /// the loop has been stopped.
    pub fn render_frame(&mut self) -> Result<bool> {
        if self.cancelled.load(Ordering::Relaxed) {
            return Ok(false);
        }

        self.surface.clear()?;

        let frame = self.engine.compute(self.reader.latest());
        let center = self.engine.geometry().center;
        for tick in &frame.ticks {
            self.surface.stroke_line(
                center + tick.x1,
                center + tick.y1,
                center + tick.x2,
                center + tick.y2,
            )?;
        }

        self.surface.set_scale(scale::estimate(&frame.scale_samples))?;
        Ok(true)
    }

    /// Continuous loop paced at `fps` until the stop handle fires. A failed
    /// frame is logged and skipped; the loop keeps rescheduling.
    pub fn run(&mut self, fps: u32) {
        let frame_budget = Duration::from_secs_f64(1.0 / fps.max(1) as f64);
        loop {
            let started = Instant::now();
            match self.render_frame() {
                Ok(true) => {}
                Ok(false) => break,
                Err(err) => log::warn!("frame skipped: {err:#}"),
            }
            if let Some(remaining) = frame_budget.checked_sub(started.elapsed()) {
                std::thread::sleep(remaining);
            }
        }
    }
}
