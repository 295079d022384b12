use crate::analyzer::FrequencySnapshot;
use crate::config::Geometry;

/// Baseline magnitude threshold at the symmetry axis.
const TICK_SENSITIVITY: f32 = 170.0;
/// Denominator factor for the threshold decay across the fold.
const FOLD_FALLOFF: f32 = 2.5;
/// Displacements of this many leading ticks feed the surface scale estimate.
pub const SCALE_SAMPLE_COUNT: usize = 5;
const SCALE_DIVISOR: f32 = 60.0;
/// Keeps the outer-point multiplier finite: delta may never reach the
/// resting tick base.
const DELTA_MARGIN: f32 = 1e-3;

/// One radial line segment, endpoints relative to the center.
#[derive(Debug, Clone, Copy)]
pub struct Tick {
    /// Position around the circle, degrees in [0, 360).
    pub angle: f32,
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

/// Everything one frame draws: the full tick ring plus the scale samples
/// taken from the bass-dominant region.
pub struct TickFrame {
    pub ticks: Vec<Tick>,
    pub scale_samples: [f32; SCALE_SAMPLE_COUNT],
}

/// Maps one frequency snapshot onto tick geometry. Holds only derived
/// constants; every frame's output is computed fresh.
pub struct TickEngine {
    geo: Geometry,
}

impl TickEngine {
    pub fn new(geo: Geometry) -> Self {
        Self { geo }
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geo
    }

    /// Fold a tick index onto the first semicircle, mirroring the ring
    /// left/right.
    fn fold(&self, i: usize) -> usize {
        if i < self.geo.tick_count / 2 {
            i
        } else {
            self.geo.tick_count - 1 - i
        }
    }

    pub fn compute(&self, snapshot: &FrequencySnapshot) -> TickFrame {
        let geo = &self.geo;
        let tick_remainder = geo.radius - geo.tick_size;
        let headroom = (tick_remainder - DELTA_MARGIN).max(0.0);
        let angle_step = 360.0 / geo.tick_count as f32;

        let mut ticks = Vec::with_capacity(geo.tick_count);
        let mut scale_samples = [1.0f32; SCALE_SAMPLE_COUNT];

        for i in 0..geo.tick_count {
            let angle = angle_step * i as f32;
            let radians = angle.to_radians();
            // y is inverted for screen coordinates
            let (dir_x, dir_y) = (radians.cos(), -radians.sin());

            let fold = self.fold(i);
            let coef =
                (1.0 - fold as f32 / (geo.tick_count as f32 * FOLD_FALLOFF)) * TICK_SENSITIVITY;
            let delta = ((snapshot.bin(fold) as f32 - coef) * geo.scale_coef)
                .max(0.0)
                .min(headroom);

            if i < SCALE_SAMPLE_COUNT {
                scale_samples[i] =
                    (delta / SCALE_DIVISOR / (geo.scale_coef / geo.delta_coef)).max(1.0);
            }

            let k = geo.radius / (tick_remainder - delta).max(DELTA_MARGIN);
            let x1 = dir_x * tick_remainder;
            let y1 = dir_y * tick_remainder;
            ticks.push(Tick {
                angle,
                x1,
                y1,
                x2: x1 * k,
                y2: y1 * k,
            });
        }

        TickFrame {
            ticks,
            scale_samples,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VisualizerConfig;

    fn engine() -> TickEngine {
        TickEngine::new(Geometry::derive(&VisualizerConfig::default()).unwrap())
    }

    fn flat_snapshot(value: u8) -> FrequencySnapshot {
        let source = crate::analyzer::StaticSource::new(vec![value; crate::analyzer::BIN_COUNT]);
        let (mut analyzer, mut reader) =
            crate::analyzer::FrequencyAnalyzer::attach(std::sync::Arc::new(source)).unwrap();
        analyzer.publish_once();
        reader.latest().clone()
    }

    #[test]
    fn angles_are_evenly_spaced_over_the_circle() {
        let frame = engine().compute(&FrequencySnapshot::silent());
        assert_eq!(frame.ticks.len(), 200);
        for (i, tick) in frame.ticks.iter().enumerate() {
            assert!((tick.angle - 1.8 * i as f32).abs() < 1e-4);
        }
        let last = frame.ticks.last().unwrap();
        assert!(last.angle < 360.0);
    }

    #[test]
    fn fold_is_symmetric() {
        let engine = engine();
        for i in 0..200 {
            assert_eq!(engine.fold(i), engine.fold(199 - i), "index {i}");
        }
    }

    #[test]
    fn silence_renders_resting_ticks_at_scale_one() {
        let frame = engine().compute(&FrequencySnapshot::silent());
        for tick in &frame.ticks {
            let outer = (tick.x2 * tick.x2 + tick.y2 * tick.y2).sqrt();
            assert!((outer - 202.0).abs() < 1e-3, "outer radius was {outer}");
        }
        assert!(frame.scale_samples.iter().all(|&s| s == 1.0));
    }

    #[test]
    fn displacement_is_never_negative() {
        // Magnitudes below the threshold must leave ticks at rest, not pull
        // them inward.
        let frame = engine().compute(&flat_snapshot(1));
        for tick in &frame.ticks {
            let inner = (tick.x1 * tick.x1 + tick.y1 * tick.y1).sqrt();
            let outer = (tick.x2 * tick.x2 + tick.y2 * tick.y2).sqrt();
            assert!(outer >= inner);
            assert!((outer - 202.0).abs() < 1e-3);
        }
    }

    #[test]
    fn golden_flat_200_snapshot() {
        // radius 202, tick_remainder 192, scale_coef 0.8: tick 0 sees
        // delta = (200 - 170) * 0.8 = 24, k = 202 / 168.
        let frame = engine().compute(&flat_snapshot(200));
        let tick = &frame.ticks[0];
        assert!((tick.x1 - 192.0).abs() < 1e-3);
        assert!(tick.y1.abs() < 1e-3);
        assert!((tick.x2 - 192.0 * 202.0 / 168.0).abs() < 1e-3);
        assert!(tick.y2.abs() < 1e-3);
        // Bass deltas stay under the 60-unit scale knee, so no pulse.
        assert!(frame.scale_samples.iter().all(|&s| s == 1.0));
    }

    #[test]
    fn extreme_magnitudes_stay_finite() {
        // A tall viewport shrinks scale_coef's denominator, pushing deltas
        // past the resting base; the clamp must keep k finite and positive.
        let cfg = VisualizerConfig {
            viewport_height: 56,
            ..VisualizerConfig::default()
        };
        let engine = TickEngine::new(Geometry::derive(&cfg).unwrap());
        let frame = engine.compute(&flat_snapshot(255));
        for tick in &frame.ticks {
            assert!(tick.x2.is_finite() && tick.y2.is_finite());
            let inner = (tick.x1 * tick.x1 + tick.y1 * tick.y1).sqrt();
            let outer = (tick.x2 * tick.x2 + tick.y2 * tick.y2).sqrt();
            assert!(outer >= inner, "clamped ticks must still point outward");
        }
        assert!(frame.scale_samples.iter().all(|&s| s >= 1.0));
    }
}
