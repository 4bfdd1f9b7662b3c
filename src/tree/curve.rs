//! Piecewise time curves with named easings

use serde::{Deserialize, Serialize};

use crate::random::RandomSource;

/// Easing applied within one curve segment
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    #[default]
    Linear,
    /// Slow start: `t²`
    Quadratic,
    /// Fast start: `1 - (1 - t)²`
    InvertedQuadratic,
}

impl Easing {
    pub const ALL: [Easing; 3] = [Easing::InvertedQuadratic, Easing::Linear, Easing::Quadratic];

    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::Quadratic => t * t,
            Easing::InvertedQuadratic => 1.0 - (1.0 - t) * (1.0 - t),
        }
    }
}

/// One segment covering `[start, end]` of the curve's [0, 1] domain
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurveSegment {
    pub start: f64,
    pub end: f64,
    pub from: f64,
    pub to: f64,
    pub easing: Easing,
}

impl CurveSegment {
    pub fn value_at(&self, t: f64) -> f64 {
        let span = self.end - self.start;
        let local = if span <= 0.0 { 1.0 } else { (t - self.start) / span };
        self.from + (self.to - self.from) * self.easing.apply(local)
    }
}

/// Value over normalized parametric length, made of eased segments
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PiecewiseCurve {
    segments: Vec<CurveSegment>,
}

impl PiecewiseCurve {
    /// Segments should be sorted and contiguous; gaps hold the previous end value
    pub fn new(segments: Vec<CurveSegment>) -> Self {
        Self { segments }
    }

    /// A single-segment curve
    pub fn constant(value: f64) -> Self {
        Self::new(vec![CurveSegment { start: 0.0, end: 1.0, from: value, to: value, easing: Easing::Linear }])
    }

    /// `count` equal segments, each ending at a random value in `[min, max]`.
    ///
    /// Segments are continuous: each starts where the previous ended, the
    /// first at `initial`. Easings cycle through [`Easing::ALL`].
    pub fn random(rng: &mut RandomSource, count: usize, initial: f64, min: f64, max: f64) -> Self {
        let count = count.max(1);
        let mut from = initial;
        let segments = (0..count)
            .map(|i| {
                let to = rng.range_f64(min, max);
                let segment = CurveSegment {
                    start: i as f64 / count as f64,
                    end: (i + 1) as f64 / count as f64,
                    from,
                    to,
                    easing: Easing::ALL[i % Easing::ALL.len()],
                };
                from = to;
                segment
            })
            .collect();
        Self::new(segments)
    }

    pub fn segments(&self) -> &[CurveSegment] {
        &self.segments
    }

    /// Evaluate at `t`; outside the covered range the nearest end value holds
    pub fn eval(&self, t: f64) -> f64 {
        let Some(first) = self.segments.first() else {
            return 0.0;
        };
        if t <= first.start {
            return first.from;
        }
        let mut held = first.from;
        for segment in &self.segments {
            if t < segment.start {
                return held;
            }
            if t <= segment.end {
                return segment.value_at(t);
            }
            held = segment.to;
        }
        held
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_easings_hit_endpoints() {
        for easing in Easing::ALL {
            assert_eq!(easing.apply(0.0), 0.0);
            assert_eq!(easing.apply(1.0), 1.0);
        }
        assert!(Easing::Quadratic.apply(0.5) < 0.5);
        assert!(Easing::InvertedQuadratic.apply(0.5) > 0.5);
    }

    #[test]
    fn test_piecewise_eval() {
        let curve = PiecewiseCurve::new(vec![
            CurveSegment { start: 0.0, end: 0.5, from: 2.0, to: 1.0, easing: Easing::Linear },
            CurveSegment { start: 0.5, end: 1.0, from: 1.0, to: 0.0, easing: Easing::Quadratic },
        ]);
        assert_eq!(curve.eval(0.0), 2.0);
        assert!((curve.eval(0.25) - 1.5).abs() < 1e-12);
        assert!((curve.eval(0.75) - 0.75).abs() < 1e-12);
        assert_eq!(curve.eval(1.0), 0.0);
        assert_eq!(curve.eval(2.0), 0.0);
        assert_eq!(curve.eval(-1.0), 2.0);
    }

    #[test]
    fn test_random_curve_is_continuous() {
        let mut rng = RandomSource::new(11);
        let curve = PiecewiseCurve::random(&mut rng, 5, 1.0, 0.5, 2.0);
        assert_eq!(curve.segments().len(), 5);
        assert_eq!(curve.eval(0.0), 1.0);
        for pair in curve.segments().windows(2) {
            assert_eq!(pair[0].to, pair[1].from);
            assert_eq!(pair[0].end, pair[1].start);
        }
        for i in 0..=100 {
            let v = curve.eval(i as f64 / 100.0);
            assert!((0.5..=2.0).contains(&v) || (v - 1.0).abs() < 1e-12);
        }
    }
}
