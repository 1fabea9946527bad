//! Reference-line reconstruction and sampling.
//!
//! # Running pose
//!
//! Authored segments each carry their own start `s`, position and heading.
//! Those anchors are redundant with the end pose of the previous segment and
//! are frequently stale after hand editing, so only the first segment's
//! anchor is used.  Every later segment starts at the end pose computed from
//! its predecessor.  Anchors that drift by more than [`ANCHOR_TOLERANCE_M`]
//! (or [`ANCHOR_TOLERANCE_RAD`] in heading) are reported at debug level.

use od_core::normalize_angle;

use crate::segment::{Segment, SegmentKind};
use crate::{GeometryError, GeometryResult};

/// Positional drift between an authored anchor and the running pose that is
/// worth a debug log line.
pub const ANCHOR_TOLERANCE_M: f64 = 0.01;
/// Heading drift between an authored anchor and the running pose that is
/// worth a debug log line.
pub const ANCHOR_TOLERANCE_RAD: f64 = 1e-3;

/// Coarse sampling step used by [`ReferenceLine::project`].
const PROJECTION_STEP_M: f64 = 1.0;
/// Golden-section iterations refining a projection inside one coarse step.
const PROJECTION_REFINE_ITERS: usize = 40;

// ── Input ─────────────────────────────────────────────────────────────────────

/// A plan-view segment as authored in the document.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AuthoredSegment {
    pub s: f64,
    pub x: f64,
    pub y: f64,
    pub hdg: f64,
    pub length: f64,
    pub kind: SegmentKind,
}

impl AuthoredSegment {
    pub fn line(s: f64, x: f64, y: f64, hdg: f64, length: f64) -> Self {
        Self { s, x, y, hdg, length, kind: SegmentKind::Line }
    }

    pub fn arc(s: f64, x: f64, y: f64, hdg: f64, length: f64, curvature: f64) -> Self {
        Self { s, x, y, hdg, length, kind: SegmentKind::Arc { curvature } }
    }

    pub fn spiral(
        s: f64, x: f64, y: f64, hdg: f64, length: f64,
        curv_start: f64, curv_end: f64,
    ) -> Self {
        Self { s, x, y, hdg, length, kind: SegmentKind::Spiral { curv_start, curv_end } }
    }
}

// ── Output ────────────────────────────────────────────────────────────────────

/// Position, heading and curvature of the reference line at some `s`, in the
/// document frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pose {
    pub s: f64,
    pub x: f64,
    pub y: f64,
    /// Radians CCW from +x, normalized to `(-π, π]`.
    pub heading: f64,
    /// `None` on polynomial segments.
    pub curvature: Option<f64>,
}

impl Pose {
    /// Document-frame point at lateral offset `t` (positive = left).
    #[inline]
    pub fn offset(&self, t: f64) -> (f64, f64) {
        let (sin_h, cos_h) = self.heading.sin_cos();
        (self.x - t * sin_h, self.y + t * cos_h)
    }
}

/// Closest point on a reference line to a query point.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Projection {
    pub s: f64,
    /// Signed lateral offset of the query point (positive = left).
    pub t: f64,
    /// Planar distance between the query point and the reference line.
    pub distance: f64,
}

/// A continuous road reference line.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReferenceLine {
    segments: Vec<Segment>,
    length: f64,
}

impl ReferenceLine {
    /// Reconstruct from authored segments using the running-pose walk.
    ///
    /// Segments with non-positive length are skipped.  Returns
    /// [`GeometryError::EmptyPlanView`] when nothing with positive length
    /// remains.
    pub fn reconstruct(authored: &[AuthoredSegment]) -> GeometryResult<Self> {
        let mut segments: Vec<Segment> = Vec::with_capacity(authored.len());
        let mut pose: Option<(f64, f64, f64)> = None;
        let mut s = 0.0;

        for (index, a) in authored.iter().enumerate() {
            // Also rejects NaN lengths.
            if !(a.length > 0.0) {
                log::debug!("skipping {} segment {index} with length {}", a.kind.name(), a.length);
                continue;
            }

            let (x, y, heading) = match pose {
                None => {
                    if !(a.x.is_finite() && a.y.is_finite() && a.hdg.is_finite()) {
                        return Err(GeometryError::NonFinite { index });
                    }
                    (a.x, a.y, a.hdg)
                }
                Some((x, y, heading)) => {
                    let drift = (a.x - x).hypot(a.y - y);
                    let turn = normalize_angle(a.hdg - heading).abs();
                    if drift > ANCHOR_TOLERANCE_M || turn > ANCHOR_TOLERANCE_RAD {
                        log::debug!(
                            "segment {index}: authored anchor off by {drift:.4} m / {turn:.5} rad, using running pose"
                        );
                    }
                    (x, y, heading)
                }
            };
            if (a.s - s).abs() > ANCHOR_TOLERANCE_M {
                log::debug!("segment {index}: authored s {} recomputed as {s}", a.s);
            }

            let segment = Segment { s, x, y, heading, length: a.length, kind: a.kind };
            if !segment.kind_is_finite() {
                return Err(GeometryError::NonFinite { index });
            }

            let (ex, ey, eh, _) = segment.global_at(segment.length);
            pose = Some((ex, ey, eh));
            s += a.length;
            segments.push(segment);
        }

        if segments.is_empty() {
            return Err(GeometryError::EmptyPlanView);
        }
        Ok(Self { segments, length: s })
    }

    /// Total arc length.
    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The segment covering `s` (clamped into `[0, length]`).
    pub fn segment_at(&self, s: f64) -> &Segment {
        let s = s.clamp(0.0, self.length);
        let idx = self.segments.partition_point(|seg| seg.s <= s).saturating_sub(1);
        &self.segments[idx]
    }

    /// Sample the reference line.  `s` is clamped into `[0, length]`.
    pub fn pose_at(&self, s: f64) -> Pose {
        let s = s.clamp(0.0, self.length);
        let segment = self.segment_at(s);
        let (x, y, heading, curvature) = segment.global_at(s - segment.s);
        Pose { s, x, y, heading: normalize_angle(heading), curvature }
    }

    /// Pose at the very end of the line.
    pub fn end_pose(&self) -> Pose {
        self.pose_at(self.length)
    }

    /// Project a document-frame point onto the line.
    ///
    /// Coarse samples every metre pick a bracket, then a fixed number of
    /// golden-section steps refine `s` inside it.  The iteration counts are
    /// fixed, so the result is deterministic.
    pub fn project(&self, x: f64, y: f64) -> Projection {
        let dist2 = |s: f64| {
            let p = self.pose_at(s);
            let (dx, dy) = (x - p.x, y - p.y);
            dx * dx + dy * dy
        };

        let samples = ((self.length / PROJECTION_STEP_M).ceil() as usize).max(1);
        let step = self.length / samples as f64;
        let mut best_s = 0.0;
        let mut best_d = f64::INFINITY;
        for i in 0..=samples {
            let s = i as f64 * step;
            let d = dist2(s);
            if d < best_d {
                best_d = d;
                best_s = s;
            }
        }

        // Golden-section search inside the neighbouring coarse steps.
        const INV_PHI: f64 = 0.618_033_988_749_894_8;
        let mut lo = (best_s - step).max(0.0);
        let mut hi = (best_s + step).min(self.length);
        let mut c = hi - INV_PHI * (hi - lo);
        let mut d = lo + INV_PHI * (hi - lo);
        let (mut fc, mut fd) = (dist2(c), dist2(d));
        for _ in 0..PROJECTION_REFINE_ITERS {
            if fc < fd {
                hi = d;
                d = c;
                fd = fc;
                c = hi - INV_PHI * (hi - lo);
                fc = dist2(c);
            } else {
                lo = c;
                c = d;
                fc = fd;
                d = lo + INV_PHI * (hi - lo);
                fd = dist2(d);
            }
        }
        let refined = 0.5 * (lo + hi);
        let s = if dist2(refined) < best_d { refined } else { best_s };

        let pose = self.pose_at(s);
        let (dx, dy) = (x - pose.x, y - pose.y);
        let (sin_h, cos_h) = pose.heading.sin_cos();
        Projection {
            s,
            t: -dx * sin_h + dy * cos_h,
            distance: dx.hypot(dy),
        }
    }
}
