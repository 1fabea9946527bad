//! Plan-view segment types and their local-frame evaluation.
//!
//! Every segment is evaluated in its own local frame: origin at the segment
//! start, `u` along the start heading, `v` to the left.  The reference line
//! rotates and translates the local result into the document frame.
//!
//! Curvature sign convention: positive curvature turns left (CCW).

/// Number of Simpson intervals used to integrate spiral positions.
///
/// Fixed so reconstruction is reproducible bit-for-bit across runs and
/// platforms.  Must be even.
pub const SPIRAL_INTEGRATION_STEPS: usize = 64;

/// Curvatures below this magnitude are evaluated as straight lines.
const STRAIGHT_CURVATURE: f64 = 1e-12;

/// Parameter domain of a parametric cubic.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParamRange {
    /// `p ∈ [0, 1]` over the segment length.
    #[default]
    Normalized,
    /// `p ∈ [0, length]`.
    ArcLength,
}

/// Shape of a plan-view segment.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SegmentKind {
    Line,
    Arc { curvature: f64 },
    Spiral { curv_start: f64, curv_end: f64 },
    Poly3 { a: f64, b: f64, c: f64, d: f64 },
    ParamPoly3 {
        au: f64, bu: f64, cu: f64, du: f64,
        av: f64, bv: f64, cv: f64, dv: f64,
        range: ParamRange,
    },
}

impl SegmentKind {
    /// `true` for segment kinds whose curvature is defined by a curvature
    /// parameter (line, arc, spiral).  Polynomial segments report no
    /// curvature.
    pub fn has_curvature(&self) -> bool {
        matches!(self, SegmentKind::Line | SegmentKind::Arc { .. } | SegmentKind::Spiral { .. })
    }

    pub fn name(&self) -> &'static str {
        match self {
            SegmentKind::Line           => "line",
            SegmentKind::Arc { .. }     => "arc",
            SegmentKind::Spiral { .. }  => "spiral",
            SegmentKind::Poly3 { .. }   => "poly3",
            SegmentKind::ParamPoly3 { .. } => "paramPoly3",
        }
    }

    fn is_finite(&self) -> bool {
        match *self {
            SegmentKind::Line => true,
            SegmentKind::Arc { curvature } => curvature.is_finite(),
            SegmentKind::Spiral { curv_start, curv_end } => {
                curv_start.is_finite() && curv_end.is_finite()
            }
            SegmentKind::Poly3 { a, b, c, d } => [a, b, c, d].iter().all(|v| v.is_finite()),
            SegmentKind::ParamPoly3 { au, bu, cu, du, av, bv, cv, dv, .. } => {
                [au, bu, cu, du, av, bv, cv, dv].iter().all(|v| v.is_finite())
            }
        }
    }
}

/// Result of evaluating a segment at a local distance `ds`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LocalPose {
    pub u: f64,
    pub v: f64,
    /// Heading relative to the segment start heading.
    pub heading: f64,
    pub curvature: Option<f64>,
}

/// A reconstructed segment: shape plus the start pose computed by the
/// running-pose walk (not the authored anchor).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Segment {
    /// Start `s` along the reference line.
    pub s: f64,
    pub x: f64,
    pub y: f64,
    pub heading: f64,
    pub length: f64,
    pub kind: SegmentKind,
}

impl Segment {
    pub(crate) fn kind_is_finite(&self) -> bool {
        self.kind.is_finite() && self.length.is_finite()
    }

    /// Evaluate in the segment's local frame.  `ds` is clamped to
    /// `[0, length]`.
    pub fn local_at(&self, ds: f64) -> LocalPose {
        let ds = ds.clamp(0.0, self.length);
        match self.kind {
            SegmentKind::Line => line(ds),
            SegmentKind::Arc { curvature } => arc(curvature, ds),
            SegmentKind::Spiral { curv_start, curv_end } => {
                spiral(curv_start, curv_end, self.length, ds)
            }
            SegmentKind::Poly3 { a, b, c, d } => {
                let u = ds;
                let v = a + u * (b + u * (c + u * d));
                let dv = b + u * (2.0 * c + u * 3.0 * d);
                LocalPose { u, v, heading: dv.atan(), curvature: None }
            }
            SegmentKind::ParamPoly3 { au, bu, cu, du, av, bv, cv, dv, range } => {
                let p = match range {
                    ParamRange::Normalized if self.length > 0.0 => ds / self.length,
                    ParamRange::Normalized => 0.0,
                    ParamRange::ArcLength => ds,
                };
                let u = au + p * (bu + p * (cu + p * du));
                let v = av + p * (bv + p * (cv + p * dv));
                let du_dp = bu + p * (2.0 * cu + p * 3.0 * du);
                let dv_dp = bv + p * (2.0 * cv + p * 3.0 * dv);
                LocalPose { u, v, heading: dv_dp.atan2(du_dp), curvature: None }
            }
        }
    }

    /// Evaluate in the document frame: `(x, y, heading, curvature)`.
    pub fn global_at(&self, ds: f64) -> (f64, f64, f64, Option<f64>) {
        let local = self.local_at(ds);
        let (sin_h, cos_h) = self.heading.sin_cos();
        let x = self.x + local.u * cos_h - local.v * sin_h;
        let y = self.y + local.u * sin_h + local.v * cos_h;
        (x, y, self.heading + local.heading, local.curvature)
    }

    pub fn end_s(&self) -> f64 {
        self.s + self.length
    }
}

// ── Closed-form and integrated shapes ─────────────────────────────────────────

fn line(ds: f64) -> LocalPose {
    LocalPose { u: ds, v: 0.0, heading: 0.0, curvature: Some(0.0) }
}

fn arc(curvature: f64, ds: f64) -> LocalPose {
    if curvature.abs() < STRAIGHT_CURVATURE {
        return line(ds);
    }
    let theta = curvature * ds;
    let r = 1.0 / curvature;
    LocalPose {
        u: r * theta.sin(),
        v: r * (1.0 - theta.cos()),
        heading: theta,
        curvature: Some(curvature),
    }
}

/// Clothoid with curvature linear in arc length.  Heading is the exact
/// integral of curvature; position is integrated with composite Simpson.
fn spiral(k0: f64, k1: f64, length: f64, ds: f64) -> LocalPose {
    let rate = if length > 0.0 { (k1 - k0) / length } else { 0.0 };
    let heading = |t: f64| k0 * t + 0.5 * rate * t * t;

    let n = SPIRAL_INTEGRATION_STEPS;
    let h = ds / n as f64;
    let (mut u, mut v) = (0.0, 0.0);
    for i in 0..=n {
        let weight = if i == 0 || i == n {
            1.0
        } else if i % 2 == 1 {
            4.0
        } else {
            2.0
        };
        let (sin_t, cos_t) = heading(i as f64 * h).sin_cos();
        u += weight * cos_t;
        v += weight * sin_t;
    }
    u *= h / 3.0;
    v *= h / 3.0;

    LocalPose { u, v, heading: heading(ds), curvature: Some(k0 + rate * ds) }
}
