//! 3D tunnel centreline built from horizontal radius and vertical grade.
//!
//! # Construction
//!
//! N control points are placed at uniformly spaced chainages z, centred on
//! the origin:
//!
//! ```text
//! z = (i / (N-1)) * L - L/2
//! x = z² / (2R)          small-angle arc offset, 0 when straight
//! y = z * grade / 100
//! ```
//!
//! A uniform Catmull-Rom spline (C¹) runs through the control points. The
//! spline reproduces linear data exactly, so with evenly spaced z the
//! z-component of the derivative is constant and positive: the tangent can
//! never vanish.
//!
//! ```
//! use tunnelviz_logic::alignment::AlignmentCurve;
//!
//! let curve = AlignmentCurve::new(500.0, 2.0);
//! let start = curve.point_at(0.0);
//! assert!((start - curve.samples()[0]).length() < 1e-4);
//! ```

use glam::{Mat3, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::constants::{ALIGNMENT_SAMPLES, MIN_HORIZONTAL_RADIUS, STRAIGHT_RADIUS, TUNNEL_LENGTH};

/// Generation parameters for an [`AlignmentCurve`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignmentParams {
    pub horizontal_radius: f32,
    pub vertical_grade: f32,
    pub length: f32,
    pub samples: usize,
    pub straight_radius: f32,
    pub min_radius: f32,
}

impl AlignmentParams {
    pub fn new(horizontal_radius: f32, vertical_grade: f32) -> Self {
        Self {
            horizontal_radius,
            vertical_grade,
            length: TUNNEL_LENGTH,
            samples: ALIGNMENT_SAMPLES,
            straight_radius: STRAIGHT_RADIUS,
            min_radius: MIN_HORIZONTAL_RADIUS,
        }
    }
}

/// How cross-section frames are oriented along the curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FrameMode {
    /// Build each frame against a fixed world-up vector.
    #[default]
    FixedUp,
    /// Carry the start frame along the curve by minimal rotation.
    ParallelTransport,
}

/// Orthonormal frame at one point of the alignment.
///
/// `(lateral, up, tangent)` is right-handed. Angles around the section are
/// measured from `lateral` toward `up`, so 90° is the crown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocalFrame {
    pub origin: Vec3,
    pub tangent: Vec3,
    pub lateral: Vec3,
    pub up: Vec3,
}

impl LocalFrame {
    /// Unit direction in the section plane at `angle_deg`.
    pub fn radial(&self, angle_deg: f32) -> Vec3 {
        let a = angle_deg.to_radians();
        self.lateral * a.cos() + self.up * a.sin()
    }

    /// Rotation taking local +Z to the tangent and local +Y to `up`.
    pub fn orientation(&self) -> Quat {
        Quat::from_mat3(&Mat3::from_cols(self.lateral, self.up, self.tangent))
    }
}

/// Subdivisions per unit parameter when transporting a frame.
const TRANSPORT_STEPS: f32 = 64.0;

/// A sampled, interpolated tunnel centreline, parameterised over t ∈ [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentCurve {
    params: AlignmentParams,
    points: Vec<Vec3>,
}

impl AlignmentCurve {
    /// Curve with the default generation length and sample count.
    pub fn new(horizontal_radius: f32, vertical_grade: f32) -> Self {
        Self::from_params(AlignmentParams::new(horizontal_radius, vertical_grade))
    }

    pub fn from_params(params: AlignmentParams) -> Self {
        let n = params.samples.max(2);
        let half = params.length / 2.0;
        let grade = if params.vertical_grade.is_finite() {
            params.vertical_grade / 100.0
        } else {
            0.0
        };
        let radius = effective_radius(&params);

        let points = (0..n)
            .map(|i| {
                let z = (i as f32 / (n - 1) as f32) * params.length - half;
                let x = match radius {
                    Some(r) => z * z / (2.0 * r),
                    None => 0.0,
                };
                Vec3::new(x, z * grade, z)
            })
            .collect();

        Self { params, points }
    }

    pub fn params(&self) -> &AlignmentParams {
        &self.params
    }

    /// The generated control points, first to last.
    pub fn samples(&self) -> &[Vec3] {
        &self.points
    }

    /// Position at `t`. Values outside [0, 1] are clamped.
    pub fn point_at(&self, t: f32) -> Vec3 {
        let (p0, p1, p2, p3, u) = self.span(t);
        let u2 = u * u;
        let u3 = u2 * u;
        0.5 * (2.0 * p1
            + (p2 - p0) * u
            + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * u2
            + (3.0 * p1 - p0 - 3.0 * p2 + p3) * u3)
    }

    /// Unit tangent at `t`. Values outside [0, 1] are clamped.
    pub fn tangent_at(&self, t: f32) -> Vec3 {
        let (p0, p1, p2, p3, u) = self.span(t);
        let d = 0.5
            * ((p2 - p0)
                + 2.0 * (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * u
                + 3.0 * (3.0 * p1 - p0 - 3.0 * p2 + p3) * u * u);
        d.try_normalize().unwrap_or(Vec3::Z)
    }

    /// Local frame at `t`.
    pub fn frame_at(&self, t: f32, mode: FrameMode) -> LocalFrame {
        let t = clamp_param(t);
        match mode {
            FrameMode::FixedUp => fixed_up_frame(self.point_at(t), self.tangent_at(t)),
            FrameMode::ParallelTransport => {
                let steps = (t * TRANSPORT_STEPS).ceil().max(1.0) as usize;
                let mut frame = fixed_up_frame(self.point_at(0.0), self.tangent_at(0.0));
                for step in 1..=steps {
                    let s = t * step as f32 / steps as f32;
                    let tangent = self.tangent_at(s);
                    let rot = Quat::from_rotation_arc(frame.tangent, tangent);
                    frame = LocalFrame {
                        origin: self.point_at(s),
                        tangent,
                        lateral: (rot * frame.lateral).normalize(),
                        up: (rot * frame.up).normalize(),
                    };
                }
                frame
            }
        }
    }

    /// Approximate arc length, from a dense polyline.
    pub fn length(&self) -> f32 {
        let steps = (self.points.len() - 1) * 10;
        let mut prev = self.point_at(0.0);
        let mut total = 0.0;
        for i in 1..=steps {
            let p = self.point_at(i as f32 / steps as f32);
            total += prev.distance(p);
            prev = p;
        }
        total
    }

    /// Four control points around the span containing `t`, plus the local
    /// parameter. Ghost points past the ends are linear extrapolations.
    fn span(&self, t: f32) -> (Vec3, Vec3, Vec3, Vec3, f32) {
        let n = self.points.len();
        let scaled = clamp_param(t) * (n - 1) as f32;
        let i = (scaled.floor() as usize).min(n - 2);
        let u = scaled - i as f32;

        let p1 = self.points[i];
        let p2 = self.points[i + 1];
        let p0 = if i == 0 { 2.0 * p1 - p2 } else { self.points[i - 1] };
        let p3 = if i + 2 < n {
            self.points[i + 2]
        } else {
            2.0 * p2 - p1
        };
        (p0, p1, p2, p3, u)
    }
}

/// Horizontal radius to use, or `None` for a straight alignment.
fn effective_radius(params: &AlignmentParams) -> Option<f32> {
    let r = params.horizontal_radius;
    if r.is_nan() {
        log::warn!("horizontal radius is NaN, treating alignment as straight");
        return None;
    }
    if r >= params.straight_radius {
        return None;
    }
    if r < params.min_radius {
        log::warn!(
            "horizontal radius {} clamped to floor {}",
            r,
            params.min_radius
        );
        return Some(params.min_radius);
    }
    Some(r)
}

fn clamp_param(t: f32) -> f32 {
    if t.is_nan() {
        0.0
    } else {
        t.clamp(0.0, 1.0)
    }
}

fn fixed_up_frame(origin: Vec3, tangent: Vec3) -> LocalFrame {
    let lateral = Vec3::Y
        .cross(tangent)
        .try_normalize()
        .unwrap_or(Vec3::X);
    let up = tangent.cross(lateral).normalize();
    LocalFrame {
        origin,
        tangent,
        lateral,
        up,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Vec<f32> {
        (0..=200).map(|i| i as f32 / 200.0).collect()
    }

    #[test]
    fn straight_curve_is_on_axis() {
        let curve = AlignmentCurve::new(STRAIGHT_RADIUS, 0.0);
        for p in curve.samples() {
            assert!(p.x.abs() < 1e-6 && p.y.abs() < 1e-6);
        }
        assert!((curve.length() - TUNNEL_LENGTH).abs() < 1e-3);
    }

    #[test]
    fn sample_layout() {
        let curve = AlignmentCurve::new(200.0, 3.0);
        let pts = curve.samples();
        assert_eq!(pts.len(), ALIGNMENT_SAMPLES);
        assert!((pts[0].z + 20.0).abs() < 1e-5);
        assert!((pts[20].z - 20.0).abs() < 1e-5);
        // x = 400 / 400 = 1 at both ends
        assert!((pts[0].x - 1.0).abs() < 1e-5);
        assert!((pts[10].x).abs() < 1e-6);
        assert!((pts[20].y - 0.6).abs() < 1e-5);
    }

    #[test]
    fn endpoint_fidelity() {
        for (r, g) in [(50.0, -5.0), (300.0, 0.0), (1_000.0, 5.0), (f32::INFINITY, 2.0)] {
            let curve = AlignmentCurve::new(r, g);
            let first = curve.samples()[0];
            let last = *curve.samples().last().unwrap();
            assert!((curve.point_at(0.0) - first).length() < 1e-4);
            assert!((curve.point_at(1.0) - last).length() < 1e-4);
        }
    }

    #[test]
    fn passes_through_every_sample() {
        let curve = AlignmentCurve::new(120.0, 4.0);
        let n = curve.samples().len();
        for (i, p) in curve.samples().iter().enumerate() {
            let t = i as f32 / (n - 1) as f32;
            assert!((curve.point_at(t) - *p).length() < 1e-3, "sample {i}");
        }
    }

    #[test]
    fn tangent_never_zero() {
        for (r, g) in [(50.0, -5.0), (75.0, 5.0), (500.0, 0.0), (STRAIGHT_RADIUS, -3.0)] {
            let curve = AlignmentCurve::new(r, g);
            for t in grid() {
                let tan = curve.tangent_at(t);
                assert!((tan.length() - 1.0).abs() < 1e-4, "r={r} g={g} t={t}");
                assert!(tan.z > 0.0);
            }
        }
    }

    #[test]
    fn point_is_continuous() {
        let curve = AlignmentCurve::new(60.0, 5.0);
        let mut prev = curve.point_at(0.0);
        for t in grid().into_iter().skip(1) {
            let p = curve.point_at(t);
            assert!(prev.distance(p) < 0.5, "jump at t={t}");
            prev = p;
        }
    }

    #[test]
    fn radius_below_floor_is_clamped() {
        let tight = AlignmentCurve::new(1.0, 0.0);
        let floor = AlignmentCurve::new(MIN_HORIZONTAL_RADIUS, 0.0);
        assert_eq!(tight.samples(), floor.samples());
        let zero = AlignmentCurve::new(0.0, 0.0);
        assert!(zero.samples().iter().all(|p| p.is_finite()));
    }

    #[test]
    fn out_of_range_parameter_is_clamped() {
        let curve = AlignmentCurve::new(300.0, 1.0);
        assert_eq!(curve.point_at(-1.0), curve.point_at(0.0));
        assert_eq!(curve.point_at(2.0), curve.point_at(1.0));
        assert_eq!(curve.point_at(f32::NAN), curve.point_at(0.0));
    }

    #[test]
    fn fixed_up_frame_is_orthonormal() {
        let curve = AlignmentCurve::new(80.0, -4.0);
        for t in grid() {
            let f = curve.frame_at(t, FrameMode::FixedUp);
            assert!(f.lateral.dot(f.tangent).abs() < 1e-4);
            assert!(f.up.dot(f.tangent).abs() < 1e-4);
            assert!(f.up.dot(f.lateral).abs() < 1e-4);
            assert!(f.lateral.cross(f.up).distance(f.tangent) < 1e-4);
            assert!(f.up.y > 0.0, "crown must point upward");
        }
    }

    #[test]
    fn straight_frame_points_up() {
        let curve = AlignmentCurve::new(STRAIGHT_RADIUS, 0.0);
        let f = curve.frame_at(0.5, FrameMode::FixedUp);
        assert!(f.up.distance(Vec3::Y) < 1e-5);
        assert!(f.radial(90.0).distance(Vec3::Y) < 1e-5);
        let rotated = f.orientation() * Vec3::Z;
        assert!(rotated.distance(f.tangent) < 1e-5);
    }

    #[test]
    fn parallel_transport_stays_close_to_fixed_up() {
        let curve = AlignmentCurve::new(200.0, 2.0);
        for t in [0.0, 0.25, 0.5, 1.0] {
            let a = curve.frame_at(t, FrameMode::FixedUp);
            let b = curve.frame_at(t, FrameMode::ParallelTransport);
            assert!(b.tangent.distance(a.tangent) < 1e-5);
            assert!(b.up.dot(b.tangent).abs() < 1e-3);
            assert!(b.up.dot(a.up) > 0.99, "t={t}");
        }
    }

    #[test]
    fn idempotent() {
        let a = AlignmentCurve::new(150.0, 1.5);
        let b = AlignmentCurve::new(150.0, 1.5);
        assert_eq!(a, b);
        assert_eq!(a.point_at(0.37), b.point_at(0.37));
    }
}
