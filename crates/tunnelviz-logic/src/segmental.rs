//! Segmental lining layout for TBM tunnels.
//!
//! # Layout
//!
//! Rings of width `ring_width` are spread over the modelled tunnel length,
//! each one attached to the alignment at t = i / (ring_count - 1).
//!
//! Each ring is split into `segment_count` regular segments plus one key
//! segment:
//!
//! ```text
//! key + segment_count × regular = 360°
//! ```
//!
//! A small gap is trimmed from every segment's span. Odd rings start half a
//! regular segment later than even rings, so longitudinal joints never line
//! up between neighbours (running bond).
//!
//! Every segment carries a stable label, `R{ring}-S{segment}` or `R{ring}-K`,
//! that front ends can use for picking and inspection.

use std::fmt;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::alignment::{AlignmentCurve, FrameMode};
use crate::constants::{controls, EngineConstants, MAX_LAYOUT_ELEMENTS};
use crate::design::TunnelDesign;
use crate::error::DesignError;

/// Angular split of one ring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RingPartition {
    pub segment_count: u32,
    pub regular_angle_deg: f32,
    pub key_angle_deg: f32,
}

impl RingPartition {
    /// Sum of all nominal spans; equals 360 up to rounding.
    pub fn total_deg(&self) -> f32 {
        self.key_angle_deg + self.segment_count as f32 * self.regular_angle_deg
    }

    /// Start-angle offset for a ring: 0 for even rings, half a regular
    /// segment for odd ones.
    pub fn stagger_deg(&self, ring: u32) -> f32 {
        if ring % 2 == 0 {
            0.0
        } else {
            self.regular_angle_deg / 2.0
        }
    }
}

/// Split a ring into regular and key segments.
pub fn ring_partition(segment_count: u32, key_angle_deg: f32) -> Result<RingPartition, DesignError> {
    if !(controls::SEGMENT_COUNT_MIN..=controls::SEGMENT_COUNT_MAX).contains(&segment_count) {
        return Err(DesignError::SegmentCountOutOfRange {
            count: segment_count,
            min: controls::SEGMENT_COUNT_MIN,
            max: controls::SEGMENT_COUNT_MAX,
        });
    }
    if !(key_angle_deg > 0.0 && key_angle_deg < 360.0) {
        return Err(DesignError::InvalidConstant {
            name: "key_segment_angle_deg",
            value: key_angle_deg,
        });
    }
    Ok(RingPartition {
        segment_count,
        regular_angle_deg: (360.0 - key_angle_deg) / segment_count as f32,
        key_angle_deg,
    })
}

/// Which piece of a ring a segment is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SegmentKind {
    Regular(u32),
    Key,
}

/// Stable address of a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SegmentId {
    pub ring: u32,
    pub kind: SegmentKind,
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            SegmentKind::Regular(s) => write!(f, "R{}-S{}", self.ring, s),
            SegmentKind::Key => write!(f, "R{}-K", self.ring),
        }
    }
}

/// One precast segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiningSegment {
    pub id: SegmentId,
    pub label: String,
    /// Start angle after the gap trim (degrees, from the lateral axis).
    pub start_angle_deg: f32,
    /// Span before the gap trim.
    pub nominal_span_deg: f32,
    /// Span after the gap trim.
    pub span_deg: f32,
    /// World position of the segment's mid-thickness centroid.
    pub centroid: Vec3,
    /// Concrete volume (m³).
    pub volume: f32,
}

impl LiningSegment {
    pub fn is_key(&self) -> bool {
        self.id.kind == SegmentKind::Key
    }

    pub fn mid_angle_deg(&self) -> f32 {
        self.start_angle_deg + self.span_deg / 2.0
    }
}

/// One lining ring at a point of the alignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiningRing {
    pub index: u32,
    /// Curve parameter the ring is attached to.
    pub t: f32,
    pub position: Vec3,
    pub orientation: Quat,
    pub stagger_deg: f32,
    pub segments: Vec<LiningSegment>,
}

/// All rings of a TBM drive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentalLayout {
    pub partition: RingPartition,
    pub gap_deg: f32,
    pub ring_width: f32,
    pub outer_radius: f32,
    pub inner_radius: f32,
    pub rings: Vec<LiningRing>,
}

impl SegmentalLayout {
    pub fn ring_count(&self) -> usize {
        self.rings.len()
    }

    pub fn segment_count(&self) -> usize {
        self.rings.iter().map(|r| r.segments.len()).sum()
    }

    /// Look up a segment by its label.
    pub fn find_segment(&self, label: &str) -> Option<&LiningSegment> {
        self.rings
            .iter()
            .flat_map(|r| r.segments.iter())
            .find(|s| s.label == label)
    }

    pub fn segment(&self, id: SegmentId) -> Option<&LiningSegment> {
        self.rings
            .get(id.ring as usize)
            .and_then(|r| r.segments.iter().find(|s| s.id == id))
    }
}

/// Number of rings needed to cover `length`.
pub fn ring_count(length: f32, ring_width: f32) -> Result<u32, DesignError> {
    if !(ring_width > 0.0) {
        return Err(DesignError::NonPositiveRingWidth(ring_width));
    }
    let count = (length / ring_width).ceil().max(1.0);
    if !(count <= MAX_LAYOUT_ELEMENTS as f32) {
        return Err(DesignError::TooManyElements {
            what: "ring",
            count,
            max: MAX_LAYOUT_ELEMENTS,
        });
    }
    Ok(count as u32)
}

/// Lay out the segmental lining of a TBM design along `curve`.
pub fn segmental_layout(
    design: &TunnelDesign,
    curve: &AlignmentCurve,
    constants: &EngineConstants,
    frame_mode: FrameMode,
) -> Result<SegmentalLayout, DesignError> {
    let partition = ring_partition(design.segment_count, constants.key_segment_angle_deg)?;
    let gap = constants.segment_gap_deg;
    let smallest = partition.regular_angle_deg.min(partition.key_angle_deg);
    if !(gap >= 0.0 && gap < smallest) {
        return Err(DesignError::InvalidConstant {
            name: "segment_gap_deg",
            value: gap,
        });
    }
    let count = ring_count(constants.tunnel_length, design.ring_width)?;

    let outer_radius = design.outer_radius();
    let inner_radius = outer_radius - design.wall_thickness;
    if !(inner_radius > 0.0) {
        return Err(DesignError::WallTooThick {
            thickness: design.wall_thickness,
            half_width: outer_radius,
        });
    }
    let mid_radius = (outer_radius + inner_radius) / 2.0;
    let annulus = outer_radius * outer_radius - inner_radius * inner_radius;

    log::debug!(
        "segmental layout: {} rings, {} + key segments, regular {:.3}°",
        count,
        partition.segment_count,
        partition.regular_angle_deg
    );

    let rings = (0..count)
        .map(|index| {
            let t = if count > 1 {
                index as f32 / (count - 1) as f32
            } else {
                0.0
            };
            let frame = curve.frame_at(t, frame_mode);
            let stagger = partition.stagger_deg(index);

            let pieces = (0..partition.segment_count)
                .map(|s| {
                    (
                        SegmentKind::Regular(s),
                        stagger + s as f32 * partition.regular_angle_deg,
                        partition.regular_angle_deg,
                    )
                })
                .chain(std::iter::once((
                    SegmentKind::Key,
                    stagger + partition.segment_count as f32 * partition.regular_angle_deg,
                    partition.key_angle_deg,
                )));

            let segments = pieces
                .map(|(kind, nominal_start, nominal_span)| {
                    let id = SegmentId { ring: index, kind };
                    let span = nominal_span - gap;
                    let start = nominal_start + gap / 2.0;
                    let mid = start + span / 2.0;
                    LiningSegment {
                        id,
                        label: id.to_string(),
                        start_angle_deg: start,
                        nominal_span_deg: nominal_span,
                        span_deg: span,
                        centroid: frame.origin + frame.radial(mid) * mid_radius,
                        volume: 0.5 * span.to_radians() * annulus * design.ring_width,
                    }
                })
                .collect();

            LiningRing {
                index,
                t,
                position: frame.origin,
                orientation: frame.orientation(),
                stagger_deg: stagger,
                segments,
            }
        })
        .collect();

    Ok(SegmentalLayout {
        partition,
        gap_deg: gap,
        ring_width: design.ring_width,
        outer_radius,
        inner_radius,
        rings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(segment_count: u32) -> SegmentalLayout {
        let design = TunnelDesign {
            segment_count,
            ..Default::default()
        };
        let curve = AlignmentCurve::new(design.horizontal_radius, design.vertical_grade);
        segmental_layout(&design, &curve, &EngineConstants::default(), FrameMode::FixedUp).unwrap()
    }

    #[test]
    fn partition_sums_to_full_circle() {
        for n in 3..=10 {
            let p = ring_partition(n, 20.0).unwrap();
            assert!((p.total_deg() - 360.0).abs() < 1e-3, "n={n} total {}", p.total_deg());
        }
    }

    #[test]
    fn six_segments() {
        let p = ring_partition(6, 20.0).unwrap();
        assert!((p.regular_angle_deg - 340.0 / 6.0).abs() < 1e-4);
    }

    #[test]
    fn partition_rejects_bad_input() {
        assert!(matches!(
            ring_partition(2, 20.0),
            Err(DesignError::SegmentCountOutOfRange { count: 2, .. })
        ));
        assert!(matches!(
            ring_partition(6, 0.0),
            Err(DesignError::InvalidConstant { .. })
        ));
    }

    #[test]
    fn ring_count_rounds_up() {
        assert_eq!(ring_count(40.0, 1.5).unwrap(), 27);
        assert_eq!(ring_count(40.0, 2.0).unwrap(), 20);
        assert!(ring_count(40.0, 0.0).is_err());
    }

    #[test]
    fn ring_count_is_bounded() {
        assert!(matches!(
            ring_count(40.0, 1e-9),
            Err(DesignError::TooManyElements { what: "ring", .. })
        ));
        assert_eq!(ring_count(10_000.0, 1.0).unwrap(), MAX_LAYOUT_ELEMENTS);
        assert!(ring_count(10_001.0, 1.0).is_err());
    }

    #[test]
    fn rings_span_the_curve() {
        let l = layout(6);
        assert_eq!(l.ring_count(), 27);
        assert_eq!(l.segment_count(), 27 * 7);
        assert_eq!(l.rings[0].t, 0.0);
        assert_eq!(l.rings[26].t, 1.0);
    }

    #[test]
    fn stagger_alternates() {
        let l = layout(6);
        let regular = l.partition.regular_angle_deg;
        let s0 = l.rings[0].segments[0].start_angle_deg;
        let s1 = l.rings[1].segments[0].start_angle_deg;
        let s2 = l.rings[2].segments[0].start_angle_deg;
        assert!(((s1 - s0) - regular / 2.0).abs() < 1e-4);
        assert_eq!(s0, s2);
    }

    #[test]
    fn joints_never_align_between_neighbours() {
        let l = layout(5);
        let joints = |ring: &LiningRing| -> Vec<f32> {
            ring.segments
                .iter()
                .map(|s| (s.start_angle_deg - l.gap_deg / 2.0).rem_euclid(360.0))
                .collect()
        };
        let a = joints(&l.rings[0]);
        let b = joints(&l.rings[1]);
        for ja in &a {
            for jb in &b {
                assert!((ja - jb).abs() > 1.0, "joint {ja} aligns with {jb}");
            }
        }
    }

    #[test]
    fn gap_is_trimmed_from_every_span() {
        let l = layout(6);
        for seg in &l.rings[3].segments {
            assert!((seg.nominal_span_deg - seg.span_deg - l.gap_deg).abs() < 1e-5);
        }
    }

    #[test]
    fn labels_are_addressable() {
        let l = layout(6);
        let key = l.find_segment("R4-K").unwrap();
        assert!(key.is_key());
        assert!((key.nominal_span_deg - 20.0).abs() < 1e-5);
        let seg = l.find_segment("R0-S5").unwrap();
        assert_eq!(seg.id.kind, SegmentKind::Regular(5));
        assert!(l.find_segment("R0-S6").is_none());
        let by_id = l
            .segment(SegmentId {
                ring: 4,
                kind: SegmentKind::Key,
            })
            .unwrap();
        assert_eq!(by_id.label, "R4-K");
    }

    #[test]
    fn centroids_sit_at_mid_radius() {
        let l = layout(6);
        let mid = (l.outer_radius + l.inner_radius) / 2.0;
        for ring in &l.rings {
            for seg in &ring.segments {
                let r = seg.centroid.distance(ring.position);
                assert!((r - mid).abs() < 1e-3, "{} at {r}", seg.label);
            }
        }
    }

    #[test]
    fn segment_volumes_add_up_to_ring() {
        let l = layout(6);
        let ring_volume: f32 = l.rings[0].segments.iter().map(|s| s.volume).sum();
        let gaps = 7.0 * l.gap_deg.to_radians();
        let full = 0.5
            * (std::f32::consts::TAU - gaps)
            * (l.outer_radius.powi(2) - l.inner_radius.powi(2))
            * l.ring_width;
        assert!((ring_volume - full).abs() < 1e-3);
    }

    #[test]
    fn single_ring_uses_curve_start() {
        let design = TunnelDesign {
            ring_width: 2.0,
            ..Default::default()
        };
        let constants = EngineConstants {
            tunnel_length: 1.0,
            ..Default::default()
        };
        let curve = AlignmentCurve::new(design.horizontal_radius, 0.0);
        let l = segmental_layout(&design, &curve, &constants, FrameMode::FixedUp).unwrap();
        assert_eq!(l.ring_count(), 1);
        assert_eq!(l.rings[0].t, 0.0);
    }
}
