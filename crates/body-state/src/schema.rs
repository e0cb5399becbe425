//! Static description of the record layout.
//!
//! Every width and alignment used by the decoders lives here. Offsets are
//! never hard-coded: [`layout`] derives them by walking [`FIELDS`] with the
//! same [`align_up`] rule the cursor applies while reading.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::DecodeError;

pub const EXPRESSION_COUNT: usize = 70;
pub const CONFIDENCE_COUNT: usize = 2;
pub const HAND_JOINT_COUNT: usize = 26;
pub const FULL_BODY_JOINT_COUNT: usize = 84;

/// Name under which the producer publishes the record.
pub const REGION_NAME: &str = "VirtualDesktop.BodyState";
/// Name of the event the producer raises after each complete write.
pub const SIGNAL_NAME: &str = "VirtualDesktop.BodyStateEvent";

/// Round `offset` up to the next multiple of `align`.
pub const fn align_up(offset: usize, align: usize) -> usize {
    if align <= 1 {
        return offset;
    }
    offset + (align - offset % align) % align
}

/// Primitive kinds; each is naturally aligned (alignment == width).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Primitive {
    Bool8,
    Float32,
    UInt32,
    UInt64,
}

impl Primitive {
    pub const fn width(self) -> usize {
        match self {
            Primitive::Bool8 => 1,
            Primitive::Float32 | Primitive::UInt32 => 4,
            Primitive::UInt64 => 8,
        }
    }

    pub const fn align(self) -> usize {
        self.width()
    }
}

/// A fixed sequence of primitives plus the padding the producer's compiler
/// appends after the last member.
#[derive(Debug)]
pub struct Composite {
    pub name: &'static str,
    pub members: &'static [Primitive],
    pub trailing_align: usize,
}

impl Composite {
    pub fn align(&self) -> usize {
        self.members.iter().map(|m| m.align()).max().unwrap_or(1)
    }

    /// Bytes consumed when starting from an offset aligned to [`Composite::align`].
    pub fn size(&self) -> usize {
        self.advance(0)
    }

    /// Offset just past this composite, including its tail padding.
    pub fn advance(&self, offset: usize) -> usize {
        let end = self
            .members
            .iter()
            .fold(offset, |at, m| align_up(at, m.align()) + m.width());
        align_up(end, self.trailing_align)
    }
}

const F: Primitive = Primitive::Float32;

pub static VECTOR3: Composite = Composite {
    name: "Vector3",
    members: &[F; 3],
    trailing_align: 1,
};

pub static QUATERNION: Composite = Composite {
    name: "Quaternion",
    members: &[F; 4],
    trailing_align: 1,
};

/// Orientation quaternion followed by position, read as seven floats.
pub static POSE: Composite = Composite {
    name: "Pose",
    members: &[F; 7],
    trailing_align: 1,
};

/// Pose, radius, angular velocity, linear velocity.
pub static FINGER_JOINT_STATE: Composite = Composite {
    name: "FingerJointState",
    members: &[F; 14],
    trailing_align: 1,
};

/// Aim status, aim pose, four pinch strengths. The leading u64 makes the
/// whole struct 8-aligned, so 4 bytes of tail padding follow the last float.
pub static HAND_TRACKING_AIM_STATE: Composite = Composite {
    name: "HandTrackingAimState",
    members: &[Primitive::UInt64, F, F, F, F, F, F, F, F, F, F, F],
    trailing_align: 8,
};

pub static BODY_JOINT_LOCATION: Composite = Composite {
    name: "BodyJointLocation",
    members: &[Primitive::UInt64, F, F, F, F, F, F, F],
    trailing_align: 8,
};

/// Ends 4-aligned already; no tail padding.
pub static SKELETON_JOINT: Composite = Composite {
    name: "SkeletonJoint",
    members: &[Primitive::UInt32, Primitive::UInt32, F, F, F, F, F, F, F],
    trailing_align: 1,
};

#[derive(Clone, Copy, Debug)]
pub enum Element {
    Primitive(Primitive),
    Composite(&'static Composite),
}

impl Element {
    pub fn align(&self) -> usize {
        match self {
            Element::Primitive(p) => p.align(),
            Element::Composite(c) => c.align(),
        }
    }

    /// Offset just past one element that starts at (or is padded up from) `offset`.
    pub fn advance(&self, offset: usize) -> usize {
        match self {
            Element::Primitive(p) => align_up(offset, p.align()) + p.width(),
            Element::Composite(c) => c.advance(offset),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Element::Primitive(Primitive::Bool8) => "Bool8",
            Element::Primitive(Primitive::Float32) => "Float32",
            Element::Primitive(Primitive::UInt32) => "UInt32",
            Element::Primitive(Primitive::UInt64) => "UInt64",
            Element::Composite(c) => c.name,
        }
    }
}

#[derive(Debug)]
pub struct Field {
    pub name: &'static str,
    pub element: Element,
    pub count: usize,
}

const fn prim(name: &'static str, p: Primitive, count: usize) -> Field {
    Field {
        name,
        element: Element::Primitive(p),
        count,
    }
}

const fn comp(name: &'static str, c: &'static Composite, count: usize) -> Field {
    Field {
        name,
        element: Element::Composite(c),
        count,
    }
}

/// Top-level fields of a V2 record, in producer order.
pub static FIELDS: [Field; 22] = [
    prim("face_is_valid", Primitive::Bool8, 1),
    prim("is_eye_following_blendshapes_valid", Primitive::Bool8, 1),
    prim("expression_weights", F, EXPRESSION_COUNT),
    prim("expression_confidences", F, CONFIDENCE_COUNT),
    prim("left_eye_is_valid", Primitive::Bool8, 1),
    prim("right_eye_is_valid", Primitive::Bool8, 1),
    comp("left_eye_pose", &POSE, 1),
    comp("right_eye_pose", &POSE, 1),
    prim("left_eye_confidence", F, 1),
    prim("right_eye_confidence", F, 1),
    prim("left_hand_active", Primitive::Bool8, 1),
    prim("right_hand_active", Primitive::Bool8, 1),
    comp("left_hand_joint_states", &FINGER_JOINT_STATE, HAND_JOINT_COUNT),
    comp("right_hand_joint_states", &FINGER_JOINT_STATE, HAND_JOINT_COUNT),
    comp("left_aim_state", &HAND_TRACKING_AIM_STATE, 1),
    comp("right_aim_state", &HAND_TRACKING_AIM_STATE, 1),
    prim("body_tracking_calibrated", Primitive::Bool8, 1),
    prim("body_tracking_high_fidelity", Primitive::Bool8, 1),
    prim("body_tracking_confidence", F, 1),
    comp("body_joints", &BODY_JOINT_LOCATION, FULL_BODY_JOINT_COUNT),
    comp("skeleton_joints", &SKELETON_JOINT, FULL_BODY_JOINT_COUNT),
    prim("skeleton_changed_count", Primitive::UInt32, 1),
];

/// Where one top-level field lands in the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldLayout {
    pub name: &'static str,
    pub kind: &'static str,
    pub count: usize,
    pub offset: usize,
    pub size: usize,
}

/// Resolve the offset and size of every field in [`FIELDS`].
pub fn layout() -> Vec<FieldLayout> {
    let mut out = Vec::with_capacity(FIELDS.len());
    let mut at = 0usize;
    for field in &FIELDS {
        let start = align_up(at, field.element.align());
        let end = (0..field.count).fold(start, |o, _| field.element.advance(o));
        out.push(FieldLayout {
            name: field.name,
            kind: field.element.name(),
            count: field.count,
            offset: start,
            size: end - start,
        });
        at = end;
    }
    out
}

pub fn field_offset(name: &str) -> Option<usize> {
    layout().into_iter().find(|f| f.name == name).map(|f| f.offset)
}

/// Total bytes the V2 field list occupies.
pub fn computed_record_size() -> usize {
    layout().last().map(|f| f.offset + f.size).unwrap_or(0)
}

/// Producer protocol revisions, identified by total record size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaVersion {
    /// Older producers. Recognized by size only; the field list is not known.
    V1,
    /// Face, eye, hand, and body tracking as laid out in [`FIELDS`].
    #[default]
    V2,
}

impl SchemaVersion {
    pub const ALL: [SchemaVersion; 2] = [SchemaVersion::V1, SchemaVersion::V2];

    pub const fn record_size(self) -> usize {
        match self {
            SchemaVersion::V1 => 9432,
            SchemaVersion::V2 => 9788,
        }
    }

    pub const fn is_decodable(self) -> bool {
        matches!(self, SchemaVersion::V2)
    }

    pub fn from_record_size(len: usize) -> Result<Self, DecodeError> {
        Self::ALL
            .into_iter()
            .find(|v| v.record_size() == len)
            .ok_or(DecodeError::UnknownRecordSize(len))
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaVersion::V1 => write!(f, "v1"),
            SchemaVersion::V2 => write!(f, "v2"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_up() {
        assert_eq!(align_up(0, 4), 0);
        assert_eq!(align_up(1, 4), 4);
        assert_eq!(align_up(4, 4), 4);
        assert_eq!(align_up(5, 8), 8);
        assert_eq!(align_up(3, 1), 3);
        assert_eq!(align_up(3, 0), 3);
    }

    #[test]
    fn test_composite_sizes() {
        assert_eq!(VECTOR3.size(), 12);
        assert_eq!(QUATERNION.size(), 16);
        assert_eq!(POSE.size(), 28);
        assert_eq!(FINGER_JOINT_STATE.size(), 56);
        assert_eq!(HAND_TRACKING_AIM_STATE.size(), 56);
        assert_eq!(BODY_JOINT_LOCATION.size(), 40);
        assert_eq!(SKELETON_JOINT.size(), 36);
        assert_eq!(HAND_TRACKING_AIM_STATE.align(), 8);
        assert_eq!(SKELETON_JOINT.align(), 4);
    }

    #[test]
    fn test_layout_matches_v2_size() {
        assert_eq!(computed_record_size(), SchemaVersion::V2.record_size());
    }

    #[test]
    fn test_field_offsets() {
        let cases = [
            ("face_is_valid", 0),
            ("is_eye_following_blendshapes_valid", 1),
            ("expression_weights", 4),
            ("expression_confidences", 284),
            ("left_eye_is_valid", 292),
            ("right_eye_is_valid", 293),
            ("left_eye_pose", 296),
            ("right_eye_pose", 324),
            ("left_eye_confidence", 352),
            ("left_hand_active", 360),
            ("right_hand_active", 361),
            ("left_hand_joint_states", 364),
            ("right_hand_joint_states", 1820),
            ("left_aim_state", 3280),
            ("right_aim_state", 3336),
            ("body_tracking_calibrated", 3392),
            ("body_tracking_confidence", 3396),
            ("body_joints", 3400),
            ("skeleton_joints", 6760),
            ("skeleton_changed_count", 9784),
        ];
        for (name, offset) in cases {
            assert_eq!(field_offset(name), Some(offset), "{name}");
        }
        assert_eq!(field_offset("nope"), None);
    }

    #[test]
    fn test_layout_is_contiguous_up_to_padding() {
        let fields = layout();
        for pair in fields.windows(2) {
            let end = pair[0].offset + pair[0].size;
            assert!(pair[1].offset >= end);
            assert!(pair[1].offset - end < 8, "{} -> {}", pair[0].name, pair[1].name);
        }
    }

    #[test]
    fn test_version_from_size() {
        assert_eq!(SchemaVersion::from_record_size(9788), Ok(SchemaVersion::V2));
        assert_eq!(SchemaVersion::from_record_size(9432), Ok(SchemaVersion::V1));
        assert_eq!(
            SchemaVersion::from_record_size(9792),
            Err(DecodeError::UnknownRecordSize(9792))
        );
        assert!(!SchemaVersion::V1.is_decodable());
        assert_eq!(SchemaVersion::default(), SchemaVersion::V2);
    }
}
