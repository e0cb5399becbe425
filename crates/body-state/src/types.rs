use serde::{Serialize, Serializer};

use crate::schema::{CONFIDENCE_COUNT, EXPRESSION_COUNT, FULL_BODY_JOINT_COUNT, HAND_JOINT_COUNT};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Quaternion {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Pose {
    pub orientation: Quaternion,
    pub position: Vector3,
}

/// State of one hand joint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FingerJointState {
    pub pose: Pose,
    pub radius: f32,
    pub angular_velocity: Vector3,
    pub linear_velocity: Vector3,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct HandTrackingAimState {
    pub aim_status: u64,
    pub aim_pose: Pose,
    pub pinch_strength_index: f32,
    pub pinch_strength_middle: f32,
    pub pinch_strength_ring: f32,
    pub pinch_strength_little: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BodyJointLocation {
    pub location_flags: u64,
    pub pose: Pose,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SkeletonJoint {
    pub joint: u32,
    pub parent_joint: u32,
    pub pose: Pose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// One decoded record. Sequence lengths are fixed by the protocol.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub face_is_valid: bool,
    pub is_eye_following_blendshapes_valid: bool,
    #[serde(serialize_with = "serialize_array")]
    pub expression_weights: [f32; EXPRESSION_COUNT],
    #[serde(serialize_with = "serialize_array")]
    pub expression_confidences: [f32; CONFIDENCE_COUNT],
    pub left_eye_is_valid: bool,
    pub right_eye_is_valid: bool,
    pub left_eye_pose: Pose,
    pub right_eye_pose: Pose,
    pub left_eye_confidence: f32,
    pub right_eye_confidence: f32,
    pub left_hand_active: bool,
    pub right_hand_active: bool,
    #[serde(serialize_with = "serialize_array")]
    pub left_hand_joint_states: [FingerJointState; HAND_JOINT_COUNT],
    #[serde(serialize_with = "serialize_array")]
    pub right_hand_joint_states: [FingerJointState; HAND_JOINT_COUNT],
    pub left_aim_state: HandTrackingAimState,
    pub right_aim_state: HandTrackingAimState,
    pub body_tracking_calibrated: bool,
    pub body_tracking_high_fidelity: bool,
    pub body_tracking_confidence: f32,
    #[serde(serialize_with = "serialize_array")]
    pub body_joints: [BodyJointLocation; FULL_BODY_JOINT_COUNT],
    #[serde(serialize_with = "serialize_array")]
    pub skeleton_joints: [SkeletonJoint; FULL_BODY_JOINT_COUNT],
    pub skeleton_changed_count: u32,
}

impl Snapshot {
    pub fn eye_is_valid(&self, side: Side) -> bool {
        match side {
            Side::Left => self.left_eye_is_valid,
            Side::Right => self.right_eye_is_valid,
        }
    }

    pub fn eye_pose(&self, side: Side) -> &Pose {
        match side {
            Side::Left => &self.left_eye_pose,
            Side::Right => &self.right_eye_pose,
        }
    }

    pub fn hand_active(&self, side: Side) -> bool {
        match side {
            Side::Left => self.left_hand_active,
            Side::Right => self.right_hand_active,
        }
    }

    pub fn hand_joints(&self, side: Side) -> &[FingerJointState; HAND_JOINT_COUNT] {
        match side {
            Side::Left => &self.left_hand_joint_states,
            Side::Right => &self.right_hand_joint_states,
        }
    }

    pub fn aim_state(&self, side: Side) -> &HandTrackingAimState {
        match side {
            Side::Left => &self.left_aim_state,
            Side::Right => &self.right_aim_state,
        }
    }
}

// serde only derives for arrays up to 32 elements
fn serialize_array<S, T, const N: usize>(items: &[T; N], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: Serialize,
{
    serializer.collect_seq(items)
}
