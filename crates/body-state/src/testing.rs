//! Test-only producer side: writes records the way the native producer lays them out.

use crate::schema::{self, align_up};
use crate::{
    BodyJointLocation, FingerJointState, HandTrackingAimState, Pose, Quaternion, SkeletonJoint,
    Snapshot, Vector3,
};

#[derive(Debug, Default)]
pub(crate) struct RecordWriter {
    buf: Vec<u8>,
}

impl RecordWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn encode(snap: &Snapshot) -> Vec<u8> {
        let mut w = Self::new();
        w.snapshot(snap);
        w.into_bytes()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn pad_to(&mut self, align: usize) {
        let target = align_up(self.buf.len(), align);
        self.buf.resize(target, 0);
    }

    pub fn bool(&mut self, v: bool) {
        self.buf.push(u8::from(v));
    }

    pub fn f32(&mut self, v: f32) {
        self.pad_to(4);
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn u32(&mut self, v: u32) {
        self.pad_to(4);
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn u64(&mut self, v: u64) {
        self.pad_to(8);
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn vector3(&mut self, v: &Vector3) {
        for c in [v.x, v.y, v.z] {
            self.f32(c);
        }
    }

    pub fn pose(&mut self, p: &Pose) {
        let q = p.orientation;
        for c in [q.x, q.y, q.z, q.w] {
            self.f32(c);
        }
        self.vector3(&p.position);
    }

    pub fn finger_joint(&mut self, j: &FingerJointState) {
        self.pose(&j.pose);
        self.f32(j.radius);
        self.vector3(&j.angular_velocity);
        self.vector3(&j.linear_velocity);
    }

    pub fn aim_state(&mut self, a: &HandTrackingAimState) {
        self.u64(a.aim_status);
        self.pose(&a.aim_pose);
        self.f32(a.pinch_strength_index);
        self.f32(a.pinch_strength_middle);
        self.f32(a.pinch_strength_ring);
        self.f32(a.pinch_strength_little);
        self.pad_to(schema::HAND_TRACKING_AIM_STATE.trailing_align);
    }

    pub fn body_joint(&mut self, j: &BodyJointLocation) {
        self.u64(j.location_flags);
        self.pose(&j.pose);
        self.pad_to(schema::BODY_JOINT_LOCATION.trailing_align);
    }

    pub fn skeleton_joint(&mut self, j: &SkeletonJoint) {
        self.u32(j.joint);
        self.u32(j.parent_joint);
        self.pose(&j.pose);
    }

    pub fn snapshot(&mut self, s: &Snapshot) {
        self.bool(s.face_is_valid);
        self.bool(s.is_eye_following_blendshapes_valid);
        s.expression_weights.iter().for_each(|&v| self.f32(v));
        s.expression_confidences.iter().for_each(|&v| self.f32(v));
        self.bool(s.left_eye_is_valid);
        self.bool(s.right_eye_is_valid);
        self.pose(&s.left_eye_pose);
        self.pose(&s.right_eye_pose);
        self.f32(s.left_eye_confidence);
        self.f32(s.right_eye_confidence);
        self.bool(s.left_hand_active);
        self.bool(s.right_hand_active);
        s.left_hand_joint_states.iter().for_each(|j| self.finger_joint(j));
        s.right_hand_joint_states.iter().for_each(|j| self.finger_joint(j));
        self.aim_state(&s.left_aim_state);
        self.aim_state(&s.right_aim_state);
        self.bool(s.body_tracking_calibrated);
        self.bool(s.body_tracking_high_fidelity);
        self.f32(s.body_tracking_confidence);
        s.body_joints.iter().for_each(|j| self.body_joint(j));
        s.skeleton_joints.iter().for_each(|j| self.skeleton_joint(j));
        self.u32(s.skeleton_changed_count);
    }
}

fn pose_at(seed: f32) -> Pose {
    Pose {
        orientation: Quaternion {
            x: seed,
            y: seed + 0.1,
            z: seed + 0.2,
            w: 1.0 - seed,
        },
        position: Vector3 {
            x: -seed,
            y: seed * 2.0,
            z: seed * 0.5,
        },
    }
}

pub(crate) fn zeroed_snapshot() -> Snapshot {
    Snapshot {
        face_is_valid: false,
        is_eye_following_blendshapes_valid: false,
        expression_weights: [0.0; schema::EXPRESSION_COUNT],
        expression_confidences: [0.0; schema::CONFIDENCE_COUNT],
        left_eye_is_valid: false,
        right_eye_is_valid: false,
        left_eye_pose: Pose::default(),
        right_eye_pose: Pose::default(),
        left_eye_confidence: 0.0,
        right_eye_confidence: 0.0,
        left_hand_active: false,
        right_hand_active: false,
        left_hand_joint_states: [FingerJointState::default(); schema::HAND_JOINT_COUNT],
        right_hand_joint_states: [FingerJointState::default(); schema::HAND_JOINT_COUNT],
        left_aim_state: HandTrackingAimState::default(),
        right_aim_state: HandTrackingAimState::default(),
        body_tracking_calibrated: false,
        body_tracking_high_fidelity: false,
        body_tracking_confidence: 0.0,
        body_joints: [BodyJointLocation::default(); schema::FULL_BODY_JOINT_COUNT],
        skeleton_joints: [SkeletonJoint::default(); schema::FULL_BODY_JOINT_COUNT],
        skeleton_changed_count: 0,
    }
}

/// Every field distinct and nonzero, with mixed flags so misplaced bytes show up.
pub(crate) fn sample_snapshot() -> Snapshot {
    let finger = |side: f32, i: usize| FingerJointState {
        pose: pose_at(side + i as f32 * 0.01),
        radius: 0.005 + i as f32 * 0.001,
        angular_velocity: Vector3 {
            x: i as f32,
            y: -(i as f32),
            z: side,
        },
        linear_velocity: Vector3 {
            x: side * 3.0,
            y: i as f32 * 0.25,
            z: -side,
        },
    };
    let aim = |side: f32| HandTrackingAimState {
        aim_status: 0x0000_0001_0000_0003 + side as u64,
        aim_pose: pose_at(side),
        pinch_strength_index: 0.1 * side,
        pinch_strength_middle: 0.2 * side,
        pinch_strength_ring: 0.3 * side,
        pinch_strength_little: 0.4 * side,
    };
    Snapshot {
        face_is_valid: true,
        is_eye_following_blendshapes_valid: false,
        expression_weights: core::array::from_fn(|i| i as f32 / 70.0),
        expression_confidences: [0.75, 0.5],
        left_eye_is_valid: true,
        right_eye_is_valid: false,
        left_eye_pose: pose_at(0.3),
        right_eye_pose: pose_at(0.4),
        left_eye_confidence: 0.9,
        right_eye_confidence: 0.8,
        left_hand_active: false,
        right_hand_active: true,
        left_hand_joint_states: core::array::from_fn(|i| finger(1.0, i)),
        right_hand_joint_states: core::array::from_fn(|i| finger(2.0, i)),
        left_aim_state: aim(1.0),
        right_aim_state: aim(2.0),
        body_tracking_calibrated: true,
        body_tracking_high_fidelity: true,
        body_tracking_confidence: 0.66,
        body_joints: core::array::from_fn(|i| BodyJointLocation {
            location_flags: ((i as u64) << 32) | 0xF,
            pose: pose_at(i as f32 * 0.1),
        }),
        skeleton_joints: core::array::from_fn(|i| SkeletonJoint {
            joint: i as u32,
            parent_joint: i.saturating_sub(1) as u32,
            pose: pose_at(-(i as f32) * 0.1),
        }),
        skeleton_changed_count: 42,
    }
}
