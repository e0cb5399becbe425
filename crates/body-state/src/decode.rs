use crate::schema::{self, SchemaVersion};
use crate::{
    BodyJointLocation, Cursor, DecodeError, DecodeResult, FingerJointState,
    HandTrackingAimState, Pose, Quaternion, SkeletonJoint, Snapshot, Vector3,
};

/// A value decoded by a fixed sequence of cursor reads.
pub trait FromCursor: Sized {
    fn read_from(cur: &mut Cursor<'_>) -> DecodeResult<Self>;
}

impl FromCursor for f32 {
    fn read_from(cur: &mut Cursor<'_>) -> DecodeResult<Self> {
        cur.read_f32()
    }
}

impl FromCursor for Vector3 {
    fn read_from(cur: &mut Cursor<'_>) -> DecodeResult<Self> {
        let [x, y, z] = read_array(cur)?;
        Ok(Vector3 { x, y, z })
    }
}

impl FromCursor for Quaternion {
    fn read_from(cur: &mut Cursor<'_>) -> DecodeResult<Self> {
        let [x, y, z, w] = read_array(cur)?;
        Ok(Quaternion { x, y, z, w })
    }
}

impl FromCursor for Pose {
    fn read_from(cur: &mut Cursor<'_>) -> DecodeResult<Self> {
        let [qx, qy, qz, qw, px, py, pz] = read_array(cur)?;
        Ok(Pose {
            orientation: Quaternion {
                x: qx,
                y: qy,
                z: qz,
                w: qw,
            },
            position: Vector3 {
                x: px,
                y: py,
                z: pz,
            },
        })
    }
}

impl FromCursor for FingerJointState {
    fn read_from(cur: &mut Cursor<'_>) -> DecodeResult<Self> {
        Ok(FingerJointState {
            pose: Pose::read_from(cur)?,
            radius: cur.read_f32()?,
            angular_velocity: Vector3::read_from(cur)?,
            linear_velocity: Vector3::read_from(cur)?,
        })
    }
}

impl FromCursor for HandTrackingAimState {
    fn read_from(cur: &mut Cursor<'_>) -> DecodeResult<Self> {
        let state = HandTrackingAimState {
            aim_status: cur.read_u64()?,
            aim_pose: Pose::read_from(cur)?,
            pinch_strength_index: cur.read_f32()?,
            pinch_strength_middle: cur.read_f32()?,
            pinch_strength_ring: cur.read_f32()?,
            pinch_strength_little: cur.read_f32()?,
        };
        cur.align_to(schema::HAND_TRACKING_AIM_STATE.trailing_align)?;
        Ok(state)
    }
}

impl FromCursor for BodyJointLocation {
    fn read_from(cur: &mut Cursor<'_>) -> DecodeResult<Self> {
        let joint = BodyJointLocation {
            location_flags: cur.read_u64()?,
            pose: Pose::read_from(cur)?,
        };
        cur.align_to(schema::BODY_JOINT_LOCATION.trailing_align)?;
        Ok(joint)
    }
}

impl FromCursor for SkeletonJoint {
    fn read_from(cur: &mut Cursor<'_>) -> DecodeResult<Self> {
        Ok(SkeletonJoint {
            joint: cur.read_u32()?,
            parent_joint: cur.read_u32()?,
            pose: Pose::read_from(cur)?,
        })
    }
}

/// Read `N` consecutive values sharing the caller's cursor.
pub fn read_array<T, const N: usize>(cur: &mut Cursor<'_>) -> DecodeResult<[T; N]>
where
    T: FromCursor + Copy + Default,
{
    let mut out = [T::default(); N];
    for slot in out.iter_mut() {
        *slot = T::read_from(cur)?;
    }
    Ok(out)
}

/// Decode one complete record laid out as `version`.
///
/// All-or-nothing: the first failed read aborts the whole snapshot. After the
/// last field the cursor must sit exactly at the declared record size, and
/// the buffer must be exactly that long.
pub fn decode_snapshot(buf: &[u8], version: SchemaVersion) -> DecodeResult<Snapshot> {
    if !version.is_decodable() {
        return Err(DecodeError::UnsupportedVersion(version));
    }
    let mut cur = Cursor::new(buf);
    // Field initializers run in source order; keep them in record order.
    let snapshot = Snapshot {
        face_is_valid: cur.read_bool()?,
        is_eye_following_blendshapes_valid: cur.read_bool()?,
        expression_weights: read_array(&mut cur)?,
        expression_confidences: read_array(&mut cur)?,
        left_eye_is_valid: cur.read_bool()?,
        right_eye_is_valid: cur.read_bool()?,
        left_eye_pose: Pose::read_from(&mut cur)?,
        right_eye_pose: Pose::read_from(&mut cur)?,
        left_eye_confidence: cur.read_f32()?,
        right_eye_confidence: cur.read_f32()?,
        left_hand_active: cur.read_bool()?,
        right_hand_active: cur.read_bool()?,
        left_hand_joint_states: read_array(&mut cur)?,
        right_hand_joint_states: read_array(&mut cur)?,
        left_aim_state: HandTrackingAimState::read_from(&mut cur)?,
        right_aim_state: HandTrackingAimState::read_from(&mut cur)?,
        body_tracking_calibrated: cur.read_bool()?,
        body_tracking_high_fidelity: cur.read_bool()?,
        body_tracking_confidence: cur.read_f32()?,
        body_joints: read_array(&mut cur)?,
        skeleton_joints: read_array(&mut cur)?,
        skeleton_changed_count: cur.read_u32()?,
    };

    let expected = version.record_size();
    for actual in [cur.position(), buf.len()] {
        if actual != expected {
            return Err(DecodeError::SchemaMismatch {
                version,
                expected,
                actual,
            });
        }
    }
    Ok(snapshot)
}

/// Pick the schema version from the buffer length, then decode.
pub fn decode_detect(buf: &[u8]) -> DecodeResult<Snapshot> {
    let version = SchemaVersion::from_record_size(buf.len())?;
    decode_snapshot(buf, version)
}
