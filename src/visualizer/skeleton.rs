// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use crate::landmark::PoseLandmark as P;

/// Body pose skeleton over the 33 landmarks (pairs of connected labels).
pub const POSE_CONNECTIONS: [(P, P); 35] = [
    // face
    (P::Nose, P::LeftEyeInner),
    (P::LeftEyeInner, P::LeftEye),
    (P::LeftEye, P::LeftEyeOuter),
    (P::LeftEyeOuter, P::LeftEar),
    (P::Nose, P::RightEyeInner),
    (P::RightEyeInner, P::RightEye),
    (P::RightEye, P::RightEyeOuter),
    (P::RightEyeOuter, P::RightEar),
    (P::MouthLeft, P::MouthRight),
    // torso
    (P::LeftShoulder, P::RightShoulder),
    (P::LeftShoulder, P::LeftHip),
    (P::RightShoulder, P::RightHip),
    (P::LeftHip, P::RightHip),
    // left arm and hand
    (P::LeftShoulder, P::LeftElbow),
    (P::LeftElbow, P::LeftWrist),
    (P::LeftWrist, P::LeftPinky),
    (P::LeftWrist, P::LeftIndex),
    (P::LeftWrist, P::LeftThumb),
    (P::LeftPinky, P::LeftIndex),
    // right arm and hand
    (P::RightShoulder, P::RightElbow),
    (P::RightElbow, P::RightWrist),
    (P::RightWrist, P::RightPinky),
    (P::RightWrist, P::RightIndex),
    (P::RightWrist, P::RightThumb),
    (P::RightPinky, P::RightIndex),
    // legs
    (P::LeftHip, P::LeftKnee),
    (P::LeftKnee, P::LeftAnkle),
    (P::LeftAnkle, P::LeftHeel),
    (P::LeftHeel, P::LeftFootIndex),
    (P::LeftAnkle, P::LeftFootIndex),
    (P::RightHip, P::RightKnee),
    (P::RightKnee, P::RightAnkle),
    (P::RightAnkle, P::RightHeel),
    (P::RightHeel, P::RightFootIndex),
    (P::RightAnkle, P::RightFootIndex),
];

/// Which part of the body a label belongs to, used for limb coloring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyPart {
    Face,
    Torso,
    Arm,
    Leg,
}

impl BodyPart {
    /// Classify a landmark label.
    #[must_use]
    pub const fn of(label: P) -> Self {
        match label.index() {
            0..=10 => Self::Face,
            11 | 12 | 23 | 24 => Self::Torso,
            13..=22 => Self::Arm,
            _ => Self::Leg,
        }
    }

    /// Part of a connection: the more distal of its two endpoints.
    #[must_use]
    pub const fn of_connection(a: P, b: P) -> Self {
        match (Self::of(a), Self::of(b)) {
            (Self::Torso, other) | (other, _) => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_connections_are_unique_and_non_degenerate() {
        let mut seen = HashSet::new();
        for (a, b) in POSE_CONNECTIONS {
            assert_ne!(a, b);
            let key = (a.index().min(b.index()), a.index().max(b.index()));
            assert!(seen.insert(key), "duplicate connection {a} - {b}");
        }
    }

    #[test]
    fn test_every_label_reaches_the_skeleton() {
        let used: HashSet<usize> = POSE_CONNECTIONS
            .iter()
            .flat_map(|(a, b)| [a.index(), b.index()])
            .collect();
        assert_eq!(used.len(), crate::landmark::NUM_LANDMARKS);
    }

    #[test]
    fn test_body_parts() {
        assert_eq!(BodyPart::of(P::Nose), BodyPart::Face);
        assert_eq!(BodyPart::of(P::LeftWrist), BodyPart::Arm);
        assert_eq!(BodyPart::of(P::RightHip), BodyPart::Torso);
        assert_eq!(BodyPart::of(P::LeftHeel), BodyPart::Leg);
        assert_eq!(
            BodyPart::of_connection(P::LeftShoulder, P::LeftElbow),
            BodyPart::Arm
        );
        assert_eq!(
            BodyPart::of_connection(P::LeftHip, P::RightHip),
            BodyPart::Torso
        );
    }
}
