use crate::args::LogLevel;
use crate::error::BridgeError;

/// Runtime settings passed by the engine to `init`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BridgeConfig {
    pub log_level: LogLevel,
    /// Forward log events to the engine's debug callback, when one is registered.
    pub forward_to_application: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            forward_to_application: true,
        }
    }
}

impl BridgeConfig {
    pub fn from_raw(log_level: u32, forward_to_application: bool) -> Self {
        Self {
            log_level: LogLevel::from_raw(log_level),
            forward_to_application,
        }
    }
}

/// Minimum number of floats the mono-frame callback reads from each array.
///
/// The engine reads these arrays through bare pointers, so anything shorter
/// would be read past its end. Longer arrays are passed through untouched.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FrameLayout {
    /// fx, fy, cx, cy
    pub intrinsics: usize,
    /// k1, k2, p1, p2, k3
    pub distortion: usize,
    /// translation followed by a rotation; six floats, or seven with a quaternion
    pub pose: usize,
}

impl Default for FrameLayout {
    fn default() -> Self {
        Self {
            intrinsics: 4,
            distortion: 5,
            pose: 6,
        }
    }
}

impl FrameLayout {
    pub fn check(
        &self,
        intrinsics: &[f32],
        distortion: &[f32],
        pose: &[f32],
    ) -> Result<(), BridgeError> {
        for (name, expected, actual) in [
            ("intrinsics", self.intrinsics, intrinsics.len()),
            ("distortion", self.distortion, distortion.len()),
            ("pose", self.pose, pose.len()),
        ] {
            if actual < expected {
                return Err(BridgeError::MalformedBuffer {
                    name,
                    expected,
                    actual,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_accepts_reference_frame() {
        let layout = FrameLayout::default();
        assert!(layout
            .check(&[1.0, 0.0, 0.0, 1.0], &[0.0; 5], &[0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0])
            .is_ok());
    }

    #[test]
    fn short_pose_is_rejected() {
        let err = FrameLayout::default()
            .check(&[0.0; 4], &[0.0; 5], &[0.0; 5])
            .unwrap_err();
        assert!(matches!(
            err,
            BridgeError::MalformedBuffer { name: "pose", expected: 6, actual: 5 }
        ));
    }

    #[test]
    fn default_layout_accepts_six_element_pose() {
        assert!(FrameLayout::default()
            .check(&[0.0; 4], &[0.0; 5], &[0.0; 6])
            .is_ok());
    }

    #[test]
    fn quaternion_layout_rejects_six_element_pose() {
        let layout = FrameLayout { pose: 7, ..FrameLayout::default() };
        assert!(layout.check(&[0.0; 4], &[0.0; 5], &[0.0; 6]).is_err());
    }
}
