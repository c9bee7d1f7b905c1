//! Rigid-transform composition for point-cloud placement.

use contracts::{Matrix4, PoseSample, RigidTransform, SessionExtrinsics};
use nalgebra as na;

fn isometry(rigid: &RigidTransform) -> na::Isometry3<f32> {
    let translation = na::Translation3::new(
        rigid.translation.x as f32,
        rigid.translation.y as f32,
        rigid.translation.z as f32,
    );
    let rotation = na::UnitQuaternion::from_quaternion(na::Quaternion::new(
        rigid.rotation.w as f32,
        rigid.rotation.x as f32,
        rigid.rotation.y as f32,
        rigid.rotation.z as f32,
    ));
    na::Isometry3::from_parts(translation, rotation)
}

/// Device pose expressed as a world-from-device homogeneous matrix
pub(crate) fn world_from_device(pose: &PoseSample) -> na::Matrix4<f32> {
    isometry(&RigidTransform {
        translation: pose.translation,
        rotation: pose.rotation,
    })
    .to_homogeneous()
}

/// Compose the fixed device-from-camera transform from session extrinsics.
///
/// Both extrinsics are given relative to the IMU frame, so
/// `device_from_camera = inverse(imu_T_device) * imu_T_camera`. Isometries
/// are always invertible; no fallible matrix inverse is involved.
pub(crate) fn device_from_camera(extrinsics: &SessionExtrinsics) -> na::Matrix4<f32> {
    let imu_from_device = isometry(&extrinsics.device_to_imu);
    let imu_from_camera = isometry(&extrinsics.depth_camera_to_imu);
    (imu_from_device.inverse() * imu_from_camera).to_homogeneous()
}

/// Convert to the column-major contract matrix
pub(crate) fn to_contract(matrix: &na::Matrix4<f32>) -> Matrix4 {
    let mut cols = [[0.0f32; 4]; 4];
    for (c, col) in cols.iter_mut().enumerate() {
        for (r, value) in col.iter_mut().enumerate() {
            *value = matrix[(r, c)];
        }
    }
    Matrix4(cols)
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{PoseStatus, Quaternion, Vector3};

    fn translated_pose(x: f64, y: f64, z: f64) -> PoseSample {
        PoseSample {
            timestamp: 0.0,
            translation: Vector3 { x, y, z },
            rotation: Quaternion::IDENTITY,
            status: PoseStatus::Valid,
        }
    }

    #[test]
    fn test_identity_extrinsics_compose_to_identity() {
        let composed = device_from_camera(&SessionExtrinsics::default());
        assert!((composed - na::Matrix4::identity()).abs().max() < 1e-6);
    }

    #[test]
    fn test_translation_lands_in_last_column() {
        let matrix = to_contract(&world_from_device(&translated_pose(1.0, 2.0, 3.0)));
        assert_eq!(matrix.translation(), [1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_extrinsic_translations_cancel() {
        let shift = RigidTransform {
            translation: Vector3 {
                x: 0.5,
                y: 0.0,
                z: 0.0,
            },
            rotation: Quaternion::IDENTITY,
        };
        let extrinsics = SessionExtrinsics {
            device_to_imu: shift,
            depth_camera_to_imu: shift,
        };

        // Identical offsets on both sides cancel out.
        let composed = device_from_camera(&extrinsics);
        assert!((composed - na::Matrix4::identity()).abs().max() < 1e-6);
    }

    #[test]
    fn test_camera_offset_survives_composition() {
        let extrinsics = SessionExtrinsics {
            device_to_imu: RigidTransform::default(),
            depth_camera_to_imu: RigidTransform {
                translation: Vector3 {
                    x: 0.0,
                    y: 0.1,
                    z: 0.0,
                },
                rotation: Quaternion::IDENTITY,
            },
        };

        let placement =
            to_contract(&(world_from_device(&translated_pose(1.0, 0.0, 0.0)) * device_from_camera(&extrinsics)));
        let t = placement.translation();
        assert!((t[0] - 1.0).abs() < 1e-6);
        assert!((t[1] - 0.1).abs() < 1e-6);
        assert!(t[2].abs() < 1e-6);
    }
}
