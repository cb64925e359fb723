//! Opaque camera position blobs for saving and restoring views
//!
//! A blob is 28 bytes: seven little-endian `f32` values, the translation
//! `x y z` followed by the rotation quaternion `i j k w`.

use bytemuck::{Pod, Zeroable};
use cldview_core::{Error, Node, Quaternionf, Result, RigidTransform, Vector3f};
use nalgebra::Quaternion;
use tracing::debug;

/// Size of a position blob in bytes
pub const POSITION_DATA_LEN: usize = std::mem::size_of::<PositionRecord>();

/// On-disk layout; each field holds the little-endian bits of an `f32`
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct PositionRecord {
    translation: [u32; 3],
    rotation: [u32; 4],
}

impl PositionRecord {
    fn from_transform(transform: &RigidTransform) -> Self {
        let t = transform.translation;
        let q = transform.rotation.coords;
        Self {
            translation: [t.x, t.y, t.z].map(|v| v.to_bits().to_le()),
            rotation: [q.x, q.y, q.z, q.w].map(|v| v.to_bits().to_le()),
        }
    }

    fn to_transform(self) -> Result<RigidTransform> {
        let [x, y, z] = self.translation.map(|bits| f32::from_bits(u32::from_le(bits)));
        let [i, j, k, w] = self.rotation.map(|bits| f32::from_bits(u32::from_le(bits)));

        if ![x, y, z, i, j, k, w].iter().all(|v| v.is_finite()) {
            return Err(Error::CorruptData("position contains non-finite values".to_string()));
        }
        let rotation = Quaternionf::try_new(Quaternion::new(w, i, j, k), f32::EPSILON)
            .ok_or_else(|| Error::CorruptData("position has a zero-length rotation".to_string()))?;

        Ok(RigidTransform::from_translation_rotation(Vector3f::new(x, y, z), rotation))
    }
}

/// Encode a transform as a position blob
pub fn encode_position(transform: &RigidTransform) -> Vec<u8> {
    bytemuck::bytes_of(&PositionRecord::from_transform(transform)).to_vec()
}

/// Decode a position blob produced by [`encode_position`]
pub fn decode_position(data: &[u8]) -> Result<RigidTransform> {
    let record: PositionRecord = bytemuck::try_pod_read_unaligned(data).map_err(|_| {
        Error::CorruptData(format!(
            "position data must be {} bytes, got {}",
            POSITION_DATA_LEN,
            data.len()
        ))
    })?;
    record.to_transform()
}

fn require_camera(node: &Node) -> Result<()> {
    if node.is_camera() {
        Ok(())
    } else {
        Err(Error::Unsupported(format!(
            "'{}' is a {} node, only the camera has position data",
            node.name(),
            node.role()
        )))
    }
}

/// Serialize the camera's current transform
pub fn position_data(node: &Node) -> Result<Vec<u8>> {
    require_camera(node)?;
    Ok(encode_position(node.transform()))
}

/// Restore the camera's transform from a blob made by [`position_data`].
///
/// On error the node is left as it was. The timeline is never touched.
pub fn set_position(node: &mut Node, data: &[u8]) -> Result<()> {
    require_camera(node)?;
    let transform = decode_position(data)?;
    node.set_transform(transform);
    debug!(node = %node.name(), "Camera position restored");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_is_little_endian() {
        let transform = RigidTransform::translation(Vector3f::new(1.0, -2.0, 0.5));
        let data = encode_position(&transform);
        assert_eq!(data.len(), 28);
        assert_eq!(&data[0..4], &1.0f32.to_le_bytes());
        assert_eq!(&data[4..8], &(-2.0f32).to_le_bytes());
        assert_eq!(&data[24..28], &1.0f32.to_le_bytes());
    }

    #[test]
    fn test_decode_rejects_bad_blobs() {
        let data = encode_position(&RigidTransform::identity());
        assert!(matches!(decode_position(&data[..27]), Err(Error::CorruptData(_))));
        assert!(matches!(decode_position(&[data.clone(), vec![0]].concat()), Err(Error::CorruptData(_))));
        assert!(matches!(decode_position(&[0u8; 28]), Err(Error::CorruptData(_))));

        let mut nan = data;
        nan[0..4].copy_from_slice(&f32::NAN.to_le_bytes());
        assert!(matches!(decode_position(&nan), Err(Error::CorruptData(_))));
    }

    #[test]
    fn test_decode_normalizes_rotation() {
        let mut data = encode_position(&RigidTransform::identity());
        data[24..28].copy_from_slice(&2.0f32.to_le_bytes());
        let transform = decode_position(&data).unwrap();
        assert!(transform.is_identity(1e-6));
    }
}
