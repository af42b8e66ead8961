//! Per-instance data structures for GPU upload.
//!
//! Layouts are `#[repr(C)]` plain-old-data so the CPU-side arrays can be
//! cast straight to bytes for the device. Static attributes are written
//! once at initialize; dynamic attributes are rewritten every frame.

use bytemuck::{Pod, Zeroable};

/// Static per-instance data, immutable after generation.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct StaticInstance {
    /// World position in the ground plane.
    pub position: [f32; 2],

    /// 2x2 rotation-and-scale basis, column major.
    pub basis: [f32; 4],

    /// Per-instance animation phase in [0, 2π).
    pub phase: f32,

    /// Padding to a 16-byte multiple.
    pub _pad: f32,
}

impl StaticInstance {
    /// Size in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Vertex attributes for the static instance slot.
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![1 => Float32x2, 2 => Float32x4, 3 => Float32];

    /// Builds an instance from a world position and jitter parameters.
    #[must_use]
    pub fn new(position: [f32; 2], angle: f32, scale: f32, phase: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self {
            position,
            basis: [cos * scale, sin * scale, -sin * scale, cos * scale],
            phase,
            _pad: 0.0,
        }
    }

    /// Per-instance vertex buffer layout for this slot.
    #[must_use]
    pub const fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: Self::SIZE as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Dynamic per-instance data, recomputed every frame.
///
/// Depends only on `(position, global_time)`; no history is kept, so the
/// array is fully recomputable at any frame.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct DynamicInstance {
    /// Displacement of the blade tip in the ground plane.
    pub sway: [f32; 2],
}

impl DynamicInstance {
    /// Size in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    const ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![4 => Float32x2];

    /// Per-instance vertex buffer layout for this slot.
    #[must_use]
    pub const fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: Self::SIZE as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Camera uniform: the view-projection matrix supplied by the caller
/// each tick.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct CameraUniform {
    /// Combined view-projection matrix, column major.
    pub view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    /// Identity matrix, useful for tests and screen-space debugging.
    pub const IDENTITY: Self = Self {
        view_proj: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Wraps a caller-supplied matrix.
    #[inline]
    #[must_use]
    pub const fn new(view_proj: [[f32; 4]; 4]) -> Self {
        Self { view_proj }
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// One vertex of the base blade mesh.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, Pod, Zeroable)]
pub struct MeshVertex {
    /// Corner position: x is width in [-0.5, 0.5], y is height in [0, 1].
    pub corner: [f32; 2],
}

impl MeshVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    /// Per-vertex buffer layout for the base mesh slot.
    #[must_use]
    pub const fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// The fixed base mesh every instance repeats: a unit blade quad as two
/// triangles.
pub const BLADE_MESH: [MeshVertex; 6] = [
    MeshVertex { corner: [-0.5, 0.0] },
    MeshVertex { corner: [0.5, 0.0] },
    MeshVertex { corner: [0.5, 1.0] },
    MeshVertex { corner: [-0.5, 0.0] },
    MeshVertex { corner: [0.5, 1.0] },
    MeshVertex { corner: [-0.5, 1.0] },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_instance_size() {
        // Two vec2s + vec4 + phase + pad = 32 bytes.
        assert_eq!(StaticInstance::SIZE, 32);
        assert_eq!(StaticInstance::SIZE % 16, 0, "static stride must stay 16-byte aligned");
    }

    #[test]
    fn test_dynamic_instance_size() {
        assert_eq!(DynamicInstance::SIZE, 8);
    }

    #[test]
    fn test_alignment() {
        assert_eq!(std::mem::align_of::<StaticInstance>(), 4);
        assert_eq!(std::mem::align_of::<DynamicInstance>(), 4);
        assert_eq!(std::mem::align_of::<CameraUniform>(), 4);
    }

    #[test]
    fn test_basis_is_rotation_times_scale() {
        let instance = StaticInstance::new([1.0, 2.0], std::f32::consts::FRAC_PI_2, 2.0, 0.0);
        let [a, b, c, d] = instance.basis;

        // Columns of a 90-degree rotation scaled by 2.
        assert!((a - 0.0).abs() < 1e-6);
        assert!((b - 2.0).abs() < 1e-6);
        assert!((c + 2.0).abs() < 1e-6);
        assert!((d - 0.0).abs() < 1e-6);
    }

    #[test]
    fn test_blade_mesh_spans_unit_height() {
        let min_y = BLADE_MESH.iter().map(|v| v.corner[1]).fold(f32::INFINITY, f32::min);
        let max_y = BLADE_MESH.iter().map(|v| v.corner[1]).fold(f32::NEG_INFINITY, f32::max);
        assert_eq!(min_y, 0.0, "blade root must sit on the ground");
        assert_eq!(max_y, 1.0, "blade tip must reach unit height");
    }
}
