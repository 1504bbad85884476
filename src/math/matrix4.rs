//! 4x4 matrix, just enough for the point renderer's view-projection.

use super::Vector3;
use bytemuck::{Pod, Zeroable};

/// A column-major 4x4 matrix.
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Matrix4 {
    /// Matrix elements in column-major order.
    pub elements: [f32; 16],
}

impl Default for Matrix4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix4 {
    /// The identity matrix.
    pub const IDENTITY: Self = Self {
        elements: [
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ],
    };

    /// Create from a column-major array.
    #[inline]
    pub const fn from_array(elements: [f32; 16]) -> Self {
        Self { elements }
    }

    /// Convert to a column-major array.
    #[inline]
    pub const fn to_array(self) -> [f32; 16] {
        self.elements
    }

    /// Right-handed perspective projection.
    /// `fov_y` is the vertical field of view in radians.
    pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        let f = 1.0 / (fov_y / 2.0).tan();
        let nf = 1.0 / (near - far);

        let mut m = [0.0; 16];
        m[0] = f / aspect;
        m[5] = f;
        m[10] = (far + near) * nf;
        m[11] = -1.0;
        m[14] = 2.0 * far * near * nf;
        Self { elements: m }
    }

    /// Right-handed look-at view matrix.
    pub fn look_at(eye: Vector3, target: Vector3, up: Vector3) -> Self {
        let f = (target - eye).normalized();
        let s = f.cross(&up).normalized();
        let u = s.cross(&f);

        Self {
            elements: [
                s.x, u.x, -f.x, 0.0, //
                s.y, u.y, -f.y, 0.0, //
                s.z, u.z, -f.z, 0.0, //
                -s.dot(&eye),
                -u.dot(&eye),
                f.dot(&eye),
                1.0,
            ],
        }
    }

    /// Matrix product `self * other`.
    pub fn multiply(&self, other: &Matrix4) -> Self {
        let a = &self.elements;
        let b = &other.elements;
        let mut out = [0.0; 16];

        for col in 0..4 {
            for row in 0..4 {
                let mut sum = 0.0;
                for k in 0..4 {
                    sum += a[k * 4 + row] * b[col * 4 + k];
                }
                out[col * 4 + row] = sum;
            }
        }
        Self { elements: out }
    }

    /// Transform a point (w = 1) with perspective divide.
    pub fn transform_point(&self, p: Vector3) -> Vector3 {
        let e = &self.elements;
        let w = e[3] * p.x + e[7] * p.y + e[11] * p.z + e[15];
        let inv_w = if w != 0.0 { 1.0 / w } else { 1.0 };

        Vector3 {
            x: (e[0] * p.x + e[4] * p.y + e[8] * p.z + e[12]) * inv_w,
            y: (e[1] * p.x + e[5] * p.y + e[9] * p.z + e[13]) * inv_w,
            z: (e[2] * p.x + e[6] * p.y + e[10] * p.z + e[14]) * inv_w,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_multiply() {
        let m = Matrix4::perspective(1.0, 16.0 / 9.0, 0.1, 100.0);
        let r = m.multiply(&Matrix4::IDENTITY);
        assert_eq!(m, r);
    }

    #[test]
    fn test_identity_transform() {
        let p = Vector3::new(1.0, 2.0, 3.0);
        assert!(Matrix4::IDENTITY.transform_point(p).approx_eq(&p, 1e-6));
    }

    #[test]
    fn test_look_at_origin() {
        // A camera at +Z looking at the origin maps the origin in front of it.
        let view = Matrix4::look_at(
            Vector3::new(0.0, 0.0, 10.0),
            Vector3::ZERO,
            Vector3::UP,
        );
        let p = view.transform_point(Vector3::ZERO);
        assert!(p.z < 0.0);
    }
}
