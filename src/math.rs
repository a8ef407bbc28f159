use std::f64::consts::PI;

/// Golden angle used to space points on a Fibonacci sphere
pub const GOLDEN_ANGLE: f64 = PI * (3.0 - 2.236_067_977_499_79);

/// Multiplies a 3x3 matrix by a 3-dimensional vector
pub fn multiply_matrix_vector(matrix: &[[f64; 3]; 3], vector: &[f64; 3]) -> [f64; 3] {
    let mut result = [0.0; 3];
    for i in 0..3 {
        for j in 0..3 {
            result[i] += matrix[i][j] * vector[j];
        }
    }
    result
}

/// Multiplies two 3x3 matrices
pub fn multiply_matrices(a: &[[f64; 3]; 3], b: &[[f64; 3]; 3]) -> [[f64; 3]; 3] {
    let mut result = [[0.0; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            for k in 0..3 {
                result[i][j] += a[i][k] * b[k][j];
            }
        }
    }
    result
}

/// Rotation about the Y axis: `x' = x cos - z sin`, `z' = z cos + x sin`
pub fn rotation_y(angle: f64) -> [[f64; 3]; 3] {
    let (sin, cos) = angle.sin_cos();
    [[cos, 0.0, -sin], [0.0, 1.0, 0.0], [sin, 0.0, cos]]
}

/// Rotation about the X axis: `y' = y cos - z sin`, `z' = z cos + y sin`
pub fn rotation_x(angle: f64) -> [[f64; 3]; 3] {
    let (sin, cos) = angle.sin_cos();
    [[1.0, 0.0, 0.0], [0.0, cos, -sin], [0.0, sin, cos]]
}

/// Combined rotation that applies `angle_y` first, then `angle_x`
pub fn rotation_yx(angle_y: f64, angle_x: f64) -> [[f64; 3]; 3] {
    multiply_matrices(&rotation_x(angle_x), &rotation_y(angle_y))
}

/// Point `index` of `count` on a Fibonacci sphere of the given radius.
///
/// A single point sits at the origin since the lattice needs at least two
/// samples to span the poles.
pub fn fibonacci_sphere_point(index: usize, count: usize, radius: f64) -> [f64; 3] {
    if count < 2 {
        return [0.0; 3];
    }
    let y = 1.0 - (index as f64 / (count - 1) as f64) * 2.0;
    let radius_at_y = (1.0 - y * y).max(0.0).sqrt();
    let theta = GOLDEN_ANGLE * index as f64;
    [
        theta.cos() * radius_at_y * radius,
        y * radius,
        theta.sin() * radius_at_y * radius,
    ]
}

/// Perspective scale for a point at depth `z`, or `None` when the point is
/// at or behind the camera plane
pub fn perspective_scale(focal_length: f64, z: f64) -> Option<f64> {
    let denominator = focal_length + z;
    if denominator <= f64::EPSILON {
        return None;
    }
    let scale = focal_length / denominator;
    scale.is_finite().then_some(scale)
}

/// Opacity for a projected scale; distant nodes fade but never vanish
pub fn depth_alpha(scale: f64) -> f64 {
    ((scale - 0.2) * 2.0).clamp(0.1, 1.0)
}

/// Length of a 2D vector
pub fn length(v: [f64; 2]) -> f64 {
    (v[0] * v[0] + v[1] * v[1]).sqrt()
}
