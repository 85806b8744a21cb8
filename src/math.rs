use nalgebra::{Matrix4, Rotation3, Translation3, Unit, Vector3};

/// Row-major 4x4 identity, the default for bind-shape, inverse-bind and node
/// transforms.
pub const IDENTITY_MATRIX: [f32; 16] = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];

/// Builds a matrix from COLLADA's row-major 16-float layout.
///
/// # Arguments
///
/// * `values` - Sixteen floats, row after row.
///
/// # Returns
///
/// The equivalent `nalgebra` matrix.
pub fn matrix_from_row_major(values: &[f32; 16]) -> Matrix4<f32> {
    Matrix4::from_row_slice(values)
}

/// Flattens a matrix back into COLLADA's row-major 16-float layout.
pub fn matrix_to_row_major(matrix: &Matrix4<f32>) -> [f32; 16] {
    let transposed = matrix.transpose();
    let mut values = [0.0f32; 16];
    values.copy_from_slice(transposed.as_slice());
    values
}

/// Copies a 16-float block out of a longer slice.
/// Returns `None` when fewer than 16 values remain at `start`.
pub fn matrix_block(values: &[f32], start: usize) -> Option<[f32; 16]> {
    let end = start.checked_add(16)?;
    let block = values.get(start..end)?;
    let mut matrix = [0.0f32; 16];
    matrix.copy_from_slice(block);
    Some(matrix)
}

/// Homogeneous matrix for a `<translate>` element.
pub fn translation_matrix(x: f32, y: f32, z: f32) -> Matrix4<f32> {
    Translation3::new(x, y, z).to_homogeneous()
}

/// Homogeneous matrix for a `<rotate>` element.
///
/// # Arguments
///
/// * `axis` - Rotation axis; need not be normalized.
/// * `degrees` - Rotation angle in degrees, as COLLADA stores it.
///
/// # Returns
///
/// The rotation matrix, or identity when the axis has zero length.
pub fn rotation_matrix(axis: Vector3<f32>, degrees: f32) -> Matrix4<f32> {
    match Unit::try_new(axis, f32::EPSILON) {
        Some(axis) => Rotation3::from_axis_angle(&axis, degrees.to_radians()).to_homogeneous(),
        None => Matrix4::identity(),
    }
}

/// Homogeneous matrix for a `<scale>` element.
pub fn scale_matrix(x: f32, y: f32, z: f32) -> Matrix4<f32> {
    Matrix4::new_nonuniform_scaling(&Vector3::new(x, y, z))
}
