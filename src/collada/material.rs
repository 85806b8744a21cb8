/// `<material>` entry. Effects are not parsed, so shading values are the
/// fixed defaults below.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub id: String,
    pub name: Option<String>,
    /// `instance_effect@url`, `#` stripped.
    pub effect_ref: Option<String>,
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    pub ambient: [f32; 4],
    pub shininess: f32,
}

impl Material {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            effect_ref: None,
            diffuse: [1.0, 1.0, 1.0, 1.0],
            specular: [0.0, 0.0, 0.0, 1.0],
            ambient: [0.0, 0.0, 0.0, 1.0],
            shininess: 0.0,
        }
    }
}
