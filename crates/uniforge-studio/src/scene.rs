//! Sample uniform block: a camera plus a fixed set of point lights.

use uniforge_layout::{ElementType, FieldDescriptor, UniformValue};

pub const MAX_LIGHTS: u16 = 4;

pub mod ids {
    pub const VIEW_PROJ: u16 = 0;
    pub const CAMERA_POS: u16 = 1;
    pub const EXPOSURE: u16 = 2;
    pub const LIGHTS: u16 = 3;
    pub const LIGHT_COUNT: u16 = 4;
    pub const CASCADE_SPLITS: u16 = 5;

    pub mod light {
        pub const POSITION: u16 = 0;
        pub const RADIUS: u16 = 1;
        pub const COLOR: u16 = 2;
        pub const FALLOFF: u16 = 3;
    }
}

pub fn schema() -> Vec<FieldDescriptor> {
    use ElementType::*;

    let light = FieldDescriptor::structure(
        ids::LIGHTS,
        vec![
            FieldDescriptor::new(ids::light::POSITION, Vec3),
            FieldDescriptor::new(ids::light::RADIUS, Float32),
            FieldDescriptor::new(ids::light::COLOR, Vec4),
            FieldDescriptor::new(ids::light::FALLOFF, Vec2),
        ],
    )
    .with_count(MAX_LIGHTS);

    vec![
        FieldDescriptor::new(ids::VIEW_PROJ, Mat4),
        FieldDescriptor::new(ids::CAMERA_POS, Vec3),
        FieldDescriptor::new(ids::EXPOSURE, Float32),
        light,
        FieldDescriptor::new(ids::LIGHT_COUNT, UInt32),
        FieldDescriptor::array(ids::CASCADE_SPLITS, Float32, 3),
    ]
}

struct PointLight {
    position: [f32; 3],
    radius: f32,
    color: [f32; 4],
    falloff: [f32; 2],
}

impl PointLight {
    fn to_value(&self) -> UniformValue {
        UniformValue::structure([
            UniformValue::from(self.position),
            self.radius.into(),
            self.color.into(),
            self.falloff.into(),
        ])
    }
}

/// Values for [`schema`] at time `t` (seconds).
pub fn values(t: f32) -> Vec<UniformValue> {
    let lights: Vec<PointLight> = (0..MAX_LIGHTS)
        .map(|i| {
            let angle = t + f32::from(i) * std::f32::consts::FRAC_PI_2;
            PointLight {
                position: [angle.cos() * 4.0, 2.0, angle.sin() * 4.0],
                radius: 6.0,
                color: [1.0, 0.9 - 0.2 * f32::from(i), 0.7, 1.0],
                falloff: [1.0, 0.35],
            }
        })
        .collect();

    vec![
        perspective_view_proj().into(),
        [0.0f32, 3.0, 8.0].into(),
        1.25f32.into(),
        UniformValue::Array(lights.iter().map(PointLight::to_value).collect()),
        u32::from(MAX_LIGHTS).into(),
        UniformValue::array([8.0f32, 24.0, 64.0]),
    ]
}

/// A fixed view-projection matrix (column-major), enough for inspection.
fn perspective_view_proj() -> [[f32; 4]; 4] {
    let f = 1.0 / (std::f32::consts::FRAC_PI_4 / 2.0).tan();
    let (near, far) = (0.1f32, 100.0f32);
    [
        [f / 1.6, 0.0, 0.0, 0.0],
        [0.0, f, 0.0, 0.0],
        [0.0, 0.0, far / (near - far), -1.0],
        [0.0, -3.0 * f, near * far / (near - far) - 8.0, 0.0],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use uniforge_layout::{serialize, Layout};

    #[test]
    fn sample_schema_compiles() {
        let layout = Layout::compile(&schema()).unwrap();
        // Mat4 64, Vec3 at 64, Float32 at 80 -> 84; lights start at 96.
        // A light is Vec3 (one full slot), f32, Vec4, Vec2 -> 56, padded to 64.
        let lights = layout.lookup(ids::LIGHTS, ElementType::Struct).unwrap();
        assert_eq!(lights.aligned_offset(), 96);
        assert_eq!(lights.stride(), 64);
        let count = layout.lookup(ids::LIGHT_COUNT, ElementType::UInt32).unwrap();
        assert_eq!(count.aligned_offset(), 352);
        let splits = layout.lookup(ids::CASCADE_SPLITS, ElementType::Float32).unwrap();
        assert_eq!(splits.aligned_offset(), 368);
        assert_eq!(layout.size_bytes(), 416);
    }

    #[test]
    fn sample_values_fit_schema() {
        let layout = Layout::compile(&schema()).unwrap();
        let mut buf = vec![0u8; layout.size_bytes() as usize];
        let out = serialize(&layout, &mut buf, &values(0.0)).unwrap();
        assert_eq!(out.fields_consumed, layout.flat_len());
    }
}
