//! Built-in tool shapes.

use super::{ParamField, ParamSection, ShapeSchema};
use crate::params::ParamKind;

fn speed_fields(schema: ShapeSchema) -> ShapeSchema {
    schema
        .with_field(ParamField::new("feed", "Feed", ParamKind::Int, 300).in_section(ParamSection::Speed))
        .with_field(
            ParamField::new("spindle_speed", "Spindle speed", ParamKind::Int, 1000)
                .in_section(ParamSection::Speed),
        )
}

/// Cylindrical end mill with a flat bottom.
pub fn flat_bottom() -> ShapeSchema {
    speed_fields(
        ShapeSchema::new("flat_bottom", "Flat bottom", 10)
            .with_field(ParamField::new("radius", "Radius", ParamKind::Float, 1.0)),
    )
}

/// End mill with a hemispherical tip.
pub fn ball_nose() -> ShapeSchema {
    speed_fields(
        ShapeSchema::new("ball_nose", "Ball nose", 20)
            .with_field(ParamField::new("radius", "Radius", ParamKind::Float, 1.0)),
    )
}

/// Bull nose end mill: flat bottom with rounded corners.
pub fn toroidal() -> ShapeSchema {
    speed_fields(
        ShapeSchema::new("toroidal", "Toroidal", 30)
            .with_field(ParamField::new("radius", "Radius", ParamKind::Float, 1.0))
            .with_field(ParamField::new("minor_radius", "Torus radius", ParamKind::Float, 0.25)),
    )
}

/// All built-in shapes.
pub fn builtin_schemas() -> Vec<ShapeSchema> {
    vec![flat_bottom(), ball_nose(), toroidal()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParamValue;

    #[test]
    fn test_builtin_names_unique() {
        let schemas = builtin_schemas();
        let mut names: Vec<_> = schemas.iter().map(|s| s.name.clone()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), schemas.len());
    }

    #[test]
    fn test_flat_bottom_defaults() {
        let defaults = flat_bottom().default_values();
        assert_eq!(defaults["radius"], ParamValue::Float(1.0));
        assert_eq!(defaults["feed"], ParamValue::Int(300));
    }

    #[test]
    fn test_toroidal_has_minor_radius() {
        assert!(toroidal().field("minor_radius").is_some());
        assert!(flat_bottom().field("minor_radius").is_none());
    }
}
