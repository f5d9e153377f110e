use crate::color::Color;
use crate::object::Object;

/// Procedural surface textures, evaluated over the object's 2D
/// surface-parameter projection.
#[derive(Debug, Clone, PartialEq)]
pub enum Texture {
    Plain {
        color: Color,
    },
    Checker {
        color1: Color,
        color2: Color,
        scale: f64,
    },
}

impl Texture {
    pub fn color_at(&self, obj: &Object, pos: geo::Vec3) -> Color {
        match self {
            Texture::Plain { color } => *color,
            Texture::Checker {
                color1,
                color2,
                scale,
            } => {
                let p = obj.projection(pos);
                let x = (p.x * scale).floor() as i64;
                let y = (p.y * scale).floor() as i64;
                if (x ^ y) & 1 != 0 {
                    *color1
                } else {
                    *color2
                }
            }
        }
    }

    /// The flat color of a plain texture; checker fields have none.
    pub fn plain_color(&self) -> Option<Color> {
        match self {
            Texture::Plain { color } => Some(*color),
            Texture::Checker { .. } => None,
        }
    }
}
