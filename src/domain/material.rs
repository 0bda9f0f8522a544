//! Editable surface material.

use serde::Serialize;

use super::error::DomainError;

const KIND: &str = "material";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Color3 {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color3 {
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

/// A live material owned by the scene and edited in place by the material
/// editor.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub id: String,
    pub name: String,
    pub diffuse_color: Color3,
    pub specular_color: Color3,
    pub alpha: f32,
    pub texture_ids: Vec<String>,
    disposed: bool,
}

impl Material {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            diffuse_color: Color3::WHITE,
            specular_color: Color3::BLACK,
            alpha: 1.0,
            texture_ids: Vec::new(),
            disposed: false,
        }
    }

    pub fn with_diffuse(mut self, color: Color3) -> Self {
        self.diffuse_color = color;
        self
    }

    pub fn dispose(&mut self) {
        self.disposed = true;
        self.texture_ids.clear();
    }

    /// Independent copy renamed to `name`.
    pub fn clone_named(&self, name: &str) -> Result<Self, DomainError> {
        if self.disposed {
            return Err(DomainError::disposed(KIND, &self.id));
        }
        if !(0.0..=1.0).contains(&self.alpha) {
            return Err(DomainError::invalid(
                KIND,
                &self.id,
                format!("alpha {} is outside 0..=1", self.alpha),
            ));
        }

        let mut copy = self.clone();
        copy.name = name.to_owned();
        Ok(copy)
    }
}
