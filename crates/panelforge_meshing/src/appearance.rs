//! Default appearance for faces with no material or surface assigned.

use panelforge_core::{AppearanceConfig, FaceDirection, MaterialId, SurfaceId};

/// Supplies the fallback material/surface pair for unassigned faces.
pub trait AppearanceProvider {
    /// Appearance to use for an unassigned face pointing in `direction`.
    fn default_appearance(&self, direction: FaceDirection) -> (MaterialId, SurfaceId);
}

/// The same fallback pair for every direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultAppearance {
    /// Fallback material.
    pub material: MaterialId,
    /// Fallback surface.
    pub surface: SurfaceId,
}

impl DefaultAppearance {
    /// Creates a provider returning a fixed pair.
    #[must_use]
    pub const fn new(material: MaterialId, surface: SurfaceId) -> Self {
        Self { material, surface }
    }

    /// Creates a provider from the configuration section.
    #[must_use]
    pub const fn from_config(config: &AppearanceConfig) -> Self {
        Self::new(config.material_id(), config.surface_id())
    }
}

impl Default for DefaultAppearance {
    fn default() -> Self {
        Self::from_config(&AppearanceConfig::default())
    }
}

impl AppearanceProvider for DefaultAppearance {
    fn default_appearance(&self, _direction: FaceDirection) -> (MaterialId, SurfaceId) {
        (self.material, self.surface)
    }
}

/// Resolves a face's stored appearance, filling unassigned parts.
pub(crate) fn resolve_appearance<A: AppearanceProvider + ?Sized>(
    provider: &A,
    direction: FaceDirection,
    material: MaterialId,
    surface: SurfaceId,
) -> (MaterialId, SurfaceId) {
    if !material.is_none() && !surface.is_none() {
        return (material, surface);
    }
    let (default_material, default_surface) = provider.default_appearance(direction);
    (
        if material.is_none() { default_material } else { material },
        if surface.is_none() { default_surface } else { surface },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fills_only_missing_parts() {
        let provider = DefaultAppearance::new(MaterialId::new(1), SurfaceId::new(2));
        let dir = FaceDirection::Up;

        assert_eq!(
            resolve_appearance(&provider, dir, MaterialId::NONE, SurfaceId::NONE),
            (MaterialId::new(1), SurfaceId::new(2))
        );
        assert_eq!(
            resolve_appearance(&provider, dir, MaterialId::new(7), SurfaceId::NONE),
            (MaterialId::new(7), SurfaceId::new(2))
        );
        assert_eq!(
            resolve_appearance(&provider, dir, MaterialId::new(7), SurfaceId::new(8)),
            (MaterialId::new(7), SurfaceId::new(8))
        );
    }
}
