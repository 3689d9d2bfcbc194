//! Visual styling shared by every rendering backend.

use spire_defence_core::TowerKind;

use crate::Color;

/// Side lengths of the three stacked tower squares, as fractions of a tile.
///
/// An 80/60/40 pixel stack on a 100 pixel tile, kept resolution
/// independent.
pub const TOWER_LAYER_FRACTIONS: [f32; 3] = [0.8, 0.6, 0.4];

/// Concentric square colors drawn for a tower, outermost first.
#[must_use]
pub fn tower_layer_colors(kind: TowerKind) -> [Color; 3] {
    match kind {
        TowerKind::Pulse => [
            Color::from_rgb_u8(0x2b, 0x50, 0x7a),
            Color::from_rgb_u8(0x3e, 0x74, 0xad),
            Color::from_rgb_u8(0x7f, 0xb2, 0xe5),
        ],
        TowerKind::Cannon => [
            Color::from_rgb_u8(0x5a, 0x3a, 0x24),
            Color::from_rgb_u8(0x8a, 0x5a, 0x35),
            Color::from_rgb_u8(0xc8, 0x8a, 0x52),
        ],
    }
}

/// Brightens a tower's layer colors as it levels up.
///
/// Level zero renders the base palette untouched; every further level
/// lightens each layer a little so upgrades read at a glance.
#[must_use]
pub fn leveled_layer_colors(kind: TowerKind, level: u8) -> [Color; 3] {
    let base = tower_layer_colors(kind);
    if level == 0 {
        return base;
    }

    let amount = (f32::from(level) * 0.12).min(0.5);
    base.map(|color| color.lighten(amount))
}

/// Outline drawn around the outer square of the selected tower.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SelectionOutline {
    /// Stroke color of the outline.
    pub color: Color,
    /// Stroke thickness in world units.
    pub thickness: f32,
}

impl SelectionOutline {
    /// Default white outline used for the selected tower.
    #[must_use]
    pub const fn default_style() -> Self {
        Self {
            color: Color::new(1.0, 1.0, 1.0, 1.0),
            thickness: 4.0,
        }
    }
}

/// Translucent disc visualising a tower's targeting range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RangeRingStyle {
    /// Fill color of the disc.
    pub fill: Color,
    /// Stroke color of the disc outline.
    pub outline: Color,
    /// Stroke thickness in world units.
    pub thickness: f32,
}

impl RangeRingStyle {
    /// Default subtle dark ring.
    #[must_use]
    pub const fn default_style() -> Self {
        Self {
            fill: Color::new(0.0, 0.0, 0.0, 15.0 / 255.0),
            outline: Color::new(0.0, 0.0, 0.0, 50.0 / 255.0),
            thickness: 2.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_fractions_shrink_inward() {
        assert!(TOWER_LAYER_FRACTIONS[0] > TOWER_LAYER_FRACTIONS[1]);
        assert!(TOWER_LAYER_FRACTIONS[1] > TOWER_LAYER_FRACTIONS[2]);
    }

    #[test]
    fn kinds_use_distinct_palettes() {
        assert_ne!(
            tower_layer_colors(TowerKind::Pulse),
            tower_layer_colors(TowerKind::Cannon)
        );
    }

    #[test]
    fn leveling_lightens_the_palette() {
        let base = leveled_layer_colors(TowerKind::Pulse, 0);
        let upgraded = leveled_layer_colors(TowerKind::Pulse, 2);

        assert_eq!(base, tower_layer_colors(TowerKind::Pulse));
        for (before, after) in base.iter().zip(upgraded.iter()) {
            assert!(after.red >= before.red);
            assert!(after.green >= before.green);
            assert!(after.blue >= before.blue);
        }
        assert_ne!(base, upgraded);
    }
}
