//! Textual HUD model rendered by backends.

use spire_defence_core::{Gold, TowerKind};

/// Removes trailing zeros from a formatted float and returns it as a string.
///
/// The value is first printed with `max_decimals` fractional digits, then
/// trailing zeros and a dangling decimal point are stripped, so `12.50`
/// becomes `12.5` and `3.00` becomes `3`.
#[must_use]
pub fn trim_trailing_zeros(value: f32, max_decimals: usize) -> String {
    let formatted = format!("{value:.max_decimals$}");
    if !formatted.contains('.') {
        return formatted;
    }

    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    trimmed.to_string()
}

/// Stat readout for the currently selected tower.
#[derive(Clone, Debug, PartialEq)]
pub struct TowerHudEntry {
    /// Kind of the selected tower.
    pub kind: TowerKind,
    /// Level the tower stands at.
    pub level: u8,
    /// Highest level the tower can reach.
    pub max_level: u8,
    /// Targeting range at the current level, in world units.
    pub range: f32,
    /// Damage per projectile hit at the current level.
    pub damage: u32,
    /// Price of the next level, or `None` at maximum level.
    pub upgrade_cost: Option<Gold>,
    /// Gold refunded if the tower is sold now.
    pub sell_refund: Gold,
}

impl TowerHudEntry {
    /// Human-readable kind label.
    #[must_use]
    pub fn kind_label(&self) -> &'static str {
        match self.kind {
            TowerKind::Pulse => "Pulse",
            TowerKind::Cannon => "Cannon",
        }
    }

    /// Formats the entry into HUD lines, one string per row.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!(
                "{} tower  Lv {}/{}",
                self.kind_label(),
                self.level + 1,
                self.max_level + 1
            ),
            format!(
                "Range {}  Damage {}",
                trim_trailing_zeros(self.range, 1),
                self.damage
            ),
        ];

        match self.upgrade_cost {
            Some(cost) => lines.push(format!("[U]pgrade {}g", cost.get())),
            None => lines.push("Max level".to_string()),
        }
        lines.push(format!("Sell for {}g", self.sell_refund.get()));

        lines
    }
}

/// Complete HUD state for a frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HudModel {
    /// Player gold balance.
    pub gold: Gold,
    /// Lives remaining.
    pub lives: u32,
    /// Kind armed for the next placement.
    pub armed_kind: Option<TowerKind>,
    /// Stats for the selected tower, when one is selected.
    pub selected: Option<TowerHudEntry>,
}

impl HudModel {
    /// Formats the always-visible status row.
    #[must_use]
    pub fn status_line(&self) -> String {
        let mut line = format!("Gold {}  Lives {}", self.gold.get(), self.lives);
        if let Some(kind) = self.armed_kind {
            let label = match kind {
                TowerKind::Pulse => "Pulse",
                TowerKind::Cannon => "Cannon",
            };
            line.push_str(&format!("  Building: {label}"));
        }
        line
    }
}
