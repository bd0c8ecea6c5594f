/// Semantic color for a notification. Slack ignores it (its payload is
/// plain text); Discord maps it to an embed color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Green,
    Red,
    Blue,
    Yellow,
}

impl Color {
    /// Decimal RGB value Discord expects in an embed's `color` field.
    pub(crate) fn discord_rgb(self) -> u32 {
        match self {
            Color::Green => 5_763_719,
            Color::Red => 15_548_997,
            Color::Blue => 3_447_003,
            Color::Yellow => 16_776_960,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::Blue
    }
}
