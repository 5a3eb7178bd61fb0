use common::board::SquareKind;
use egui::Color32;

pub mod square_tile;

pub use square_tile::SquareTile;

pub trait KindColor {
    fn color(self) -> Color32;
}

impl KindColor for SquareKind {
    fn color(self) -> Color32 {
        match self {
            SquareKind::Start => Color32::from_rgb(0x7f, 0x8c, 0x8d),
            SquareKind::Empty => Color32::from_rgb(0x3a, 0x3f, 0x44),
            SquareKind::Bonus => Color32::from_rgb(0x27, 0xae, 0x60),
            SquareKind::Penalty => Color32::from_rgb(0xc0, 0x39, 0x2b),
            SquareKind::TriviaZone => Color32::from_rgb(0x29, 0x80, 0xb9),
            SquareKind::Arrival => Color32::from_rgb(0xc9, 0xa1, 0x4a),
        }
    }
}

/// Colour of a `#rrggbb` die face, grey when it does not parse.
pub fn hex_color(hex: &str) -> Color32 {
    Color32::from_hex(hex).unwrap_or(Color32::GRAY)
}
