use common::{board::SquareKind, BoardPosition};
use egui::{Align2, Color32, FontId, Sense, Stroke, Vec2, Widget};

use super::KindColor;

pub const TILE_SIZE: Vec2 = Vec2::new(64.0, 48.0);

/// One square of the path, with the token drawn on it when occupied.
pub struct SquareTile<'a> {
    square: BoardPosition,
    kind: SquareKind,
    zone: Option<&'a str>,
    occupied: bool,
}

impl<'a> SquareTile<'a> {
    pub fn new(square: BoardPosition, kind: SquareKind) -> Self {
        Self {
            square,
            kind,
            zone: None,
            occupied: false,
        }
    }

    pub fn zone(mut self, zone: Option<&'a str>) -> Self {
        self.zone = zone;
        self
    }

    pub fn occupied(mut self, occupied: bool) -> Self {
        self.occupied = occupied;
        self
    }
}

impl Widget for SquareTile<'_> {
    fn ui(self, ui: &mut egui::Ui) -> egui::Response {
        let (rect, response) = ui.allocate_exact_size(TILE_SIZE, Sense::hover());

        if ui.is_rect_visible(rect) {
            let painter = ui.painter();
            painter.rect_filled(rect, 6.0, self.kind.color());
            painter.text(
                rect.left_top() + Vec2::new(6.0, 4.0),
                Align2::LEFT_TOP,
                self.square.to_string(),
                FontId::monospace(12.0),
                Color32::WHITE,
            );

            if self.occupied {
                painter.circle(
                    rect.center() + Vec2::new(0.0, 6.0),
                    10.0,
                    Color32::from_rgb(0xf1, 0xc4, 0x0f),
                    Stroke::new(2.0, Color32::BLACK),
                );
            }
        }

        let label: &'static str = self.kind.into();
        match self.zone {
            Some(zone) => response.on_hover_text(format!("{label}: {zone}")),
            None => response.on_hover_text(label),
        }
    }
}
