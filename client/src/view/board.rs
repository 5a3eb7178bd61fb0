use common::board::{BoardLayout, SquareKind};
use egui::{Align2, Color32, FontId, Pos2, Rect, RichText};
use itertools::Itertools;

use crate::{
    commands::{CommandQueue, Roll},
    prelude::*,
    state::animation::Marker,
    widgets::{KindColor, SquareTile},
};

/// The board grid with the player's token and the roll button.
pub struct BoardPanel;

impl BoardPanel {
    pub fn ui(&mut self, ui: &mut egui::Ui, view: &BoardView, commands: &mut CommandQueue) {
        let layout = view.layout();

        let grid = egui::Grid::new("board")
            .spacing([6.0, 6.0])
            .show(ui, |ui| {
                for row in layout.grid_rows() {
                    for cell in row {
                        match cell {
                            Some(square) => {
                                ui.add(
                                    SquareTile::new(square, layout.kind_of(square))
                                        .zone(layout.zone_name(square))
                                        .occupied(square == view.position()),
                                );
                            }
                            None => {
                                ui.label("");
                            }
                        }
                    }
                    ui.end_row();
                }
            });

        paint_celebration(ui, grid.response.rect, view.celebration());

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            if ui
                .add_enabled(view.can_roll(), egui::Button::new("Roll the die"))
                .clicked()
            {
                commands.add(Roll);
            }
            if let Some(remaining) = view.die().remaining {
                ui.label(format!("Moving, {remaining} to go"));
            }
        });

        ui.add_space(8.0);
        ui.horizontal_wrapped(|ui| {
            for (kind, text) in legend(layout) {
                ui.label(RichText::new(text).background_color(kind.color()).color(Color32::WHITE));
            }
        });
    }
}

/// Stars drawn over the board, positioned in percent of its area.
fn paint_celebration(ui: &egui::Ui, board: Rect, markers: &[Marker]) {
    let painter = ui.painter();
    for marker in markers {
        let pos = Pos2::new(
            board.left() + board.width() * marker.left / 100.0,
            board.top() + board.height() * marker.top / 100.0,
        );
        painter.text(
            pos,
            Align2::CENTER_CENTER,
            "★",
            FontId::proportional(marker.size),
            Color32::GOLD,
        );
    }
}

/// Legend entries: one per special kind, trivia zones listed by name.
pub fn legend(layout: &BoardLayout) -> Vec<(SquareKind, String)> {
    let zones = layout
        .squares()
        .filter(|(_, kind)| *kind == SquareKind::TriviaZone)
        .filter_map(|(square, _)| {
            layout
                .zone_name(square)
                .map(|name| format!("{square} {name}"))
        })
        .join(", ");

    vec![
        (SquareKind::Bonus, "Bonus".to_string()),
        (SquareKind::Penalty, "Penalty".to_string()),
        (SquareKind::Arrival, "Finish".to_string()),
        (SquareKind::TriviaZone, format!("Trivia: {zones}")),
    ]
}
