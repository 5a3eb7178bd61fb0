mod board;
mod modals;

use egui::{Align2, Key, RichText, TopBottomPanel, Window};

pub use board::*;
pub use modals::*;

use crate::{
    commands::{Choose, CommandQueue, Dismiss, Exit, Hint, Roll, Submit},
    prelude::*,
    state::Overlay,
    widgets::hex_color,
};

const CHOICE_KEYS: [Key; 9] = [
    Key::Num1,
    Key::Num2,
    Key::Num3,
    Key::Num4,
    Key::Num5,
    Key::Num6,
    Key::Num7,
    Key::Num8,
    Key::Num9,
];

/// Draws a whole frame: status bar, board and the current modal.
pub fn show(
    ctx: &egui::Context,
    view: &BoardView,
    notice: Option<&str>,
    commands: &mut CommandQueue,
) {
    TopBottomPanel::top("status").show(ctx, |ui| {
        ui.horizontal(|ui| {
            status_bar(ui, view);
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Exit game").clicked() {
                    commands.add(Exit);
                }
            });
        });
    });

    if let Some(notice) = notice {
        TopBottomPanel::bottom("notice").show(ctx, |ui| {
            ui.label(notice);
        });
    }

    egui::CentralPanel::default().show(ctx, |ui| {
        BoardPanel.ui(ui, view, commands);
    });

    if let Some(modal) = modal_for(view) {
        Window::new(modal.title())
            .id(egui::Id::new("overlay"))
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| modal.ui(ui, commands));
    }

    shortcuts(ctx, view, commands);
}

fn status_bar(ui: &mut egui::Ui, view: &BoardView) {
    ui.label(RichText::new(format!("Score: {}", view.score())).strong());
    ui.separator();
    ui.label(format!(
        "Square: {}/{}",
        view.position(),
        view.layout().terminal()
    ));

    if let Some(roll) = view.die().last_roll {
        ui.separator();
        ui.label("Die:");
        ui.label(
            RichText::new(format!(" {roll} "))
                .strong()
                .background_color(hex_color(roll.color())),
        );
    }
}

pub fn modal_for(view: &BoardView) -> Option<Box<dyn Modal + '_>> {
    match view.overlay() {
        Overlay::None => None,
        Overlay::Bonus => Some(Box::new(BonusModal)),
        Overlay::Penalty => Some(Box::new(PenaltyModal)),
        Overlay::Arrival { countdown } => Some(Box::new(ArrivalModal {
            countdown: *countdown,
            score: view.score(),
            finish: view.finish(),
        })),
        Overlay::Trivia(session) => Some(Box::new(QuestionModal(session))),
    }
}

/// Keyboard equivalents of the buttons.
pub fn shortcuts(ctx: &egui::Context, view: &BoardView, commands: &mut CommandQueue) {
    if ctx.wants_keyboard_input() {
        return;
    }

    ctx.input(|input| {
        if view.can_roll() && (input.key_pressed(Key::Space) || input.key_pressed(Key::R)) {
            commands.add(Roll);
        }
        if view.trivia().is_none() {
            if input.key_pressed(Key::Escape) {
                commands.add(Dismiss);
            }
            return;
        }

        if input.key_pressed(Key::H) {
            commands.add(Hint);
        }
        for (n, key) in CHOICE_KEYS.iter().enumerate() {
            if input.key_pressed(*key) {
                commands.add(Choose(n));
            }
        }
        if input.key_pressed(Key::Enter) {
            commands.add(Submit);
        }
        if input.key_pressed(Key::Escape) {
            commands.add(Dismiss);
        }
    });
}

#[cfg(test)]
mod tests {
    use common::{board::BoardLayout, rules::RollOutcome};
    use egui::{Event, Modifiers, RawInput};
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::{commands::run_all, config::Timings};

    fn session() -> Session {
        let view = BoardView::new(
            BoardLayout::classic(),
            Timings::default(),
            StdRng::seed_from_u64(2),
        );
        let mut session = Session::new(view);
        session.mount(GameId::parse("7").as_ref(), None);
        session.drain_outbound();
        session
    }

    fn press(key: Key) -> RawInput {
        RawInput {
            events: vec![Event::Key {
                key,
                physical_key: None,
                pressed: true,
                repeat: false,
                modifiers: Modifiers::NONE,
            }],
            ..Default::default()
        }
    }

    /// One frame with `input`, returning the commands the frame queued.
    fn frame(session: &Session, input: RawInput) -> Vec<Box<dyn crate::commands::Command>> {
        let ctx = egui::Context::default();
        let mut queued = Vec::new();
        let _ = ctx.run(input, |ctx| {
            show(
                ctx,
                session.view(),
                None,
                &mut CommandQueue {
                    command_queue: &mut queued,
                },
            );
        });
        queued
    }

    #[test]
    fn space_rolls_the_die() {
        let mut session = session();
        let queued = frame(&session, press(Key::Space));
        assert_eq!(queued.len(), 1);

        assert_eq!(run_all(queued, &mut session), None);
        assert!(session.view().is_animating());

        // Nothing is queued while the token is moving.
        assert!(frame(&session, press(Key::R)).is_empty());
    }

    #[test]
    fn number_keys_only_answer_open_questions() {
        let session = session();
        assert!(frame(&session, press(Key::Num2)).is_empty());
        assert!(frame(&session, RawInput::default()).is_empty());
    }

    #[test]
    fn bonus_square_opens_its_modal() {
        let mut session = session();
        session.with_view(|view| view.roll_with(RollOutcome::new(6).unwrap()));
        session.advance_by(std::time::Duration::from_millis(7 * 320));

        assert_eq!(
            modal_for(session.view()).map(|modal| modal.title()).as_deref(),
            Some("Bonus!")
        );

        let queued = frame(&session, press(Key::Escape));
        assert_eq!(run_all(queued, &mut session), None);
        assert!(modal_for(session.view()).is_none());
    }
}
