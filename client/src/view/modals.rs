use common::rules::{expected_answer_delta, BONUS_POINTS, HINT_COST, PENALTY_POINTS};
use egui::{Color32, RichText};

use crate::{
    commands::{Choose, CommandQueue, Dismiss, Hint, Submit},
    prelude::*,
    state::trivia::{Prompt, TriviaPhase, TriviaSession},
};

/// Content of the overlay window. The window itself is owned by the caller.
pub trait Modal {
    fn title(&self) -> String;
    fn ui(&self, ui: &mut egui::Ui, commands: &mut CommandQueue);
}

pub struct BonusModal;

impl Modal for BonusModal {
    fn title(&self) -> String {
        "Bonus!".into()
    }

    fn ui(&self, ui: &mut egui::Ui, commands: &mut CommandQueue) {
        ui.label(
            RichText::new(format!("You earned {BONUS_POINTS} points."))
                .color(Color32::from_rgb(0x27, 0xae, 0x60))
                .heading(),
        );
        if ui.button("Close").clicked() {
            commands.add(Dismiss);
        }
    }
}

pub struct PenaltyModal;

impl Modal for PenaltyModal {
    fn title(&self) -> String {
        "Penalty!".into()
    }

    fn ui(&self, ui: &mut egui::Ui, commands: &mut CommandQueue) {
        ui.label(
            RichText::new(format!("You lost {PENALTY_POINTS} points."))
                .color(Color32::from_rgb(0xc0, 0x39, 0x2b))
                .heading(),
        );
        if ui.button("Close").clicked() {
            commands.add(Dismiss);
        }
    }
}

pub struct ArrivalModal<'a> {
    pub countdown: u32,
    pub score: Score,
    pub finish: Option<&'a FinishReply>,
}

impl ArrivalModal<'_> {
    /// Line under the headline: the countdown, then the server's summary.
    pub fn status_line(&self) -> String {
        match self.finish {
            Some(finish) => {
                let outcome = if finish.victory { "Victory" } else { "Game over" };
                let mut line = format!("{outcome}: final score {}", finish.final_score);
                if let Some(time) = &finish.play_time {
                    line.push_str(&format!(" in {time}"));
                }
                line
            }
            None if self.countdown > 0 => format!("Finishing in {}s...", self.countdown),
            None => "Finishing...".into(),
        }
    }
}

impl Modal for ArrivalModal<'_> {
    fn title(&self) -> String {
        "Finish".into()
    }

    fn ui(&self, ui: &mut egui::Ui, _commands: &mut CommandQueue) {
        ui.heading(format!("You reached the finish with {} points!", self.score));
        ui.label(self.status_line());

        if let Some(finish) = self.finish {
            if !finish.message.is_empty() {
                ui.label(&finish.message);
            }
            if let (Some(games), Some(victories)) = (finish.games_completed, finish.victories) {
                ui.label(format!("Games completed: {games}, victories: {victories}"));
            }
        } else {
            ui.spinner();
        }
    }
}

pub struct QuestionModal<'a>(pub &'a TriviaSession);

impl QuestionModal<'_> {
    /// Hint line for the prompt, if the question has a hint at all.
    pub fn hint_line(prompt: &Prompt, revealed: bool) -> Option<String> {
        let hint = prompt.question.hint()?;
        Some(if revealed {
            format!(
                "Hint: {hint} (a correct answer is now worth {})",
                expected_answer_delta(true, true)
            )
        } else {
            format!("Show hint (-{HINT_COST} points)")
        })
    }

    pub fn outcome_line(result: &AnswerResult) -> String {
        match &result.outcome {
            AnswerOutcome::Correct { points, answer } => {
                format!("Correct! \"{answer}\" is right, +{points} points.")
            }
            AnswerOutcome::Incorrect {
                penalty,
                correct_answer,
            } => format!(
                "Wrong answer, -{penalty} points. The correct answer was \"{correct_answer}\"."
            ),
        }
    }

    fn prompt(ui: &mut egui::Ui, prompt: &Prompt, revealed: bool, commands: &mut CommandQueue) {
        let question = &prompt.question;
        if !question.category.is_empty() {
            ui.label(RichText::new(&question.category).italics());
        }
        ui.label(RichText::new(&question.text).strong());
        if let Some(url) = &question.image_url {
            ui.hyperlink_to("Question image", url);
        }

        ui.separator();
        for (n, choice) in prompt.choices.iter().enumerate() {
            let checked = prompt.selected == Some(choice.id);
            let radio = egui::RadioButton::new(checked, format!("{}. {}", n + 1, choice.text));
            if ui.add_enabled(!prompt.submitting, radio).clicked() {
                commands.add(Choose(n));
            }
        }
        ui.separator();

        if let Some(line) = Self::hint_line(prompt, revealed) {
            if revealed {
                ui.label(RichText::new(line).color(Color32::LIGHT_BLUE));
            } else if ui
                .add_enabled(!prompt.submitting, egui::Button::new(line))
                .clicked()
            {
                commands.add(Hint);
            }
        }

        ui.horizontal(|ui| {
            let ready = prompt.selected.is_some() && !prompt.submitting;
            if ui.add_enabled(ready, egui::Button::new("Submit")).clicked() {
                commands.add(Submit);
            }
            if prompt.submitting {
                ui.spinner();
                ui.label("Checking your answer...");
            }
        });
    }
}

impl Modal for QuestionModal<'_> {
    fn title(&self) -> String {
        match &self.0.zone {
            Some(zone) => zone.clone(),
            None => format!("Question on square {}", self.0.square),
        }
    }

    fn ui(&self, ui: &mut egui::Ui, commands: &mut CommandQueue) {
        match &self.0.phase {
            TriviaPhase::Loading => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Loading question...");
                });
            }
            TriviaPhase::Failed(reason) => {
                ui.colored_label(
                    Color32::from_rgb(0xc0, 0x39, 0x2b),
                    format!("Could not load the question: {reason}"),
                );
                if ui.button("Close").clicked() {
                    commands.add(Dismiss);
                }
            }
            TriviaPhase::Answering(prompt) => Self::prompt(ui, prompt, false, commands),
            TriviaPhase::HintRevealed(prompt) => Self::prompt(ui, prompt, true, commands),
            TriviaPhase::Resolved(result) => {
                ui.label(RichText::new(&result.question).strong());
                let color = if result.is_correct() {
                    Color32::from_rgb(0x27, 0xae, 0x60)
                } else {
                    Color32::from_rgb(0xc0, 0x39, 0x2b)
                };
                ui.colored_label(color, Self::outcome_line(result));
                if let Some(explanation) = &result.explanation {
                    ui.label(explanation);
                }
                ui.label(format!("Your score is now {}.", result.score));
            }
        }
    }
}
