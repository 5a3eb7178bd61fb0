use std::mem;

use common::message::{AnswerResult, Choice, ChoiceId, GameRequest, Question, QuestionReply};

use crate::{network::ApiError, prelude::*};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub question: Question,
    pub choices: Vec<Choice>,
    pub selected: Option<ChoiceId>,
    pub submitting: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, strum_macros::IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum TriviaPhase {
    Loading,
    Failed(String),
    Answering(Prompt),
    HintRevealed(Prompt),
    Resolved(AnswerResult),
}

/// One visit to a trivia zone, from fetching the question to showing the
/// server's verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriviaSession {
    pub square: BoardPosition,
    pub zone: Option<String>,
    pub phase: TriviaPhase,
}

impl TriviaSession {
    pub fn open(square: BoardPosition, zone: Option<String>) -> Self {
        Self {
            square,
            zone,
            phase: TriviaPhase::Loading,
        }
    }

    pub fn request(&self) -> GameRequest {
        GameRequest::GetQuestion {
            square: self.square,
        }
    }

    pub fn phase_name(&self) -> &'static str {
        (&self.phase).into()
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, TriviaPhase::Loading)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.phase, TriviaPhase::Failed(_))
    }

    pub fn prompt(&self) -> Option<&Prompt> {
        match &self.phase {
            TriviaPhase::Answering(prompt) | TriviaPhase::HintRevealed(prompt) => Some(prompt),
            _ => None,
        }
    }

    fn prompt_mut(&mut self) -> Option<&mut Prompt> {
        match &mut self.phase {
            TriviaPhase::Answering(prompt) | TriviaPhase::HintRevealed(prompt) => Some(prompt),
            _ => None,
        }
    }

    pub fn used_hint(&self) -> bool {
        matches!(self.phase, TriviaPhase::HintRevealed(_))
    }

    pub fn result(&self) -> Option<&AnswerResult> {
        match &self.phase {
            TriviaPhase::Resolved(result) => Some(result),
            _ => None,
        }
    }

    /// Applies the question fetch. Ignored unless still loading.
    pub fn loaded(&mut self, reply: Result<QuestionReply, ApiError>) {
        if !self.is_loading() {
            debug!("Ignoring late question for square {}", self.square);
            return;
        }

        self.phase = match reply {
            Ok(QuestionReply { choices, .. }) if choices.is_empty() => {
                warn!("Question for square {} has no answers", self.square);
                TriviaPhase::Failed(String::from("This question has no answers to choose from"))
            }
            Ok(QuestionReply { question, choices }) => {
                info!("Question {} loaded for square {}", question.id, self.square);
                TriviaPhase::Answering(Prompt {
                    question,
                    choices,
                    selected: None,
                    submitting: false,
                })
            }
            Err(e) => {
                error!("Failed to load question for square {}: {e}", self.square);
                TriviaPhase::Failed(e.to_string())
            }
        };
    }

    /// Shows the hint. One way; only offered when the question has one.
    pub fn reveal_hint(&mut self) -> bool {
        let revealable = matches!(
            &self.phase,
            TriviaPhase::Answering(prompt) if prompt.question.hint().is_some() && !prompt.submitting
        );
        if !revealable {
            return false;
        }

        if let TriviaPhase::Answering(prompt) = mem::replace(&mut self.phase, TriviaPhase::Loading)
        {
            self.phase = TriviaPhase::HintRevealed(prompt);
        }
        true
    }

    /// Stages a choice locally. Nothing is sent until [`Self::submit`].
    pub fn select(&mut self, choice: ChoiceId) -> bool {
        let Some(prompt) = self.prompt_mut() else {
            return false;
        };
        if prompt.submitting || !prompt.choices.iter().any(|c| c.id == choice) {
            return false;
        }

        prompt.selected = Some(choice);
        true
    }

    /// Stages the `index`-th choice (zero based), as listed to the player.
    pub fn select_nth(&mut self, index: usize) -> bool {
        let choice = self
            .prompt()
            .and_then(|prompt| prompt.choices.get(index))
            .map(|choice| choice.id);

        choice.is_some_and(|choice| self.select(choice))
    }

    /// Locks the prompt and builds the submission. `None` without a staged
    /// choice or while a submission is already in flight.
    pub fn submit(&mut self) -> Option<GameRequest> {
        let used_hint = self.used_hint();
        let prompt = self.prompt_mut()?;
        if prompt.submitting {
            debug!("Submission already in flight");
            return None;
        }

        let answer = prompt.selected?;
        prompt.submitting = true;

        Some(GameRequest::AnswerQuestion { answer, used_hint })
    }

    /// Applies the server's verdict. Returns true when the session resolved.
    pub fn answered(&mut self, reply: Result<AnswerResult, ApiError>) -> bool {
        if !self.prompt().is_some_and(|prompt| prompt.submitting) {
            debug!("Ignoring answer reply with nothing in flight");
            return false;
        }

        match reply {
            Ok(result) => {
                info!(
                    "Answer on square {} was {}, score now {}",
                    self.square,
                    if result.is_correct() { "correct" } else { "wrong" },
                    result.score
                );
                self.phase = TriviaPhase::Resolved(result);
                true
            }
            Err(e) => {
                error!("Failed to submit answer: {e}");
                self.phase = TriviaPhase::Failed(e.to_string());
                false
            }
        }
    }
}
