//! Wire format of the game page endpoint.
//!
//! Every request is a form-encoded POST to the game page, told apart by the
//! `action` field. Every reply is a JSON object with a `status` field; any
//! value other than `success` is an application level failure carrying a
//! `message`.

use log::debug;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::{BoardPosition, GameId, Score};

pub mod fields {
    pub const ACTION: &str = "action";
    pub const GAME_ID: &str = "jogo_id";
    pub const SQUARE_ID: &str = "casa_id";
    pub const ANSWER_ID: &str = "resposta_id";
    pub const USED_HINT: &str = "usou_dica";
    pub const POINTS: &str = "pontos";
    pub const POSITION: &str = "casa_atual";
    pub const FINALIZE: &str = "finalizar";
    pub const CSRF_FORM_TOKEN: &str = "csrfmiddlewaretoken";
}

pub mod actions {
    pub const GET_QUESTION: &str = "get_pergunta";
    pub const ANSWER_QUESTION: &str = "responder_pergunta";
    pub const CHECK_STATUS: &str = "check_status";
    pub const CANCEL_GAME: &str = "cancel_game";
}

const SUCCESS: &str = "success";

#[derive(
    serde::Serialize,
    serde::Deserialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct ChoiceId(pub i64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameRequest {
    GetQuestion {
        square: BoardPosition,
    },
    AnswerQuestion {
        answer: ChoiceId,
        used_hint: bool,
    },
    CheckStatus,
    /// Report a score delta. Sent without an `action`, the endpoint default.
    UpdateScore {
        points: Score,
        position: BoardPosition,
        finalize: bool,
    },
    CancelGame,
}

impl GameRequest {
    pub fn action(&self) -> Option<&'static str> {
        match self {
            GameRequest::GetQuestion { .. } => Some(actions::GET_QUESTION),
            GameRequest::AnswerQuestion { .. } => Some(actions::ANSWER_QUESTION),
            GameRequest::CheckStatus => Some(actions::CHECK_STATUS),
            GameRequest::UpdateScore { .. } => None,
            GameRequest::CancelGame => Some(actions::CANCEL_GAME),
        }
    }

    /// Form fields for this request, `jogo_id` first.
    pub fn form(&self, game: &GameId) -> Vec<(&'static str, String)> {
        let mut form = vec![(fields::GAME_ID, game.to_string())];
        if let Some(action) = self.action() {
            form.push((fields::ACTION, action.to_string()));
        }

        match self {
            GameRequest::GetQuestion { square } => {
                form.push((fields::SQUARE_ID, square.to_string()));
            }
            GameRequest::AnswerQuestion { answer, used_hint } => {
                form.push((fields::ANSWER_ID, answer.to_string()));
                form.push((fields::USED_HINT, used_hint.to_string()));
            }
            GameRequest::UpdateScore {
                points,
                position,
                finalize,
            } => {
                form.push((fields::POINTS, points.to_string()));
                form.push((fields::POSITION, position.to_string()));
                form.push((fields::FINALIZE, finalize.to_string()));
            }
            GameRequest::CheckStatus | GameRequest::CancelGame => {}
        }

        form
    }
}

#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("{0}")]
    Rejected(String),
    #[error("malformed server reply: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("answer reply is missing `{0}`")]
    MissingField(&'static str),
}

/// Decodes a reply body, turning a non-success `status` into
/// [`ProtocolError::Rejected`].
pub fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ProtocolError> {
    let value: serde_json::Value = serde_json::from_str(body)?;

    let status = value.get("status").and_then(serde_json::Value::as_str);
    if status != Some(SUCCESS) {
        let message = value
            .get("message")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("unknown server error")
            .to_string();
        debug!("Server rejected request ({status:?}): {message}");
        return Err(ProtocolError::Rejected(message));
    }

    Ok(serde_json::from_value(value)?)
}

#[derive(
    serde::Serialize,
    serde::Deserialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStatus {
    InProgress,
    Completed,
    Cancelled,
}

#[derive(serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StatusReply {
    #[serde(rename = "jogo_status")]
    pub game_status: GameStatus,
    #[serde(rename = "pontuacao_atual")]
    pub score: Score,
}

#[derive(serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FinishReply {
    #[serde(rename = "pontuacao_final")]
    pub final_score: Score,
    #[serde(rename = "e_vitoria")]
    pub victory: bool,
    #[serde(rename = "tempo_jogo", default)]
    pub play_seconds: Option<u64>,
    #[serde(rename = "tempo_formatado", default)]
    pub play_time: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(rename = "jogos_completados", default)]
    pub games_completed: Option<u32>,
    #[serde(rename = "vitorias", default)]
    pub victories: Option<u32>,
    pub redirect_url: String,
}

#[derive(serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ScoreUpdate {
    #[serde(rename = "pontuacao_atual")]
    pub score: Score,
    #[serde(default)]
    pub redirect_url: Option<String>,
}

/// Reply to a score report. Finalizing reports (or reaching the arrival
/// server side) end the game and come back with the final tally.
#[derive(serde::Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum ScoreReply {
    Finished(FinishReply),
    Updated(ScoreUpdate),
}

impl ScoreReply {
    pub fn score(&self) -> Score {
        match self {
            ScoreReply::Finished(finish) => finish.final_score,
            ScoreReply::Updated(update) => update.score,
        }
    }

    pub fn redirect_url(&self) -> Option<&str> {
        match self {
            ScoreReply::Finished(finish) => Some(&finish.redirect_url),
            ScoreReply::Updated(update) => update.redirect_url.as_deref(),
        }
    }
}

#[derive(serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub id: i64,
    pub text: String,
    #[serde(default)]
    pub category: String,
    #[serde(rename = "dica", default)]
    hint: Option<String>,
    #[serde(rename = "imagem_url", default)]
    pub image_url: Option<String>,
}

impl Question {
    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref().filter(|hint| !hint.trim().is_empty())
    }
}

#[derive(serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub id: ChoiceId,
    pub text: String,
}

#[derive(serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct QuestionReply {
    #[serde(rename = "pergunta")]
    pub question: Question,
    #[serde(rename = "respostas", default)]
    pub choices: Vec<Choice>,
}

#[derive(serde::Deserialize, Debug, Clone, PartialEq, Eq)]
struct AnsweredQuestion {
    text: String,
    #[serde(rename = "explicacao", default)]
    explanation: Option<String>,
}

#[derive(serde::Deserialize, Debug, Clone, PartialEq, Eq)]
struct AnswerText {
    text: String,
}

/// Raw reply to `responder_pergunta`; see [`AnswerResult`].
#[derive(serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AnswerReply {
    #[serde(rename = "resposta_correta")]
    correct: bool,
    #[serde(rename = "pontos", default)]
    points: Option<Score>,
    #[serde(rename = "penalidade", default)]
    penalty: Option<Score>,
    #[serde(rename = "pergunta")]
    question: AnsweredQuestion,
    #[serde(rename = "resposta", default)]
    chosen: Option<AnswerText>,
    #[serde(rename = "resposta_correta_obj", default)]
    correct_answer: Option<AnswerText>,
    #[serde(rename = "pontuacao_atual")]
    score: Score,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerOutcome {
    Correct { points: Score, answer: String },
    Incorrect { penalty: Score, correct_answer: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerResult {
    pub outcome: AnswerOutcome,
    pub question: String,
    pub explanation: Option<String>,
    pub score: Score,
}

impl AnswerResult {
    pub fn is_correct(&self) -> bool {
        matches!(self.outcome, AnswerOutcome::Correct { .. })
    }
}

impl TryFrom<AnswerReply> for AnswerResult {
    type Error = ProtocolError;

    fn try_from(reply: AnswerReply) -> Result<Self, Self::Error> {
        let outcome = if reply.correct {
            AnswerOutcome::Correct {
                points: reply.points.ok_or(ProtocolError::MissingField("pontos"))?,
                answer: reply
                    .chosen
                    .ok_or(ProtocolError::MissingField("resposta"))?
                    .text,
            }
        } else {
            AnswerOutcome::Incorrect {
                penalty: reply
                    .penalty
                    .ok_or(ProtocolError::MissingField("penalidade"))?,
                correct_answer: reply
                    .correct_answer
                    .ok_or(ProtocolError::MissingField("resposta_correta_obj"))?
                    .text,
            }
        };

        Ok(Self {
            outcome,
            question: reply.question.text,
            explanation: reply
                .question
                .explanation
                .filter(|text| !text.trim().is_empty()),
            score: reply.score,
        })
    }
}
