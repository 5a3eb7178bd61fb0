use std::time::Duration;

use reqwest::{header, Client, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;

use crate::prelude::*;

const CSRF_HEADER: &str = "X-CSRFToken";
const CSRF_COOKIE: &str = "csrftoken";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("failed to reach the server: {0}")]
    Transport(#[from] reqwest::Error),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

impl ApiError {
    /// The server answered but refused the request.
    pub fn is_rejection(&self) -> bool {
        matches!(self, ApiError::Protocol(ProtocolError::Rejected(_)))
    }
}

/// Talks to the game page endpoint on behalf of one game.
#[derive(Debug, Clone)]
pub struct GameClient {
    http: Client,
    page_url: Url,
    game: GameId,
    csrf_token: Option<String>,
}

impl GameClient {
    /// Every call gives up after `timeout`, surfacing as a transport error.
    pub fn new(
        page_url: Url,
        game: GameId,
        csrf_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            page_url,
            game,
            csrf_token,
        })
    }

    async fn post(&self, form: &[(&'static str, String)]) -> Result<String, ApiError> {
        let mut request = self.http.post(self.page_url.clone()).form(form);
        if let Some(token) = &self.csrf_token {
            request = request
                .header(CSRF_HEADER, token)
                .header(header::COOKIE, format!("{CSRF_COOKIE}={token}"));
        }

        // Error statuses still carry a json body with the reason.
        let body = request.send().await?.text().await?;
        Ok(body)
    }

    async fn call<T: DeserializeOwned>(&self, request: &GameRequest) -> Result<T, ApiError> {
        debug!("Posting {request:?} for game {}", self.game);
        let body = self.post(&request.form(&self.game)).await?;
        Ok(decode(&body)?)
    }

    pub async fn check_status(&self) -> Result<StatusReply, ApiError> {
        self.call(&GameRequest::CheckStatus).await
    }

    pub async fn report_score(
        &self,
        points: Score,
        position: BoardPosition,
        finalize: bool,
    ) -> Result<ScoreReply, ApiError> {
        self.call(&GameRequest::UpdateScore {
            points,
            position,
            finalize,
        })
        .await
    }

    pub async fn fetch_question(&self, square: BoardPosition) -> Result<QuestionReply, ApiError> {
        self.call(&GameRequest::GetQuestion { square }).await
    }

    pub async fn answer(&self, answer: ChoiceId, used_hint: bool) -> Result<AnswerResult, ApiError> {
        let reply: AnswerReply = self
            .call(&GameRequest::AnswerQuestion { answer, used_hint })
            .await?;
        Ok(AnswerResult::try_from(reply)?)
    }

    /// Fire and forget delivery. The token travels in the form since no
    /// headers can be relied on.
    pub async fn beacon(&self, request: &GameRequest) -> Result<(), ApiError> {
        let mut form = request.form(&self.game);
        if let Some(token) = &self.csrf_token {
            form.push((fields::CSRF_FORM_TOKEN, token.clone()));
        }

        self.post(&form).await?;
        Ok(())
    }

    /// Runs a request and wraps the reply for the board. Requests nobody
    /// waits on yield `None`.
    pub async fn execute(&self, request: GameRequest) -> Option<ServerEvent> {
        match request {
            GameRequest::CheckStatus => Some(ServerEvent::Status(self.check_status().await)),
            GameRequest::UpdateScore {
                points,
                position,
                finalize,
            } => Some(ServerEvent::Score(
                self.report_score(points, position, finalize).await,
            )),
            GameRequest::GetQuestion { square } => Some(ServerEvent::Question {
                square,
                reply: self.fetch_question(square).await,
            }),
            GameRequest::AnswerQuestion { answer, used_hint } => {
                Some(ServerEvent::Answer(self.answer(answer, used_hint).await))
            }
            GameRequest::CancelGame => {
                if let Err(e) = self.beacon(&request).await {
                    warn!("Failed to cancel game: {e}");
                }
                None
            }
        }
    }
}

/// Runs `request` in the background, handing the reply back through `tx`
/// and calling `wake` once it is there.
pub fn spawn_request(
    client: &GameClient,
    request: GameRequest,
    tx: UnboundedSender<ServerEvent>,
    wake: impl FnOnce() + Send + 'static,
) -> tokio::task::JoinHandle<()> {
    let client = client.clone();
    tokio::spawn(async move {
        if let Some(event) = client.execute(request).await {
            if tx.send(event).is_err() {
                debug!("Board is gone, dropping reply");
                return;
            }
            wake();
        }
    })
}
