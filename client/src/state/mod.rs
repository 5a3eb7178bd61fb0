use std::time::Duration;

use common::{
    board::{BoardLayout, SquareEvent},
    message::{AnswerResult, FinishReply, QuestionReply, ScoreReply, StatusReply},
    rules::{RollOutcome, DIE_FACES},
};
use rand::{rngs::StdRng, Rng};

use crate::{config::Timings, handoff::Handoff, network::ApiError, prelude::*};

pub mod animation;
pub mod trivia;

use animation::{Animation, AnimationPhase, Marker};
use trivia::TriviaSession;

/// Side effects requested by the view. The session routes timers to the
/// scheduler and everything else to the front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Request(GameRequest),
    /// Fire and forget delivery that has to survive teardown.
    Beacon(GameRequest),
    Schedule { delay: Duration, timer: Timer },
    Navigate(Navigation),
    Notice(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timer {
    AnimationStep,
    ClearCelebration,
    RevealPending,
    HideOverlay(u64),
    ArrivalTick(u64),
    FinalizeGame,
    CloseTrivia(u64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Site index.
    Home,
    /// Entry point that resumes or creates a game.
    NewGame,
    To(String),
}

impl Navigation {
    pub fn target(&self) -> &str {
        match self {
            Navigation::Home => "/",
            Navigation::NewGame => "/tabuleiro/",
            Navigation::To(url) => url,
        }
    }
}

#[derive(Debug)]
pub enum ServerEvent {
    Status(Result<StatusReply, ApiError>),
    Score(Result<ScoreReply, ApiError>),
    Question {
        square: BoardPosition,
        reply: Result<QuestionReply, ApiError>,
    },
    Answer(Result<AnswerResult, ApiError>),
}

/// The single modal on screen.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Overlay {
    #[default]
    None,
    Bonus,
    Penalty,
    Arrival {
        countdown: u32,
    },
    Trivia(TriviaSession),
}

/// Overlay waiting out its reveal delay after the token settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    Arrival,
    Trivia(BoardPosition),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Die {
    pub last_roll: Option<RollOutcome>,
    /// Squares left in the current walk, shown on the die while moving.
    pub remaining: Option<u32>,
}

pub struct BoardView {
    layout: BoardLayout,
    timings: Timings,
    rng: StdRng,

    mounted: bool,
    disposed: bool,
    left: bool,
    finalizing: bool,

    position: BoardPosition,
    score: Score,
    die: Die,
    animation: Option<Animation>,
    celebration: Vec<Marker>,
    pending: Option<Pending>,
    overlay: Overlay,
    overlay_token: u64,
    finish: Option<FinishReply>,

    effects: Vec<Effect>,
}

impl BoardView {
    pub fn new(layout: BoardLayout, timings: Timings, rng: StdRng) -> Self {
        for square in layout.overlapping_squares() {
            warn!("Square {square} has more than one special kind, priority order applies");
        }

        Self {
            layout,
            timings,
            rng,
            mounted: false,
            disposed: false,
            left: false,
            finalizing: false,
            position: BoardPosition::START,
            score: 0,
            die: Die::default(),
            animation: None,
            celebration: Vec::new(),
            pending: None,
            overlay: Overlay::None,
            overlay_token: 0,
            finish: None,
            effects: Vec::new(),
        }
    }

    pub fn layout(&self) -> &BoardLayout {
        &self.layout
    }

    pub fn position(&self) -> BoardPosition {
        self.position
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn die(&self) -> Die {
        self.die
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn trivia(&self) -> Option<&TriviaSession> {
        match &self.overlay {
            Overlay::Trivia(session) => Some(session),
            _ => None,
        }
    }

    fn trivia_mut(&mut self) -> Option<&mut TriviaSession> {
        match &mut self.overlay {
            Overlay::Trivia(session) => Some(session),
            _ => None,
        }
    }

    pub fn celebration(&self) -> &[Marker] {
        &self.celebration
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn finish(&self) -> Option<&FinishReply> {
        self.finish.as_ref()
    }

    pub fn has_left(&self) -> bool {
        self.left
    }

    pub fn drain_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    fn schedule(&mut self, delay: Duration, timer: Timer) {
        self.effects.push(Effect::Schedule { delay, timer });
    }

    fn request(&mut self, request: GameRequest) {
        debug!("Requesting {request:?}");
        self.effects.push(Effect::Request(request));
    }

    fn navigate(&mut self, navigation: Navigation) {
        if self.left {
            return;
        }

        info!("Leaving the board for {}", navigation.target());
        self.left = true;
        self.effects.push(Effect::Navigate(navigation));
    }

    fn set_overlay(&mut self, overlay: Overlay) -> u64 {
        self.overlay_token += 1;
        self.overlay = overlay;
        self.overlay_token
    }

    fn is_active(&self) -> bool {
        self.mounted && !self.disposed && !self.left
    }

    /// Initial load: adopt the handoff left by a previous page, then ask the
    /// server where things stand.
    pub fn mount(&mut self, game: Option<&GameId>, handoff: Option<Handoff>) {
        if self.mounted {
            return;
        }
        self.mounted = true;

        match handoff {
            // A game that already reached the finish is never resumed.
            Some(handoff) if handoff.position >= self.layout.terminal() => {
                warn!(
                    "Ignoring handoff at square {}, the finish is {}",
                    handoff.position,
                    self.layout.terminal()
                );
            }
            Some(handoff) => {
                info!("Resuming from handoff at square {}", handoff.position);
                self.position = handoff.position;
                if let Some(score) = handoff.score {
                    self.score = score;
                }
            }
            None => {}
        }

        match game {
            Some(game) => {
                info!("Board mounted for game {game}");
                self.request(GameRequest::CheckStatus);
            }
            None => {
                error!("No valid game id, starting a new game");
                self.navigate(Navigation::NewGame);
            }
        }
    }

    /// Stops acting on timers and replies. Pending timers must be dropped by
    /// the owner.
    pub fn unmount(&mut self) {
        self.disposed = true;
        self.animation = None;
        self.pending = None;
        self.celebration.clear();
        self.effects.clear();
    }

    pub fn can_roll(&self) -> bool {
        self.is_active()
            && self.animation.is_none()
            && self.pending.is_none()
            && self.overlay == Overlay::None
            && !self.layout.is_terminal(self.position)
    }

    pub fn roll(&mut self) -> bool {
        let roll = RollOutcome::clamped(self.rng.random_range(1..=DIE_FACES));
        self.roll_with(roll)
    }

    /// Starts walking the token. Silently rejected while anything is moving
    /// or showing.
    pub fn roll_with(&mut self, roll: RollOutcome) -> bool {
        if !self.can_roll() {
            debug!("Roll rejected");
            return false;
        }

        let destination = self.layout.destination(self.position, roll);
        info!("Rolled {roll}, walking {} -> {destination}", self.position);

        self.animation = Some(Animation::new(roll, self.position, destination));
        self.celebration.clear();
        self.die = Die {
            last_roll: Some(roll),
            remaining: Some(self.position.distance_to(destination)),
        };
        self.schedule(self.timings.step, Timer::AnimationStep);
        true
    }

    pub fn on_timer(&mut self, timer: Timer) {
        if self.disposed || self.left {
            return;
        }

        match timer {
            Timer::AnimationStep => self.animation_step(),
            Timer::ClearCelebration => {
                self.celebration.clear();
                self.animation = None;
            }
            Timer::RevealPending => self.reveal_pending(),
            Timer::HideOverlay(token) => {
                if token == self.overlay_token
                    && matches!(self.overlay, Overlay::Bonus | Overlay::Penalty)
                {
                    self.set_overlay(Overlay::None);
                }
            }
            Timer::ArrivalTick(token) => {
                if token != self.overlay_token {
                    return;
                }
                if let Overlay::Arrival { countdown } = &mut self.overlay {
                    *countdown = countdown.saturating_sub(1);
                    if *countdown > 0 {
                        self.schedule(self.timings.countdown_tick, Timer::ArrivalTick(token));
                    }
                }
            }
            Timer::FinalizeGame => {
                if self.left || self.finalizing {
                    return;
                }
                info!("Finalizing game at square {}", self.position);
                self.finalizing = true;
                self.request(GameRequest::UpdateScore {
                    points: 0,
                    position: self.position,
                    finalize: true,
                });
            }
            Timer::CloseTrivia(token) => {
                if token != self.overlay_token {
                    return;
                }
                let score = self
                    .trivia()
                    .and_then(TriviaSession::result)
                    .map(|result| result.score);
                if let Some(score) = score {
                    self.score = score;
                    self.set_overlay(Overlay::None);
                }
            }
        }
    }

    fn animation_step(&mut self) {
        let Some(animation) = self.animation.as_mut() else {
            return;
        };
        if animation.phase != AnimationPhase::Moving {
            return;
        }

        match animation.step() {
            Some(position) => {
                let remaining = animation.remaining();
                self.position = position;
                self.die.remaining = Some(remaining);
                self.schedule(self.timings.step, Timer::AnimationStep);
                // Every committed move is checked against the server.
                self.request(GameRequest::CheckStatus);
            }
            None => {
                let destination = animation.destination;
                self.position = destination;
                self.die.remaining = None;
                self.celebration = Marker::burst(&mut self.rng);
                self.schedule(self.timings.celebration, Timer::ClearCelebration);
                self.settle(destination);
            }
        }
    }

    /// Runs the square's special behaviour, once per arrival.
    fn settle(&mut self, square: BoardPosition) {
        let event = self.layout.classify(square);
        debug!("Token settled on {square}: {event:?}");

        match event {
            SquareEvent::Arrival => {
                self.pending = Some(Pending::Arrival);
                self.schedule(self.timings.arrival_reveal, Timer::RevealPending);
            }
            SquareEvent::Bonus { .. } | SquareEvent::Penalty { .. } => {
                if let Some(points) = event.score_delta() {
                    self.request(GameRequest::UpdateScore {
                        points,
                        position: square,
                        finalize: false,
                    });
                }
                let overlay = if matches!(event, SquareEvent::Bonus { .. }) {
                    Overlay::Bonus
                } else {
                    Overlay::Penalty
                };
                let token = self.set_overlay(overlay);
                self.schedule(self.timings.modal, Timer::HideOverlay(token));
            }
            SquareEvent::Trivia { square } => {
                self.pending = Some(Pending::Trivia(square));
                self.schedule(self.timings.trivia_reveal, Timer::RevealPending);
            }
            SquareEvent::Nothing => {}
        }
    }

    fn reveal_pending(&mut self) {
        match self.pending.take() {
            Some(Pending::Arrival) => {
                let countdown = self.timings.arrival_countdown();
                let token = self.set_overlay(Overlay::Arrival { countdown });
                self.schedule(self.timings.countdown_tick, Timer::ArrivalTick(token));
                self.schedule(self.timings.finalize, Timer::FinalizeGame);
            }
            Some(Pending::Trivia(square)) => {
                let zone = self.layout.zone_name(square).map(String::from);
                let session = TriviaSession::open(square, zone);
                let request = session.request();
                self.set_overlay(Overlay::Trivia(session));
                self.request(request);
            }
            None => {}
        }
    }

    pub fn on_server(&mut self, event: ServerEvent) {
        if !self.is_active() {
            debug!("Dropping server event after the board closed");
            return;
        }

        match event {
            ServerEvent::Status(Ok(status)) => {
                self.score = status.score;
                if status.game_status != GameStatus::InProgress {
                    warn!("Game is {}, leaving the board", status.game_status);
                    self.effects.push(Effect::Notice(String::from(
                        "This game is no longer in progress. Returning to the home page.",
                    )));
                    self.navigate(Navigation::Home);
                }
            }
            ServerEvent::Status(Err(e)) if e.is_rejection() => {
                error!("Game status check rejected: {e}");
                self.navigate(Navigation::NewGame);
            }
            ServerEvent::Status(Err(e)) => {
                error!("Failed to check game status: {e}");
            }
            ServerEvent::Score(Ok(reply)) => {
                self.score = reply.score();
                info!("Score updated: {}", self.score);
                let redirect = reply.redirect_url().map(String::from);
                if let ScoreReply::Finished(finish) = reply {
                    info!(
                        "Game finished with {} points ({})",
                        finish.final_score,
                        if finish.victory { "victory" } else { "no victory" }
                    );
                    self.finish = Some(finish);
                }
                match redirect {
                    Some(url) => self.navigate(Navigation::To(url)),
                    None if self.finalizing => self.navigate(Navigation::Home),
                    None => {}
                }
            }
            ServerEvent::Score(Err(e)) => {
                error!("Failed to update score: {e}");
                if self.finalizing {
                    self.navigate(Navigation::Home);
                }
            }
            ServerEvent::Question { square, reply } => match self.trivia_mut() {
                Some(session) if session.square == square => session.loaded(reply),
                _ => debug!("Dropping question for square {square}, no session waiting"),
            },
            ServerEvent::Answer(reply) => {
                let resolved = self
                    .trivia_mut()
                    .is_some_and(|session| session.answered(reply));
                if resolved {
                    let token = self.overlay_token;
                    self.schedule(self.timings.trivia_result, Timer::CloseTrivia(token));
                }
            }
        }
    }

    pub fn reveal_hint(&mut self) -> bool {
        self.is_active() && self.trivia_mut().is_some_and(TriviaSession::reveal_hint)
    }

    pub fn select_answer(&mut self, index: usize) -> bool {
        self.is_active()
            && self
                .trivia_mut()
                .is_some_and(|session| session.select_nth(index))
    }

    pub fn submit_answer(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }

        match self.trivia_mut().and_then(TriviaSession::submit) {
            Some(request) => {
                self.request(request);
                true
            }
            None => false,
        }
    }

    /// Manual close. Only failed trivia sessions and the short lived
    /// bonus/penalty modals can be closed by hand.
    pub fn dismiss(&mut self) -> bool {
        let closable = match &self.overlay {
            Overlay::Bonus | Overlay::Penalty => true,
            Overlay::Trivia(session) => session.is_failed(),
            Overlay::None | Overlay::Arrival { .. } => false,
        };

        if closable && self.is_active() {
            self.set_overlay(Overlay::None);
        }
        closable
    }

    /// Leave the game on purpose: cancel it server side and go home.
    pub fn exit(&mut self) {
        if !self.is_active() {
            return;
        }

        info!("Leaving game");
        self.effects.push(Effect::Beacon(GameRequest::CancelGame));
        self.navigate(Navigation::Home);
    }

    /// The page is going away. Abandoned games are cancelled; finished ones
    /// are left alone.
    pub fn page_close(&mut self) {
        if self.left || self.disposed || self.finalizing || self.finish.is_some() {
            return;
        }

        info!("Board closed, cancelling game");
        self.effects.push(Effect::Beacon(GameRequest::CancelGame));
    }
}

#[cfg(test)]
mod tests;
