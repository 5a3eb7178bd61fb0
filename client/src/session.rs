use std::time::Duration;

use crate::{
    handoff::Handoff,
    prelude::*,
    scheduler::Scheduler,
};

/// Work the front end has to carry out on behalf of the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Request(GameRequest),
    Beacon(GameRequest),
    Navigate(Navigation),
    Notice(String),
}

/// Drives a [`BoardView`] against a clock: timers the view asks for are
/// queued here and fed back once due, everything else ends up in the outbox.
pub struct Session {
    view: BoardView,
    timers: Scheduler<Timer>,
    now: Duration,
    outbox: Vec<Outbound>,
}

impl Session {
    pub fn new(view: BoardView) -> Self {
        Self {
            view,
            timers: Scheduler::new(),
            now: Duration::ZERO,
            outbox: Vec::new(),
        }
    }

    pub fn view(&self) -> &BoardView {
        &self.view
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn mount(&mut self, game: Option<&GameId>, handoff: Option<Handoff>) {
        self.with_view(|view| view.mount(game, handoff));
    }

    /// Runs `f` against the view and collects whatever it asked for.
    pub fn with_view<R>(&mut self, f: impl FnOnce(&mut BoardView) -> R) -> R {
        let result = f(&mut self.view);
        self.flush();
        result
    }

    pub fn on_server(&mut self, event: ServerEvent) {
        self.with_view(|view| view.on_server(event));
    }

    /// Moves the clock forward, firing every timer due by `now` in order.
    pub fn advance_to(&mut self, now: Duration) {
        while let Some((deadline, timer)) = self.timers.pop_due(now) {
            self.now = self.now.max(deadline);
            self.view.on_timer(timer);
            self.flush();
        }
        self.now = self.now.max(now);
    }

    pub fn advance_by(&mut self, delta: Duration) {
        self.advance_to(self.now + delta);
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    pub fn drain_outbound(&mut self) -> Vec<Outbound> {
        std::mem::take(&mut self.outbox)
    }

    pub fn page_close(&mut self) {
        self.with_view(BoardView::page_close);
    }

    /// Tears the board down. Timers still queued are dropped.
    pub fn unmount(&mut self) {
        self.view.unmount();
        self.timers.clear();
    }

    fn flush(&mut self) {
        for effect in self.view.drain_effects() {
            match effect {
                Effect::Schedule { delay, timer } => {
                    self.timers.schedule(self.now + delay, timer);
                }
                Effect::Request(request) => self.outbox.push(Outbound::Request(request)),
                Effect::Beacon(request) => self.outbox.push(Outbound::Beacon(request)),
                Effect::Navigate(navigation) => self.outbox.push(Outbound::Navigate(navigation)),
                Effect::Notice(notice) => self.outbox.push(Outbound::Notice(notice)),
            }
        }
    }
}
