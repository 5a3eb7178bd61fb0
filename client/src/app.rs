use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Instant,
};

use anyhow::Context;
use common::board::BoardLayout;
use eframe::egui;
use egui::ViewportCommand;
use rand::{rngs::StdRng, SeedableRng};
use reqwest::Url;
use tokio::{
    runtime::Runtime,
    sync::mpsc::{self, UnboundedReceiver, UnboundedSender},
};

use crate::{
    beacon::Beacon,
    commands::{self, CommandQueue},
    config::Config,
    handoff::HandoffStore,
    network::{self, GameClient},
    prelude::*,
    view,
};

/// Close request raised from outside the frame loop, e.g. by Ctrl-C.
#[derive(Debug, Clone, Default)]
pub struct Interrupt(Arc<AtomicBool>);

impl Interrupt {
    pub fn raise(&self, ctx: &egui::Context) {
        info!("Interrupted, closing the board");
        self.0.store(true, Ordering::SeqCst);
        ctx.request_repaint();
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// The board window. Owns the session, drives its clock from the frame loop
/// and carries out whatever it queues.
pub struct TrilhaApp {
    config: Config,
    ctx: egui::Context,
    rt: Runtime,

    session: Session,
    start: Instant,
    client: Option<GameClient>,
    beacon: Option<Beacon>,
    tx: UnboundedSender<ServerEvent>,
    rx: UnboundedReceiver<ServerEvent>,

    notice: Option<String>,
    destination: Option<Url>,
    interrupt: Interrupt,
}

impl TrilhaApp {
    pub fn new(config: Config, ctx: egui::Context) -> anyhow::Result<Self> {
        let rt = Runtime::new().context("Failed to start the async runtime")?;

        let handoff = HandoffStore::new(&config.handoff_path);
        let resumed = handoff.take().unwrap_or_else(|e| {
            warn!("Ignoring handoff in {}: {e}", handoff.path().display());
            None
        });

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let session = Session::new(BoardView::new(BoardLayout::classic(), config.timings, rng));

        let client = config
            .game
            .clone()
            .map(|game| {
                GameClient::new(
                    config.page_url.clone(),
                    game,
                    config.csrf_token.clone(),
                    config.request_timeout,
                )
            })
            .transpose()
            .context("Failed to build the http client")?;
        let beacon = {
            let _guard = rt.enter();
            client.clone().map(Beacon::spawn)
        };
        let (tx, rx) = mpsc::unbounded_channel();

        let mut app = Self {
            config,
            ctx,
            rt,
            session,
            start: Instant::now(),
            client,
            beacon,
            tx,
            rx,
            notice: None,
            destination: None,
            interrupt: Interrupt::default(),
        };
        app.session.mount(app.config.game.as_ref(), resumed);
        app.flush();
        Ok(app)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn destination(&self) -> Option<&Url> {
        self.destination.as_ref()
    }

    pub fn interrupt(&self) -> Interrupt {
        self.interrupt.clone()
    }

    /// Carries out queued work.
    fn flush(&mut self) {
        for outbound in self.session.drain_outbound() {
            match outbound {
                Outbound::Request(request) => match &self.client {
                    Some(client) => {
                        let _guard = self.rt.enter();
                        let ctx = self.ctx.clone();
                        network::spawn_request(client, request, self.tx.clone(), move || {
                            ctx.request_repaint()
                        });
                    }
                    None => warn!("No game to send {request:?} for"),
                },
                Outbound::Beacon(request) => match &self.beacon {
                    Some(beacon) => beacon.send(request),
                    None => warn!("No game to send {request:?} for"),
                },
                Outbound::Notice(notice) => {
                    info!("{notice}");
                    self.notice = Some(notice);
                }
                Outbound::Navigate(navigation) => {
                    let url = self.config.resolve(navigation.target());
                    info!("Redirecting to {url}");
                    self.destination = Some(url);
                }
            }
        }
    }

    /// One frame: replies and timers first, then drawing, then the player's
    /// commands.
    pub fn frame(&mut self, ctx: &egui::Context) {
        while let Ok(event) = self.rx.try_recv() {
            self.session.on_server(event);
        }
        self.session.advance_to(self.start.elapsed());
        self.flush();

        let mut command_queue = Vec::new();
        view::show(
            ctx,
            self.session.view(),
            self.notice.as_deref(),
            &mut CommandQueue {
                command_queue: &mut command_queue,
            },
        );
        if let Some(feedback) = commands::run_all(command_queue, &mut self.session) {
            self.notice = Some(feedback);
        }
        self.flush();

        if self.destination.is_some() || self.interrupt.is_raised() {
            ctx.send_viewport_cmd(ViewportCommand::Close);
        } else if let Some(deadline) = self.session.next_deadline() {
            ctx.request_repaint_after(deadline.saturating_sub(self.start.elapsed()));
        }
    }

    /// Teardown: cancel an abandoned game, stop the board, then give pending
    /// notifications a moment to go out.
    pub fn shutdown(&mut self) {
        if self.destination.is_none() {
            self.session.page_close();
            self.flush();
        }
        self.session.unmount();

        if let Some(notice) = &self.notice {
            println!("{notice}");
        }
        if let Some(url) = &self.destination {
            println!("Redirecting to {url}");
        }

        if let Some(beacon) = self.beacon.take() {
            if self
                .rt
                .block_on(beacon.shutdown(self.config.beacon_grace))
                .is_none()
            {
                warn!("Some notifications may not have reached the server");
            }
        }
    }
}

impl eframe::App for TrilhaApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.frame(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use egui::{RawInput, ViewportId};

    use super::*;
    use crate::config::Timings;

    fn config(game: Option<&str>) -> Config {
        Config {
            page_url: Url::parse("http://127.0.0.1:9/tabuleiro/7/").unwrap(),
            game: game.and_then(GameId::parse),
            csrf_token: None,
            handoff_path: std::env::temp_dir().join(format!(
                "trilha-app-{}-{}.json",
                std::process::id(),
                game.unwrap_or("none")
            )),
            seed: Some(5),
            beacon_grace: Duration::from_millis(200),
            request_timeout: Duration::from_millis(200),
            timings: Timings::default(),
        }
    }

    fn closes(output: &egui::FullOutput) -> bool {
        output
            .viewport_output
            .get(&ViewportId::ROOT)
            .is_some_and(|viewport| viewport.commands.contains(&ViewportCommand::Close))
    }

    #[test]
    fn interrupt_closes_the_window() {
        let ctx = egui::Context::default();
        let mut app = TrilhaApp::new(config(Some("8")), ctx.clone()).unwrap();
        let output = ctx.run(RawInput::default(), |ctx| app.frame(ctx));
        assert!(!closes(&output));

        // Raised from another thread, picked up by the next frame.
        let interrupt = app.interrupt();
        let remote = ctx.clone();
        std::thread::spawn(move || interrupt.raise(&remote))
            .join()
            .unwrap();

        let output = ctx.run(RawInput::default(), |ctx| app.frame(ctx));
        assert!(closes(&output));
        app.shutdown();
    }

    #[test]
    fn missing_game_redirects_to_a_new_one() {
        let ctx = egui::Context::default();
        let mut app = TrilhaApp::new(config(None), ctx.clone()).unwrap();
        assert_eq!(
            app.destination().map(Url::as_str),
            Some("http://127.0.0.1:9/tabuleiro/")
        );

        let output = ctx.run(RawInput::default(), |ctx| app.frame(ctx));
        assert!(closes(&output));
        assert!(app.session().view().has_left());

        // Leaving on purpose cancels nothing.
        app.shutdown();
    }

    #[test]
    fn mounted_game_keeps_the_window_open() {
        let ctx = egui::Context::default();
        let mut app = TrilhaApp::new(config(Some("7")), ctx.clone()).unwrap();
        assert_eq!(app.destination(), None);

        let output = ctx.run(RawInput::default(), |ctx| app.frame(ctx));
        assert!(!closes(&output));
        assert!(app.session().view().can_roll());

        app.shutdown();
        assert!(app.beacon.is_none());
    }
}
