use rand::SeedableRng;

use super::*;

fn view() -> BoardView {
    BoardView::new(
        BoardLayout::classic(),
        Timings::default(),
        StdRng::seed_from_u64(11),
    )
}

fn mounted(handoff: Option<Handoff>) -> BoardView {
    let mut view = view();
    view.mount(GameId::parse("7").as_ref(), handoff);
    assert_eq!(
        view.drain_effects(),
        vec![Effect::Request(GameRequest::CheckStatus)]
    );
    view
}

fn status(game_status: GameStatus, score: Score) -> ServerEvent {
    ServerEvent::Status(Ok(StatusReply { game_status, score }))
}

#[test]
fn missing_game_starts_a_new_one() {
    let mut view = view();
    view.mount(None, None);
    assert_eq!(
        view.drain_effects(),
        vec![Effect::Navigate(Navigation::NewGame)]
    );
    assert!(view.has_left());
    assert!(!view.can_roll());
}

#[test]
fn handoff_seeds_position_and_score() {
    let view = mounted(Some(Handoff {
        position: BoardPosition(14),
        score: Some(75),
    }));
    assert_eq!(view.position(), BoardPosition(14));
    assert_eq!(view.score(), 75);
    assert!(view.can_roll());
}

#[test]
fn finished_handoff_starts_from_scratch() {
    for square in [21, 40] {
        let mut view = mounted(Some(Handoff {
            position: BoardPosition(square),
            score: Some(75),
        }));
        assert_eq!(view.position(), BoardPosition::START);
        assert_eq!(view.score(), 0);
        assert!(view.can_roll());
        assert!(view.roll_with(RollOutcome::new(2).unwrap()));
    }
}

#[test]
fn server_status_overrides_cached_score() {
    let mut view = mounted(Some(Handoff {
        position: BoardPosition(4),
        score: Some(75),
    }));
    view.on_server(status(GameStatus::InProgress, 60));
    assert_eq!(view.score(), 60);
    assert!(view.drain_effects().is_empty());
}

#[test]
fn finished_game_sends_player_home() {
    let mut view = mounted(None);
    view.on_server(status(GameStatus::Completed, 140));

    let effects = view.drain_effects();
    assert!(matches!(effects[0], Effect::Notice(_)));
    assert_eq!(effects[1], Effect::Navigate(Navigation::Home));

    // Late replies are dropped once the board has been left.
    view.on_server(status(GameStatus::Cancelled, 0));
    assert!(view.drain_effects().is_empty());
    assert_eq!(view.score(), 140);
}

#[test]
fn rejected_status_restarts_the_game() {
    let mut view = mounted(None);
    view.on_server(ServerEvent::Status(Err(ApiError::Protocol(
        ProtocolError::Rejected("Jogo não encontrado".into()),
    ))));
    assert_eq!(
        view.drain_effects(),
        vec![Effect::Navigate(Navigation::NewGame)]
    );
}

#[test]
fn malformed_status_is_only_logged() {
    let mut view = mounted(None);
    view.on_server(ServerEvent::Status(Err(ApiError::Protocol(
        ProtocolError::MissingField("jogo_status"),
    ))));
    assert!(view.drain_effects().is_empty());
    assert!(view.can_roll());
}

#[test]
fn roll_schedules_first_step() {
    let mut view = mounted(None);
    let roll = RollOutcome::new(3).unwrap();
    assert!(view.roll_with(roll));
    assert_eq!(
        view.drain_effects(),
        vec![Effect::Schedule {
            delay: Duration::from_millis(320),
            timer: Timer::AnimationStep,
        }]
    );
    assert_eq!(view.die().last_roll, Some(roll));
    assert!(!view.roll());
}

#[test]
fn stale_overlay_timers_are_ignored() {
    let mut view = mounted(Some(Handoff {
        position: BoardPosition(5),
        score: None,
    }));
    assert!(view.roll_with(RollOutcome::new(1).unwrap()));
    view.on_timer(Timer::AnimationStep);
    view.on_timer(Timer::AnimationStep);
    assert_eq!(view.overlay(), &Overlay::Bonus);

    let token = view.overlay_token;
    assert!(view.dismiss());
    assert_eq!(view.overlay(), &Overlay::None);

    // The hide timer of the dismissed modal must not touch a later one.
    view.set_overlay(Overlay::Penalty);
    view.on_timer(Timer::HideOverlay(token));
    assert_eq!(view.overlay(), &Overlay::Penalty);
}

#[test]
fn arrival_modal_cannot_be_dismissed() {
    let mut view = mounted(None);
    view.set_overlay(Overlay::Arrival { countdown: 5 });
    assert!(!view.dismiss());
    assert_eq!(view.overlay(), &Overlay::Arrival { countdown: 5 });
}

#[test]
fn page_close_cancels_an_abandoned_game_once() {
    let mut view = mounted(None);
    view.page_close();
    assert_eq!(
        view.drain_effects(),
        vec![Effect::Beacon(GameRequest::CancelGame)]
    );

    view.unmount();
    view.page_close();
    assert!(view.drain_effects().is_empty());
}

#[test]
fn overlapping_layout_follows_priority() {
    let layout = BoardLayout::new(BoardPosition(10))
        .with_bonus([4])
        .with_penalty([4, 5])
        .with_trivia_zone(5, "Probability")
        .with_trivia_zone(10, "Correlation");
    let mut view = BoardView::new(layout, Timings::default(), StdRng::seed_from_u64(1));
    view.mount(GameId::parse("7").as_ref(), None);

    assert!(view.roll_with(RollOutcome::new(4).unwrap()));
    for _ in 0..5 {
        view.on_timer(Timer::AnimationStep);
    }
    assert_eq!(view.overlay(), &Overlay::Bonus);
}
