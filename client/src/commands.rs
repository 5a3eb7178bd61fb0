use crate::prelude::*;

/// Player input, applied to the running session. Returns a line of feedback
/// when there is something to tell the player.
pub trait Command {
    fn execute(self: Box<Self>, session: &mut Session) -> Option<String>;
}

/// Collects what the player did during a frame; run once the frame is drawn.
pub struct CommandQueue<'a> {
    pub command_queue: &'a mut Vec<Box<dyn Command>>,
}

impl CommandQueue<'_> {
    pub fn add(&mut self, command: impl Command + 'static) {
        self.command_queue.push(Box::new(command));
    }
}

pub struct Roll;

impl Command for Roll {
    fn execute(self: Box<Self>, session: &mut Session) -> Option<String> {
        if session.with_view(BoardView::roll) {
            None
        } else {
            Some("You can't roll right now.".into())
        }
    }
}

pub struct Hint;

impl Command for Hint {
    fn execute(self: Box<Self>, session: &mut Session) -> Option<String> {
        (!session.with_view(BoardView::reveal_hint)).then(|| "There is no hint to show.".into())
    }
}

/// Stages the answer at this index, as listed.
pub struct Choose(pub usize);

impl Command for Choose {
    fn execute(self: Box<Self>, session: &mut Session) -> Option<String> {
        (!session.with_view(|view| view.select_answer(self.0)))
            .then(|| format!("Answer {} can't be chosen.", self.0 + 1))
    }
}

pub struct Submit;

impl Command for Submit {
    fn execute(self: Box<Self>, session: &mut Session) -> Option<String> {
        (!session.with_view(BoardView::submit_answer))
            .then(|| "Choose an answer before submitting.".into())
    }
}

pub struct Dismiss;

impl Command for Dismiss {
    fn execute(self: Box<Self>, session: &mut Session) -> Option<String> {
        (!session.with_view(BoardView::dismiss)).then(|| "Nothing to close.".into())
    }
}

pub struct Exit;

impl Command for Exit {
    fn execute(self: Box<Self>, session: &mut Session) -> Option<String> {
        session.with_view(BoardView::exit);
        None
    }
}

/// Runs every queued command in order, keeping the last piece of feedback.
pub fn run_all(commands: Vec<Box<dyn Command>>, session: &mut Session) -> Option<String> {
    commands
        .into_iter()
        .filter_map(|command| command.execute(session))
        .last()
}

#[cfg(test)]
mod tests {
    use common::board::BoardLayout;
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::config::Timings;

    fn session() -> Session {
        let view = BoardView::new(
            BoardLayout::classic(),
            Timings::default(),
            StdRng::seed_from_u64(1),
        );
        let mut session = Session::new(view);
        session.mount(GameId::parse("7").as_ref(), None);
        session.drain_outbound();
        session
    }

    fn run(session: &mut Session, command: impl Command + 'static) -> Option<String> {
        let mut queued = Vec::new();
        CommandQueue {
            command_queue: &mut queued,
        }
        .add(command);
        run_all(queued, session)
    }

    #[test]
    fn roll_twice_is_refused() {
        let mut session = session();
        assert_eq!(run(&mut session, Roll), None);
        assert!(session.view().is_animating());
        assert!(run(&mut session, Roll).is_some());
    }

    #[test]
    fn trivia_commands_need_a_question() {
        let mut session = session();
        assert!(run(&mut session, Hint).is_some());
        assert_eq!(
            run(&mut session, Choose(1)).as_deref(),
            Some("Answer 2 can't be chosen.")
        );
        assert!(run(&mut session, Submit).is_some());
        assert!(run(&mut session, Dismiss).is_some());
    }

    #[test]
    fn queue_keeps_last_feedback() {
        let mut session = session();
        let commands: Vec<Box<dyn Command>> = vec![Box::new(Roll), Box::new(Hint), Box::new(Roll)];
        assert_eq!(
            run_all(commands, &mut session).as_deref(),
            Some("You can't roll right now.")
        );
    }

    #[test]
    fn exit_cancels_and_goes_home() {
        let mut session = session();
        assert_eq!(run(&mut session, Exit), None);
        assert_eq!(
            session.drain_outbound(),
            vec![
                Outbound::Beacon(GameRequest::CancelGame),
                Outbound::Navigate(Navigation::Home),
            ]
        );

        // Already gone: closing the page does not cancel twice.
        session.page_close();
        assert!(session.drain_outbound().is_empty());
    }
}
