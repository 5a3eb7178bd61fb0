pub use log::{debug, error, info, warn};

pub use common::message::*;
pub use common::{BoardPosition, GameId, Score};

pub use crate::{
    commands::Command,
    session::{Outbound, Session},
    state::{BoardView, Effect, Navigation, ServerEvent, Timer},
};
