use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::prelude::*;

const POSITION_KEY: &str = fields::POSITION;
const SCORE_KEY: &str = "pontuacao_atual";

/// Position and score carried over a page navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Handoff {
    pub position: BoardPosition,
    pub score: Option<Score>,
}

#[derive(Error, Debug)]
pub enum HandoffError {
    #[error("failed to access handoff file: {0}")]
    Io(#[from] io::Error),
    #[error("handoff file is not valid json: {0}")]
    Json(#[from] serde_json::Error),
}

/// One-shot key/value file left by the page that sent the player here. The
/// board only reads and clears it. Values are kept as strings.
#[derive(Debug, Clone)]
pub struct HandoffStore {
    path: PathBuf,
}

impl HandoffStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<BTreeMap<String, String>, HandoffError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, entries: &BTreeMap<String, String>) -> Result<(), HandoffError> {
        fs::write(&self.path, serde_json::to_string_pretty(entries)?)?;
        Ok(())
    }

    /// Reads and clears the handoff. A position that does not parse counts as
    /// no handoff at all; a bad score is just dropped.
    pub fn take(&self) -> Result<Option<Handoff>, HandoffError> {
        let mut entries = self.read()?;
        let position = entries.remove(POSITION_KEY);
        let score = entries.remove(SCORE_KEY);

        let Some(position) = position else {
            return Ok(None);
        };
        self.write(&entries)?;

        let Ok(position) = position.trim().parse::<u32>() else {
            warn!("Ignoring handoff with invalid position {position:?}");
            return Ok(None);
        };

        let score = score.and_then(|score| match score.trim().parse::<Score>() {
            Ok(score) => Some(score),
            Err(e) => {
                warn!("Ignoring handoff score {score:?}: {e}");
                None
            }
        });

        Ok(Some(Handoff {
            position: BoardPosition(position),
            score,
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    static NEXT_FILE: AtomicUsize = AtomicUsize::new(0);

    fn temp_store() -> HandoffStore {
        let n = NEXT_FILE.fetch_add(1, Ordering::Relaxed);
        let path =
            std::env::temp_dir().join(format!("trilha-handoff-{}-{n}.json", std::process::id()));
        let _ = fs::remove_file(&path);
        HandoffStore::new(path)
    }

    #[test]
    fn take_is_one_shot() {
        let store = temp_store();
        fs::write(
            store.path(),
            r#"{"casa_atual":"7","pontuacao_atual":"-10"}"#,
        )
        .unwrap();

        assert_eq!(
            store.take().unwrap(),
            Some(Handoff {
                position: BoardPosition(7),
                score: Some(-10),
            })
        );
        assert_eq!(store.take().unwrap(), None);
        let _ = fs::remove_file(store.path());
    }

    #[test]
    fn missing_file_is_empty() {
        let store = temp_store();
        assert_eq!(store.take().unwrap(), None);
    }

    #[test]
    fn unrelated_keys_survive() {
        let store = temp_store();
        fs::write(
            store.path(),
            r#"{"casa_atual":"4","pontuacao_atual":"abc","gameAudioEnabled":"false"}"#,
        )
        .unwrap();

        assert_eq!(
            store.take().unwrap(),
            Some(Handoff {
                position: BoardPosition(4),
                score: None
            })
        );

        let left: BTreeMap<String, String> =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(left.len(), 1);
        assert!(left.contains_key("gameAudioEnabled"));
        let _ = fs::remove_file(store.path());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let store = temp_store();
        fs::write(store.path(), "not json").unwrap();
        assert!(matches!(store.take(), Err(HandoffError::Json(_))));
        let _ = fs::remove_file(store.path());
    }
}
