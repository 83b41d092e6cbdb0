//! On-disk story sessions.
//!
//! Each session is a directory `story_<YYYYmmdd_HHMMSS>` under the base
//! directory, holding `seed.json` and one text file per approved artifact.

use crate::{StoryContext, StorySeed};
use derive_getters::Getters;
use std::path::{Path, PathBuf};
use storyloom_error::{JsonError, JsonErrorKind, StorageError, StorageErrorKind, StoryloomResult};
use tracing::{debug, info, instrument};

const SESSION_PREFIX: &str = "story_";
const SEED_FILE: &str = "seed.json";

/// A session directory.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Getters)]
pub struct Session {
    /// Directory name, e.g. `story_20240101_120000`
    name: String,
    /// Full path of the directory
    path: PathBuf,
}

/// Creates, lists, saves and loads sessions under a base directory.
#[derive(Debug, Clone, Getters)]
pub struct SessionStore {
    /// Directory holding one sub-directory per session
    base_dir: PathBuf,
}

impl SessionStore {
    /// A store rooted at `base_dir`. Nothing is created until [`create`](Self::create).
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    /// Create a new, empty session named after the current local time.
    ///
    /// A numeric suffix is added if a session with that name already exists.
    #[instrument(skip(self), fields(base_dir = %self.base_dir.display()))]
    pub fn create(&self) -> StoryloomResult<Session> {
        std::fs::create_dir_all(&self.base_dir).map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                self.base_dir.display(),
                e
            )))
        })?;

        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
        let mut name = format!("{}{}", SESSION_PREFIX, stamp);
        let mut suffix = 2;
        while self.base_dir.join(&name).exists() {
            name = format!("{}{}_{}", SESSION_PREFIX, stamp, suffix);
            suffix += 1;
        }

        let path = self.base_dir.join(&name);
        std::fs::create_dir(&path).map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                path.display(),
                e
            )))
        })?;

        info!(session = %name, "Created session");
        Ok(Session { name, path })
    }

    /// Every session under the base directory, sorted by name.
    ///
    /// A missing base directory means no sessions.
    pub fn list(&self) -> StoryloomResult<Vec<Session>> {
        if !self.base_dir.exists() {
            return Ok(Vec::new());
        }

        let entries = std::fs::read_dir(&self.base_dir).map_err(|e| {
            StorageError::new(StorageErrorKind::FileRead(format!(
                "{}: {}",
                self.base_dir.display(),
                e
            )))
        })?;

        let mut sessions: Vec<Session> = entries
            .filter_map(Result::ok)
            .filter(|entry| entry.path().is_dir())
            .filter_map(|entry| {
                let name = entry.file_name().to_str()?.to_string();
                name.starts_with(SESSION_PREFIX).then(|| Session {
                    path: entry.path(),
                    name,
                })
            })
            .collect();
        sessions.sort();

        debug!(count = sessions.len(), "Listed sessions");
        Ok(sessions)
    }

    /// An existing session by name.
    pub fn open(&self, name: &str) -> StoryloomResult<Session> {
        let valid = !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains(['/', '\\']);
        if !valid {
            return Err(StorageError::new(StorageErrorKind::InvalidPath(name.to_string())).into());
        }

        let path = self.base_dir.join(name);
        if !path.is_dir() {
            return Err(StorageError::new(StorageErrorKind::NotFound(name.to_string())).into());
        }

        Ok(Session {
            name: name.to_string(),
            path,
        })
    }

    /// Write the seed and every populated artifact of `context`.
    #[instrument(skip(self, context), fields(session = %session.name))]
    pub fn save(&self, session: &Session, context: &StoryContext) -> StoryloomResult<()> {
        let seed = serde_json::to_string_pretty(context.seed())
            .map_err(|e| JsonError::new(JsonErrorKind::Serialize(e.to_string())))?;
        write_file(&session.path.join(SEED_FILE), &seed)?;

        let mut written = 0;
        for (file, text) in artifact_files(context) {
            if let Some(text) = text {
                write_file(&session.path.join(file), text)?;
                written += 1;
            }
        }

        debug!(artifacts = written, "Saved session");
        Ok(())
    }

    /// Rebuild the context stored in session `name`.
    #[instrument(skip(self))]
    pub fn load(&self, name: &str) -> StoryloomResult<StoryContext> {
        let session = self.open(name)?;

        let seed_path = session.path.join(SEED_FILE);
        if !seed_path.is_file() {
            return Err(StorageError::new(StorageErrorKind::NotFound(
                seed_path.display().to_string(),
            ))
            .into());
        }
        let seed: StorySeed = serde_json::from_str(&read_file(&seed_path)?)
            .map_err(|e| {
                JsonError::new(JsonErrorKind::Parse {
                    path: seed_path.display().to_string(),
                    message: e.to_string(),
                })
            })?;

        let mut context = StoryContext::new(seed);
        let stages = [
            ("topic.txt", crate::Stage::Topic),
            ("characters.txt", crate::Stage::Characters),
            ("outline.txt", crate::Stage::Outline),
            ("detailed_outline.txt", crate::Stage::DetailedOutline),
            ("prose.txt", crate::Stage::Prose),
            ("title.txt", crate::Stage::TitleTeaser),
        ];
        for (file, stage) in stages {
            let path = session.path.join(file);
            if path.is_file() {
                context.set_artifact(stage, read_file(&path)?)?;
            }
        }
        let teaser = session.path.join("teaser.txt");
        if teaser.is_file() {
            context.set_teaser(read_file(&teaser)?);
        }

        debug!(next = %context.next_stage(), "Loaded session");
        Ok(context)
    }
}

fn artifact_files(context: &StoryContext) -> [(&'static str, Option<&String>); 7] {
    [
        ("topic.txt", context.topic().as_ref()),
        ("characters.txt", context.characters().as_ref()),
        ("outline.txt", context.outline().as_ref()),
        ("detailed_outline.txt", context.detailed_outline().as_ref()),
        ("prose.txt", context.prose().as_ref()),
        ("title.txt", context.title().as_ref()),
        ("teaser.txt", context.teaser().as_ref()),
    ]
}

fn write_file(path: &Path, contents: &str) -> Result<(), StorageError> {
    std::fs::write(path, contents).map_err(|e| {
        StorageError::new(StorageErrorKind::FileWrite(format!("{}: {}", path.display(), e)))
    })
}

fn read_file(path: &Path) -> Result<String, StorageError> {
    std::fs::read_to_string(path).map_err(|e| {
        StorageError::new(StorageErrorKind::FileRead(format!("{}: {}", path.display(), e)))
    })
}
