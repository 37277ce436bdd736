//! Per-session artifact directory and its public URI mapping.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};

/// The artifact directory owned by a single run, keyed by its session id.
/// Never reused across runs; concurrent runs cannot collide because the key
/// is a fresh UUID.
#[derive(Debug)]
pub struct SessionArtifacts {
    session_id: String,
    dir: PathBuf,
    public_base: String,
}

impl SessionArtifacts {
    /// Create `{root}/{session_id}`. Failure here is fatal for the run.
    pub async fn create(root: &Path, public_base: &str, session_id: &str) -> Result<Self> {
        let dir = root.join(session_id);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| Error::Storage(format!("cannot create {}: {e}", dir.display())))?;
        debug!(session = session_id, dir = %dir.display(), "artifact directory ready");
        Ok(Self {
            session_id: session_id.to_string(),
            dir,
            public_base: public_base.trim_end_matches('/').to_string(),
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// File name for the screenshot of step `index` (1-based).
    pub fn step_file(index: usize, failed: bool) -> String {
        if failed {
            format!("step-{index}-error.png")
        } else {
            format!("step-{index}.png")
        }
    }

    /// On-disk path for a file in this session's directory.
    pub fn path_of(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    /// Public URI for a file in this session's directory.
    pub fn url_of(&self, file: &str) -> String {
        format!("{}/{}/{}", self.public_base, self.session_id, file)
    }
}
