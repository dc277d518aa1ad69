//! gix-backed config read.

use crate::error::GitError;
use crate::gix_repo::GixRepo;

pub fn read_config(repo: &GixRepo, key: &str) -> Result<Option<String>, GitError> {
    let local = repo.local();
    let snapshot = local.config_snapshot();
    Ok(snapshot.string(key).map(|value| value.to_string()))
}
