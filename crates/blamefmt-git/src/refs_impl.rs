//! gix-backed rev-parse.

use crate::error::GitError;
use crate::gix_repo::GixRepo;
use crate::types::GitOid;

/// Convert a `gix::ObjectId` to a `GitOid`.
pub(crate) fn from_gix_oid(oid: &gix::oid) -> Result<GitOid, GitError> {
    let bytes: [u8; 20] = oid
        .as_bytes()
        .try_into()
        .map_err(|_| GitError::InvalidOid {
            value: oid.to_string(),
            reason: "only SHA-1 repositories are supported".to_owned(),
        })?;
    Ok(GitOid::from_bytes(bytes))
}

pub fn rev_parse(repo: &GixRepo, spec: &str) -> Result<GitOid, GitError> {
    let local = repo.local();
    let id = local
        .rev_parse_single(spec)
        .map_err(|e| GitError::NotFound {
            message: format!("rev-parse '{spec}': {e}"),
        })?;
    from_gix_oid(&id.detach())
}
