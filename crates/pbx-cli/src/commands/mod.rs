//! Subcommands and exit-code policy

pub(crate) mod add_file;
pub(crate) mod fix_logging;

use pbx_manifest::InsertError;
use pbx_store::StoreError;

/// Success, including "already present" and "nothing to rewrite"
pub(crate) const EXIT_OK: i32 = 0;
/// Anchor, identifier or reference-audit failure
pub(crate) const EXIT_PATCH_FAILED: i32 = 1;
/// I/O, lock or configuration error
pub(crate) const EXIT_ENVIRONMENT: i32 = 2;

/// Exit code for a failed command
pub(crate) fn exit_code(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        let insert = cause.downcast_ref::<InsertError>().or_else(|| {
            match cause.downcast_ref::<StoreError>() {
                Some(StoreError::Insert(inner)) => Some(inner),
                _ => None,
            }
        });
        if let Some(insert) = insert {
            return if is_patch_failure(insert) {
                EXIT_PATCH_FAILED
            } else {
                EXIT_ENVIRONMENT
            };
        }
    }
    EXIT_ENVIRONMENT
}

fn is_patch_failure(err: &InsertError) -> bool {
    err.is_anchor_failure() || err.is_collision() || matches!(err, InsertError::Unverified(_))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use std::path::PathBuf;

    #[test]
    fn anchor_failures_exit_one() {
        let err = anyhow::Error::from(StoreError::from(InsertError::anchor_not_found("PBXGroup", "x")));
        assert_eq!(exit_code(&err), EXIT_PATCH_FAILED);

        let err = anyhow::Error::from(InsertError::ambiguous_anchor("PBXGroup", "x", 3));
        assert_eq!(exit_code(&err), EXIT_PATCH_FAILED);
    }

    #[test]
    fn plan_errors_exit_two() {
        let err: anyhow::Result<()> =
            Err(InsertError::InvalidPlan("no targets".into())).context("invalid insertion plan");
        assert_eq!(exit_code(&err.unwrap_err()), EXIT_ENVIRONMENT);
    }

    #[test]
    fn lock_errors_exit_two() {
        let err = anyhow::Error::from(StoreError::LockBusy {
            path: PathBuf::from("project.pbxproj.lock"),
        });
        assert_eq!(exit_code(&err), EXIT_ENVIRONMENT);
        assert_eq!(exit_code(&anyhow::anyhow!("bad config")), EXIT_ENVIRONMENT);
    }
}
