//! Experience points and level tiers.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// XP awarded per completion.
pub const XP_PER_COMPLETION: u64 = 10;

/// Minimum XP for each level, starting at level 1. The last entry is the
/// open-ended top tier.
pub const LEVEL_THRESHOLDS: [u64; 5] = [0, 100, 300, 600, 1000];

/// Reported as `xp_to_next` once the top tier is reached.
pub const LEVEL_CEILING_XP: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelState {
    pub xp: u64,
    pub level: u32,
    /// XP threshold of the next level, or [`LEVEL_CEILING_XP`] at the top tier.
    pub xp_to_next: u64,
}

/// Map lifetime completions to XP and level.
///
/// # Errors
/// Returns [`ValidationError::InvalidArgument`] for a negative count.
pub fn level_for(total_completions: i64) -> Result<LevelState, ValidationError> {
    let completions = u64::try_from(total_completions).map_err(|_| {
        ValidationError::InvalidArgument {
            name: "total_completions",
            message: format!("must be >= 0, got {total_completions}"),
        }
    })?;
    let xp = completions.saturating_mul(XP_PER_COMPLETION);

    let tier = LEVEL_THRESHOLDS
        .iter()
        .rposition(|threshold| xp >= *threshold)
        .unwrap_or(0);
    let xp_to_next = LEVEL_THRESHOLDS
        .get(tier + 1)
        .copied()
        .unwrap_or(LEVEL_CEILING_XP);

    Ok(LevelState {
        xp,
        level: tier as u32 + 1,
        xp_to_next,
    })
}
