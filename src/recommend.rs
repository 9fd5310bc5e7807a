//! Recommendations for the player sidebar: scenes related to the one
//! currently playing, scored by tag overlap with a random fallback.

use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::api::Scene;

pub const MAX_RECOMMENDATIONS: usize = 8;

/// Minimum number of tag-matching scenes required before tag-based
/// recommendations are shown; below this the selection falls back to a
/// random sample. Product tuning, not a correctness contract.
pub const MIN_TAG_MATCHES: usize = 4;

#[derive(Debug, Clone)]
pub struct Recommendation {
    pub scene: Scene,
    /// How many of the current scene's tags this scene shares. Zero for
    /// scenes picked by the random fallback.
    pub tag_matches: usize,
}

/// Pick up to [`MAX_RECOMMENDATIONS`] scenes related to `current`.
///
/// Candidates sharing tags with the current scene are preferred, ordered by
/// overlap count descending (ties keep server order). When fewer than
/// [`MIN_TAG_MATCHES`] candidates share any tag, the result is a random
/// sample of the remaining candidates instead.
pub fn recommend<R: Rng + ?Sized>(
    current: &Scene,
    candidates: &[Scene],
    rng: &mut R,
) -> Vec<Recommendation> {
    if !current.tags.is_empty() {
        let current_tags: HashSet<&str> = current.tags.iter().map(|t| t.id.as_str()).collect();

        let mut tagged: Vec<Recommendation> = candidates
            .iter()
            .filter(|scene| scene.id != current.id)
            .map(|scene| Recommendation {
                tag_matches: scene
                    .tags
                    .iter()
                    .filter(|t| current_tags.contains(t.id.as_str()))
                    .count(),
                scene: scene.clone(),
            })
            .filter(|r| r.tag_matches > 0)
            .collect();

        tagged.sort_by(|a, b| b.tag_matches.cmp(&a.tag_matches));
        tagged.truncate(MAX_RECOMMENDATIONS);

        if tagged.len() >= MIN_TAG_MATCHES {
            return tagged;
        }
    }

    let mut others: Vec<&Scene> = candidates
        .iter()
        .filter(|scene| scene.id != current.id)
        .collect();
    others.shuffle(rng);

    others
        .into_iter()
        .take(MAX_RECOMMENDATIONS)
        .map(|scene| Recommendation {
            scene: scene.clone(),
            tag_matches: 0,
        })
        .collect()
}
