//! Multiple-choice question generation
//!
//! Distractors are drawn preferentially from species sharing the target's
//! trailing name word (e.g. everything ending in "Sunbird"), a cheap proxy
//! for taxonomic-family confusability, then topped up with the rest of the
//! list.

use lifer_common::SpeciesRecord;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Option count ceiling: the target plus up to three distractors
pub const MAX_OPTIONS: usize = 4;

/// Minimum list size for a meaningful question
pub const MIN_LIST_SIZE: usize = 2;

/// Quiz generation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    #[error("You need at least {MIN_LIST_SIZE} birds in your list to start a quiz (have {have})")]
    NotEnoughSpecies { have: usize },
}

/// Question prompt modality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Photo,
    Audio,
}

/// A generated question: the drawn target and the shuffled answer options.
///
/// Exactly one option equals the target's display name; the drawn target
/// instance stays authoritative even when the list holds duplicate display
/// names under distinct ids.
#[derive(Debug, Clone)]
pub struct GeneratedQuestion {
    pub target: SpeciesRecord,
    pub modality: Modality,
    pub options: Vec<String>,
}

/// Last whitespace-delimited token of a display name
pub fn trailing_word(name: &str) -> &str {
    name.split_whitespace().last().unwrap_or("")
}

/// Generate one multiple-choice question from the list.
///
/// Fails when the list has fewer than two members. Option count is
/// `min(4, list len)`, shorter when duplicate display names force distractor
/// candidates to be skipped.
pub fn generate(
    list: &[SpeciesRecord],
    modality: Modality,
    rng: &mut impl Rng,
) -> Result<GeneratedQuestion, QuizError> {
    if list.len() < MIN_LIST_SIZE {
        return Err(QuizError::NotEnoughSpecies { have: list.len() });
    }

    // 1. Draw the target uniformly
    let target_idx = rng.gen_range(0..list.len());
    let target = list[target_idx].clone();
    let target_name = target.display_name().to_string();
    let target_tail = trailing_word(&target_name).to_string();

    // 2. Partition the rest into confusable (same trailing word) and distinct
    let others: Vec<&SpeciesRecord> = list
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != target_idx)
        .map(|(_, r)| r)
        .collect();

    let mut confusable: Vec<&SpeciesRecord> = others
        .iter()
        .copied()
        .filter(|r| trailing_word(r.display_name()) == target_tail)
        .collect();
    let mut distinct: Vec<&SpeciesRecord> = others
        .iter()
        .copied()
        .filter(|r| trailing_word(r.display_name()) != target_tail)
        .collect();

    confusable.shuffle(rng);
    distinct.shuffle(rng);

    // 3. Fill distractors, confusables first. Skip anything that would
    //    collide with the target's name or repeat an option already chosen.
    let wanted = others.len().min(MAX_OPTIONS - 1);
    let mut options: Vec<String> = Vec::with_capacity(wanted + 1);
    for candidate in confusable.into_iter().chain(distinct) {
        if options.len() == wanted {
            break;
        }
        let name = candidate.display_name();
        if name == target_name || options.iter().any(|o| o == name) {
            continue;
        }
        options.push(name.to_string());
    }

    // 4. Mix the target in
    options.push(target_name);
    options.shuffle(rng);

    Ok(GeneratedQuestion {
        target,
        modality,
        options,
    })
}
