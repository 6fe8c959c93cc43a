use serde::{Deserialize, Serialize};

use super::domain::Level;
use super::normalizer::normalize_name;

/// Every keyword table the pipeline consults, bundled so callers pass one value
/// into the pure functions instead of reaching for globals.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecruitingRules {
    pub events: EventPatterns,
    pub stage_types: StageTypeKeywords,
    pub levels: LevelKeywords,
    pub rollout: AiRolloutPolicy,
}

/// Phrases recognizing one event kind. A label matches when it contains any
/// `any_of` phrase, every `all_of` phrase and none of the `none_of` phrases;
/// phrases are compared in normalized form (lower case, dashes and underscores
/// as spaces).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternFamily {
    pub any_of: Vec<String>,
    #[serde(default)]
    pub all_of: Vec<String>,
    #[serde(default)]
    pub none_of: Vec<String>,
}

fn normalized(phrases: &[&str]) -> Vec<String> {
    phrases.iter().map(|phrase| normalize_name(phrase)).collect()
}

impl PatternFamily {
    pub fn new(any_of: &[&str], none_of: &[&str]) -> Self {
        Self {
            any_of: normalized(any_of),
            all_of: Vec::new(),
            none_of: normalized(none_of),
        }
    }

    /// Adds phrases that must all be present, in any position.
    pub fn requiring(mut self, all_of: &[&str]) -> Self {
        self.all_of = normalized(all_of);
        self
    }

    /// Byte offset just past the earliest matching `any_of` phrase in `folded`.
    pub(crate) fn match_end(&self, folded: &str) -> Option<usize> {
        let contains = |phrase: &String| !phrase.is_empty() && folded.contains(phrase.as_str());
        if self.none_of.iter().any(contains) {
            return None;
        }
        if !self
            .all_of
            .iter()
            .all(|phrase| phrase.is_empty() || folded.contains(phrase.as_str()))
        {
            return None;
        }

        self.any_of
            .iter()
            .filter(|phrase| !phrase.is_empty())
            .filter_map(|phrase| {
                folded
                    .find(phrase.as_str())
                    .map(|start| (start, start + phrase.len()))
            })
            .min()
            .map(|(_, end)| end)
    }
}

/// Pattern families in classification priority order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPatterns {
    pub stage_change: PatternFamily,
    pub availability_requested: PatternFamily,
    pub availability_received: PatternFamily,
    pub interview_scheduled: PatternFamily,
    pub interview_completed: PatternFamily,
    pub take_home_submitted: PatternFamily,
    pub take_home_graded: PatternFamily,
}

impl Default for EventPatterns {
    fn default() -> Self {
        Self {
            stage_change: PatternFamily::new(
                &["moved into", "moved to stage", "stage changed to", "advanced to"],
                &[],
            ),
            availability_requested: PatternFamily::new(
                &[
                    "to requested",
                    "requested availability",
                    "availability request",
                    "availability requested",
                ],
                &[
                    "to received",
                    "submitted their availability",
                    "availability received",
                ],
            ),
            availability_received: PatternFamily::new(
                &[
                    "submitted their availability",
                    "to received",
                    "availability received",
                    "availability submitted",
                    "provided availability",
                ],
                &[],
            ),
            interview_scheduled: PatternFamily::new(
                &[
                    "interview scheduled",
                    "scheduled an interview",
                    "scheduled interview",
                    "interview rescheduled",
                    "rescheduled interview",
                ],
                &["take home"],
            ),
            interview_completed: PatternFamily::new(
                &[
                    "interview completed",
                    "completed interview",
                    "feedback submitted",
                    "submitted feedback",
                    "scorecard submitted",
                    "submitted a scorecard",
                    "submitted scorecard",
                ],
                &["take home"],
            ),
            take_home_submitted: PatternFamily::new(
                &[
                    "take home submitted",
                    "take home test submitted",
                    "submitted take home",
                    "submitted the take home",
                    "submitted a take home",
                    "take home sent",
                    "take home test sent",
                    "sent take home",
                    "sent the take home",
                    "sent a take home",
                ],
                &["graded", "scored", "scorecard", "feedback"],
            ),
            // Grading wording may come before or after the take-home name
            // ("Take home test scored", "submitted a scorecard for Take Home Test").
            take_home_graded: PatternFamily::new(
                &["graded", "scored", "scorecard", "feedback"],
                &[],
            )
            .requiring(&["take home"]),
        }
    }
}

/// Keywords mapping a stage name onto its stage type. Checked take-home first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTypeKeywords {
    pub take_home: Vec<String>,
    pub interview: Vec<String>,
}

impl Default for StageTypeKeywords {
    fn default() -> Self {
        Self {
            take_home: vec!["home".to_string(), "assignment".to_string()],
            interview: vec![
                "interview".to_string(),
                "onsite".to_string(),
                "phone".to_string(),
                "screen".to_string(),
            ],
        }
    }
}

/// Title keywords for the seniority heuristic.
///
/// `keywords` are tried in order against whole tokens of the title; when none
/// hit, a `1`/`2` (or `i`/`ii`) attached to or following one of `numbered_roots`
/// selects SWE1/SWE2. `custom_field_keys` name the job custom fields consulted
/// before the title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelKeywords {
    pub keywords: Vec<(String, Level)>,
    pub numbered_roots: Vec<String>,
    pub engineering_keywords: Vec<String>,
    pub custom_field_keys: Vec<String>,
}

impl Default for LevelKeywords {
    fn default() -> Self {
        Self {
            keywords: vec![
                ("staff".to_string(), Level::Staff),
                ("senior".to_string(), Level::Senior),
                ("sr".to_string(), Level::Senior),
            ],
            numbered_roots: vec!["swe".to_string(), "engineer".to_string()],
            engineering_keywords: vec![
                "engineer".to_string(),
                "engineering".to_string(),
                "swe".to_string(),
                "developer".to_string(),
            ],
            custom_field_keys: vec!["level".to_string(), "seniority".to_string()],
        }
    }
}

/// Rules deciding whether AI-assisted recruiting is switched on for a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiRolloutPolicy {
    /// Levels enabled through a take-home stage.
    pub take_home_levels: Vec<Level>,
    pub take_home_stage_marker: String,
    /// Levels enabled through the AI-assisted screen interview.
    pub screen_levels: Vec<Level>,
    pub screen_interview_marker: String,
}

impl Default for AiRolloutPolicy {
    fn default() -> Self {
        Self {
            take_home_levels: vec![Level::Swe1, Level::Swe2],
            take_home_stage_marker: "Take Home Test".to_string(),
            screen_levels: vec![Level::Senior],
            screen_interview_marker: "DevAI Technical Screen".to_string(),
        }
    }
}
