use std::sync::LazyLock;

use regex::Regex;

use super::rules::{first_match, STYLE_RULES, URGENCY_RULES};
use crate::models::{CommunicationStyle, UrgencyLevel, UserProfile};

static NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:je m'appelle|je m’appelle|mon prénom est|my name is)\s+(\p{L}[\p{L}'-]{0,30})")
        .expect("Invalid name regex pattern")
});

/// Classify the register of a lower-cased utterance.
///
/// Technical indicators win over formal ones; no match is `Casual`.
pub fn detect_style(lowered: &str) -> CommunicationStyle {
    first_match(STYLE_RULES, lowered).unwrap_or_default()
}

/// Urgency tier of a lower-cased utterance, high tier first. `None` when no tier matches.
pub fn detect_urgency(lowered: &str) -> Option<UrgencyLevel> {
    first_match(URGENCY_RULES, lowered)
}

/// Update style and urgency from one utterance.
///
/// Blank input leaves the profile as it is. Style falls back to `Casual`
/// when nothing matches; urgency keeps its previous value instead.
/// Name and satisfaction history are never touched here.
pub fn classify_profile(text: &str, profile: &UserProfile) -> UserProfile {
    let mut updated = profile.clone();
    if text.trim().is_empty() {
        return updated;
    }

    let lowered = text.to_lowercase();
    updated.communication_style = detect_style(&lowered);

    match detect_urgency(&lowered) {
        Some(level) => updated.urgency_level = level,
        None => tracing::trace!(
            urgency = %profile.urgency_level,
            "No urgency pattern matched, keeping previous level"
        ),
    }

    updated
}

/// Name the user introduces themselves with ("je m'appelle Julie"), capitalised.
pub fn extract_preferred_name(text: &str) -> Option<String> {
    let caps = NAME_PATTERN.captures(text)?;
    let raw = caps.get(1)?.as_str();
    let mut chars = raw.chars();
    let first = chars.next()?;
    Some(first.to_uppercase().chain(chars).collect())
}
