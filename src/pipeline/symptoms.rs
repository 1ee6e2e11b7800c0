use std::collections::BTreeSet;

use super::rules::{all_matches, Rule, SYMPTOM_RULES};

/// Canonical symptom labels found in an utterance, using the built-in vocabulary.
pub fn extract_symptoms(text: &str) -> BTreeSet<String> {
    extract_symptoms_with(text, SYMPTOM_RULES)
}

/// Canonical symptom labels found in an utterance against a caller-supplied table.
pub fn extract_symptoms_with(text: &str, rules: &[Rule<&'static str>]) -> BTreeSet<String> {
    let lowered = text.to_lowercase();
    all_matches(rules, &lowered).map(str::to_string).collect()
}

/// Union `found` into `collected`. Returns the labels that were new.
pub fn merge_symptoms(collected: &mut BTreeSet<String>, found: BTreeSet<String>) -> Vec<String> {
    let mut added = Vec::new();
    for label in found {
        if collected.insert(label.clone()) {
            added.push(label);
        }
    }
    added
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_screen_damage_from_french() {
        let found = extract_symptoms("Mon écran est cassé et c'est urgent");
        assert!(found.contains("écran cassé"));
    }

    #[test]
    fn one_utterance_can_yield_several_labels() {
        let found = extract_symptoms("Il est tombé dans l'eau, depuis il ne charge plus et surchauffe");
        assert!(found.contains("dégât des eaux"));
        assert!(found.contains("problème de charge"));
        assert!(found.contains("surchauffe"));
    }

    #[test]
    fn matching_ignores_case() {
        let found = extract_symptoms("CRACKED SCREEN after a drop");
        assert!(found.contains("écran cassé"));
    }

    #[test]
    fn no_symptom_in_small_talk() {
        assert!(extract_symptoms("Bonjour, merci de votre aide").is_empty());
        assert!(extract_symptoms("").is_empty());
    }

    #[test]
    fn merge_is_idempotent() {
        let mut collected = BTreeSet::new();
        let text = "écran noir et batterie gonflée";

        let added = merge_symptoms(&mut collected, extract_symptoms(text));
        assert_eq!(added.len(), 2);
        let size = collected.len();

        let added = merge_symptoms(&mut collected, extract_symptoms(text));
        assert!(added.is_empty());
        assert_eq!(collected.len(), size);
    }

    #[test]
    fn merge_never_shrinks_the_set() {
        let mut collected = BTreeSet::new();
        merge_symptoms(&mut collected, extract_symptoms("écran cassé"));
        merge_symptoms(&mut collected, extract_symptoms("rien à signaler"));
        merge_symptoms(&mut collected, extract_symptoms("il surchauffe"));
        assert_eq!(collected.len(), 2);
        assert!(collected.contains("écran cassé"));
    }

    #[test]
    fn custom_table_is_honoured() {
        static RULES: &[Rule<&'static str>] = &[Rule {
            label: "clavier défectueux",
            patterns: &["touche bloquée", "clavier"],
        }];
        let found = extract_symptoms_with("le clavier ne répond plus", RULES);
        assert_eq!(found.into_iter().collect::<Vec<_>>(), vec!["clavier défectueux"]);
    }
}
