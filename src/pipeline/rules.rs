//! Static keyword tables driving classification, symptom extraction and
//! mood tracking.
//!
//! Every table is an ordered list of `Rule`s. Matching is plain substring
//! containment against the lower-cased utterance: multi-word patterns must
//! appear literally. Patterns are stored lower-case.

use crate::models::{CommunicationStyle, UrgencyLevel};

/// A label and the substrings that trigger it.
#[derive(Debug, Clone, Copy)]
pub struct Rule<L: 'static> {
    pub label: L,
    pub patterns: &'static [&'static str],
}

impl<L: Copy> Rule<L> {
    pub fn matches(&self, lowered: &str) -> bool {
        self.patterns.iter().any(|p| lowered.contains(p))
    }
}

/// Label of the first rule (in table order) with a matching pattern.
pub fn first_match<L: Copy>(rules: &[Rule<L>], lowered: &str) -> Option<L> {
    rules.iter().find(|r| r.matches(lowered)).map(|r| r.label)
}

/// Labels of every rule with a matching pattern, in table order.
pub fn all_matches<'a, L: Copy>(
    rules: &'a [Rule<L>],
    lowered: &'a str,
) -> impl Iterator<Item = L> + 'a {
    rules.iter().filter(move |r| r.matches(lowered)).map(|r| r.label)
}

// ═══════════════════════════════════════════
// Communication style (technical wins over formal)
// ═══════════════════════════════════════════

pub static STYLE_RULES: &[Rule<CommunicationStyle>] = &[
    Rule {
        label: CommunicationStyle::Technical,
        patterns: &[
            // French
            "carte mère",
            "carte mere",
            "mémoire vive",
            "memoire vive",
            "processeur",
            "firmware",
            "micrologiciel",
            "le bios",
            "du bios",
            "nappe de l'écran",
            "nappe de l'ecran",
            "connecteur",
            "cycle de charge",
            "cycles de charge",
            "0 mah",
            "0mah",
            "ghz",
            "stockage interne",
            "pilote graphique",
            "pilotes",
            "oled",
            "lcd",
            "mode recovery",
            "mode dfu",
            // English
            "motherboard",
            "cpu",
            "ram usage",
            "graphics driver",
            "driver update",
            "bios update",
            "kernel",
            "flex cable",
            "battery health",
            "charge cycles",
            "bootloader",
        ],
    },
    Rule {
        label: CommunicationStyle::Formal,
        patterns: &[
            // French
            "monsieur",
            "madame",
            "pourriez-vous",
            "pourriez vous",
            "auriez-vous",
            "je vous prie",
            "veuillez",
            "cordialement",
            "je souhaiterais",
            "je vous remercie",
            "bien à vous",
            // English
            "could you please",
            "would you kindly",
            "i would like to",
            "dear ",
            "sincerely",
            "kind regards",
        ],
    },
];

// ═══════════════════════════════════════════
// Urgency, evaluated high → medium → low
// ═══════════════════════════════════════════

// Low-tier patterns never contain a high-tier pattern: "pas urgent" would
// always resolve to `High` and is left out. The high tier names the noun
// only in affirmative phrases so that "aucune urgence" stays reachable.
pub static URGENCY_RULES: &[Rule<UrgencyLevel>] = &[
    Rule {
        label: UrgencyLevel::High,
        patterns: &[
            // French
            "urgent",
            "en urgence",
            "d'urgence",
            "c'est une urgence",
            "urgence absolue",
            "immédiatement",
            "immediatement",
            "tout de suite",
            "au plus vite",
            "le plus vite possible",
            "aujourd'hui même",
            "c'est grave",
            "besoin pour le travail",
            // English
            "asap",
            "emergency",
            "right now",
            "immediately",
        ],
    },
    Rule {
        label: UrgencyLevel::Medium,
        patterns: &[
            // French
            "bientôt",
            "bientot",
            "cette semaine",
            "rapidement",
            "dès que possible",
            "des que possible",
            "dans les jours",
            // English
            "soon",
            "this week",
            "quickly",
            "in a few days",
        ],
    },
    Rule {
        label: UrgencyLevel::Low,
        patterns: &[
            // French
            "pas pressé",
            "pas presse",
            "rien ne presse",
            "quand vous aurez le temps",
            "quand vous pouvez",
            "aucune urgence",
            "sans urgence",
            // English
            "no rush",
            "whenever",
            "no hurry",
            "take your time",
        ],
    },
];

// ═══════════════════════════════════════════
// Symptom vocabulary: canonical label → triggers
// ═══════════════════════════════════════════

pub static SYMPTOM_RULES: &[Rule<&'static str>] = &[
    Rule {
        label: "écran cassé",
        patterns: &[
            "écran cassé",
            "ecran casse",
            "écran est cassé",
            "ecran est casse",
            "écran fissuré",
            "écran brisé",
            "vitre cassée",
            "vitre fissurée",
            "cracked screen",
            "broken screen",
            "screen is cracked",
            "screen is broken",
        ],
    },
    Rule {
        label: "écran noir",
        patterns: &[
            "écran noir",
            "ecran noir",
            "écran reste noir",
            "plus d'affichage",
            "black screen",
            "screen stays black",
            "no display",
        ],
    },
    Rule {
        label: "tactile défaillant",
        patterns: &[
            "tactile ne répond",
            "tactile ne marche",
            "tactile ne fonctionne",
            "écran ne répond",
            "touch screen not",
            "touchscreen not",
            "ghost touch",
        ],
    },
    Rule {
        label: "batterie défaillante",
        patterns: &[
            "batterie se vide",
            "batterie faible",
            "batterie gonflée",
            "batterie ne tient",
            "autonomie",
            "battery drain",
            "battery dies",
            "swollen battery",
        ],
    },
    Rule {
        label: "problème de charge",
        patterns: &[
            "ne charge pas",
            "ne charge plus",
            "charge pas",
            "chargeur ne",
            "port de charge",
            "not charging",
            "won't charge",
            "charging port",
        ],
    },
    Rule {
        label: "ne s'allume pas",
        patterns: &[
            "ne s'allume pas",
            "ne s'allume plus",
            "ne démarre pas",
            "ne démarre plus",
            "ne demarre pas",
            "won't turn on",
            "doesn't turn on",
            "won't boot",
        ],
    },
    Rule {
        label: "surchauffe",
        patterns: &[
            "surchauffe",
            "chauffe beaucoup",
            "devient chaud",
            "brûlant",
            "overheat",
            "gets hot",
        ],
    },
    Rule {
        label: "dégât des eaux",
        patterns: &[
            "tombé dans l'eau",
            "tombe dans l'eau",
            "dans l'eau",
            "mouillé",
            "oxydation",
            "liquide renversé",
            "water damage",
            "dropped in water",
            "got wet",
        ],
    },
    Rule {
        label: "problème audio",
        patterns: &[
            "pas de son",
            "haut-parleur",
            "haut parleur",
            "micro ne",
            "son grésille",
            "no sound",
            "speaker",
            "microphone",
        ],
    },
    Rule {
        label: "problème caméra",
        patterns: &[
            "appareil photo",
            "caméra",
            "camera",
            "photos floues",
        ],
    },
    Rule {
        label: "problème réseau",
        patterns: &[
            "pas de réseau",
            "pas de reseau",
            "wifi",
            "wi-fi",
            "bluetooth",
            "carte sim",
            "no signal",
            "no network",
        ],
    },
    Rule {
        label: "lenteur",
        patterns: &[
            "très lent",
            "tres lent",
            "devenu lent",
            "ça rame",
            "il rame",
            "se bloque",
            "plante souvent",
            "freeze",
            "very slow",
            "lagging",
        ],
    },
    Rule {
        label: "redémarrages intempestifs",
        patterns: &[
            "redémarre tout seul",
            "redemarre tout seul",
            "redémarre en boucle",
            "s'éteint tout seul",
            "keeps restarting",
            "boot loop",
            "bootloop",
        ],
    },
    Rule {
        label: "bouton défectueux",
        patterns: &[
            "bouton",
            "touche ne",
            "button",
        ],
    },
];

// ═══════════════════════════════════════════
// Mood signals (first match wins)
// ═══════════════════════════════════════════

/// Effect of a mood signal on the emotional journey.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoodShift {
    pub mood: &'static str,
    pub frustration_delta: i32,
    pub confidence_delta: i32,
}

// Frustration is checked before satisfaction so that
// "merci mais ça ne marche toujours pas" reads as frustrated.
pub static MOOD_RULES: &[Rule<MoodShift>] = &[
    Rule {
        label: MoodShift { mood: "frustrated", frustration_delta: 20, confidence_delta: -10 },
        patterns: &[
            "toujours pas",
            "encore en panne",
            "énervé",
            "enerve",
            "marre",
            "ras le bol",
            "n'importe quoi",
            "ça sert à rien",
            "frustr",
            "still not working",
            "useless",
            "fed up",
            "annoying",
        ],
    },
    Rule {
        label: MoodShift { mood: "anxious", frustration_delta: 10, confidence_delta: -5 },
        patterns: &[
            "inquiet",
            "inquiète",
            "j'ai peur",
            "stressé",
            "perdre mes photos",
            "perdu mes données",
            "worried",
            "scared",
            "lose my data",
        ],
    },
    Rule {
        label: MoodShift { mood: "confused", frustration_delta: 5, confidence_delta: -10 },
        patterns: &[
            "je ne comprends pas",
            "comprends pas",
            "c'est quoi",
            "je suis perdu",
            "don't understand",
            "confused",
        ],
    },
    Rule {
        label: MoodShift { mood: "satisfied", frustration_delta: -15, confidence_delta: 15 },
        patterns: &[
            "merci",
            "super",
            "génial",
            "parfait",
            "ça marche",
            "ça fonctionne",
            "thanks",
            "thank you",
            "great",
            "perfect",
            "it works",
        ],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patterns_are_lower_case() {
        let all = STYLE_RULES
            .iter()
            .flat_map(|r| r.patterns)
            .chain(URGENCY_RULES.iter().flat_map(|r| r.patterns))
            .chain(SYMPTOM_RULES.iter().flat_map(|r| r.patterns))
            .chain(MOOD_RULES.iter().flat_map(|r| r.patterns));
        for p in all {
            assert_eq!(*p, p.to_lowercase(), "pattern not lower-case: {p}");
        }
    }

    #[test]
    fn low_urgency_patterns_are_reachable() {
        let high = &URGENCY_RULES[0];
        for rule in &URGENCY_RULES[1..] {
            for p in rule.patterns {
                assert!(!high.matches(p), "{p} is shadowed by the high tier");
            }
        }
    }

    #[test]
    fn technical_patterns_do_not_fire_inside_everyday_words() {
        for text in [
            "j'ai perdu mon screwdriver",
            "une belle symbiose entre le boîtier et l'écran",
            "mahal, mon téléphone est tombé",
            "ma nappe de cuisine est mouillée",
        ] {
            assert_ne!(
                first_match(STYLE_RULES, text),
                Some(CommunicationStyle::Technical),
                "{text}"
            );
        }
        assert_eq!(
            first_match(STYLE_RULES, "batterie de 4000 mah, je suis allé dans le bios"),
            Some(CommunicationStyle::Technical)
        );
    }

    #[test]
    fn first_match_respects_table_order() {
        let text = "le processeur chauffe, pourriez-vous m'aider";
        assert_eq!(first_match(STYLE_RULES, text), Some(CommunicationStyle::Technical));
    }

    #[test]
    fn first_match_none_when_nothing_matches() {
        assert_eq!(first_match(URGENCY_RULES, "bonjour"), None);
    }

    #[test]
    fn all_matches_collects_every_label() {
        let text = "écran cassé et batterie gonflée";
        let labels: Vec<_> = all_matches(SYMPTOM_RULES, text).collect();
        assert_eq!(labels, vec!["écran cassé", "batterie défaillante"]);
    }

    #[test]
    fn symptom_labels_are_unique() {
        let mut labels: Vec<_> = SYMPTOM_RULES.iter().map(|r| r.label).collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), SYMPTOM_RULES.len());
    }
}
