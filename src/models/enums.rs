use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unknown string value for one of the enums below.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid {field} value: {value}")]
pub struct ParseEnumError {
    pub field: String,
    pub value: String,
}

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// Variant order is the declaration order, so `Ord` follows it.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ParseEnumError {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(CommunicationStyle {
    Formal => "formal",
    Casual => "casual",
    Technical => "technical",
});

str_enum!(UrgencyLevel {
    Low => "low",
    Medium => "medium",
    High => "high",
});

str_enum!(DiagnosisStage {
    Greeting => "greeting",
    ProblemIdentification => "problem_identification",
    SymptomAnalysis => "symptom_analysis",
    Recommendation => "recommendation",
    Completed => "completed",
});

str_enum!(SenderType {
    User => "user",
    Bot => "bot",
});

str_enum!(MessageType {
    Text => "text",
    Diagnostic => "diagnostic",
    Quote => "quote",
});

str_enum!(Complexity {
    Simple => "simple",
    Medium => "medium",
    Complex => "complex",
});

impl Default for CommunicationStyle {
    fn default() -> Self {
        Self::Casual
    }
}

impl Default for UrgencyLevel {
    fn default() -> Self {
        Self::Medium
    }
}

impl Default for DiagnosisStage {
    fn default() -> Self {
        Self::Greeting
    }
}

impl Default for Complexity {
    fn default() -> Self {
        Self::Simple
    }
}

impl Complexity {
    /// Lenient parse of the reasoning service's hint: absent or unknown is `Simple`.
    pub fn from_hint(hint: Option<&str>) -> Self {
        hint.and_then(|h| h.trim().to_lowercase().parse().ok())
            .unwrap_or_default()
    }
}
