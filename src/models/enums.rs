use serde::{Deserialize, Serialize};

use super::ModelError;

/// Macro to generate enum with as_str + std::str::FromStr + Display pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ModelError::InvalidEnum {
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

str_enum!(Stage {
    Greeting => "greeting",
    SymptomGathering => "symptom_gathering",
    Clarification => "clarification",
    Analysis => "analysis",
    Recommendation => "recommendation",
});

str_enum!(Sex {
    Male => "male",
    Female => "female",
});

str_enum!(Severity {
    Low => "low",
    Medium => "medium",
    High => "high",
});

str_enum!(Intent {
    Greeting => "greeting",
    Confirmation => "confirmation",
    Denial => "denial",
    SeekingHelp => "seeking_help",
    SymptomReport => "symptom_report",
    ProfileInfo => "profile_info",
    General => "general",
});

str_enum!(Urgency {
    Routine => "routine",
    ScheduleSoon => "schedule_soon",
    SeekImmediateCare => "seek_immediate_care",
});

str_enum!(MessageAuthor {
    User => "user",
    Assistant => "assistant",
});

impl Severity {
    /// Numeric severity sent as evidence to the diagnosis API (symptom-log scale).
    pub fn evidence_score(&self) -> u8 {
        match self {
            Self::Low => 2,
            Self::Medium => 3,
            Self::High => 4,
        }
    }
}

impl Intent {
    /// Yes/no answers resolve an outstanding clarification question.
    pub fn is_yes_no(&self) -> bool {
        matches!(self, Self::Confirmation | Self::Denial)
    }
}

impl Default for Severity {
    fn default() -> Self {
        Self::Medium
    }
}

impl Default for Stage {
    fn default() -> Self {
        Self::Greeting
    }
}
