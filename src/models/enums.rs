use serde::{Deserialize, Serialize};

/// Error for enum values received from the frontend or the wire.
#[derive(Debug, thiserror::Error)]
#[error("Invalid {field} value: '{value}'")]
pub struct InvalidEnum {
    pub field: String,
    pub value: String,
}

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
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
            type Err = InvalidEnum;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(MessageRole {
    User => "user",
    Assistant => "assistant",
});

// Advisory question category. Changes prompt affordances on the welcome
// screen only — transport behavior is identical for both modes.
str_enum!(QuestionMode {
    QnA => "qna",
    Recommendation => "recommendation",
});

// Derived backend reachability, driven by health polling and send outcomes.
str_enum!(Connectivity {
    Unknown => "unknown",
    Connected => "connected",
    Disconnected => "disconnected",
});
