// lifecycle/mod.rs - Status vocabularies and the transition guard
//
// Each entity that carries a workflow status (matches, season registrations,
// supervisor reports) declares its vocabulary with `status_vocabulary!` and
// its edge table by implementing `Lifecycle`. The guard in `machine` is
// shared by all of them.

use thiserror::Error;

/// Raised when a status string does not belong to a vocabulary
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown {entity} status '{value}'")]
pub struct UnknownStatus {
    pub entity: &'static str,
    pub value: String,
}

/// Declares a status enum with its wire spelling, `ALL`, `Display` and `FromStr`.
macro_rules! status_vocabulary {
    (
        $(#[$meta:meta])*
        $name:ident ($entity:literal) {
            $( $variant:ident => $text:literal $(| $alias:literal)* ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $( #[serde(rename = $text $(, alias = $alias)*)] $variant ),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $text ),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::lifecycle::UnknownStatus;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $( $text $(| $alias)* => Ok($name::$variant), )+
                    other => Err($crate::lifecycle::UnknownStatus {
                        entity: $entity,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

pub mod machine;
pub mod match_status;
pub mod registration_status;
pub mod report_status;

pub use machine::{allowed_targets, guard, Denial, Edge, Lifecycle};
pub use match_status::{LineupStatus, MatchStatus};
pub use registration_status::RegistrationStatus;
pub use report_status::ReviewStatus;
