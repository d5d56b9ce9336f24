//! Request/response DTOs and the string-backed enums stored in the database.

use serde::{Deserialize, Serialize};

/// Declares an enum persisted as a lowercase string column.
///
/// Generates `as_str`, `Display`, `FromStr` (case-insensitive) and serde
/// renames so the JSON and database spellings stay identical.
macro_rules! db_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($(#[$vmeta])* #[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    _ => Err(format!("Unknown {}: {}", stringify!($name), s)),
                }
            }
        }
    };
}

pub mod credit;
pub mod estimate;
pub mod garden;
pub mod notification;
pub mod submission;
pub mod transaction;
pub mod user;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::submission::SubmissionStatus;
    use super::user::UserRole;

    #[test]
    fn test_enum_round_trips_through_display() {
        for status in SubmissionStatus::ALL {
            let parsed: SubmissionStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, *status);
        }
    }

    #[test]
    fn test_enum_parse_is_case_insensitive() {
        assert_eq!("NGO".parse::<UserRole>(), Ok(UserRole::Ngo));
        assert_eq!("Under_Review".parse::<SubmissionStatus>(), Ok(SubmissionStatus::UnderReview));
    }

    #[test]
    fn test_enum_parse_unknown() {
        let err = "reviewer".parse::<UserRole>().unwrap_err();
        assert!(err.contains("UserRole"));
    }

    #[test]
    fn test_enum_serde_uses_db_spelling() {
        let json = serde_json::to_string(&SubmissionStatus::UnderReview).unwrap();
        assert_eq!(json, "\"under_review\"");
        let role: UserRole = serde_json::from_str("\"garden_owner\"").unwrap();
        assert_eq!(role, UserRole::GardenOwner);
    }
}
