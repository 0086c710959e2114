//! Display ordering for the current page of users.

use std::{cmp::Ordering, fmt};

use feruca::Collator;
use shared::domain::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortOption {
    #[default]
    None,
    FirstNameAsc,
    FirstNameDesc,
    LastNameAsc,
    LastNameDesc,
}

impl SortOption {
    pub const ALL: [SortOption; 5] = [
        SortOption::None,
        SortOption::FirstNameAsc,
        SortOption::FirstNameDesc,
        SortOption::LastNameAsc,
        SortOption::LastNameDesc,
    ];

    /// Parses the selector value. Empty or unrecognized input maps to `None`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "firstNameAsc" => Self::FirstNameAsc,
            "firstNameDesc" => Self::FirstNameDesc,
            "lastNameAsc" => Self::LastNameAsc,
            "lastNameDesc" => Self::LastNameDesc,
            _ => Self::None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "",
            Self::FirstNameAsc => "firstNameAsc",
            Self::FirstNameDesc => "firstNameDesc",
            Self::LastNameAsc => "lastNameAsc",
            Self::LastNameDesc => "lastNameDesc",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::None => "Sort By",
            Self::FirstNameAsc => "First Name (A-Z)",
            Self::FirstNameDesc => "First Name (Z-A)",
            Self::LastNameAsc => "Last Name (A-Z)",
            Self::LastNameDesc => "Last Name (Z-A)",
        }
    }
}

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Compares two names with the Unicode Collation Algorithm (CLDR root order):
/// base letters first, then accents, then case with lowercase first. Letters
/// such as `Ø` or `Ł` sort beside their base letter.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    Collator::default().collate(a, b)
}

fn first_name(user: &User) -> &str {
    &user.first_name
}

fn last_name(user: &User) -> &str {
    &user.last_name
}

/// Returns the page in display order without touching the stored sequence.
///
/// The sort is stable: users with equal names keep their fetch order in both
/// directions.
pub fn sort_users(users: &[User], option: SortOption) -> Vec<&User> {
    let mut sorted: Vec<&User> = users.iter().collect();
    let (name, descending): (fn(&User) -> &str, bool) = match option {
        SortOption::None => return sorted,
        SortOption::FirstNameAsc => (first_name, false),
        SortOption::FirstNameDesc => (first_name, true),
        SortOption::LastNameAsc => (last_name, false),
        SortOption::LastNameDesc => (last_name, true),
    };
    let mut collator = Collator::default();
    sorted.sort_by(|a, b| {
        let ordering = collator.collate(name(a), name(b));
        if descending {
            ordering.reverse()
        } else {
            ordering
        }
    });
    sorted
}

#[cfg(test)]
#[path = "tests/sort_tests.rs"]
mod tests;
