use std::cmp::Ordering;

use shared::domain::UserId;

use super::*;

fn user(id: i64, first_name: &str, last_name: &str) -> User {
    User {
        id: UserId(id),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email: format!("user{id}@example.com"),
        avatar: format!("u{id}.png"),
    }
}

fn ids(users: &[&User]) -> Vec<i64> {
    users.iter().map(|u| u.id.0).collect()
}

fn sample() -> Vec<User> {
    vec![
        user(1, "george", "Bluth"),
        user(2, "Janet", "Weaver"),
        user(3, "Emma", "Wong"),
        user(4, "Eve", "Holt"),
        user(5, "Charles", "Morris"),
        user(6, "Tracey", "Ramos"),
    ]
}

#[test]
fn none_keeps_fetch_order() {
    let users = sample();
    assert_eq!(ids(&sort_users(&users, SortOption::None)), vec![1, 2, 3, 4, 5, 6]);
}

#[test]
fn first_name_ascending_ignores_case() {
    let users = sample();
    assert_eq!(
        ids(&sort_users(&users, SortOption::FirstNameAsc)),
        vec![5, 3, 4, 1, 2, 6]
    );
}

#[test]
fn descending_is_reverse_of_ascending_without_ties() {
    let users = sample();
    for (asc, desc) in [
        (SortOption::FirstNameAsc, SortOption::FirstNameDesc),
        (SortOption::LastNameAsc, SortOption::LastNameDesc),
    ] {
        let mut ascending = ids(&sort_users(&users, asc));
        ascending.reverse();
        assert_eq!(ascending, ids(&sort_users(&users, desc)), "{asc:?}");
    }
}

#[test]
fn last_name_ascending() {
    let users = sample();
    assert_eq!(
        ids(&sort_users(&users, SortOption::LastNameAsc)),
        vec![1, 4, 5, 6, 2, 3]
    );
}

#[test]
fn ties_keep_fetch_order_in_both_directions() {
    let users = vec![user(1, "Ann", "Zed"), user(2, "Bob", "Lee"), user(3, "Ann", "Lee")];
    assert_eq!(
        ids(&sort_users(&users, SortOption::FirstNameAsc)),
        vec![1, 3, 2]
    );
    assert_eq!(
        ids(&sort_users(&users, SortOption::FirstNameDesc)),
        vec![2, 1, 3]
    );
}

#[test]
fn sorting_does_not_mutate_storage() {
    let users = sample();
    let before = users.clone();
    let _ = sort_users(&users, SortOption::LastNameDesc);
    assert_eq!(users, before);
}

#[test]
fn accented_letters_sort_with_their_base_letter() {
    assert_eq!(locale_compare("Émile", "Eve"), Ordering::Less);
    assert_eq!(locale_compare("Emile", "Émile"), Ordering::Less);
    assert_eq!(locale_compare("Zoë", "Zoe"), Ordering::Greater);
    assert_eq!(locale_compare("Éve", "Frank"), Ordering::Less);
}

#[test]
fn letters_without_decomposition_sort_with_their_base_letter() {
    let users = vec![
        user(1, "Zoe", "Hart"),
        user(2, "Øyvind", "Berg"),
        user(3, "Oscar", "Lind"),
        user(4, "Łukasz", "Nowak"),
        user(5, "Mia", "Ray"),
    ];
    assert_eq!(
        ids(&sort_users(&users, SortOption::FirstNameAsc)),
        vec![4, 5, 3, 2, 1]
    );
    assert_eq!(
        ids(&sort_users(&users, SortOption::FirstNameDesc)),
        vec![1, 2, 3, 5, 4]
    );
    assert_eq!(locale_compare("Đani", "Eva"), Ordering::Less);
}

#[test]
fn lowercase_precedes_uppercase_on_otherwise_equal_text() {
    assert_eq!(locale_compare("ann", "Ann"), Ordering::Less);
    assert_eq!(locale_compare("Ann", "ann"), Ordering::Greater);
    assert_eq!(locale_compare("ann", "ann"), Ordering::Equal);
    assert_eq!(locale_compare("ann", "Bob"), Ordering::Less);
}

#[test]
fn parses_selector_values_and_falls_back_to_none() {
    assert_eq!(SortOption::parse("firstNameAsc"), SortOption::FirstNameAsc);
    assert_eq!(SortOption::parse("lastNameDesc"), SortOption::LastNameDesc);
    assert_eq!(SortOption::parse(""), SortOption::None);
    assert_eq!(SortOption::parse("ageAsc"), SortOption::None);
    for option in SortOption::ALL {
        assert_eq!(SortOption::parse(option.as_str()), option);
    }
}
