use entity::{Estado, User};

/// Keep a user when its name contains `search` (case-insensitive) and, if a
/// status filter is set, its `estado` equals it.
pub fn matches(user: &User, search: &str, estado: Option<Estado>) -> bool {
    user.usuario.to_lowercase().contains(&search.to_lowercase())
        && estado.is_none_or(|wanted| user.estado == wanted)
}

pub fn filter_users<'a>(users: &'a [User], search: &str, estado: Option<Estado>) -> Vec<&'a User> {
    users
        .iter()
        .filter(|user| matches(user, search, estado))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<User> {
        vec![
            User::new("1", "Ana", Estado::Activo, 7000),
            User::new("2", "Mariana", Estado::Inactivo, 7000),
            User::new("3", "bruno", Estado::Activo, 7000),
            User::new("4", "JUANA", Estado::Activo, 7000),
        ]
    }

    fn ids(users: &[&User]) -> Vec<String> {
        users.iter().map(|u| u.id.clone()).collect()
    }

    #[test]
    fn empty_search_and_no_status_keeps_everything() {
        let users = sample();
        let kept = filter_users(&users, "", None);
        assert_eq!(kept.len(), users.len());
        assert!(kept.iter().zip(&users).all(|(a, b)| *a == b));
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let users = sample();
        assert_eq!(ids(&filter_users(&users, "ANA", None)), ["1", "2", "4"]);
        assert_eq!(ids(&filter_users(&users, "run", None)), ["3"]);
        assert!(filter_users(&users, "zz", None).is_empty());
    }

    #[test]
    fn status_filter_requires_exact_estado() {
        let users = sample();
        assert_eq!(ids(&filter_users(&users, "", Some(Estado::Inactivo))), ["2"]);
        assert_eq!(ids(&filter_users(&users, "ana", Some(Estado::Activo))), ["1", "4"]);
    }

    #[test]
    fn predicate_order_does_not_matter() {
        let users = sample();
        for estado in [None, Some(Estado::Activo), Some(Estado::Inactivo)] {
            for search in ["", "an", "BRU", "x"] {
                let by_status: Vec<User> = filter_users(&users, "", estado).into_iter().cloned().collect();
                let status_then_search = filter_users(&by_status, search, None);
                let by_search: Vec<User> = filter_users(&users, search, None).into_iter().cloned().collect();
                let search_then_status = filter_users(&by_search, "", estado);
                assert_eq!(ids(&status_then_search), ids(&search_then_status));
                assert_eq!(ids(&status_then_search), ids(&filter_users(&users, search, estado)));
            }
        }
    }
}
