//! Identifier casing for rendered SQL names.
//!
//! Model and field names are mapped to `snake_case` before they reach SQL
//! text. The mapping is deterministic and idempotent, so names that are
//! already snake cased pass through unchanged.

/// Converts a model or field name to its SQL identifier.
///
/// Runs of capitals are treated as one word (`CategoryID` becomes
/// `category_id`, `HTTPServer` becomes `http_server`).
///
/// ```rust
/// use sqltag_core::naming::to_snake_case;
///
/// assert_eq!(to_snake_case("OrderItem"), "order_item");
/// assert_eq!(to_snake_case("CategoryID"), "category_id");
/// assert_eq!(to_snake_case("created_at"), "created_at");
/// ```
#[must_use]
pub fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                let prev = chars[i - 1];
                let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
                let boundary = prev.is_lowercase()
                    || prev.is_ascii_digit()
                    || (prev.is_uppercase() && next_is_lower);
                if boundary && !result.ends_with('_') {
                    result.push('_');
                }
            }
            result.extend(c.to_lowercase());
        } else {
            result.push(c);
        }
    }
    result
}

/// Joins names with `", "` after converting each one to its identifier.
#[must_use]
pub fn join_identifiers<S: AsRef<str>>(names: &[S]) -> String {
    names
        .iter()
        .map(|n| to_snake_case(n.as_ref()))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pascal_case() {
        assert_eq!(to_snake_case("Product"), "product");
        assert_eq!(to_snake_case("OrderItem"), "order_item");
    }

    #[test]
    fn test_acronyms() {
        assert_eq!(to_snake_case("ID"), "id");
        assert_eq!(to_snake_case("CategoryID"), "category_id");
        assert_eq!(to_snake_case("HTTPServer"), "http_server");
    }

    #[test]
    fn test_already_snake() {
        assert_eq!(to_snake_case("created_at"), "created_at");
        assert_eq!(to_snake_case("user_ID"), "user_id");
        assert_eq!(to_snake_case("t"), "t");
    }

    #[test]
    fn test_digits() {
        assert_eq!(to_snake_case("Address2Line"), "address2_line");
    }

    #[test]
    fn test_join_identifiers() {
        assert_eq!(join_identifiers(&["UserId", "RoleId"]), "user_id, role_id");
        assert_eq!(join_identifiers::<&str>(&[]), "");
    }
}
