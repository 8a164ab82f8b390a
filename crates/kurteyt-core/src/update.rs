use std::collections::BTreeMap;

/// A `SET` update expression with its attribute name and value maps.
///
/// Every field `F` becomes `#F = :valF`; names are always aliased so that
/// reserved words (`TTL`, `Url`, ...) never need special casing.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateExpression<V> {
    pub expression: String,
    pub names: BTreeMap<String, String>,
    pub values: BTreeMap<String, V>,
}

impl<V> UpdateExpression<V> {
    /// Builds `SET #A = :valA,#B = :valB` from the fields, in order.
    ///
    /// Returns `None` when there is nothing to set. A field repeated later
    /// in the input does not replace the first value.
    pub fn set<K, I>(fields: I) -> Option<Self>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut clauses = Vec::new();
        let mut names = BTreeMap::new();
        let mut values = BTreeMap::new();

        for (field, value) in fields {
            let field = field.into();
            let name = format!("#{field}");
            let placeholder = format!(":val{field}");

            if names.contains_key(&name) {
                continue;
            }
            clauses.push(format!("{name} = {placeholder}"));
            names.insert(name, field);
            values.insert(placeholder, value);
        }

        if clauses.is_empty() {
            return None;
        }

        Some(Self {
            expression: format!("SET {}", clauses.join(",")),
            names,
            values,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_set_expression_in_order() {
        let update = UpdateExpression::set([("State", "ACTIVE"), ("FirstName", "Franklin")]).unwrap();

        assert_eq!(
            update.expression,
            "SET #State = :valState,#FirstName = :valFirstName"
        );
        assert_eq!(update.names["#State"], "State");
        assert_eq!(update.names["#FirstName"], "FirstName");
        assert_eq!(update.values[":valState"], "ACTIVE");
        assert_eq!(update.values[":valFirstName"], "Franklin");
    }

    #[test]
    fn single_field_has_no_trailing_comma() {
        let update = UpdateExpression::set([("UpdatedAt", 1)]).unwrap();
        assert_eq!(update.expression, "SET #UpdatedAt = :valUpdatedAt");
    }

    #[test]
    fn empty_input_yields_none() {
        let fields: Vec<(String, u8)> = Vec::new();
        assert!(UpdateExpression::set(fields).is_none());
    }

    #[test]
    fn repeated_field_keeps_first_value() {
        let update = UpdateExpression::set([("A", 1), ("A", 2)]).unwrap();
        assert_eq!(update.expression, "SET #A = :valA");
        assert_eq!(update.values[":valA"], 1);
    }
}
