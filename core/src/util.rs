//! Ordered key/value list updates shared by interceptors.

/// How [`upsert`] selects entries to rewrite.
pub enum KeyMatch<'a> {
    /// Exact, case-sensitive key equality. Guarantees the key is present
    /// after the call: if nothing matched, a new entry is appended.
    Literal(&'a str),
    /// Arbitrary key predicate. Only rewrites existing matches; appends
    /// nothing when no entry matches.
    Predicate(&'a dyn Fn(&str) -> bool),
}

/// The value written into matching entries.
pub enum NewValue<'a, T> {
    /// Always this value.
    Constant(T),
    /// Derived from the current value. Receives `None` when a missing
    /// literal key is being inserted.
    Translator(&'a dyn Fn(Option<&T>) -> T),
}

/// Rewrite every entry whose key matches, in place and order-preserving.
///
/// A [`KeyMatch::Literal`] key that matched nothing is appended at the
/// end; a [`KeyMatch::Predicate`] never appends. That asymmetry is part of
/// the contract: literal-key upserts guarantee presence, predicate updates
/// only touch what already exists.
pub fn upsert<T: Clone>(entries: &mut Vec<(String, T)>, key: KeyMatch<'_>, value: NewValue<'_, T>) {
    let mut found = false;
    for (entry_key, entry_value) in entries.iter_mut() {
        let matched = match &key {
            KeyMatch::Literal(target) => entry_key.as_str() == *target,
            KeyMatch::Predicate(predicate) => predicate(entry_key),
        };
        if matched {
            let rewritten = match &value {
                NewValue::Constant(constant) => constant.clone(),
                NewValue::Translator(translate) => translate(Some(&*entry_value)),
            };
            *entry_value = rewritten;
            found = true;
        }
    }

    if !found {
        if let KeyMatch::Literal(target) = key {
            let inserted = match value {
                NewValue::Constant(constant) => constant,
                NewValue::Translator(translate) => translate(None),
            };
            entries.push((target.to_string(), inserted));
        }
    }
}
