//! Shared helpers for dialect implementations.

/// Quote identifier with double quotes (ANSI standard).
/// Used by: Snowflake, PostgreSQL
///
/// Embedded double quotes are doubled. Case is preserved.
pub fn quote_double(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Build a possibly schema-qualified object name.
///
/// An empty `schema` means the session's current schema, so only the
/// escaped `name` is emitted.
pub fn qualified_name(schema: &str, name: &str, escape: impl Fn(&str) -> String) -> String {
    if schema.is_empty() {
        escape(name)
    } else {
        format!("{}.{}", escape(schema), escape(name))
    }
}
