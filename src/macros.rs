/// Lazily compiled, process-wide regex. Patterns are literals checked by the
/// test suite, so initialisation cannot fail at runtime.
#[macro_export]
macro_rules! regex {
    ($pat:expr) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new($pat).unwrap());
        &*RE
    }};
}
