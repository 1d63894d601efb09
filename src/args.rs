//! Flag parsing for the data binaries.
//!
//! Flags take the form `--name=value`, `--name value`, or bare `--name` for
//! booleans. Parsing works over a plain argument slice so the binaries stay
//! testable without touching the process environment.

pub fn string_arg(args: &[String], name: &str) -> Option<String> {
    let eq_prefix = format!("--{name}=");
    let bare = format!("--{name}");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&eq_prefix) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == &bare
            && let Some(next) = args.get(idx + 1)
            && !next.starts_with("--")
        {
            let trimmed = next.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}

/// Unparseable values read as absent so callers fall back to their default.
pub fn u64_arg(args: &[String], name: &str) -> Option<u64> {
    string_arg(args, name).and_then(|raw| raw.parse::<u64>().ok())
}

pub fn bool_arg(args: &[String], name: &str) -> bool {
    let eq_prefix = format!("--{name}=");
    let bare = format!("--{name}");
    args.iter().any(|arg| {
        arg == &bare
            || arg
                .strip_prefix(&eq_prefix)
                .is_some_and(|value| value.trim() == "true")
    })
}
