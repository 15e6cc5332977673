//! PowerShell-style switches (`-Help`, `-DryRun`, `-Action`) accepted for
//! compatibility with the PowerShell wrapper script.

use std::ffi::OsString;

fn long_form(arg: &str) -> Option<&'static str> {
    match arg.to_ascii_lowercase().as_str() {
        "-help" => Some("--help"),
        "-dryrun" => Some("--dry-run"),
        "-action" => Some("--action"),
        _ => None,
    }
}

/// Rewrite legacy switches to their long forms. The value following an
/// action switch is passed through untouched.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut out = Vec::new();
    let mut take_value = false;
    for (i, arg) in args.into_iter().enumerate() {
        let arg: OsString = arg.into();
        if i == 0 || take_value {
            take_value = false;
            out.push(arg);
            continue;
        }
        let replacement = arg.to_str().and_then(long_form);
        take_value = matches!(replacement, Some("--action")) || arg == "--action";
        out.push(replacement.map(OsString::from).unwrap_or(arg));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(args: &[&str]) -> Vec<String> {
        normalize_args(args.iter().copied())
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn legacy_switches_become_long_flags() {
        assert_eq!(
            norm(&["upsync", "-DryRun", "-Action", "status"]),
            vec!["upsync", "--dry-run", "--action", "status"]
        );
        assert_eq!(norm(&["upsync", "-help"]), vec!["upsync", "--help"]);
    }

    #[test]
    fn action_value_is_never_rewritten() {
        assert_eq!(
            norm(&["upsync", "-Action", "-Help"]),
            vec!["upsync", "--action", "-Help"]
        );
        assert_eq!(
            norm(&["upsync", "--action", "-DryRun"]),
            vec!["upsync", "--action", "-DryRun"]
        );
    }

    #[test]
    fn modern_flags_pass_through() {
        assert_eq!(
            norm(&["upsync", "--native", "-j", "--file", "a.py"]),
            vec!["upsync", "--native", "-j", "--file", "a.py"]
        );
    }
}
