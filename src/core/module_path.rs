//! Module path validation.

/// Check that `path` is a valid module path.
///
/// The first element must look like a domain name (lower-case, containing
/// a dot); every element must be non-empty and made of letters, digits
/// and `-._~`, without a leading or trailing dot.
pub fn check_path(path: &str) -> Result<(), String> {
    let malformed = |reason: String| format!("malformed module path \"{}\": {}", path, reason);

    if path.is_empty() {
        return Err(malformed("empty string".into()));
    }
    if path.starts_with('/') {
        return Err(malformed("leading slash".into()));
    }
    if path.ends_with('/') {
        return Err(malformed("trailing slash".into()));
    }
    if path.contains("//") {
        return Err(malformed("double slash".into()));
    }

    for elem in path.split('/') {
        if elem.starts_with('.') {
            return Err(malformed("leading dot in path element".into()));
        }
        if elem.ends_with('.') {
            return Err(malformed("trailing dot in path element".into()));
        }
        if let Some(c) = elem
            .chars()
            .find(|&c| !(c.is_ascii_alphanumeric() || "-._~".contains(c)))
        {
            return Err(malformed(format!("invalid char {:?}", c)));
        }
    }

    let first = path.split('/').next().unwrap_or_default();
    if !first.contains('.') {
        return Err(malformed("missing dot in first path element".into()));
    }
    if first.starts_with('-') {
        return Err(malformed("leading dash in first path element".into()));
    }
    if let Some(c) = first
        .chars()
        .find(|&c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.'))
    {
        return Err(malformed(format!("invalid char {:?} in first path element", c)));
    }
    Ok(())
}

/// Report whether a replacement target names a directory rather than a
/// module: relative (`./`, `../`) and rooted paths are directories.
pub fn is_directory_path(ns: &str) -> bool {
    ns == "."
        || ns == ".."
        || ns.starts_with("./")
        || ns.starts_with("../")
        || ns.starts_with('/')
        || ns.starts_with(".\\")
        || ns.starts_with("..\\")
        || ns.starts_with('\\')
        || (ns.len() >= 2 && ns.as_bytes()[0].is_ascii_alphabetic() && ns.as_bytes()[1] == b':')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_path_accepts_module_paths() {
        assert!(check_path("github.com/goplus/spx").is_ok());
        assert!(check_path("golang.org/x/mod").is_ok());
        assert!(check_path("github.com/Foo/Bar_baz~1").is_ok());
    }

    #[test]
    fn test_check_path_rejects() {
        assert_eq!(
            check_path("math").unwrap_err(),
            "malformed module path \"math\": missing dot in first path element"
        );
        assert!(check_path("").is_err());
        assert!(check_path("github.com//x").is_err());
        assert!(check_path("GitHub.com/x").is_err());
        assert!(check_path("github.com/a b").is_err());
        assert!(check_path("github.com/.x").is_err());
    }

    #[test]
    fn test_is_directory_path() {
        assert!(is_directory_path("../local"));
        assert!(is_directory_path("./x"));
        assert!(is_directory_path("/abs"));
        assert!(is_directory_path("C:\\src"));
        assert!(!is_directory_path("github.com/a"));
    }
}
