//! Domain extraction from URL-ish strings.

/// Pulls the host part out of a URL: strips an `http://` or `https://`
/// prefix, cuts at the first slash, lowercases. Returns `None` when
/// nothing is left.
pub fn extract_domain(url: &str) -> Option<String> {
    if url.is_empty() {
        return None;
    }
    let rest = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"))
        .unwrap_or(url);
    let domain = rest.split('/').next().unwrap_or_default();
    if domain.is_empty() {
        return None;
    }
    Some(domain.to_lowercase())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn strips_scheme_and_path() {
        assert_eq!(
            extract_domain("http://Evil.test/login?q=1"),
            Some("evil.test".into())
        );
        assert_eq!(
            extract_domain("https://bank.example/"),
            Some("bank.example".into())
        );
    }

    #[test]
    fn bare_host_passes_through_lowercased() {
        assert_eq!(extract_domain("Example.COM"), Some("example.com".into()));
    }

    #[test]
    fn empty_inputs_yield_none() {
        assert_eq!(extract_domain(""), None);
        assert_eq!(extract_domain("http:///path"), None);
    }

    #[test]
    fn unknown_schemes_are_not_stripped() {
        assert_eq!(extract_domain("ftp://host/x"), Some("ftp:".into()));
    }

    proptest! {
        #[test]
        fn scheme_prefix_never_changes_the_domain(
            domain in "[a-z0-9-]{1,16}(\\.[a-z0-9-]{1,8}){0,3}",
            path in "[a-zA-Z0-9/._-]{0,40}",
        ) {
            let plain = extract_domain(&format!("{domain}/{path}"));
            let http = extract_domain(&format!("http://{domain}/{path}"));
            let https = extract_domain(&format!("https://{domain}/{path}"));
            prop_assert_eq!(&plain, &http);
            prop_assert_eq!(&https, &http);
            prop_assert_eq!(http, Some(domain));
        }

        #[test]
        fn extraction_is_idempotent(url in "[ -~]{0,60}") {
            if let Some(domain) = extract_domain(&url) {
                prop_assert_eq!(extract_domain(&domain), Some(domain.clone()));
            }
        }
    }
}
