use crate::caddy::block::ConfigDocument;
use crate::error::Error;

/// Snippet imported by every synthesized site. Expected to be defined in the proxy's main
/// configuration.
const COMMON_SNIPPET: &str = "common";

/// Render the canonical serving block for `domain`, reusing the TLS material already declared for
/// it in `document`:
///
/// ```text
/// <domain> {
///   import common
///   root * <document_root>
///   tls <cert_path> <key_path>
/// }
/// ```
///
/// The output has no trailing newline and depends only on its inputs.
///
/// # Errors
///
/// Returns [`Error::DomainNotConfigured`] if `document` has no root-level block named `domain`.
///
/// Returns [`Error::MissingTls`] if that block has no `tls` entry. Certificates are issued out of
/// band and are never invented here.
pub fn synthesize(
    domain: &str,
    document: &ConfigDocument,
    document_root: &str,
) -> Result<String, Error> {
    let block = document
        .block(domain)
        .ok_or_else(|| Error::DomainNotConfigured(domain.to_string()))?;
    let tls = block
        .tls()
        .ok_or_else(|| Error::MissingTls(domain.to_string()))?;

    Ok(format!(
        "{domain} {{\n  import {COMMON_SNIPPET}\n  root * {document_root}\n  tls {} {}\n}}",
        tls.cert_path, tls.key_path
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caddy::parse;

    #[test]
    fn renders_canonical_block() {
        let doc = parse("example.com {\n\tencode gzip\n\ttls /c.pem /k.pem\n}\n").unwrap();
        let block = synthesize("example.com", &doc, "/srv/example.com").unwrap();
        assert_eq!(
            block,
            "example.com {\n  import common\n  root * /srv/example.com\n  tls /c.pem /k.pem\n}"
        );
    }

    #[test]
    fn is_idempotent() {
        let doc = parse("example.com {\n  tls /c.pem /k.pem\n}\n").unwrap();
        let first = synthesize("example.com", &doc, "/srv/x").unwrap();
        let second = synthesize("example.com", &doc, "/srv/x").unwrap();
        assert_eq!(first, second);

        // Feeding the output back in is a fixed point too.
        let doc = parse(&first).unwrap();
        assert_eq!(synthesize("example.com", &doc, "/srv/x").unwrap(), first);
    }

    #[test]
    fn uses_last_duplicate_block() {
        let doc = parse("a {\n  tls /1.pem /1.key\n}\na {\n  tls /2.pem /2.key\n}\n").unwrap();
        assert!(synthesize("a", &doc, "/r").unwrap().ends_with("tls /2.pem /2.key\n}"));
    }

    #[test]
    fn domain_must_be_configured() {
        let doc = parse("example.com {\n  tls /c.pem /k.pem\n}\n").unwrap();
        assert!(matches!(
            synthesize("new.example.com", &doc, "/srv/new"),
            Err(Error::DomainNotConfigured(d)) if d == "new.example.com"
        ));
    }

    #[test]
    fn tls_is_never_invented() {
        let doc = parse("example.com {\n  sub {\n    tls /c.pem /k.pem\n  }\n}\n").unwrap();
        assert!(matches!(
            synthesize("example.com", &doc, "/srv"),
            Err(Error::MissingTls(d)) if d == "example.com"
        ));
    }
}
