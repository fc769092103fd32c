use crate::caddy::block::{BlockNode, ConfigDocument, Entry, TlsMaterial};
use crate::error::{Error, MalformedConfig};

const TLS_KEY: &str = "tls";

struct OpenBlock {
    node: BlockNode,
    start: usize,
    line: usize,
}

/// Parse the brace-delimited, line-oriented configuration format into a [`ConfigDocument`].
///
/// Every line is trimmed before it is classified:
///
/// * blank lines are skipped,
/// * a line ending in `{` opens a block named by the rest of the line,
/// * a line that is exactly `}` closes the innermost open block,
/// * anything else is an entry, split on its first run of whitespace into a key and the rest of
///   the line. `tls` entries must carry exactly a certificate path and a key path.
///
/// # Errors
///
/// Returns [`Error::MalformedConfig`] for a `}` with no open block, an entry outside of any block,
/// or a block still open at the end of input.
///
/// Returns [`Error::MalformedTlsEntry`] for a `tls` entry without exactly two arguments.
pub fn parse(text: &str) -> Result<ConfigDocument, Error> {
    let mut roots: Vec<BlockNode> = Vec::new();
    let mut stack: Vec<OpenBlock> = Vec::new();
    let mut offset = 0;

    for (idx, raw) in text.split_inclusive('\n').enumerate() {
        let line_no = idx + 1;
        let start = offset;
        offset += raw.len();
        let content = match raw.strip_suffix('\n') {
            Some(l) => l.strip_suffix('\r').unwrap_or(l),
            None => raw,
        };
        let end = start + content.len();

        let line = content.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(name) = line.strip_suffix('{') {
            stack.push(OpenBlock {
                node: BlockNode::new(name.trim()),
                start,
                line: line_no,
            });
        } else if line == "}" {
            let Some(mut open) = stack.pop() else {
                return Err(MalformedConfig::UnbalancedBlock { line: line_no }.into());
            };
            open.node.span = open.start..end;
            match stack.last_mut() {
                Some(parent) => parent.node.entries.push(Entry::Block(open.node)),
                None => roots.push(open.node),
            }
        } else {
            let Some(current) = stack.last_mut() else {
                return Err(MalformedConfig::DanglingEntry { line: line_no }.into());
            };
            current.node.entries.push(parse_entry(line, line_no)?);
        }
    }

    if let Some(open) = stack.pop() {
        return Err(MalformedConfig::UnclosedBlock {
            line: open.line,
            name: open.node.name,
        }
        .into());
    }

    Ok(ConfigDocument::new(text.to_string(), roots))
}

fn parse_entry(line: &str, line_no: usize) -> Result<Entry, Error> {
    let (key, rest) = match line.split_once(char::is_whitespace) {
        Some((key, rest)) => (key, rest.trim_start()),
        None => (line, ""),
    };

    if key != TLS_KEY {
        return Ok(Entry::Scalar {
            key: key.to_string(),
            value: rest.to_string(),
        });
    }

    match rest.split_whitespace().collect::<Vec<_>>().as_slice() {
        [cert_path, key_path] => Ok(Entry::Tls(TlsMaterial {
            cert_path: (*cert_path).to_string(),
            key_path: (*key_path).to_string(),
        })),
        tokens => Err(Error::MalformedTlsEntry {
            line: line_no,
            tokens: tokens.len(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn malformed(text: &str) -> MalformedConfig {
        match parse(text) {
            Err(Error::MalformedConfig(err)) => err,
            other => panic!("expected MalformedConfig, got {other:?}"),
        }
    }

    #[test]
    fn parses_nested_blocks_in_order() {
        let text = "\
(common) {
  encode gzip
}

example.com {
  import common
  handle /api/* {
    reverse_proxy localhost:3000
  }
  file_server
  tls /etc/ssl/example.com.pem /etc/ssl/example.com.key
}
";
        let doc = parse(text).unwrap();
        let names: Vec<_> = doc.blocks().iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["(common)", "example.com"]);

        let site = doc.block("example.com").unwrap();
        assert_eq!(site.entries.len(), 4);
        assert_eq!(
            site.entries[0],
            Entry::Scalar {
                key: "import".into(),
                value: "common".into()
            }
        );
        assert!(matches!(&site.entries[1], Entry::Block(b) if b.name == "handle /api/*"));
        assert_eq!(
            site.entries[2],
            Entry::Scalar {
                key: "file_server".into(),
                value: String::new()
            }
        );
        assert_eq!(
            site.tls(),
            Some(&TlsMaterial {
                cert_path: "/etc/ssl/example.com.pem".into(),
                key_path: "/etc/ssl/example.com.key".into(),
            })
        );
        assert_eq!(
            site.child("handle /api/*").unwrap().scalar("reverse_proxy"),
            Some("localhost:3000")
        );
    }

    #[test]
    fn scalar_value_keeps_inner_whitespace() {
        let doc = parse("a {\n   header   X-Foo  \"bar  baz\"  \n}").unwrap();
        assert_eq!(
            doc.block("a").unwrap().scalar("header"),
            Some("X-Foo  \"bar  baz\"")
        );
    }

    #[test]
    fn handles_crlf_and_missing_final_newline() {
        let doc = parse("a {\r\n  tls c k\r\n}").unwrap();
        let block = doc.block("a").unwrap();
        assert_eq!(doc.source_of(block), "a {\r\n  tls c k\r\n}");
        assert_eq!(block.tls().unwrap().key_path, "k");
    }

    #[test]
    fn bare_brace_opens_unnamed_block() {
        let doc = parse("{\n  admin off\n}\n").unwrap();
        assert_eq!(doc.block("").unwrap().scalar("admin"), Some("off"));
    }

    #[test]
    fn empty_input_is_empty_document() {
        assert!(parse("").unwrap().blocks().is_empty());
        assert!(parse("\n  \n\t\n").unwrap().blocks().is_empty());
    }

    #[test]
    fn unclosed_block() {
        assert_eq!(
            malformed("a {\n  b {\n  }\n"),
            MalformedConfig::UnclosedBlock {
                line: 1,
                name: "a".into()
            }
        );
        assert_eq!(
            malformed("a {\n}\nb {\n  c {\n}\n"),
            MalformedConfig::UnclosedBlock {
                line: 3,
                name: "b".into()
            }
        );
    }

    #[test]
    fn unbalanced_block() {
        assert_eq!(
            malformed("a {\n}\n}\n"),
            MalformedConfig::UnbalancedBlock { line: 3 }
        );
        assert_eq!(malformed("}"), MalformedConfig::UnbalancedBlock { line: 1 });
    }

    #[test]
    fn dangling_entry() {
        assert_eq!(
            malformed("\nimport common\n"),
            MalformedConfig::DanglingEntry { line: 2 }
        );
        assert_eq!(
            malformed("a {\n}\nencode gzip\n"),
            MalformedConfig::DanglingEntry { line: 3 }
        );
    }

    #[test]
    fn tls_arity() {
        for (text, expected) in [
            ("a {\n  tls /c.pem\n}", 1),
            ("a {\n  tls /c.pem /k.pem /x\n}", 3),
            ("a {\n  tls\n}", 0),
        ] {
            match parse(text) {
                Err(Error::MalformedTlsEntry { line, tokens }) => {
                    assert_eq!(line, 2);
                    assert_eq!(tokens, expected);
                }
                other => panic!("expected MalformedTlsEntry, got {other:?}"),
            }
        }
    }
}
