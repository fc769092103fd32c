use crate::caddy::{parse, synthesize};
use crate::error::Error;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Outcome of a successful [`update_site`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiteUpdate {
    /// `true` if the domain had no block in the file before the update.
    pub created: bool,
}

/// Read the configuration file at `path`, replace (or append) the serving block for `domain`
/// pointing at `document_root`, and atomically write the file back.
///
/// Only the target domain's block changes. All other root-level blocks keep their original text.
///
/// A symlinked `path` is followed: the link stays in place and its target is rewritten.
///
/// This function does no locking. Callers must serialise concurrent updates of the same `path`.
///
/// # Errors
///
/// Returns [`Error::ConfigFileNotFound`] if `path` doesn't exist.
///
/// Returns the [parse][crate::caddy::parse] and [synthesis][crate::caddy::synthesize] errors
/// unchanged. The file is untouched in all of those cases.
///
/// Returns [`Error::IO`] if reading, writing or renaming fails.
pub fn update_site(
    path: impl AsRef<Path>,
    domain: &str,
    document_root: &str,
) -> Result<SiteUpdate, Error> {
    let path = path.as_ref();
    // Resolve symlinks so the rename replaces the link's target, not the link.
    let target = match fs::canonicalize(path) {
        Ok(target) => target,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(Error::ConfigFileNotFound(path.to_path_buf()))
        }
        Err(err) => return Err(Error::IO(err)),
    };
    let text = fs::read_to_string(&target)?;

    let document = parse(&text)?;
    let rendered = synthesize(domain, &document, document_root)?;
    let rewrite = document.rewrite(domain, &rendered);

    persist(&target, rewrite.text.as_bytes())?;
    tracing::info!("wrote {}", target.display());

    Ok(SiteUpdate {
        created: rewrite.created,
    })
}

// Write to a sibling temporary file and rename it over `path`, so readers only ever see the old
// or the new contents.
fn persist(path: &Path, contents: &[u8]) -> Result<(), Error> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let permissions = fs::metadata(path)?.permissions();

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().set_permissions(permissions)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|err| err.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const EXISTING: &str = "\
other.example.com {
\timport common
\troot * /srv/other
\ttls /o/cert.pem /o/key.pem
}

example.com {
  tls /c.pem /k.pem
}

last.example.com {
    redir https://example.com{uri}
    tls /l.pem /l.key
}
";

    fn write_config(dir: &tempfile::TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("example.com");
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn updates_only_the_target_block() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, EXISTING);

        let update = update_site(&path, "example.com", "/srv/example.com").unwrap();
        assert!(!update.created);

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            "\
other.example.com {
\timport common
\troot * /srv/other
\ttls /o/cert.pem /o/key.pem
}

example.com {
  import common
  root * /srv/example.com
  tls /c.pem /k.pem
}

last.example.com {
    redir https://example.com{uri}
    tls /l.pem /l.key
}
"
        );
    }

    #[test]
    fn repeated_updates_are_stable() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, EXISTING);

        update_site(&path, "last.example.com", "/srv/last").unwrap();
        let once = fs::read_to_string(&path).unwrap();
        update_site(&path, "last.example.com", "/srv/last").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), once);
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope");
        assert!(matches!(
            update_site(&path, "example.com", "/srv"),
            Err(Error::ConfigFileNotFound(p)) if p == path
        ));
        assert!(!path.exists());
    }

    #[test]
    fn unconfigured_domain_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "example.com {\n  tls /c.pem /k.pem\n}\n");

        assert!(matches!(
            update_site(&path, "new.example.com", "/srv/new.example.com"),
            Err(Error::DomainNotConfigured(_))
        ));
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "example.com {\n  tls /c.pem /k.pem\n}\n"
        );
    }

    #[test]
    fn malformed_file_is_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "example.com {\n  tls /c.pem /k.pem\n");

        assert!(matches!(
            update_site(&path, "example.com", "/srv"),
            Err(Error::MalformedConfig(_))
        ));
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "example.com {\n  tls /c.pem /k.pem\n"
        );
        // No temporary files left behind.
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn keeps_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "example.com {\n  tls /c.pem /k.pem\n}\n");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        update_site(&path, "example.com", "/srv").unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[cfg(unix)]
    #[test]
    fn follows_symlinked_config() {
        let dir = tempfile::tempdir().unwrap();
        let real_dir = dir.path().join("real");
        fs::create_dir(&real_dir).unwrap();
        let target = real_dir.join("example.com");
        fs::write(&target, "example.com {\n  tls /c.pem /k.pem\n}\n").unwrap();
        let link = dir.path().join("example.com");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        update_site(&link, "example.com", "/srv").unwrap();

        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_link(&link).unwrap(), target);
        assert!(fs::read_to_string(&target).unwrap().contains("root * /srv"));
        // The temporary file was created next to the target, not the link.
        assert_eq!(fs::read_dir(&real_dir).unwrap().count(), 1);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn parallel_updates_to_different_files() {
        let dir = tempfile::tempdir().unwrap();
        let paths: Vec<PathBuf> = (0..8)
            .map(|i| {
                let path = dir.path().join(format!("site{i}.example.com"));
                fs::write(&path, format!("site{i}.example.com {{\n  tls /{i}.pem /{i}.key\n}}\n"))
                    .unwrap();
                path
            })
            .collect();

        std::thread::scope(|s| {
            for (i, path) in paths.iter().enumerate() {
                s.spawn(move || {
                    update_site(path, &format!("site{i}.example.com"), &format!("/srv/{i}"))
                        .unwrap();
                });
            }
        });

        for (i, path) in paths.iter().enumerate() {
            assert_eq!(
                fs::read_to_string(path).unwrap(),
                format!(
                    "site{i}.example.com {{\n  import common\n  root * /srv/{i}\n  \
                     tls /{i}.pem /{i}.key\n}}\n"
                )
            );
        }
    }
}
