//! Archive extraction into a (possibly shared) destination directory
//!
//! Wheels are zip archives; plain binary tarballs are supported too. When
//! several artifacts are merged into one directory their `*.dist-info`
//! metadata directories would shadow each other, so merge mode leaves them
//! out. A single self-contained artifact keeps its metadata.
//!
//! Every entry path is confined to the destination: absolute paths, `..`
//! components, links pointing outside, and writes through symlinked
//! components are rejected.

use std::fs::File;
use std::io::{Cursor, Read};
use std::path::{Component, Path, PathBuf};

use crate::core::error::{AcquireError, Result};
use crate::core::output;
use crate::internal::fs_utils;

/// Suffix identifying a package-metadata directory.
pub const METADATA_DIR_SUFFIX: &str = ".dist-info";

/// Archive container formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    TarGz,
    TarXz,
    TarBz2,
    TarZst,
    Tar,
}

impl ArchiveFormat {
    /// Detect archive format from filename extension
    pub fn detect(file_name: &str) -> Option<Self> {
        let name = file_name.to_lowercase();
        if name.ends_with(".whl") || name.ends_with(".zip") {
            Some(Self::Zip)
        } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(Self::TarGz)
        } else if name.ends_with(".tar.xz") || name.ends_with(".txz") {
            Some(Self::TarXz)
        } else if name.ends_with(".tar.bz2") || name.ends_with(".tbz2") {
            Some(Self::TarBz2)
        } else if name.ends_with(".tar.zst") || name.ends_with(".tzst") {
            Some(Self::TarZst)
        } else if name.ends_with(".tar") {
            Some(Self::Tar)
        } else {
            None
        }
    }
}

/// How entries are selected for a destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Destination is shared with other artifacts: skip metadata directories
    pub merge: bool,
}

/// What an extraction wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionReport {
    pub destination: PathBuf,
    /// Archive names of the files written, in archive order
    pub written: Vec<String>,
    /// Archive names of metadata entries left out in merge mode
    pub skipped_metadata: Vec<String>,
}

/// Whether an archive entry lives under a package-metadata directory.
pub fn is_metadata_entry(path: &Path) -> bool {
    path.components()
        .find_map(|c| match c {
            Component::Normal(seg) => Some(seg.to_string_lossy().ends_with(METADATA_DIR_SUFFIX)),
            _ => None,
        })
        .unwrap_or(false)
}

/// Extract an in-memory archive into `dest`.
///
/// `file_name` selects the format and names the artifact in errors. Writes
/// happen entry by entry; a failure part-way leaves earlier entries in place.
pub fn extract(
    bytes: &[u8],
    file_name: &str,
    dest: &Path,
    options: ExtractOptions,
) -> Result<ExtractionReport> {
    let format = ArchiveFormat::detect(file_name).ok_or_else(|| {
        AcquireError::archive(file_name, "cannot detect archive format from file name")
    })?;

    std::fs::create_dir_all(dest).map_err(|e| {
        AcquireError::archive(
            file_name,
            format!("cannot create destination {}: {}", dest.display(), e),
        )
    })?;

    let mut report = ExtractionReport {
        destination: dest.to_path_buf(),
        ..Default::default()
    };

    match format {
        ArchiveFormat::Zip => extract_zip(bytes, file_name, dest, options, &mut report)?,
        ArchiveFormat::TarGz => extract_tar(
            flate2::read::GzDecoder::new(bytes),
            file_name,
            dest,
            options,
            &mut report,
        )?,
        ArchiveFormat::TarXz => extract_tar(
            xz2::read::XzDecoder::new(bytes),
            file_name,
            dest,
            options,
            &mut report,
        )?,
        ArchiveFormat::TarBz2 => extract_tar(
            bzip2::read::BzDecoder::new(bytes),
            file_name,
            dest,
            options,
            &mut report,
        )?,
        ArchiveFormat::TarZst => {
            let decoder = zstd::stream::read::Decoder::new(bytes)
                .map_err(|e| AcquireError::archive(file_name, format!("zstd init error: {e}")))?;
            extract_tar(decoder, file_name, dest, options, &mut report)?
        }
        ArchiveFormat::Tar => extract_tar(bytes, file_name, dest, options, &mut report)?,
    }

    Ok(report)
}

fn ensure_no_symlink_components(artifact: &str, dest: &Path, full_path: &Path) -> Result<()> {
    let rel = full_path.strip_prefix(dest).map_err(|_| {
        AcquireError::archive(
            artifact,
            format!("entry outside destination: {}", full_path.display()),
        )
    })?;

    // Reject if any existing path component (including leaf) is a symlink.
    let mut cur = dest.to_path_buf();
    for comp in rel.components() {
        cur.push(comp);
        if let Ok(md) = std::fs::symlink_metadata(&cur)
            && md.file_type().is_symlink()
        {
            return Err(AcquireError::archive(
                artifact,
                format!("symlink in path component: {}", cur.display()),
            ));
        }
    }

    Ok(())
}

/// Checks the directories above an entry and clears a non-directory already
/// at its path, so a re-extraction replaces earlier files and links instead of
/// writing through them.
fn prepare_entry_path(artifact: &str, dest: &Path, full_path: &Path) -> Result<()> {
    if let Some(parent) = full_path.parent()
        && parent != dest
    {
        ensure_no_symlink_components(artifact, dest, parent)?;
    }

    if let Ok(md) = std::fs::symlink_metadata(full_path)
        && !md.is_dir()
    {
        std::fs::remove_file(full_path).map_err(|e| {
            AcquireError::archive(
                artifact,
                format!("cannot replace {}: {}", full_path.display(), e),
            )
        })?;
    }

    Ok(())
}

fn ensure_link_target_within_dest(
    artifact: &str,
    dest: &Path,
    link_parent: &Path,
    link_name: &Path,
) -> Result<()> {
    if link_name.is_absolute()
        || link_name
            .components()
            .any(|c| matches!(c, Component::Prefix(_) | Component::RootDir))
    {
        return Err(AcquireError::archive(
            artifact,
            format!("unsafe link target (absolute): {}", link_name.display()),
        ));
    }

    // Resolve relative to the link's parent, then ensure it stays within dest.
    let candidate = fs_utils::normalize_lexical(&link_parent.join(link_name));
    let norm_dest = fs_utils::normalize_lexical(dest);
    if candidate.strip_prefix(&norm_dest).is_err() {
        return Err(AcquireError::archive(
            artifact,
            format!(
                "unsafe link target (escapes destination): {} -> {}",
                link_parent.display(),
                link_name.display()
            ),
        ));
    }

    Ok(())
}

fn create_parent(artifact: &str, dest: &Path, full_path: &Path) -> Result<()> {
    if let Some(parent) = full_path.parent() {
        if parent.starts_with(dest) {
            ensure_no_symlink_components(artifact, dest, parent)?;
        }
        std::fs::create_dir_all(parent).map_err(|e| {
            AcquireError::archive(
                artifact,
                format!("cannot create directory {}: {}", parent.display(), e),
            )
        })?;
    }
    Ok(())
}

fn extract_tar<R: Read>(
    reader: R,
    artifact: &str,
    dest: &Path,
    options: ExtractOptions,
    report: &mut ExtractionReport,
) -> Result<()> {
    let mut archive = tar::Archive::new(reader);

    let entries = archive
        .entries()
        .map_err(|e| AcquireError::archive(artifact, format!("tar read error: {e}")))?;

    for entry in entries {
        let mut entry =
            entry.map_err(|e| AcquireError::archive(artifact, format!("tar entry error: {e}")))?;

        let path = entry
            .path()
            .map_err(|e| AcquireError::archive(artifact, format!("tar path error: {e}")))?
            .into_owned();

        if !fs_utils::is_safe_path(&path) {
            return Err(AcquireError::archive(
                artifact,
                format!("unsafe entry path: {}", path.display()),
            ));
        }

        // Some archives contain a "." entry; treat it as a no-op.
        if path.as_os_str().is_empty() || path == Path::new(".") {
            continue;
        }

        let name = path.to_string_lossy().to_string();
        if options.merge && is_metadata_entry(&path) {
            report.skipped_metadata.push(name);
            continue;
        }

        let full_path = dest.join(&path);
        let entry_type = entry.header().entry_type();

        let link_name = match entry_type {
            tar::EntryType::Symlink | tar::EntryType::Link => Some(
                entry
                    .link_name()
                    .map_err(|e| {
                        AcquireError::archive(artifact, format!("tar link_name error: {e}"))
                    })?
                    .ok_or_else(|| {
                        AcquireError::archive(
                            artifact,
                            format!("link without target: {}", path.display()),
                        )
                    })?
                    .into_owned(),
            ),
            _ => None,
        };

        // Hardlink targets name another archive member relative to dest;
        // symlink targets resolve from the link's own directory.
        let hardlink_target = match &link_name {
            Some(target) if entry_type == tar::EntryType::Link => {
                if !fs_utils::is_safe_path(target) {
                    return Err(AcquireError::archive(
                        artifact,
                        format!("unsafe link target (escapes destination): {}", target.display()),
                    ));
                }
                ensure_link_target_within_dest(artifact, dest, dest, target)?;
                let resolved = dest.join(target);
                ensure_no_symlink_components(artifact, dest, &resolved)?;
                Some(resolved)
            }
            Some(target) => {
                let link_parent = full_path.parent().unwrap_or(dest);
                ensure_link_target_within_dest(artifact, dest, link_parent, target)?;
                None
            }
            None => None,
        };

        if entry_type.is_dir() {
            ensure_no_symlink_components(artifact, dest, &full_path)?;
        } else {
            prepare_entry_path(artifact, dest, &full_path)?;
        }
        create_parent(artifact, dest, &full_path)?;

        if let Some(target) = hardlink_target {
            std::fs::hard_link(&target, &full_path).map_err(|e| {
                AcquireError::archive(
                    artifact,
                    format!("cannot link {} -> {}: {}", path.display(), target.display(), e),
                )
            })?;
        } else {
            entry.unpack(&full_path).map_err(|e| {
                AcquireError::archive(
                    artifact,
                    format!("unpack error for {}: {}", path.display(), e),
                )
            })?;
        }

        if !entry_type.is_dir() {
            output::detail(&name);
            report.written.push(name);
        }
    }

    Ok(())
}

fn extract_zip(
    bytes: &[u8],
    artifact: &str,
    dest: &Path,
    options: ExtractOptions,
    report: &mut ExtractionReport,
) -> Result<()> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| AcquireError::archive(artifact, format!("zip read error: {e}")))?;

    for i in 0..archive.len() {
        let mut file = archive
            .by_index(i)
            .map_err(|e| AcquireError::archive(artifact, format!("zip entry error: {e}")))?;

        let name = file.name().to_string();
        let rel = file.enclosed_name().ok_or_else(|| {
            AcquireError::archive(artifact, format!("unsafe entry path: {name}"))
        })?;

        if options.merge && is_metadata_entry(&rel) {
            report.skipped_metadata.push(name);
            continue;
        }

        let outpath = dest.join(&rel);

        if file.is_dir() {
            ensure_no_symlink_components(artifact, dest, &outpath)?;
            std::fs::create_dir_all(&outpath).map_err(|e| {
                AcquireError::archive(
                    artifact,
                    format!("cannot create directory {}: {}", outpath.display(), e),
                )
            })?;
            continue;
        }

        prepare_entry_path(artifact, dest, &outpath)?;
        create_parent(artifact, dest, &outpath)?;

        let mut outfile = File::create(&outpath).map_err(|e| {
            AcquireError::archive(artifact, format!("cannot create {}: {}", outpath.display(), e))
        })?;
        std::io::copy(&mut file, &mut outfile).map_err(|e| {
            AcquireError::archive(artifact, format!("write error for {}: {}", outpath.display(), e))
        })?;

        if let Some(mode) = file.unix_mode()
            && let Err(e) = fs_utils::set_mode(&outpath, mode & 0o7777)
        {
            output::warning(&format!(
                "cannot set mode {:o} on {}: {}",
                mode & 0o7777,
                outpath.display(),
                e
            ));
        }

        output::detail(&name);
        report.written.push(name);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);
        for (name, content) in entries {
            zip.start_file(*name, options).unwrap();
            zip.write_all(content).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    fn tar_gz_bytes(build: impl FnOnce(&mut tar::Builder<flate2::write::GzEncoder<Vec<u8>>>)) -> Vec<u8> {
        let encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        let mut builder = tar::Builder::new(encoder);
        build(&mut builder);
        builder.into_inner().unwrap().finish().unwrap()
    }

    fn append_file(builder: &mut tar::Builder<flate2::write::GzEncoder<Vec<u8>>>, path: &str, content: &[u8]) {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, path, content).unwrap();
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(ArchiveFormat::detect("debugpy-1.8.19-py2.py3-none-any.whl"), Some(ArchiveFormat::Zip));
        assert_eq!(ArchiveFormat::detect("foo.zip"), Some(ArchiveFormat::Zip));
        assert_eq!(ArchiveFormat::detect("foo.tar.gz"), Some(ArchiveFormat::TarGz));
        assert_eq!(ArchiveFormat::detect("foo.tgz"), Some(ArchiveFormat::TarGz));
        assert_eq!(ArchiveFormat::detect("foo.tar.xz"), Some(ArchiveFormat::TarXz));
        assert_eq!(ArchiveFormat::detect("foo.tbz2"), Some(ArchiveFormat::TarBz2));
        assert_eq!(ArchiveFormat::detect("foo.tar.zst"), Some(ArchiveFormat::TarZst));
        assert_eq!(ArchiveFormat::detect("foo.tar"), Some(ArchiveFormat::Tar));
        assert_eq!(ArchiveFormat::detect("foo.unknown"), None);
    }

    #[test]
    fn test_is_metadata_entry() {
        assert!(is_metadata_entry(Path::new("debugpy-1.8.19.dist-info/METADATA")));
        assert!(is_metadata_entry(Path::new("./debugpy-1.8.19.dist-info/RECORD")));
        assert!(!is_metadata_entry(Path::new("debugpy/__init__.py")));
        assert!(!is_metadata_entry(Path::new("debugpy/vendored/x.dist-info.txt")));
    }

    #[test]
    fn test_single_artifact_keeps_metadata() {
        let temp = tempfile::tempdir().unwrap();
        let bytes = zip_bytes(&[
            ("pkg/__init__.py", b"x = 1\n"),
            ("pkg-1.0.dist-info/METADATA", b"Name: pkg\n"),
        ]);

        let report = extract(&bytes, "pkg-1.0-py3-none-any.whl", temp.path(), ExtractOptions::default()).unwrap();

        assert_eq!(report.written, ["pkg/__init__.py", "pkg-1.0.dist-info/METADATA"]);
        assert!(report.skipped_metadata.is_empty());
        assert!(temp.path().join("pkg-1.0.dist-info/METADATA").exists());
    }

    #[test]
    fn test_merge_skips_metadata() {
        let temp = tempfile::tempdir().unwrap();
        let bytes = zip_bytes(&[
            ("pkg/__init__.py", b"x = 1\n"),
            ("pkg-1.0.dist-info/METADATA", b"Name: pkg\n"),
            ("pkg-1.0.dist-info/RECORD", b""),
        ]);

        let report = extract(&bytes, "pkg-1.0-cp312-cp312-win_amd64.whl", temp.path(), ExtractOptions { merge: true }).unwrap();

        assert_eq!(report.written, ["pkg/__init__.py"]);
        assert_eq!(report.skipped_metadata.len(), 2);
        assert!(temp.path().join("pkg/__init__.py").exists());
        assert!(!temp.path().join("pkg-1.0.dist-info").exists());
    }

    #[test]
    fn test_zip_rejects_escaping_entry() {
        let temp = tempfile::tempdir().unwrap();
        let dest = temp.path().join("dest");
        let bytes = zip_bytes(&[("../evil.py", b"pwned")]);

        let err = extract(&bytes, "evil.whl", &dest, ExtractOptions::default()).unwrap_err();
        assert!(matches!(err, AcquireError::Archive { .. }));
        assert!(err.to_string().contains("unsafe entry path"));
        assert!(!temp.path().join("evil.py").exists());
    }

    #[test]
    fn test_zip_overwrites_existing_files() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(temp.path().join("pkg")).unwrap();
        std::fs::write(temp.path().join("pkg/mod.py"), "old contents that are longer").unwrap();

        let bytes = zip_bytes(&[("pkg/mod.py", b"new")]);
        extract(&bytes, "pkg.whl", temp.path(), ExtractOptions::default()).unwrap();

        assert_eq!(std::fs::read_to_string(temp.path().join("pkg/mod.py")).unwrap(), "new");
    }

    #[test]
    fn test_corrupt_zip_is_archive_error() {
        let temp = tempfile::tempdir().unwrap();
        let err = extract(b"not a zip", "pkg.whl", temp.path(), ExtractOptions::default()).unwrap_err();
        assert!(matches!(err, AcquireError::Archive { .. }));
    }

    #[test]
    fn test_unknown_format_is_archive_error() {
        let temp = tempfile::tempdir().unwrap();
        let err = extract(b"", "pkg.rpm", temp.path(), ExtractOptions::default()).unwrap_err();
        assert!(err.to_string().contains("cannot detect archive format"));
    }

    #[test]
    fn test_extract_tar_gz_with_nested_dirs() {
        let temp = tempfile::tempdir().unwrap();
        let bytes = tar_gz_bytes(|b| {
            append_file(b, "foo/bar/baz.txt", b"nested content");
            append_file(b, "foo-1.0.dist-info/METADATA", b"Name: foo");
        });

        let report = extract(&bytes, "foo-1.0.tar.gz", temp.path(), ExtractOptions { merge: true }).unwrap();

        assert_eq!(report.written, ["foo/bar/baz.txt"]);
        assert_eq!(report.skipped_metadata, ["foo-1.0.dist-info/METADATA"]);
        assert_eq!(
            std::fs::read_to_string(temp.path().join("foo/bar/baz.txt")).unwrap(),
            "nested content"
        );
    }

    #[test]
    fn test_extract_tar_blocks_symlink_escape() {
        let temp = tempfile::tempdir().unwrap();
        let dest = temp.path().join("extracted");

        let bytes = tar_gz_bytes(|b| {
            // Create a symlink "a" -> "/" then attempt to write "a/evil.txt".
            let mut link_header = tar::Header::new_gnu();
            link_header.set_entry_type(tar::EntryType::Symlink);
            link_header.set_size(0);
            link_header.set_mode(0o777);
            link_header.set_link_name("/").unwrap();
            link_header.set_cksum();
            b.append_data(&mut link_header, "a", std::io::empty()).unwrap();
            append_file(b, "a/evil.txt", b"pwned");
        });

        let err = extract(&bytes, "escape.tar.gz", &dest, ExtractOptions::default()).unwrap_err();
        let msg = err.to_string();
        assert!(
            msg.contains("unsafe link target") || msg.contains("symlink"),
            "expected link/symlink safety error, got: {msg}"
        );
        assert!(!dest.join("a/evil.txt").exists());
    }

    #[test]
    fn test_extract_tar_blocks_hardlink_outside_dest() {
        let temp = tempfile::tempdir().unwrap();
        let dest = temp.path().join("extracted");

        let bytes = tar_gz_bytes(|b| {
            let mut header = tar::Header::new_gnu();
            header.set_entry_type(tar::EntryType::Link);
            header.set_size(0);
            header.set_mode(0o777);
            header.set_link_name("/etc/passwd").unwrap();
            header.set_cksum();
            b.append_data(&mut header, "hl", std::io::empty()).unwrap();
        });

        let err = extract(&bytes, "hardlink.tar.gz", &dest, ExtractOptions::default()).unwrap_err();
        assert!(err.to_string().contains("unsafe link target"));
    }

    fn append_link(
        builder: &mut tar::Builder<flate2::write::GzEncoder<Vec<u8>>>,
        kind: tar::EntryType,
        path: &str,
        target: &str,
    ) {
        let mut header = tar::Header::new_gnu();
        header.set_entry_type(kind);
        header.set_size(0);
        header.set_mode(0o777);
        header.set_link_name(target).unwrap();
        header.set_cksum();
        builder.append_data(&mut header, path, std::io::empty()).unwrap();
    }

    #[test]
    fn test_extract_tar_hardlink_resolves_inside_dest() {
        let temp = tempfile::tempdir().unwrap();
        let dest = temp.path().join("extracted");

        // Cargo.toml exists in the test working directory but not in dest.
        assert!(Path::new("Cargo.toml").exists());
        let bytes = tar_gz_bytes(|b| {
            append_link(b, tar::EntryType::Link, "leak", "Cargo.toml");
        });

        let err = extract(&bytes, "leak.tar.gz", &dest, ExtractOptions::default()).unwrap_err();
        assert!(matches!(err, AcquireError::Archive { .. }));
        assert!(!dest.join("leak").exists());
    }

    #[test]
    fn test_extract_tar_hardlink_to_member() {
        let temp = tempfile::tempdir().unwrap();
        let bytes = tar_gz_bytes(|b| {
            append_file(b, "lib/libfoo.so.1", b"ELF");
            append_link(b, tar::EntryType::Link, "lib/libfoo.so", "lib/libfoo.so.1");
        });

        let report = extract(&bytes, "libs.tar.gz", temp.path(), ExtractOptions::default()).unwrap();

        assert_eq!(report.written, ["lib/libfoo.so.1", "lib/libfoo.so"]);
        assert_eq!(std::fs::read(temp.path().join("lib/libfoo.so")).unwrap(), b"ELF");
    }

    #[test]
    fn test_extract_tar_hardlink_rejects_parent_dir_target() {
        let temp = tempfile::tempdir().unwrap();
        let dest = temp.path().join("extracted");
        std::fs::write(temp.path().join("secret"), "outside").unwrap();

        let bytes = tar_gz_bytes(|b| {
            append_link(b, tar::EntryType::Link, "leak", "../secret");
        });

        let err = extract(&bytes, "leak.tar.gz", &dest, ExtractOptions::default()).unwrap_err();
        assert!(err.to_string().contains("unsafe link target"));
        assert!(!dest.join("leak").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_extract_tar_with_symlink_twice() {
        let temp = tempfile::tempdir().unwrap();
        let bytes = tar_gz_bytes(|b| {
            append_file(b, "lib/libfoo.so.1", b"ELF");
            append_link(b, tar::EntryType::Symlink, "lib/libfoo.so", "libfoo.so.1");
        });

        for _ in 0..2 {
            extract(&bytes, "libs.tar.gz", temp.path(), ExtractOptions::default()).unwrap();
        }

        let link = temp.path().join("lib/libfoo.so");
        assert_eq!(std::fs::read_link(&link).unwrap(), Path::new("libfoo.so.1"));
        assert_eq!(std::fs::read(&link).unwrap(), b"ELF");
    }

    #[cfg(unix)]
    #[test]
    fn test_zip_replaces_symlink_instead_of_writing_through() {
        let temp = tempfile::tempdir().unwrap();
        let dest = temp.path().join("dest");
        let outside = temp.path().join("outside.py");
        std::fs::write(&outside, "untouched").unwrap();
        std::fs::create_dir_all(dest.join("pkg")).unwrap();
        std::os::unix::fs::symlink(&outside, dest.join("pkg/mod.py")).unwrap();

        let bytes = zip_bytes(&[("pkg/mod.py", b"new")]);
        extract(&bytes, "pkg.whl", &dest, ExtractOptions::default()).unwrap();

        assert_eq!(std::fs::read_to_string(&outside).unwrap(), "untouched");
        let md = std::fs::symlink_metadata(dest.join("pkg/mod.py")).unwrap();
        assert!(md.file_type().is_file());
        assert_eq!(std::fs::read_to_string(dest.join("pkg/mod.py")).unwrap(), "new");
    }

    #[cfg(unix)]
    #[test]
    fn test_zip_applies_unix_mode() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::tempdir().unwrap();
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default().unix_permissions(0o755);
        zip.start_file("pkg/_speedups.so", options).unwrap();
        zip.write_all(b"ELF").unwrap();
        let bytes = zip.finish().unwrap().into_inner();

        extract(&bytes, "pkg.whl", temp.path(), ExtractOptions::default()).unwrap();

        let mode = std::fs::metadata(temp.path().join("pkg/_speedups.so"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o755);
    }
}
