//! Test fixtures - in-memory wheels.

#![allow(dead_code)]

use std::io::{Cursor, Write};

pub const PACKAGE: &str = "debugpy";
pub const VERSION: &str = "1.8.19";

/// Build a zip archive from `(name, content)` pairs.
pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);
    for (name, content) in entries {
        zip.start_file(*name, options).unwrap();
        zip.write_all(content).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

/// Wheel contents for one ABI, or the pure wheel when `abi` is None.
///
/// Every wheel shares `debugpy/__init__.py`; ABI wheels add one compiled
/// module of their own so merged trees show which wheels landed.
pub fn wheel_entries(abi: Option<&str>) -> Vec<(String, Vec<u8>)> {
    let mut entries = vec![
        (
            "debugpy/__init__.py".to_string(),
            b"__version__ = \"1.8.19\"\n".to_vec(),
        ),
        (
            "debugpy/server/api.py".to_string(),
            b"def listen(address): ...\n".to_vec(),
        ),
    ];
    if let Some(abi) = abi {
        entries.push((
            format!("debugpy/_vendored/pydevd/_pydevd_bundle/speedups.{abi}.so"),
            format!("ELF {abi}").into_bytes(),
        ));
    }
    entries.push((
        format!("{PACKAGE}-{VERSION}.dist-info/METADATA"),
        b"Metadata-Version: 2.1\nName: debugpy\n".to_vec(),
    ));
    entries.push((format!("{PACKAGE}-{VERSION}.dist-info/RECORD"), Vec::new()));
    entries
}

pub fn wheel_bytes(abi: Option<&str>) -> Vec<u8> {
    let entries = wheel_entries(abi);
    let borrowed: Vec<(&str, &[u8])> = entries
        .iter()
        .map(|(name, content)| (name.as_str(), content.as_slice()))
        .collect();
    zip_bytes(&borrowed)
}

/// Wheel file name for an ABI and platform tag, or the pure wheel.
pub fn wheel_name(abi: Option<&str>, platform: Option<&str>) -> String {
    match (abi, platform) {
        (Some(abi), Some(platform)) => format!("{PACKAGE}-{VERSION}-{abi}-{abi}-{platform}.whl"),
        _ => format!("{PACKAGE}-{VERSION}-py2.py3-none-any.whl"),
    }
}

pub fn speedups_path(abi: &str) -> String {
    format!("debugpy/_vendored/pydevd/_pydevd_bundle/speedups.{abi}.so")
}
