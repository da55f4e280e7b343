//! Common test utilities: a scripted package tool and tree snapshots.

#![allow(dead_code)]

mod fixtures;

pub use fixtures::*;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::Path;

use wheel_acquire::fetch::{PackageTool, PipRequest};

/// Package tool that answers from a rule instead of running pip.
///
/// The rule sees each request and returns whether a wheel exists for it.
/// On success a fixture wheel for the requested ABI is written to the
/// scratch directory; otherwise the attempt fails with a pip-like message.
pub struct FakePip {
    rule: Box<dyn Fn(&PipRequest) -> bool>,
    pub calls: RefCell<Vec<PipRequest>>,
}

impl FakePip {
    pub fn new(rule: impl Fn(&PipRequest) -> bool + 'static) -> Self {
        Self {
            rule: Box::new(rule),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Every request succeeds.
    pub fn always() -> Self {
        Self::new(|_| true)
    }

    /// Platform tags requested for `abi`, in order.
    pub fn tags_tried(&self, abi: &str) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter(|r| requested_abi(r) == Some(abi))
            .filter_map(|r| requested_platform(r).map(str::to_string))
            .collect()
    }
}

pub fn requested_abi(request: &PipRequest) -> Option<&str> {
    request
        .targeting
        .as_ref()
        .and_then(|t| t.abi.as_ref())
        .map(|a| a.abi.as_str())
}

pub fn requested_platform(request: &PipRequest) -> Option<&str> {
    request
        .targeting
        .as_ref()
        .and_then(|t| t.platform.as_deref())
}

impl PackageTool for FakePip {
    fn download(&self, request: &PipRequest, dest: &Path) -> Result<(), String> {
        self.calls.borrow_mut().push(request.clone());
        if !(self.rule)(request) {
            return Err(format!(
                "ERROR: No matching distribution found for {}",
                request.requirement()
            ));
        }
        let abi = requested_abi(request);
        let name = wheel_name(abi, requested_platform(request));
        std::fs::write(dest.join(name), wheel_bytes(abi)).map_err(|e| e.to_string())
    }
}

/// Relative path to file contents for every file under `root`.
pub fn snapshot(root: &Path) -> BTreeMap<String, Vec<u8>> {
    walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let rel = e
                .path()
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/");
            (rel, std::fs::read(e.path()).unwrap())
        })
        .collect()
}
