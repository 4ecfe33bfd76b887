//! Shared fixtures for CLI integration tests.

#![allow(dead_code, clippy::unwrap_used, deprecated)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use frame_redact_core::Frame;
use frame_redact_test_support::{MaskBuilder, SyntheticFrameBuilder};
use serde_json::Value;

/// A scratch workspace: images live in `root`, config lookups are confined to it.
pub struct Workspace {
    pub dir: tempfile::TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root().join(name)
    }

    /// Command running in the workspace with an isolated XDG config home.
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("frame-redact").unwrap();
        cmd.current_dir(self.root())
            .env("XDG_CONFIG_HOME", self.path("xdg"))
            .env("HOME", self.root())
            .env_remove("RUST_LOG");
        cmd
    }

    /// Writes a checkerboard PNG and returns the frame that was written.
    pub fn image(&self, name: &str, width: u32, height: u32) -> Frame {
        let frame = SyntheticFrameBuilder::checkerboard(width, height);
        SyntheticFrameBuilder::to_image(&frame)
            .save_with_format(self.path(name), image::ImageFormat::Png)
            .unwrap();
        frame
    }

    /// Writes `<stem>.faces.json` with the given JSON faces array.
    pub fn faces(&self, stem: &str, faces_json: &str) {
        std::fs::write(
            self.path(&format!("{stem}.faces.json")),
            format!(r#"{{"faces": {faces_json}}}"#),
        )
        .unwrap();
    }

    /// Writes `<stem>.mask.png` positive inside the rectangle.
    pub fn mask(&self, stem: &str, width: u32, height: u32, rect: [u32; 4]) {
        let mask = MaskBuilder::rect(width, height, rect[0], rect[1], rect[2], rect[3]);
        MaskBuilder::to_image(&mask)
            .save(self.path(&format!("{stem}.mask.png")))
            .unwrap();
    }

    pub fn write(&self, name: &str, contents: &str) {
        let path = self.path(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, contents).unwrap();
    }
}

/// Parses JSONL stdout into one value per line.
pub fn parse_jsonl(stdout: &[u8]) -> Vec<Value> {
    String::from_utf8_lossy(stdout)
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

/// Loads an image as raw RGBA bytes.
pub fn rgba(path: &Path) -> Vec<u8> {
    image::open(path).unwrap().to_rgba8().into_raw()
}
