#![allow(dead_code)]

use std::{path::PathBuf, sync::Mutex};

use once_cell::sync::Lazy;
use tally::App;
use tally_config::Config;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Fresh directory that outlives the calling test.
pub fn temp_dir() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let path = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    path
}

/// Config pointing at an isolated data directory.
pub fn test_config() -> Config {
    Config {
        data_dir: Some(temp_dir().join("data")),
        ..Config::default()
    }
}

/// App backed by JSON files in a unique directory.
pub fn setup_test_app() -> App {
    App::open(test_config()).expect("open app")
}
