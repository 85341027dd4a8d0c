//! Collects the version of the engine from Git and the build profile and
//! target from Cargo. Profile and target are written to files in the output
//! directory and printed by the binary on startup.

use std::path::Path;
use std::{env, fs};

fn generate_file(filename: &str, contents: &str) {
    let out_dir = env::var_os("OUT_DIR").unwrap();
    let dest_path = Path::new(&out_dir).join(filename);
    fs::write(dest_path, contents).unwrap();
}

fn generate_build_info() {
    for (variable, filename) in [("PROFILE", "profile"), ("TARGET", "target")] {
        let value = env::var(variable).unwrap_or_else(|_| "unknown".to_string());
        generate_file(filename, &value);
    }
}

fn main() -> shadow_rs::SdResult<()> {
    generate_build_info();
    shadow_rs::new()
}
