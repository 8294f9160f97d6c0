// Build script that tries to generate a C header with `cbindgen`.
// If `cbindgen` is not available, it falls back to copying the
// checked-in `include/gendy.h` to $OUT_DIR.
//
// Either way, consumers can include the header from:
//   - <repo>/gendy-ffi/include/gendy.h      (checked-in)
//   - $OUT_DIR/gendy.h

use std::{env, fs, path::PathBuf, process::Command};

fn main() {
    println!("cargo:rerun-if-changed=src/lib.rs");
    println!("cargo:rerun-if-changed=include/gendy.h");

    let crate_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR"));
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR"));
    let header_repo = crate_dir.join("include").join("gendy.h");
    let header_out = out_dir.join("gendy.h");

    let cbindgen_ok = Command::new("cbindgen")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false);

    if cbindgen_ok {
        let generated = Command::new("cbindgen")
            .args(["--crate", "gendy-ffi", "--lang", "C", "--output"])
            .arg(&header_out)
            .current_dir(&crate_dir)
            .status()
            .map(|s| s.success())
            .unwrap_or(false);

        if generated {
            // The checked-in copy is left alone; regenerate it by hand with cbindgen.
            println!("cargo:warning=gendy-ffi: generated header with cbindgen -> {}", header_out.display());
            return;
        }
        println!("cargo:warning=gendy-ffi: cbindgen failed; falling back to checked-in header");
    }

    fs::copy(&header_repo, &header_out).expect("failed to copy include/gendy.h to OUT_DIR");
}
