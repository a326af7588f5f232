use std::env;
use std::fs;
use std::path::Path;

const HEADER: &str = "include/courier.h";

fn main() {
    println!("cargo:rerun-if-changed=src/ffi.rs");
    println!("cargo:rerun-if-changed=src/error.rs");
    println!("cargo:rerun-if-changed=cbindgen.toml");
    println!("cargo:rerun-if-env-changed=COURIER_SKIP_HEADER");

    // Packaging builds run from a read-only source tree.
    if env::var_os("COURIER_SKIP_HEADER").is_some() || env::var_os("DOCS_RS").is_some() {
        return;
    }

    let crate_dir = env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set");
    let crate_dir = Path::new(&crate_dir);
    let header = crate_dir.join(HEADER);

    if let Some(dir) = header.parent() {
        fs::create_dir_all(dir).expect("failed to create include/ directory");
    }

    let config = cbindgen::Config::from_file(crate_dir.join("cbindgen.toml"))
        .expect("failed to read cbindgen.toml");

    let bindings = cbindgen::Builder::new()
        .with_crate(crate_dir)
        .with_config(config)
        .generate()
        .expect("cbindgen failed to generate bindings");

    // write_to_file only touches the header when its contents change.
    if bindings.write_to_file(&header) {
        println!("cargo:warning=C header written to {}", header.display());
    }
}
