use std::env;
use std::path::PathBuf;

fn main() {
    let crate_dir = env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let out_dir = env::var("OUT_DIR").unwrap_or_else(|_| crate_dir.clone());
    let out = PathBuf::from(out_dir).join("reqpad.h");

    println!("cargo:rerun-if-changed=src/lib.rs");
    println!("cargo:rerun-if-changed=src/types.rs");

    match cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_language(cbindgen::Language::C)
        .with_include_guard("REQPAD_H")
        .generate()
    {
        Ok(bindings) => {
            // The bool only reports whether the contents changed; I/O
            // failures panic inside cbindgen and fail the build.
            let _changed = bindings.write_to_file(&out);
        }
        Err(err) => println!("cargo:warning=cbindgen: {err}"),
    }
}
