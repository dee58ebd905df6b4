use std::{env, fs, path::PathBuf};

// Puts the memory layout where the linker (and riscv-rt's `link.x`) can find it.
fn main() {
    let out_dir = PathBuf::from(env::var_os("OUT_DIR").unwrap());
    fs::write(out_dir.join("memory.x"), include_bytes!("memory.x")).unwrap();
    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-env-changed=NEXUSV_LOGLEVEL");
}
