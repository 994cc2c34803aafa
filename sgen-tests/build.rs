fn main() {
    // Generate storages for the integration tests
    // The generated code is only used by tests (via include!), so it won't
    // affect normal library compilation
    let out_dir = std::path::PathBuf::from(std::env::var("OUT_DIR").unwrap());
    sgen_codegen::GeneratorBuilder::new("fixtures/models")
        .output_dir(out_dir.join("database"))
        .register_file(out_dir.join("sgen-register.toml"))
        .skip_formatting()
        .generate()
        .expect("codegen failed");

    println!("cargo:rerun-if-changed=fixtures/models");
}
