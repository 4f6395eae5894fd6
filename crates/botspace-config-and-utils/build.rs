fn main() {
    // option_env!() values are cached; recompile when the baked-in default changes.
    println!("cargo:rerun-if-env-changed=BOTSPACE_DEFAULT_API_URL");
}
