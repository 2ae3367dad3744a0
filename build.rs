//! Build script tracking compile-time options for `marsview`.

fn main() {
    println!("cargo:rerun-if-env-changed=MARSVIEW_API_BASE_URL");
}
