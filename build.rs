use std::env;

fn main() {
    let target = env::var("TARGET").unwrap_or_default();

    // Host builds only run the library tests, nothing to link for.
    if !target.contains("avr") {
        return;
    }

    // Configure for ATtiny84
    println!("cargo:rustc-link-arg=-mmcu=attiny84");

    // Debug builds carry the serial trace on PB1
    if env::var("PROFILE").map(|p| p == "debug").unwrap_or(false) {
        println!("cargo:rustc-cfg=feature=\"debug\"");
    }

    println!("cargo:warning=Building for ATtiny84 at 3.6864MHz");
}
