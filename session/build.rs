use rustc_version::{Channel, version_meta};

fn main() {
    println!("cargo::rustc-check-cfg=cfg(CHANNEL_NIGHTLY)");
    if version_meta().is_ok_and(|meta| meta.channel == Channel::Nightly) {
        println!("cargo:rustc-cfg=CHANNEL_NIGHTLY");
    }
}
