use std::env;

fn main() {
    // Default slot mapping used by `ZoneConfig::from_build_env()`.
    // Provisioning tooling assigns real addresses per board; this only
    // supplies a fallback when the application does not pass its own list.
    if let Ok(slots) = env::var("DCZ_SLOT_ADDRESSES") {
        println!("cargo:rustc-env=DCZ_SLOT_ADDRESSES={}", slots);
        println!(
            "cargo:warning=Using DCZ_SLOT_ADDRESSES from environment: {}",
            slots
        );
    } else {
        println!("cargo:rustc-env=DCZ_SLOT_ADDRESSES=0x310000,0x311000");
    }

    // Rerun if environment variables change
    println!("cargo:rerun-if-env-changed=DCZ_SLOT_ADDRESSES");
}
