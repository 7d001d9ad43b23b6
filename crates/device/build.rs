fn main() {
    println!("cargo:rerun-if-env-changed=LIBMTP_NO_PKG_CONFIG");

    if std::env::var_os("LIBMTP_NO_PKG_CONFIG").is_some() {
        println!("cargo:rustc-link-lib=mtp");
        return;
    }

    match pkg_config::probe_library("libmtp") {
        Ok(_) => {}
        Err(err) => {
            println!(
                "cargo:warning=pkg-config could not locate libmtp ({err}); falling back to -lmtp"
            );
            println!("cargo:rustc-link-lib=mtp");
        }
    }
}
