use std::env;
use std::path::PathBuf;

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let proto = "proto/memoria/v1/memoria.proto";

    println!("cargo:rerun-if-changed={proto}");

    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .file_descriptor_set_path(out_dir.join("memoria_descriptor.bin"))
        .compile(&[proto], &["proto"])
        .expect("failed to compile memoria.proto");
}
