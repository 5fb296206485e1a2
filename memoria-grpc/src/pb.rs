//! Generated prost/tonic stubs for `memoria.v1` (see `build.rs`).

pub mod memoria {
    pub mod v1 {
        tonic::include_proto!("memoria.v1");

        /// Reflection descriptor for `tonic-reflection` (spec §4.10: the
        /// gRPC surface exposes server reflection alongside the RPCs
        /// themselves).
        pub const FILE_DESCRIPTOR_SET: &[u8] = tonic::include_file_descriptor_set!("memoria_descriptor");
    }
}
