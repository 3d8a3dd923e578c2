fn main() {
    // Client stubs for upstream services. The server half is generated too so
    // tests can stand up an in-process fake.
    let services_dir = "../../proto/services";

    for proto in ["auth_service.proto", "common.proto"] {
        println!("cargo:rerun-if-changed={}/{}", services_dir, proto);
    }

    tonic_build::configure()
        .build_client(true)
        .build_server(true)
        .compile_protos(&[format!("{services_dir}/auth_service.proto")], &[services_dir])
        .unwrap_or_else(|e| panic!("Failed to compile auth_service.proto: {}", e));
}
