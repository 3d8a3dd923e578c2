fn main() -> Result<(), Box<dyn std::error::Error>> {
    let services_dir = "../proto/services";

    for proto in ["post_service.proto", "comment_service.proto", "common.proto"] {
        println!("cargo:rerun-if-changed={}/{}", services_dir, proto);
    }

    tonic_build::configure().build_client(true).compile_protos(
        &[
            format!("{services_dir}/post_service.proto"),
            format!("{services_dir}/comment_service.proto"),
        ],
        &[services_dir],
    )?;

    Ok(())
}
