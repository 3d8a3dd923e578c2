/// gRPC Clients Library
///
/// Client stubs and wrappers for the upstream services the post service
/// depends on. Currently that is the Authentication service, which resolves
/// the caller's profile from the token the caller presented.
pub mod auth_client;
pub mod config;

pub use auth_client::{AuthClient, IdentityError, IdentityProvider};
pub use config::GrpcConfig;

// Generated proto modules
pub mod tracer_study_grpc {
    tonic::include_proto!("tracer_study_grpc");
}

pub use tracer_study_grpc::auth_service_client::AuthServiceClient;
pub use tracer_study_grpc::User;
