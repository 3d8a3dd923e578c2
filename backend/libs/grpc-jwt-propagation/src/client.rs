//! Client-side token forwarding
//!
//! Copies the caller's token onto outgoing gRPC requests, byte for byte.

use crate::AUTHORIZATION_METADATA_KEY;
use tonic::metadata::AsciiMetadataValue;
use tonic::service::Interceptor;
use tonic::{Request, Status};

/// Client-side interceptor that sets `authorization` on every outgoing request
///
/// The value is forwarded exactly as received: no `Bearer ` prefix is added
/// or removed. One interceptor is built per upstream call, carrying the token
/// of the request being served.
///
/// ## Usage
///
/// ```rust,no_run
/// use grpc_jwt_propagation::JwtClientInterceptor;
///
/// # fn example(token: &str) -> Result<(), tonic::Status> {
/// let interceptor = JwtClientInterceptor::new(token)?;
/// // let client = AuthServiceClient::with_interceptor(channel, interceptor);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct JwtClientInterceptor {
    auth_header: AsciiMetadataValue,
}

impl JwtClientInterceptor {
    /// Build from a raw token string
    ///
    /// ## Errors
    ///
    /// `Status::unauthenticated` if the token is not visible ASCII and so
    /// cannot be carried as metadata.
    pub fn new(token: &str) -> Result<Self, Status> {
        let rejected = || Status::unauthenticated("authorization token is not valid metadata");

        // try_from lets obs-text (0x80..=0xff) through; to_str does not
        let auth_header = AsciiMetadataValue::try_from(token).map_err(|_| rejected())?;
        auth_header.to_str().map_err(|_| rejected())?;

        Ok(Self { auth_header })
    }
}

impl Interceptor for JwtClientInterceptor {
    fn call(&mut self, mut request: Request<()>) -> Result<Request<()>, Status> {
        request
            .metadata_mut()
            .insert(AUTHORIZATION_METADATA_KEY, self.auth_header.clone());

        Ok(request)
    }
}
