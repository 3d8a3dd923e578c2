//! Request Extension Trait for Handler Identity Access

use crate::claims::AuthContext;
use crate::AUTHORIZATION_METADATA_KEY;
use tonic::{Request, Status};

/// Accessors for identity data the gate attached to a request
///
/// ## Usage
///
/// ```rust,no_run
/// use grpc_jwt_propagation::AuthContextExt;
/// use tonic::{Request, Response, Status};
///
/// async fn delete_post(request: Request<()>) -> Result<Response<()>, Status> {
///     let caller = request.auth_context()?;
///     tracing::info!(subject_id = caller.subject_id, "Deleting post");
///     Ok(Response::new(()))
/// }
/// ```
pub trait AuthContextExt {
    /// Verified identity of the caller
    ///
    /// ## Errors
    ///
    /// `Status::unauthenticated` when the gate did not attach a context, i.e.
    /// an anonymous call to an unlisted route or a service without the layer.
    fn auth_context(&self) -> Result<&AuthContext, Status>;

    /// Raw `authorization` value as received, for forwarding upstream
    fn access_token(&self) -> Result<&str, Status>;
}

impl<T> AuthContextExt for Request<T> {
    fn auth_context(&self) -> Result<&AuthContext, Status> {
        self.extensions()
            .get::<AuthContext>()
            .ok_or_else(|| Status::unauthenticated("Request is not authenticated"))
    }

    fn access_token(&self) -> Result<&str, Status> {
        self.metadata()
            .get(AUTHORIZATION_METADATA_KEY)
            .ok_or_else(|| Status::unauthenticated("Missing authorization header"))?
            .to_str()
            .map_err(|_| Status::unauthenticated("Invalid authorization header"))
    }
}
