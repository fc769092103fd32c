use crate::api::routes;
use crate::config::Shared;
use crate::content::DynContentStore;
use crate::provision::Provisioner;
use axum::body::Body;
use axum::http::Request;
use axum::ServiceExt;
use std::future::Future;
use std::sync::Arc;

#[derive(Clone)]
pub(super) struct AppState {
    pub config: Shared,
    pub provisioner: Arc<Provisioner>,
}

pub fn new(
    config: Shared,
    content: DynContentStore,
) -> impl Future<Output = hyper::Result<()>> {
    let addr = config.api_bind_addr;
    let provisioner = Arc::new(Provisioner::new(config.clone(), content));
    let app = routes::new(AppState {
        config,
        provisioner,
    });
    axum::Server::bind(&addr)
        .serve(ServiceExt::<Request<Body>>::into_make_service(app))
}
