use {
    crate::kernel::db::Database,
    std::{
        sync::Arc,
        time::Duration,
    },
};

pub mod add_review;
pub mod get_reviews;

#[derive(Clone, Debug)]
pub struct Config {
    pub request_timeout: Duration,
}

#[derive(Debug)]
pub struct ServiceInner {
    db:     Arc<dyn Database>,
    config: Config,
}

#[derive(Clone, Debug)]
pub struct Service(Arc<ServiceInner>);
impl std::ops::Deref for Service {
    type Target = ServiceInner;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Service {
    pub fn new(db: Arc<dyn Database>, config: Config) -> Self {
        Self(Arc::new(ServiceInner { db, config }))
    }
}
