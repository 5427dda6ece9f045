use std::{sync::Arc, time::Duration};

use axum::extract::FromRef;

use crate::{
    config::Config,
    geo::branches::{Branch, default_branches},
    utils::types::Pool,
};

#[derive(Clone, FromRef)]
pub struct AppState {
    pub pool: Pool,
    pub config: Arc<Config>,
    pub http: reqwest::Client,
    pub branches: Arc<[Branch]>,
}

impl AppState {
    pub fn new(pool: Pool, config: Config) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .user_agent(config.geocoding.user_agent.clone())
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            pool,
            config: Arc::new(config),
            http,
            branches: default_branches().into(),
        })
    }

    pub fn with_branches(mut self, branches: Vec<Branch>) -> Self {
        self.branches = branches.into();
        self
    }
}
