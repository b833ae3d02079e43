use std::sync::Arc;

use crate::{
    config::Config,
    database::{MongoCatalogStore, init_mongo},
};

pub struct AppState<S> {
    pub config: Config,
    pub store: S,
}

impl AppState<MongoCatalogStore> {
    pub async fn new() -> Arc<Self> {
        let config = Config::load();

        let db = init_mongo(&config.mongo_url, &config.database).await;

        Arc::new(Self {
            config,
            store: MongoCatalogStore::new(db),
        })
    }
}
