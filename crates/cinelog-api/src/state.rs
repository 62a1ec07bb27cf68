use std::sync::Arc;

use cinelog_db::Store;

use crate::config::Config;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub store: Store,
    pub config: Config,
}
