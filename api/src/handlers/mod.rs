mod activities;
mod image;
mod ranking;

pub use activities::get_activities;
pub use image::get_item_image;
pub use ranking::get_collection_ranking;

use std::sync::Arc;

use crate::config::ApiConfig;
use crate::db::repositories::Repositories;
use crate::kv::KvStore;

#[derive(Clone)]
pub struct AppState {
    pub repositories: Arc<Repositories>,
    pub kv: Arc<dyn KvStore>,
    pub config: Arc<ApiConfig>,
}
