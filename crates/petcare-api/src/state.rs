use std::sync::Arc;

use petcare_db::Database;
use petcare_guard::SubmissionGuard;

use crate::config::Config;
use crate::llm::Consultant;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub config: Config,
    pub db: Database,
    pub guard: SubmissionGuard,
    pub consultant: Arc<dyn Consultant>,
}

impl AppStateInner {
    pub fn new(config: Config, db: Database, consultant: Arc<dyn Consultant>) -> AppState {
        let guard = SubmissionGuard::new(config.post_limit, config.comment_limit);
        Arc::new(Self {
            config,
            db,
            guard,
            consultant,
        })
    }
}
