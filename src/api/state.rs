use derive_new::new;

use crate::database::{Database, Videos};

/// Shared state of the web server, one per process.
#[derive(Debug, Clone, new)]
pub struct App {
    pub database: Database,
}

impl App {
    pub fn videos(&self) -> Videos<'_> {
        self.database.videos()
    }
}
