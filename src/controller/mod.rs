//! Controller module - maps user input onto the core operations
//!
//! - `input`: Key event handling
//! - `actions`: Search, playlist editing, export and session actions

mod input;
mod actions;

use crate::model::AppModel;

#[derive(Clone)]
pub struct AppController {
    pub(crate) model: AppModel,
}

impl AppController {
    pub fn new(model: AppModel) -> Self {
        Self { model }
    }
}
