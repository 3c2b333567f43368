pub mod action;
pub mod api;
pub mod dispatch;
pub mod editor;
pub mod error;
pub mod form;
pub mod live;
pub mod model;
pub mod schema;
pub mod settings;
pub mod state;
