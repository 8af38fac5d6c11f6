pub mod batch;
pub mod form;
pub mod transfer;
pub mod view;

// Re-export handler functions for use in routing
pub use view::get as dashboard_get;
pub use view::refresh as dashboard_refresh;
pub use view::search as dashboard_search;
pub use view::toggle_visibility as dashboard_visibility;

pub use form::put as form_put;
pub use form::submit as form_submit;
pub use form::cancel as form_cancel;
pub use form::begin_edit as certificate_edit;
pub use form::delete as certificate_delete;

pub use batch::add_row as batch_add_row;
pub use batch::set_cell as batch_set_cell;
pub use batch::save as batch_save;

pub use transfer::template as csv_template;
pub use transfer::import as csv_import;
