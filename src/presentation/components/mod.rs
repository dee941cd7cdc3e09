mod body;
mod controls;
mod footer;
mod popup;
mod tabstrip;

pub use body::render_body;
pub use footer::render_footer;
pub use popup::render_popup;
