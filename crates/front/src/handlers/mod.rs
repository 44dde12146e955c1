mod metrics;
mod posts;
mod status;

pub(crate) use metrics::metrics_handler;
pub(crate) use posts::{index_handler, new_post_handler, submit_post_handler};
pub(crate) use status::status_handler;
