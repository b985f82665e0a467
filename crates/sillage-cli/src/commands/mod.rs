//! Command handlers grouped by concern.

mod auth;
mod collection;
mod profile;
mod recommend;

pub(crate) use auth::{handle_login, handle_logout, handle_register};
pub(crate) use collection::{
    handle_collection_add, handle_collection_create, handle_collection_list,
    handle_collection_remove, handle_search,
};
pub(crate) use profile::{handle_profile_show, handle_profile_update, handle_subscription};
pub(crate) use recommend::{
    handle_recommend_create, handle_recommend_history, handle_recommend_show,
};
