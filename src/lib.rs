#![forbid(unsafe_code)]
#![warn(
    clippy::cognitive_complexity,
    clippy::dbg_macro,
    clippy::doc_markdown,
    keyword_idents,
    clippy::missing_const_for_fn,
    missing_debug_implementations,
    non_ascii_idents,
    noop_method_call,
    clippy::print_stdout,
    clippy::semicolon_if_nothing_returned,
    clippy::shadow_unrelated,
    unused_extern_crates,
    unused_import_braces,
    clippy::unused_self,
    clippy::wildcard_imports
)]

pub mod anime_form;
pub mod cli;
pub mod config;
pub mod enrich;
pub mod error;
pub mod gamer;
pub mod item_payload;
pub mod new_anime_item;
pub mod text;
pub mod wikibase;
pub mod zhwp;
