//! The daemon's route table.
//!
//! Order matters: literal routes such as `/paste/new` must precede the
//! identifier patterns that would otherwise swallow them, and the static
//! catch-all comes last.

use crate::handlers::{api, assets, image, index, paste};
use crate::router::{Dispatcher, Method, RouteError};
use crate::AppContext;

/// Compile every route in dispatch order.
///
/// # Errors
/// Returns [`RouteError`] when a pattern fails to compile.
pub fn build() -> Result<Dispatcher<AppContext>, RouteError> {
    let mut dispatcher = Dispatcher::new();
    dispatcher
        .register(Method::Get, "index", "/", index::index)?
        .register(Method::Get, "paste_new", "/paste/new", paste::paste_new)?
        .register(Method::Post, "paste_create", "/paste/new", paste::paste_create)?
        .register(Method::Get, "paste_download", "/paste/download/([a-z0-9]+)", paste::paste_download)?
        .register(Method::Get, "paste_show", "/paste/([a-z0-9]+)", paste::paste_show)?
        .register(Method::Get, "image_new", "/image/new", image::image_new)?
        .register(Method::Post, "image_create", "/image/new", image::image_create)?
        .register(Method::Get, "image_download", "/image/download/([a-z0-9]+)", image::image_download)?
        .register(Method::Get, "image_show", "/image/([a-z0-9]+)", image::image_show)?
        .register(Method::Post, "api_paste_create", "/api/v0/paste", api::api_paste_create)?
        .register(Method::Get, "api_paste_show", "/api/v0/paste/([a-z0-9]+)", api::api_paste_show)?
        .register(Method::Post, "api_image_create", "/api/v0/image", api::api_image_create)?
        .register(Method::Get, "api_image_show", "/api/v0/image/([a-z0-9]+)", api::api_image_show)?
        .register(Method::Get, "static_asset", "/static/(.+)", assets::static_asset)?;
    Ok(dispatcher)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_path_reaches_its_handler() {
        let dispatcher = build().expect("routes");
        let cases = [
            (Method::Get, "/", "index", vec![]),
            (Method::Get, "/paste/new", "paste_new", vec![]),
            (Method::Post, "/paste/new", "paste_create", vec![]),
            (Method::Get, "/paste/download/abc123", "paste_download", vec!["abc123"]),
            (Method::Get, "/paste/abc123", "paste_show", vec!["abc123"]),
            (Method::Get, "/image/new", "image_new", vec![]),
            (Method::Post, "/image/new", "image_create", vec![]),
            (Method::Get, "/image/download/k9k9", "image_download", vec!["k9k9"]),
            (Method::Get, "/image/k9k9", "image_show", vec!["k9k9"]),
            (Method::Post, "/api/v0/paste", "api_paste_create", vec![]),
            (Method::Get, "/api/v0/paste/zz", "api_paste_show", vec!["zz"]),
            (Method::Post, "/api/v0/image", "api_image_create", vec![]),
            (Method::Get, "/api/v0/image/zz", "api_image_show", vec!["zz"]),
            (Method::Get, "/static/style.css", "static_asset", vec!["style.css"]),
        ];
        assert_eq!(dispatcher.len(), cases.len());

        for (method, path, name, args) in cases {
            let matched = dispatcher
                .dispatch(method, path)
                .unwrap_or_else(|| panic!("no route for {:?} {}", method, path));
            assert_eq!(matched.name(), name, "path: {}", path);
            assert_eq!(matched.args(), args.as_slice(), "path: {}", path);
        }
    }

    #[test]
    fn unknown_paths_and_verbs_are_unmatched() {
        let dispatcher = build().expect("routes");
        assert!(dispatcher.dispatch(Method::Get, "/paste").is_none());
        assert!(dispatcher.dispatch(Method::Post, "/paste/abc123").is_none());
        assert!(dispatcher.dispatch(Method::Get, "/api/v1/paste/abc").is_none());
        assert!(dispatcher.dispatch(Method::Other, "/").is_none());
    }
}
