//! Landing page
//!
//! Renders `index.html` from the views directory, or a plain greeting when no
//! views are configured, and counts visits in a cookie.

use serde_json::json;

use crate::error::HttpError;
use crate::http::cookie::{Cookie, SameSite};
use crate::http::mime;
use crate::request::RequestContext;
use crate::resource::Resource;
use crate::response::Response;
use crate::routing::TemplateError;

const VISITS_COOKIE: &str = "visits";

pub fn resource() -> Result<Resource, TemplateError> {
    Ok(Resource::new("home", ["/"])?
        .produces([mime::TEXT_HTML])
        .get(|ctx, res| Box::pin(get(ctx, res))))
}

async fn get(ctx: &RequestContext, res: &mut Response) -> Result<(), HttpError> {
    let visits = ctx
        .cookie(VISITS_COOKIE)
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(0)
        .saturating_add(1);

    res.set_cookie(
        &Cookie::new(VISITS_COOKIE, visits.to_string())
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax),
    )?;

    let page = res
        .render("index.html", Some(&json!({ "visits": visits })))
        .await?
        .unwrap_or_else(|| greeting(visits));
    res.set_body(page);
    Ok(())
}

fn greeting(visits: u64) -> String {
    let times = if visits == 1 { "time" } else { "times" };
    format!("<h1>Welcome to the coffee shop</h1><p>You have visited {visits} {times}.</p>")
}
