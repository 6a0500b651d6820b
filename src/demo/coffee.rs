//! Coffee menu resource
//!
//! `GET /coffee/:id` (or `GET /coffee?id=`) answers with one menu entry as
//! JSON or HTML. ID 123 was retired and redirects to its replacement.

use serde::Serialize;
use serde_json::json;

use crate::error::HttpError;
use crate::http::mime;
use crate::request::RequestContext;
use crate::resource::Resource;
use crate::response::Response;
use crate::routing::TemplateError;

const RETIRED_ID: &str = "123";
const REPLACEMENT: &str = "/coffee/17";

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Coffee {
    pub name: &'static str,
}

const MENU: [(&str, Coffee); 3] = [
    ("17", Coffee { name: "Light" }),
    ("28", Coffee { name: "Medium" }),
    ("32", Coffee { name: "Dark" }),
];

pub fn lookup(id: &str) -> Option<Coffee> {
    MENU.iter()
        .find(|(key, _)| *key == id)
        .map(|(_, coffee)| *coffee)
}

pub fn resource() -> Result<Resource, TemplateError> {
    Ok(Resource::new("coffee", ["/coffee/:id", "/coffee"])?
        .produces([mime::APPLICATION_JSON, mime::TEXT_HTML])
        .get(|ctx, res| Box::pin(get(ctx, res))))
}

async fn get(ctx: &RequestContext, res: &mut Response) -> Result<(), HttpError> {
    let Some(id) = ctx.path_param("id").or_else(|| ctx.query_param("id")) else {
        res.set_body("Please specify a coffee ID.");
        return Ok(());
    };

    if id == RETIRED_ID {
        return res.redirect(302, REPLACEMENT);
    }

    let coffee = lookup(id)
        .ok_or_else(|| HttpError::new(404, format!("Coffee with ID \"{id}\" not found.")))?;

    if ctx.content_type() == Some(mime::TEXT_HTML) {
        let page = res
            .render("coffee.html", Some(&json!({ "id": id, "name": coffee.name })))
            .await?
            .unwrap_or_else(|| format!("<h1>{}</h1>", coffee.name));
        res.set_body(page);
    } else {
        res.set_json(&coffee)?;
    }
    Ok(())
}
