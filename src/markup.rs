use std::convert::Infallible;

use axum::{
    body::Body,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, IntoResponseParts, Response, ResponseParts},
};
use maud::{DOCTYPE, Markup, Render, html};
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};

const TITLE: &str = "Slack Archive";
const BODY_STYLE: &str = "font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Helvetica,Arial,sans-serif;max-width:760px;margin:0 auto;padding:16px;";

struct Head<'a>(&'a str);

impl Render for Head<'_> {
    fn render(&self) -> Markup {
        html! {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (self.0) }
            }
        }
    }
}

fn base(w: &Wrappable) -> Markup {
    html! {
        (DOCTYPE)
        html {
            (Head(TITLE))

            body style=(BODY_STYLE) {
                main { (w.content) }
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct Wrappable {
    content: Markup,
}

impl Wrappable {
    pub fn new(content: impl Render) -> Self {
        Self {
            content: content.render(),
        }
    }
}

impl IntoResponseParts for Wrappable {
    type Error = Infallible;

    fn into_response_parts(
        self,
        mut res: ResponseParts,
    ) -> core::result::Result<ResponseParts, Self::Error> {
        res.extensions_mut().insert(self);
        Ok(res)
    }
}

impl IntoResponse for Wrappable {
    fn into_response(self) -> Response {
        (self, ()).into_response()
    }
}

pub async fn wrap_in_base(mut resp: Response) -> impl IntoResponse {
    if let Some(w) = resp.extensions_mut().remove::<Wrappable>() {
        let headers = resp.headers_mut();
        headers.remove(CONTENT_LENGTH);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/html; charset=utf-8"));
        *resp.body_mut() = Body::new(base(&w).into_string());
        return resp;
    }

    resp
}

pub struct Notice<'a>(pub &'a str);

impl Render for Notice<'_> {
    fn render(&self) -> Markup {
        html! {
            p .notice { (self.0) }
            p { a href="/" { "Back" } }
        }
    }
}

pub struct ErrorPage<'a> {
    pub status: StatusCode,
    pub message: &'a str,
    pub details: Option<&'a str>,
}

impl Render for ErrorPage<'_> {
    fn render(&self) -> Markup {
        html! {
            h1 { (self.status.as_u16()) " " (self.status.canonical_reason().unwrap_or("Error")) }
            p .error { (self.message) }
            @if let Some(details) = self.details {
                pre .details { (details) }
            }
            p { a href="/" { "Back" } }
        }
    }
}
