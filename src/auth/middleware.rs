use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::PrivateCookieJar;
use log::debug;

use crate::account::{self, Account};

use super::Session;

/// Attaches the signed-in account, if any. A session for a deleted account is dropped.
pub async fn validate_session(
    accounts: State<account::Repository>,
    jar: PrivateCookieJar,
    mut req: Request,
    next: Next,
) -> crate::Result<Response> {
    if let Some(cookie) = jar.get(Session::ID) {
        let session = Session::from(&cookie);
        debug!("Active {session:?} found");

        match accounts.find(session.slack_user_id()).await {
            Ok(account) => {
                req.extensions_mut().insert(account);
            }
            Err(account::Error::NotFound(_)) => {
                debug!("No account for {session:?}, signing out");
                let jar = jar.remove(Session::removal());
                return Ok((jar, Redirect::to("/")).into_response());
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(next.run(req).await)
}

pub async fn authorize(req: Request, next: Next) -> crate::Result<Response> {
    if req.extensions().get::<Account>().is_none() {
        return Ok(Redirect::to("/").into_response());
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use axum::{
        Router,
        body::{Body, to_bytes},
        extract::FromRef,
        http::{
            StatusCode,
            header::{COOKIE, LOCATION, SET_COOKIE},
        },
        middleware::{from_fn, from_fn_with_state},
        routing::get,
    };
    use axum_extra::extract::cookie::{Cookie, Key};
    use tower::ServiceExt;

    use super::*;
    use crate::account::repository::test::InMemoryAccountRepository;

    #[derive(Clone, FromRef)]
    struct TestState {
        accounts: account::Repository,
        key: Key,
    }

    fn app(state: TestState) -> Router {
        Router::new()
            .route(
                "/private",
                get(|account: axum::Extension<Account>| async move { account.0.slack_user_id }),
            )
            .route_layer(from_fn(authorize))
            .route("/public", get(|| async { "ok" }))
            .layer(from_fn_with_state(state.clone(), validate_session))
            .with_state(state)
    }

    fn state() -> TestState {
        TestState {
            accounts: Arc::new(InMemoryAccountRepository::with(&[Account::new(
                "U1",
                "Acme",
                "https://acme.slack.com/",
                "xoxp-1",
            )])),
            key: Key::generate(),
        }
    }

    fn session_cookie(key: &Key, slack_user_id: &str) -> String {
        let jar = PrivateCookieJar::new(key.clone()).add(Cookie::from(Session::new(slack_user_id)));
        let resp = jar.into_response();
        let set_cookie = resp.headers()[SET_COOKIE].to_str().unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }

    fn get_with(uri: &str, cookie: Option<String>) -> Request {
        let mut req = axum::http::Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            req = req.header(COOKIE, cookie);
        }
        req.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn should_redirect_anonymous_requests_to_index() {
        let resp = app(state())
            .oneshot(get_with("/private", None))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers()[LOCATION], "/");
    }

    #[tokio::test]
    async fn should_let_anonymous_requests_reach_public_routes() {
        let resp = app(state()).oneshot(get_with("/public", None)).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn should_attach_account_of_valid_session() {
        let state = state();
        let cookie = session_cookie(&state.key, "U1");

        let resp = app(state)
            .oneshot(get_with("/private", Some(cookie)))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"U1");
    }

    #[tokio::test]
    async fn should_drop_session_of_deleted_account() {
        let state = state();
        let cookie = session_cookie(&state.key, "U404");

        let resp = app(state)
            .oneshot(get_with("/public", Some(cookie)))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        let removal = resp.headers()[SET_COOKIE].to_str().unwrap();
        assert!(removal.starts_with("session=;"));
    }
}
