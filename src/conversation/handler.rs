pub(super) mod pages {
    use axum::{Extension, extract::State};
    use log::debug;

    use crate::account::{self, Account};
    use crate::conversation::{
        Conversations,
        markup::{Index, SignedOut},
    };
    use crate::markup::Wrappable;
    use crate::user::UserLookup;
    use crate::{slack, style};

    pub async fn index(
        auth_account: Option<Extension<Account>>,
        connector: State<slack::Connector>,
        styles: State<style::Styles>,
    ) -> crate::Result<Wrappable> {
        let Some(Extension(account)) = auth_account else {
            return Ok(Wrappable::new(SignedOut));
        };

        let slack = connector.connect(&account.api_token);
        let team = slack.team_info().await?;
        let address = match account.digest_address(&slack).await {
            Ok(address) => Some(address),
            Err(account::Error::MissingEmailAddress(id)) => {
                debug!("No digest address for {id}");
                None
            }
            Err(e) => return Err(e.into()),
        };

        let mut lookup = UserLookup::new(slack).await?;
        let user = lookup.user(&account.slack_user_id).await?;
        let conversations = Conversations::load(&mut lookup, &account.slack_user_id).await?;

        Ok(Wrappable::new(Index {
            user: &user,
            team_name: &team.name,
            account: &account,
            address: address.as_ref(),
            conversations: &conversations,
            styles: &styles,
        }))
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use axum::{Extension, extract::State, http::StatusCode, response::IntoResponse};

    use super::pages;
    use crate::account::Account;
    use crate::conversation::model::test::public;
    use crate::slack::fake::{FakeConnector, FakeSlack};
    use crate::style::StyleTable;

    fn connector(slack: FakeSlack) -> State<crate::slack::Connector> {
        State(Arc::new(FakeConnector(Arc::new(slack))))
    }

    #[tokio::test]
    async fn should_render_signed_out_page_without_session() {
        let fake = Arc::new(FakeSlack::new());

        let resp = pages::index(
            None,
            State(Arc::new(FakeConnector(fake.clone()))),
            State(Arc::new(StyleTable::default())),
        )
        .await
        .unwrap()
        .into_response();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(fake.calls("team.info"), 0);
    }

    #[tokio::test]
    async fn should_render_index_for_signed_in_account() {
        let slack = FakeSlack::new()
            .with_user("U1", "ana")
            .with_channel(public("C1", "general"));

        let resp = pages::index(
            Some(Extension(Account::new("U1", "Acme", "https://acme.slack.com/", "xoxp-1"))),
            connector(slack),
            State(Arc::new(StyleTable::default())),
        )
        .await
        .unwrap()
        .into_response();

        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn should_fail_when_slack_fails() {
        let slack = FakeSlack::new().failing("team.info");

        let err = pages::index(
            Some(Extension(Account::new("U1", "Acme", "https://acme.slack.com/", "xoxp-1"))),
            connector(slack),
            State(Arc::new(StyleTable::default())),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, crate::Error::_Slack(_)));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
