pub(super) mod api {
    use axum::{
        Extension, Form,
        extract::State,
        response::Redirect,
    };
    use axum_extra::extract::PrivateCookieJar;
    use log::info;

    use crate::account::{self, Account, Settings};
    use crate::auth;

    pub async fn save_settings(
        auth_account: Extension<Account>,
        accounts: State<account::Repository>,
        Form(settings): Form<Settings>,
    ) -> crate::Result<Redirect> {
        let mut account = auth_account.0;
        account.apply(settings)?;
        accounts.save(&account).await?;

        info!("settings saved for {}", account.slack_user_id);
        Ok(Redirect::to("/"))
    }

    pub async fn delete(
        auth_account: Extension<Account>,
        accounts: State<account::Repository>,
        jar: PrivateCookieJar,
    ) -> crate::Result<(PrivateCookieJar, Redirect)> {
        accounts.delete(&auth_account.slack_user_id).await?;

        info!("account {} deleted", auth_account.slack_user_id);
        Ok((jar.remove(auth::Session::removal()), Redirect::to("/")))
    }
}
