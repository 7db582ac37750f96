pub(super) mod pages {
    use axum::{
        Extension,
        extract::{Path, State},
    };
    use chrono::Utc;

    use crate::account::Account;
    use crate::archive::{self, markup::ArchivePage};
    use crate::conversation::{Conversation, Kind};
    use crate::markup::Wrappable;
    use crate::slack;
    use crate::user::UserLookup;

    pub async fn archive(
        Path((kind, id)): Path<(String, String)>,
        auth_account: Extension<Account>,
        connector: State<slack::Connector>,
        assembler: State<archive::Assembler>,
    ) -> crate::Result<Wrappable> {
        let kind = kind.parse::<Kind>()?;

        let slack = connector.connect(&auth_account.api_token);
        let mut lookup = UserLookup::new(slack).await?;
        let conversation =
            Conversation::from_ref(kind, &id, &mut lookup, &auth_account.slack_user_id).await?;

        let archive = assembler
            .build(&auth_account, &mut lookup, conversation, Utc::now())
            .await?;

        Ok(Wrappable::new(ArchivePage(&archive, assembler.styles())))
    }
}

pub(super) mod api {
    use axum::{Extension, Form, extract::State};
    use log::info;
    use serde::Deserialize;

    use crate::account::Account;
    use crate::conversation::Kind;
    use crate::digest;
    use crate::markup::{Notice, Wrappable};

    #[derive(Deserialize)]
    pub struct SendConversation {
        pub conversation_type: String,
        pub conversation_ref: String,
    }

    pub async fn send_conversation(
        auth_account: Extension<Account>,
        digest_service: State<digest::Service>,
        Form(form): Form<SendConversation>,
    ) -> crate::Result<Wrappable> {
        let kind = form.conversation_type.parse::<Kind>()?;

        let sent = digest_service
            .send_conversation_archive(&auth_account, kind, &form.conversation_ref)
            .await?;
        info!(
            "Manual send of {kind}/{} for {}: {sent}",
            form.conversation_ref, auth_account.slack_user_id
        );

        let notice = if sent {
            "Emailed archive!"
        } else {
            "No archive was sent, it was empty or disabled."
        };
        Ok(Wrappable::new(Notice(notice)))
    }

    pub async fn send_all(
        auth_account: Extension<Account>,
        digest_service: State<digest::Service>,
    ) -> crate::Result<Wrappable> {
        let count = digest_service.send_archive(&auth_account).await?;
        info!("Manual send for {}: {count} archives", auth_account.slack_user_id);

        let notice = if count > 0 {
            format!("Emailed {count} archives!")
        } else {
            "No archives were sent, they were either all empty or disabled.".to_string()
        };
        Ok(Wrappable::new(Notice(&notice)))
    }
}
