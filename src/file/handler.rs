pub(super) mod api {
    use axum::{
        extract::{Path, State},
        http::{HeaderName, HeaderValue},
        response::{IntoResponse, Response},
    };
    use log::{debug, info};

    use crate::{account, file, slack};

    pub async fn thumbnail(
        Path(token): Path<String>,
        codec: State<file::Codec>,
        accounts: State<account::Repository>,
        connector: State<slack::Connector>,
    ) -> crate::Result<Response> {
        let file_ref = codec.decode(&token)?;

        let account = match accounts.find(&file_ref.slack_user_id).await {
            Ok(account) => account,
            Err(account::Error::NotFound(id)) => return Err(file::Error::UnknownAccount(id).into()),
            Err(e) => return Err(e.into()),
        };

        let slack = connector.connect(&account.api_token);
        let file = match slack.file_info(&file_ref.file_id).await {
            Ok(file) => file,
            Err(e) if e.is_hidden_by_limit() => {
                debug!("{e}");
                return Err(file::Error::HiddenByLimit(file_ref.file_id).into());
            }
            Err(e) => return Err(e.into()),
        };

        let url = file
            .thumbnail_url()
            .ok_or_else(|| file::Error::NoThumbnail(file.id.clone()))?;
        info!("Proxying {url} for {}", file_ref.slack_user_id);
        let download = slack.download(url).await?;

        let mut resp = download.body.into_response();
        let headers = resp.headers_mut();
        for (name, value) in download.headers {
            if let (Ok(name), Ok(value)) = (
                HeaderName::try_from(name),
                HeaderValue::try_from(value),
            ) {
                headers.insert(name, value);
            }
        }

        Ok(resp)
    }
}
