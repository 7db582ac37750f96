pub(super) mod api {
    use axum::extract::State;
    use chrono::Utc;
    use log::info;

    use crate::digest::{self, Job};

    pub async fn cron(
        digest_service: State<digest::Service>,
        queue: State<digest::Queue>,
    ) -> crate::Result<String> {
        let due = digest_service.due_accounts(Utc::now()).await?;

        for account in &due {
            queue.enqueue(Job::SendAccount {
                slack_user_id: account.slack_user_id.clone(),
            });
        }

        info!("Enqueued {} accounts", due.len());
        Ok(format!("Enqueued {} accounts", due.len()))
    }
}
