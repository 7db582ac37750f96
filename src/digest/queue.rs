use std::fmt;
use std::time::Duration;

use log::{error, info, warn};
use tokio::sync::mpsc;

use crate::conversation::Kind;

use super::Service;

pub const MAX_ATTEMPTS: u32 = 3;
const BACKOFF: Duration = Duration::from_secs(30);

#[derive(Clone, Debug, PartialEq)]
pub enum Job {
    SendAccount { slack_user_id: String },
    SendConversation {
        slack_user_id: String,
        kind: Kind,
        id: String,
    },
}

impl Job {
    pub fn slack_user_id(&self) -> &str {
        match self {
            Job::SendAccount { slack_user_id } | Job::SendConversation { slack_user_id, .. } => {
                slack_user_id
            }
        }
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Job::SendAccount { slack_user_id } => write!(f, "send-account({slack_user_id})"),
            Job::SendConversation {
                slack_user_id,
                kind,
                id,
            } => write!(f, "send-conversation({slack_user_id}, {kind}/{id})"),
        }
    }
}

#[derive(Clone)]
pub struct Queue {
    sender: mpsc::UnboundedSender<Job>,
}

impl Queue {
    pub fn start(service: Service) -> Self {
        Self::start_with_backoff(service, BACKOFF)
    }

    pub(crate) fn start_with_backoff(service: Service, backoff: Duration) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let queue = Self { sender };
        tokio::spawn(dispatch(service, queue.clone(), receiver, backoff));
        queue
    }

    pub fn enqueue(&self, job: Job) {
        if let Err(e) = self.sender.send(job) {
            error!("Queue is closed, dropping {}", e.0);
        }
    }
}

async fn dispatch(
    service: Service,
    queue: Queue,
    mut receiver: mpsc::UnboundedReceiver<Job>,
    backoff: Duration,
) {
    while let Some(job) = receiver.recv().await {
        tokio::spawn(execute(service.clone(), queue.clone(), job, backoff));
    }
}

async fn execute(service: Service, queue: Queue, job: Job, backoff: Duration) {
    for attempt in 1..=MAX_ATTEMPTS {
        match service.run(&job).await {
            Ok(follow_ups) => {
                for follow_up in follow_ups {
                    queue.enqueue(follow_up);
                }
                return;
            }
            Err(e) => {
                warn!("{job} failed on attempt {attempt}/{MAX_ATTEMPTS}: {e}");
                service.alert(&job, &e).await;
                if attempt < MAX_ATTEMPTS {
                    tokio::time::sleep(backoff * attempt).await;
                }
            }
        }
    }

    info!("Giving up on {job}");
}
