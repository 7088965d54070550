use std::sync::Arc;

use crate::relay::RelayHandler;

#[derive(Clone)]
pub(super) struct RelayWebhookState {
    pub(super) handler: Arc<RelayHandler>,
    pub(super) secret_token: Option<String>,
}
