use actix::Addr;
use std::sync::Arc;

use crate::hub::Hub;
use crate::identity::IdentityProvider;

/// Application state shared between connections
#[derive(Clone)]
pub struct AppState {
    pub hub: Addr<Hub>,
    pub identity: Arc<dyn IdentityProvider>,
}
