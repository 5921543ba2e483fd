use std::sync::Arc;

use axum::extract::FromRef;

use crate::auth::JwtKeys;
use crate::config::{AppConfig, PaginationConfig, Service};
use crate::database::repository::{AuthRepositories, PortfolioRepositories, StoreHealth};
use crate::metrics::Metrics;

/// Shared state of the portfolio API router
#[derive(Clone)]
pub struct ApiState {
    pub repos: PortfolioRepositories,
    pub keys: JwtKeys,
    pub metrics: Arc<Metrics>,
    pub pagination: PaginationConfig,
}

impl ApiState {
    pub fn new(repos: PortfolioRepositories, config: &AppConfig, metrics: Arc<Metrics>) -> Self {
        Self {
            repos,
            keys: JwtKeys::from_config(&config.security),
            metrics,
            pagination: config.pagination.clone(),
        }
    }
}

/// Shared state of the auth service router
#[derive(Clone)]
pub struct AuthState {
    pub repos: AuthRepositories,
    pub keys: JwtKeys,
    pub metrics: Arc<Metrics>,
    pub pagination: PaginationConfig,
    pub bcrypt_cost: u32,
}

impl AuthState {
    pub fn new(repos: AuthRepositories, config: &AppConfig, metrics: Arc<Metrics>) -> Self {
        Self {
            repos,
            keys: JwtKeys::from_config(&config.security),
            metrics,
            pagination: config.pagination.clone(),
            bcrypt_cost: config.security.bcrypt_cost,
        }
    }
}

/// What the system endpoints (`/health`, `/ready`, `/metrics`) need from
/// either service.
#[derive(Clone)]
pub struct SystemState {
    pub service: &'static str,
    pub store: Arc<dyn StoreHealth>,
    pub metrics: Arc<Metrics>,
}

impl FromRef<ApiState> for SystemState {
    fn from_ref(state: &ApiState) -> Self {
        Self {
            service: Service::Api.name(),
            store: state.repos.store.clone(),
            metrics: state.metrics.clone(),
        }
    }
}

impl FromRef<AuthState> for SystemState {
    fn from_ref(state: &AuthState) -> Self {
        Self {
            service: Service::Auth.name(),
            store: state.repos.store.clone(),
            metrics: state.metrics.clone(),
        }
    }
}
