// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use tracing::info;

use crate::auth::claims::role_set;
use crate::auth::codec::CodecError;
use crate::auth::password::CredentialError;
use crate::auth::{
    AuthPipeline, AuthService, CredentialVerifier, PublicRoutes, RegistrationError,
    RevocationStore, Role, TokenCodec, UserDirectory,
};
use crate::clock::Clock;
use crate::config::{AuthSettings, BootstrapAdmin};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("token codec: {0}")]
    Codec(#[from] CodecError),

    #[error("credential verifier: {0}")]
    Credential(#[from] CredentialError),

    #[error("bootstrap admin: {0}")]
    Bootstrap(#[from] RegistrationError),
}

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<AuthPipeline>,
    pub service: Arc<AuthService>,
    pub revocations: Arc<RevocationStore>,
    pub directory: Arc<dyn UserDirectory>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Wire the auth components around one shared revocation store.
    pub fn new(
        settings: &AuthSettings,
        directory: Arc<dyn UserDirectory>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, StartupError> {
        let codec = Arc::new(TokenCodec::new(
            settings.jwt_secret.as_bytes(),
            settings.token_ttl,
        )?);
        let verifier = Arc::new(CredentialVerifier::new(settings.bcrypt_cost)?);
        let revocations = Arc::new(RevocationStore::new());

        let pipeline = Arc::new(AuthPipeline::new(
            Arc::clone(&codec),
            Arc::clone(&revocations),
            Arc::clone(&directory),
            PublicRoutes::default(),
        ));
        let service = Arc::new(AuthService::new(
            codec,
            verifier,
            Arc::clone(&revocations),
            Arc::clone(&directory),
        ));

        Ok(Self {
            pipeline,
            service,
            revocations,
            directory,
            clock,
        })
    }

    /// Create the bootstrap admin account unless it already exists.
    pub async fn seed_admin(&self, admin: &BootstrapAdmin) -> Result<(), StartupError> {
        let result = self
            .service
            .register_with_roles(
                &admin.username,
                &admin.password,
                &admin.email,
                role_set([Role::User, Role::Admin]),
            )
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(RegistrationError::Duplicate) => {
                info!(username = %admin.username, "Bootstrap admin already present");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
