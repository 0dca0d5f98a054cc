//! AppChallenge / AppLogin handler
//!
//! The PBX asks for a challenge, then logs in with a digest over the login
//! fields, the challenge and the shared app service password.

use super::{send_message, HandlerError, HandlerResult};
use crate::connection::{Connection, ConnectionState};
use crate::protocol::{CloseCode, PbxMessage};
use crate::server::GatewayState;
use presence_common::{generate_challenge, verify_login_digest};

/// Handler for the login handshake
pub struct LoginHandler;

impl LoginHandler {
    /// Hand out a fresh challenge
    pub async fn handle_challenge(
        connection: &Connection,
        message: PbxMessage,
    ) -> HandlerResult<Option<CloseCode>> {
        if connection.is_authenticated() {
            return Err(HandlerError::AlreadyAuthenticated);
        }

        let challenge = generate_challenge();
        connection.set_challenge(challenge.clone());
        send_message(
            connection,
            &PbxMessage::challenge_result(&challenge, message.src),
        )
        .await?;

        tracing::debug!(session_id = %connection.session_id(), "Challenge sent");
        Ok(None)
    }

    /// Verify an AppLogin
    ///
    /// A failed login is answered with `ok: false` and closes the connection.
    pub async fn handle_login(
        state: &GatewayState,
        connection: &Connection,
        message: PbxMessage,
    ) -> HandlerResult<Option<CloseCode>> {
        if connection.is_authenticated() {
            return Err(HandlerError::AlreadyAuthenticated);
        }

        let login = message
            .as_login()
            .ok_or_else(|| HandlerError::InvalidPayload("Invalid AppLogin payload".to_string()))?;

        let verified = match connection.take_challenge() {
            Some(challenge) => {
                let info = login.info_text();
                let params = login.login_params(&info, &challenge);
                verify_login_digest(&params, &state.app_service().password, &login.digest)
            }
            None => {
                tracing::debug!(
                    session_id = %connection.session_id(),
                    "AppLogin without a challenge"
                );
                false
            }
        };

        send_message(connection, &PbxMessage::login_result(verified, message.src)).await?;

        if !verified {
            tracing::warn!(
                session_id = %connection.session_id(),
                app = %login.app,
                domain = %login.domain,
                "PBX login failed"
            );
            return Ok(Some(CloseCode::LoginFailed));
        }

        connection.set_state(ConnectionState::Authenticated);
        tracing::info!(
            session_id = %connection.session_id(),
            domain = %login.domain,
            sip = %login.sip,
            "PBX logged in"
        );

        Ok(None)
    }
}
