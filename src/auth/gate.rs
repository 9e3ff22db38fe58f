//! Capability-based permission gate. Handlers declare the capability they
//! need in their signature (`gate: Gate<ReadUsers>`); authentication and
//! the capability check both run before the handler body does. Missing the
//! capability is a fixed-message 403 with no side effects.

use std::marker::PhantomData;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::error::AppError;
use crate::state::SharedState;

pub const FORBIDDEN_MESSAGE: &str = "403 Forbidden";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    CreateUser,
    ReadUser,
    UpdateUser,
    DeleteUser,
    ShowUser,
    CreateCity,
    ReadCity,
    UpdateCity,
    DeleteCity,
    ShowCity,
}

impl Capability {
    pub fn as_str(self) -> &'static str {
        match self {
            Capability::CreateUser => "create-user",
            Capability::ReadUser => "read-user",
            Capability::UpdateUser => "update-user",
            Capability::DeleteUser => "delete-user",
            Capability::ShowUser => "show-user",
            Capability::CreateCity => "create-city",
            Capability::ReadCity => "read-city",
            Capability::UpdateCity => "update-city",
            Capability::DeleteCity => "delete-city",
            Capability::ShowCity => "show-city",
        }
    }
}

pub trait Requires {
    const CAPABILITY: Capability;
}

macro_rules! capability_markers {
    ($($marker:ident => $cap:ident),* $(,)?) => {
        $(
            pub struct $marker;
            impl Requires for $marker {
                const CAPABILITY: Capability = Capability::$cap;
            }
        )*
    };
}

capability_markers! {
    CreateUsers => CreateUser,
    ReadUsers => ReadUser,
    UpdateUsers => UpdateUser,
    DeleteUsers => DeleteUser,
    ShowUsers => ShowUser,
    CreateCities => CreateCity,
    ReadCities => ReadCity,
    UpdateCities => UpdateCity,
    DeleteCities => DeleteCity,
    ShowCities => ShowCity,
}

/// Authenticated actor that has been checked for `R::CAPABILITY`.
pub struct Gate<R: Requires> {
    pub actor: AuthUser,
    _capability: PhantomData<R>,
}

impl<R: Requires + Send> FromRequestParts<SharedState> for Gate<R> {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let actor = AuthUser::from_request_parts(parts, state).await?;

        let allowed =
            db::permissions::user_has(&state.pool, actor.user_id, R::CAPABILITY.as_str()).await?;
        if !allowed {
            tracing::debug!(
                user_id = actor.user_id,
                capability = R::CAPABILITY.as_str(),
                "capability check failed"
            );
            return Err(AppError::Forbidden(FORBIDDEN_MESSAGE.to_string()));
        }

        Ok(Gate {
            actor,
            _capability: PhantomData,
        })
    }
}
