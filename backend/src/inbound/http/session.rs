//! Actix session adapter implementing the domain `SessionHolder` port.
//!
//! The session cookie carries only the numeric user id under
//! [`USER_ID_KEY`].

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::UserId;
use crate::domain::ports::{SessionError, SessionHolder};

pub(crate) const USER_ID_KEY: &str = "user_id";

/// Newtype wrapper exposing the Actix session through the domain port.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Wrap an Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }
}

impl SessionHolder for SessionContext {
    fn set_user_id(&self, user_id: UserId) -> Result<(), SessionError> {
        // Rotate the session on privilege change.
        self.0.renew();
        self.0
            .insert(USER_ID_KEY, user_id.get())
            .map_err(|error| SessionError::store(format!("failed to persist session: {error}")))
    }

    fn user_id(&self) -> Result<Option<UserId>, SessionError> {
        match self.0.get::<i64>(USER_ID_KEY) {
            Ok(id) => Ok(id.map(UserId::new)),
            Err(error) => {
                warn!(%error, "unreadable user id in session cookie");
                Ok(None)
            }
        }
    }

    fn destroy(&self) -> Result<(), SessionError> {
        self.0.purge();
        Ok(())
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::cookie::Cookie;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, dev::ServiceResponse, test, web};

    fn session_cookie(res: &ServiceResponse) -> Cookie<'static> {
        res.response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .map(|cookie| cookie.into_owned())
            .expect("session cookie set")
    }

    macro_rules! session_app {
        () => {
            test::init_service(
                App::new()
                    .wrap(crate::inbound::http::test_utils::test_session_middleware())
                    .route(
                        "/set",
                        web::get().to(|session: SessionContext| async move {
                            match session.set_user_id(UserId::new(42)) {
                                Ok(()) => HttpResponse::Ok().finish(),
                                Err(_) => HttpResponse::InternalServerError().finish(),
                            }
                        }),
                    )
                    .route(
                        "/get",
                        web::get().to(|session: SessionContext| async move {
                            let id = session.user_id().ok().flatten();
                            HttpResponse::Ok()
                                .body(id.map(|id| id.to_string()).unwrap_or_default())
                        }),
                    )
                    .route(
                        "/destroy",
                        web::get().to(|session: SessionContext| async move {
                            let _ = session.destroy();
                            HttpResponse::Ok().finish()
                        }),
                    )
                    .route(
                        "/set-invalid",
                        web::get().to(|session: Session| async move {
                            session
                                .insert(USER_ID_KEY, "not-a-number")
                                .expect("set invalid user id");
                            HttpResponse::Ok().finish()
                        }),
                    ),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn round_trips_user_id() {
        let app = session_app!();
        let res = test::call_service(&app, test::TestRequest::get().uri("/set").to_request()).await;
        assert_eq!(res.status(), StatusCode::OK);
        let cookie = session_cookie(&res);

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/get").cookie(cookie).to_request(),
        )
        .await;
        let body = test::read_body(res).await;
        assert_eq!(body.as_ref(), b"42");
    }

    #[actix_web::test]
    async fn unreadable_user_id_reads_as_absent() {
        let app = session_app!();
        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/set-invalid").to_request(),
        )
        .await;
        let cookie = session_cookie(&res);

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/get").cookie(cookie).to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = test::read_body(res).await;
        assert!(body.is_empty());
    }

    #[actix_web::test]
    async fn destroy_expires_the_cookie() {
        let app = session_app!();
        let res = test::call_service(&app, test::TestRequest::get().uri("/set").to_request()).await;
        let cookie = session_cookie(&res);

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/destroy")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        let removal = session_cookie(&res);
        assert_eq!(removal.value(), "");
    }
}
