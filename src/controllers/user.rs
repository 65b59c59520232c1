use crate::binder::Args;
use crate::context::Exchange;
use crate::models::{SignInRequest, User};
use crate::registry::{HandlerRegistry, Route};
use crate::view::ModelAndView;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Sign-in, sign-out and profile handlers.
///
/// Holds a fixed read-only user table, so the shared instance is safe
/// across concurrent requests.
pub struct UserController {
    users: HashMap<String, User>,
}

impl Default for UserController {
    fn default() -> Self {
        let users = [
            User::new("bob@example.com", "bob123", "Bob", "This is bob."),
            User::new("tom@example.com", "tomcat", "Tom", "This is tom."),
        ]
        .into_iter()
        .map(|u| (u.email.clone(), u))
        .collect();
        Self { users }
    }
}

impl UserController {
    /// `GET /signin` - the sign-in page.
    pub fn signin(&self, _ex: &mut Exchange, _args: &Args) -> anyhow::Result<Option<ModelAndView>> {
        Ok(Some(ModelAndView::new("/signin.html")))
    }

    /// `POST /signin` - checks credentials and writes an inline JSON
    /// result; returns `None` because the response is already final.
    pub fn do_signin(&self, ex: &mut Exchange, args: &Args) -> anyhow::Result<Option<ModelAndView>> {
        let form: SignInRequest = args.body()?;
        let session = args.session(2)?;
        ex.set_content_type("application/json");
        match self.users.get(&form.email) {
            Some(user) if user.password == form.password => {
                session.set("user", user);
                info!(email = %form.email, "sign-in succeeded");
                ex.write(r#"{"result":true}"#);
            }
            _ => {
                info!(email = %form.email, "sign-in rejected");
                ex.write(r#"{"error":"Bad email or password"}"#);
            }
        }
        Ok(None)
    }

    /// `GET /signout` - drops the signed-in user and redirects home.
    pub fn signout(&self, _ex: &mut Exchange, args: &Args) -> anyhow::Result<Option<ModelAndView>> {
        let session = args.session(0)?;
        session.remove("user");
        Ok(Some(ModelAndView::new("redirect:/")))
    }

    /// `GET /user/profile` - the profile page, or a redirect to sign-in
    /// for anonymous visitors.
    pub fn profile(&self, _ex: &mut Exchange, args: &Args) -> anyhow::Result<Option<ModelAndView>> {
        let session = args.session(0)?;
        match session.get("user") {
            Some(user) if !user.is_null() => {
                Ok(Some(ModelAndView::with("/profile.html", "user", user)))
            }
            _ => Ok(Some(ModelAndView::new("redirect:/signin"))),
        }
    }
}

pub fn register(registry: &mut HandlerRegistry) {
    let controller = Arc::new(UserController::default());
    registry.add(Route::get("/signin").handler({
        let c = controller.clone();
        move |ex, args| c.signin(ex, args)
    }));
    registry.add(
        Route::post("/signin")
            .payload_param()
            .response_param()
            .session_param()
            .handler({
                let c = controller.clone();
                move |ex, args| c.do_signin(ex, args)
            }),
    );
    registry.add(Route::get("/signout").session_param().handler({
        let c = controller.clone();
        move |ex, args| c.signout(ex, args)
    }));
    registry.add(Route::get("/user/profile").session_param().handler({
        let c = controller;
        move |ex, args| c.profile(ex, args)
    }));
}
