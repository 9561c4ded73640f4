//! HTML pages, rendered with tera from templates embedded in the binary.

use axum::response::Html;
use tera::{Context, Tera};

use crate::model::Todo;

pub struct Views {
    engine: Tera,
    multi_user: bool,
}

impl Views {
    pub fn new(multi_user: bool) -> Result<Self, tera::Error> {
        let mut engine = Tera::default();
        engine.add_raw_templates(vec![
            ("layout.html", include_str!("../templates/layout.html")),
            ("index.html", include_str!("../templates/index.html")),
            ("login.html", include_str!("../templates/login.html")),
            ("register.html", include_str!("../templates/register.html")),
        ])?;

        Ok(Self { engine, multi_user })
    }

    fn context(&self) -> Context {
        let mut context = Context::new();
        context.insert("multi_user", &self.multi_user);
        context
    }

    pub fn index(&self, todos: &[Todo]) -> Result<Html<String>, tera::Error> {
        let mut context = self.context();
        context.insert("todos", todos);
        self.engine.render("index.html", &context).map(Html)
    }

    pub fn login(&self, error: Option<&str>) -> Result<Html<String>, tera::Error> {
        self.form("login.html", error)
    }

    pub fn register(&self, error: Option<&str>) -> Result<Html<String>, tera::Error> {
        self.form("register.html", error)
    }

    fn form(&self, template: &str, error: Option<&str>) -> Result<Html<String>, tera::Error> {
        let mut context = self.context();
        context.insert("error", &error);
        self.engine.render(template, &context).map(Html)
    }
}
